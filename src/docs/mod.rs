//! Documentation generation.
//!
//! - [`content`] - placeholder substitution and the versioned-tree rewrites
//! - [`layout`] - where each document lives in the documentation repository
//! - [`index`] - versions, alias and type indexes rendered with tera
//! - [`stack`] - current stack and ECS versions lookup
//! - [`DocsPipeline`] - current docs for the plugins of a versions report
//! - [`VersionedPipeline`] - one document per tagged release, plus indexes
//!
//! Both pipelines run their per-repository work on a bounded pool of blocking
//! workers; the plugin model underneath is synchronous.

pub mod content;
pub mod index;
pub mod layout;
mod plugin_docs;
pub mod stack;
mod versioned;
mod workers;

pub use content::{ReleaseFields, StackVersions};
pub use index::{IndexWriter, VersionEntry};
pub use layout::DocsLayout;
pub use plugin_docs::{DocsOptions, DocsPipeline, DocsSummary};
pub use stack::StackVersionsLoader;
pub use versioned::{VersionedOptions, VersionedPipeline, VersionedSummary};
