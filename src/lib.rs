//! docket - Logstash plugin documentation generator
//!
//! docket resolves plugin packages through the rubygems registry, reads each
//! release's documentation from its GitHub source repository, and writes it
//! into the `logstash-docs` repository, either as the current reference or as
//! one document per tagged release.
//!
//! # Architecture Overview
//!
//! A **package** is published to the registry under a name of the form
//! `logstash-<type>-<name>`. Each package is backed by a source repository,
//! and a release of it is a [`plugin::Plugin`]. Integration packages bundle
//! several embedded plugins, and any plugin may be reachable under an alias
//! declared in the central alias registry. Documentation runs expand every
//! release into all the plugins it documents and write one document for each.
//!
//! Registry and source lookups are lazy and memoised per repository, so a
//! run only fetches what it documents.
//!
//! # Core Modules
//!
//! ## Domain model
//! - [`version`] - registry version parsing and ordering
//! - [`registry`] - release metadata and the rubygems client
//! - [`source`] - source repositories and their resolution from metadata
//! - [`repository`] - a package bound to its registry data and source
//! - [`plugin`] - artifact, embedded and alias plugins, and their traversal
//! - [`alias`] - the alias definitions table
//!
//! ## Generation
//! - [`docs`] - content rewriting, output layout, indexes and the two pipelines
//! - [`git`] - git operations on the documentation checkout
//! - [`publish`] - branch, commit and pull request workflow
//!
//! ## Supporting modules
//! - [`cli`] - command-line interface
//! - [`config`] - settings document and versions report
//! - [`constants`] - endpoints, paths and defaults
//! - [`core`] - error types and plugin types
//! - [`github`] - GitHub REST and raw-content client
//! - [`utils`] - concurrency primitives, retry schedule, file writes

pub mod alias;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod docs;
pub mod git;
pub mod github;
pub mod plugin;
pub mod publish;
pub mod registry;
pub mod repository;
pub mod source;
pub mod utils;
pub mod version;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
