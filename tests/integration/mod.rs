//! Integration test suite for docket
//!
//! End-to-end runs of both documentation pipelines against in-memory registry
//! and source fakes, writing into temporary directories, plus checks of the
//! binary's argument surface.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **cli**: argument parsing and early rejections of the `docket` binary
//! - **docs_pipeline**: current documentation from a versions report
//! - **fixtures**: shared registry, source and document builders
//! - **versioned_pipeline**: versioned documents and indexes

mod cli;
mod docs_pipeline;
mod fixtures;
mod versioned_pipeline;
