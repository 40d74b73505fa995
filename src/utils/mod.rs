//! Shared utilities
//!
//! - [`deferred`] - compute-once cells ([`Deferred`])
//! - [`index`] - get-or-create maps ([`ThreadsafeIndex`])
//! - [`sync_set`] - serialized ordered sets ([`SyncSet`])
//! - [`runtime`] - the blocking → async bridge used by network clients
//! - [`backoff`] - retry delay schedules
//! - [`fs`] - atomic writes for generated documents

pub mod backoff;
pub mod deferred;
pub mod fs;
pub mod index;
pub mod runtime;
pub mod sync_set;

pub use deferred::Deferred;
pub use fs::{ensure_dir, read_if_exists, safe_write};
pub use index::ThreadsafeIndex;
pub use runtime::BlockingRuntime;
pub use sync_set::SyncSet;
