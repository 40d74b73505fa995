//! Bridge from blocking domain code to the async HTTP clients.
//!
//! The plugin model is synchronous: workers run it on tokio's blocking pool
//! (`spawn_blocking`) and every network read funnels through a
//! [`BlockingRuntime`], which drives the client future on the runtime captured
//! at construction. Calling [`BlockingRuntime::block_on`] from an async task
//! panics inside tokio; only blocking-pool threads and plain OS threads may use it.

use anyhow::{Context, Result};
use std::future::Future;
use tokio::runtime::{Handle, Runtime};

#[derive(Debug, Clone)]
pub struct BlockingRuntime {
    handle: Handle,
}

impl BlockingRuntime {
    /// Captures the runtime of the calling context.
    pub fn current() -> Result<Self> {
        let handle = Handle::try_current()
            .context("Network clients must be created inside a tokio runtime")?;
        Ok(Self {
            handle,
        })
    }

    pub fn from_handle(handle: Handle) -> Self {
        Self {
            handle,
        }
    }

    /// Runs `future` to completion on the captured runtime, blocking this thread.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.handle.block_on(future)
    }
}

/// Builds a standalone multi-threaded runtime for synchronous callers (tests, tools).
pub fn standalone_runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start tokio runtime")
}
