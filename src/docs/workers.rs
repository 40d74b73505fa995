//! Bounded pool of blocking workers.

use anyhow::{Result, anyhow};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::error;

/// Runs `work` for every item on tokio's blocking pool, at most `parallelism`
/// at a time, and waits for all of them.
///
/// A failing item is logged and counted; it never stops the others. Returns
/// the number of failed items.
pub(crate) async fn run_blocking<T, F>(items: Vec<T>, parallelism: usize, work: Arc<F>) -> usize
where
    T: Send + 'static,
    F: Fn(T) -> Result<()> + Send + Sync + 'static,
{
    let results: Vec<Result<()>> = stream::iter(items)
        .map(|item| {
            let work = Arc::clone(&work);
            async move {
                tokio::task::spawn_blocking(move || work(item))
                    .await
                    .map_err(|e| anyhow!("Worker task failed: {e}"))?
            }
        })
        .buffer_unordered(parallelism.max(1))
        .collect()
        .await;

    let mut failures = 0;
    for error in results.into_iter().filter_map(Result::err) {
        error!("{error:#}");
        failures += 1;
    }
    failures
}
