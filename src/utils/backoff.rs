//! Exponential backoff schedules for retried upstream requests.

use crate::constants::REGISTRY_RETRY_MAX_DELAY;
use std::time::Duration;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

/// Delays between attempts for a request allowed `max_attempts` tries in total.
///
/// Starts at roughly `base_ms`, doubles each time, is capped at
/// [`REGISTRY_RETRY_MAX_DELAY`] and jittered. The iterator yields
/// `max_attempts - 1` delays because the first attempt is not delayed.
pub fn retry_schedule(base_ms: u64, max_attempts: usize) -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(2)
        .factor((base_ms / 2).max(1))
        .max_delay(REGISTRY_RETRY_MAX_DELAY)
        .map(jitter)
        .take(max_attempts.saturating_sub(1))
}
