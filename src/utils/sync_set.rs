//! A mutex-guarded ordered set shared between workers.

use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError};

/// Ordered set whose every operation, iteration included, is serialized.
///
/// Used for the per-run "already processed" guard and for the accumulators
/// filled concurrently by pipeline workers.
#[derive(Debug, Default)]
pub struct SyncSet<T> {
    inner: Mutex<BTreeSet<T>>,
}

impl<T: Ord + Clone> SyncSet<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(BTreeSet::new()),
        }
    }

    /// Adds `value`; returns `true` if it was not present before.
    ///
    /// The check and the insert happen under one lock, so exactly one of any
    /// number of concurrent callers inserting the same value sees `true`.
    pub fn insert(&self, value: T) -> bool {
        self.lock().insert(value)
    }

    pub fn contains(&self, value: &T) -> bool {
        self.lock().contains(value)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Sorted snapshot of the current members.
    pub fn to_vec(&self) -> Vec<T> {
        self.lock().iter().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeSet<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
