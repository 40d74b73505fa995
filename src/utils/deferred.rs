//! Compute-once cells.
//!
//! A [`Deferred`] captures a generator and runs it at most once, if and when
//! the value is first requested. Concurrent first callers block until the single
//! computation finishes and then all observe the same value; later callers take
//! the lock-free fast path.
//!
//! ```rust
//! use docket_cli::utils::Deferred;
//!
//! let deferred = Deferred::new(|| 6 * 7);
//! assert!(!deferred.is_computed());
//! assert_eq!(*deferred.get(), 42);
//! assert!(deferred.is_computed());
//! ```

use std::fmt;
use std::sync::OnceLock;

type Generator<T> = Box<dyn Fn() -> T + Send + Sync>;

/// A value computed at most once, on first access.
pub struct Deferred<T> {
    // OnceLock gives the double-checked fast path: an atomic state check,
    // then a blocking once-guard around the single computation.
    value: OnceLock<T>,
    generator: Generator<T>,
}

impl<T> Deferred<T> {
    pub fn new(generator: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self {
            value: OnceLock::new(),
            generator: Box::new(generator),
        }
    }

    /// Returns the value, computing it if this is the first request.
    pub fn get(&self) -> &T {
        if let Some(value) = self.value.get() {
            return value;
        }
        self.value.get_or_init(|| (self.generator)())
    }

    pub fn is_computed(&self) -> bool {
        self.value.get().is_some()
    }
}

impl<T: fmt::Debug> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.get() {
            Some(value) => f.debug_tuple("Deferred").field(value).finish(),
            None => f.write_str("Deferred(<pending>)"),
        }
    }
}
