//! Thread-safe get-or-create index.

use dashmap::DashMap;
use std::hash::Hash;
use std::sync::{Arc, OnceLock};

type Generator<K, V> = Box<dyn Fn(&K) -> V + Send + Sync>;

/// A key → value map that creates missing values with a fixed generator.
///
/// Each key owns a compute-once cell. The map shard is only locked long enough
/// to find or insert that cell; generation happens outside it, so concurrent
/// requests for the same key produce exactly one value while distinct keys
/// never wait on each other. Values are typically `Arc`s so clones share
/// identity.
pub struct ThreadsafeIndex<K, V> {
    entries: DashMap<K, Arc<OnceLock<V>>>,
    generator: Generator<K, V>,
}

impl<K, V> ThreadsafeIndex<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(generator: impl Fn(&K) -> V + Send + Sync + 'static) -> Self {
        Self {
            entries: DashMap::new(),
            generator: Box::new(generator),
        }
    }

    /// Fetches the value for `key`, generating and storing it on first request.
    pub fn fetch(&self, key: &K) -> V {
        let cell = match self.entries.get(key) {
            Some(cell) => Arc::clone(cell.value()),
            None => Arc::clone(self.entries.entry(key.clone()).or_default().value()),
        };
        cell.get_or_init(|| (self.generator)(key)).clone()
    }

    /// Snapshot of the generated entries; never generates new ones.
    pub fn entries(&self) -> Vec<(K, V)> {
        self.entries
            .iter()
            .filter_map(|entry| entry.value().get().map(|value| (entry.key().clone(), value.clone())))
            .collect()
    }
}

impl<K, V> std::fmt::Debug for ThreadsafeIndex<K, V>
where
    K: Eq + Hash + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<String> = self.entries.iter().map(|entry| format!("{:?}", entry.key())).collect();
        f.debug_struct("ThreadsafeIndex").field("keys", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Barrier, mpsc};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_fetch_is_reference_stable() {
        let index = ThreadsafeIndex::new(|key: &String| Arc::new(key.to_uppercase()));
        let first = index.fetch(&"beats".to_string());
        let second = index.fetch(&"beats".to_string());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(index.entries().len(), 1);
    }

    #[test]
    fn test_concurrent_fetch_generates_once_per_key() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let index = Arc::new(ThreadsafeIndex::new(move |key: &u32| {
            counter.fetch_add(1, Ordering::SeqCst);
            Arc::new(*key * 10)
        }));

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let index = Arc::clone(&index);
                thread::spawn(move || *index.fetch(&(i % 4)))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(index.entries().len(), 4);
    }

    #[test]
    fn test_distinct_keys_generate_concurrently() {
        // each generator waits for the other, so this only finishes if both run at once
        let barrier = Arc::new(Barrier::new(2));
        let index = Arc::new(ThreadsafeIndex::new(move |key: &u32| {
            barrier.wait();
            *key
        }));

        let (done, finished) = mpsc::channel();
        for key in [1u32, 2] {
            let index = Arc::clone(&index);
            let done = done.clone();
            thread::spawn(move || done.send(index.fetch(&key)).unwrap());
        }

        let mut values = vec![
            finished.recv_timeout(Duration::from_secs(5)).unwrap(),
            finished.recv_timeout(Duration::from_secs(5)).unwrap(),
        ];
        values.sort();
        assert_eq!(values, vec![1, 2]);
    }

    #[test]
    fn test_entries_do_not_generate() {
        let index = ThreadsafeIndex::new(|key: &Option<String>| key.clone().unwrap_or_default());
        assert!(index.entries().is_empty());
        index.fetch(&None);
        index.fetch(&Some("1.0.0".to_string()));
        let mut values: Vec<String> = index.entries().into_iter().map(|(_, v)| v).collect();
        values.sort();
        assert_eq!(values, vec![String::new(), "1.0.0".to_string()]);
    }
}
