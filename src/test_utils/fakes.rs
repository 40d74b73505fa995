use crate::registry::{RegistryApi, ReleaseMetadata};
use crate::source::SourceAdapter;
use anyhow::Result;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};

/// Registry serving releases from memory.
#[derive(Debug, Default)]
pub struct FakeRegistry {
    releases: HashMap<String, Vec<ReleaseMetadata>>,
    failing: HashSet<String>,
    fetches: Mutex<HashMap<String, usize>>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_release(mut self, package: &str, release: ReleaseMetadata) -> Self {
        self.releases.entry(package.to_string()).or_default().push(release);
        self
    }

    /// Makes every fetch for `package` fail, as after exhausted retries.
    #[must_use]
    pub fn failing(mut self, package: &str) -> Self {
        self.failing.insert(package.to_string());
        self
    }

    pub fn fetch_count(&self, package: &str) -> usize {
        self.lock().get(package).copied().unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.lock().values().sum()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, usize>> {
        self.fetches.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RegistryApi for FakeRegistry {
    fn fetch_releases(&self, package: &str) -> Result<Vec<ReleaseMetadata>> {
        *self.lock().entry(package.to_string()).or_default() += 1;
        if self.failing.contains(package) {
            anyhow::bail!("registry unavailable for {package}");
        }
        Ok(self.releases.get(package).cloned().unwrap_or_default())
    }
}

/// Source tree served from memory, keyed by path and version.
#[derive(Debug, Default)]
pub struct FakeSource {
    name: String,
    files: HashMap<(String, Option<String>), String>,
    tags: BTreeSet<String>,
    listed_tags: OnceLock<BTreeSet<String>>,
    reads: AtomicUsize,
    tag_fetches: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self {
            name: "fake".to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    #[must_use]
    pub fn with_file(mut self, path: &str, version: Option<&str>, content: &str) -> Self {
        self.files.insert((path.to_string(), version.map(String::from)), content.to_string());
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.insert(tag.to_string());
        self
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn tag_fetches(&self) -> usize {
        self.tag_fetches.load(Ordering::SeqCst)
    }
}

impl SourceAdapter for FakeSource {
    fn read_file(&self, path: &str, version: Option<&str>) -> Result<Option<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.files.get(&(path.to_string(), version.map(String::from))).cloned())
    }

    fn web_url(&self, path: &str, version: Option<&str>) -> String {
        format!("https://example.test/{}/blob/{}/{path}", self.name, crate::source::reference(version))
    }

    fn release_tags(&self) -> Result<&BTreeSet<String>> {
        Ok(self.listed_tags.get_or_init(|| {
            self.tag_fetches.fetch_add(1, Ordering::SeqCst);
            self.tags.clone()
        }))
    }

    fn desc(&self) -> String {
        format!("[source:fake/{}]", self.name)
    }
}
