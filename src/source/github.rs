use super::{SourceAdapter, reference};
use crate::constants::GITHUB_WEB_URL;
use crate::github::GithubClient;
use crate::utils::BlockingRuntime;
use anyhow::Result;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::{LazyLock, Mutex, OnceLock, PoisonError};
use tracing::debug;

static RELEASE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v\d+\.\d+\.\d+").expect("release tag pattern is valid"));

/// A public GitHub repository.
///
/// Release tags are listed once per instance; a failed listing is not
/// cached, so a later call retries.
#[derive(Debug)]
pub struct GithubSource {
    org: String,
    repo: String,
    client: GithubClient,
    runtime: BlockingRuntime,
    tags: OnceLock<BTreeSet<String>>,
    tags_lock: Mutex<()>,
}

impl GithubSource {
    pub fn new(org: impl Into<String>, repo: impl Into<String>, client: GithubClient, runtime: BlockingRuntime) -> Self {
        Self {
            org: org.into(),
            repo: repo.into(),
            client,
            runtime,
            tags: OnceLock::new(),
            tags_lock: Mutex::new(()),
        }
    }

    pub fn org(&self) -> &str {
        &self.org
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }
}

impl SourceAdapter for GithubSource {
    fn read_file(&self, path: &str, version: Option<&str>) -> Result<Option<String>> {
        let reference = reference(version);
        debug!("{} reading {path}@{reference}", self.desc());
        self.runtime.block_on(self.client.raw_file(&self.org, &self.repo, &reference, path))
    }

    fn web_url(&self, path: &str, version: Option<&str>) -> String {
        format!("{GITHUB_WEB_URL}/{}/{}/blob/{}/{path}", self.org, self.repo, reference(version))
    }

    fn release_tags(&self) -> Result<&BTreeSet<String>> {
        if let Some(tags) = self.tags.get() {
            return Ok(tags);
        }

        let _guard = self.tags_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(tags) = self.tags.get() {
            return Ok(tags);
        }

        let tags: BTreeSet<String> = self
            .runtime
            .block_on(self.client.tags(&self.org, &self.repo))?
            .into_iter()
            .filter(|tag| RELEASE_TAG.is_match(tag))
            .collect();
        debug!("{} {} release tags", self.desc(), tags.len());
        Ok(self.tags.get_or_init(|| tags))
    }

    fn desc(&self) -> String {
        format!("[source:github/{}/{}]", self.org, self.repo)
    }
}
