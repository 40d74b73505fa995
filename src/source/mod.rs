//! Versioned source hosts.
//!
//! A [`SourceAdapter`] reads files of a plugin's source tree at a release,
//! builds public links to them, and lists release tags. Versions map to refs
//! with [`reference`]: a pinned version `x.y.z` reads from tag `vx.y.z`, an
//! unpinned plugin reads from the floating [`FLOATING_REF`] branch.
//!
//! [`SourceFactory`] decides where a package's source lives, preferring the
//! `source_code_uri` declared in registry metadata and falling back to the
//! configured organisation plus the package name.

mod github;

pub use github::GithubSource;

use crate::constants::{DEFAULT_PLUGIN_ORG, FLOATING_REF};
use crate::github::GithubClient;
use crate::registry::ReleaseMetadata;
use crate::utils::BlockingRuntime;
use anyhow::Result;
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, LazyLock};

static GITHUB_REPOSITORY_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"github\.com[/:](?P<org>[^/\s]+)/(?P<repo>[^/\s?#]+?)(?:\.git)?/?(?:[?#].*)?$")
        .expect("repository url pattern is valid")
});

/// Blocking access to a plugin's versioned source tree.
pub trait SourceAdapter: Send + Sync + fmt::Debug {
    /// Contents of `path` at `version`, or `None` when the file does not exist there.
    fn read_file(&self, path: &str, version: Option<&str>) -> Result<Option<String>>;

    /// Public link to `path` at `version`. Never performs I/O.
    fn web_url(&self, path: &str, version: Option<&str>) -> String;

    /// Tags shaped like `v<major>.<minor>.<patch>`, fetched once per adapter.
    fn release_tags(&self) -> Result<&BTreeSet<String>>;

    fn desc(&self) -> String;
}

/// Picks the source of a package from the metadata of its resolved release.
pub trait SourceResolver: Send + Sync {
    fn resolve(&self, package: &str, release: &ReleaseMetadata) -> Arc<dyn SourceAdapter>;
}

impl<F> SourceResolver for F
where
    F: Fn(&str, &ReleaseMetadata) -> Arc<dyn SourceAdapter> + Send + Sync,
{
    fn resolve(&self, package: &str, release: &ReleaseMetadata) -> Arc<dyn SourceAdapter> {
        self(package, release)
    }
}

/// Ref for a version: `v<version>`, or the floating branch.
pub fn reference(version: Option<&str>) -> String {
    match version {
        Some(version) => format!("v{version}"),
        None => FLOATING_REF.to_string(),
    }
}

/// `(org, repo)` from a GitHub repository URL such as a `source_code_uri`.
pub fn parse_github_url(url: &str) -> Option<(String, String)> {
    let captures = GITHUB_REPOSITORY_URL.captures(url.trim())?;
    Some((captures["org"].to_string(), captures["repo"].to_string()))
}

/// Builds [`GithubSource`]s sharing one client and runtime bridge.
#[derive(Debug, Clone)]
pub struct SourceFactory {
    client: GithubClient,
    runtime: BlockingRuntime,
    default_org: String,
}

impl SourceFactory {
    pub fn new(client: GithubClient, runtime: BlockingRuntime) -> Self {
        Self {
            client,
            runtime,
            default_org: DEFAULT_PLUGIN_ORG.to_string(),
        }
    }

    /// Uses `PLUGIN_ORG` as the fallback organisation when set.
    #[must_use]
    pub fn with_env_org(self) -> Self {
        match std::env::var("PLUGIN_ORG") {
            Ok(org) if !org.trim().is_empty() => self.with_default_org(org.trim()),
            _ => self,
        }
    }

    #[must_use]
    pub fn with_default_org(mut self, org: impl Into<String>) -> Self {
        self.default_org = org.into();
        self
    }

    pub fn default_org(&self) -> &str {
        &self.default_org
    }

    pub fn github(&self, org: &str, repo: &str) -> Arc<dyn SourceAdapter> {
        Arc::new(GithubSource::new(org, repo, self.client.clone(), self.runtime.clone()))
    }

    /// Source for an `org/repo` spec.
    pub fn from_spec(&self, spec: &str) -> Result<Arc<dyn SourceAdapter>> {
        match spec.split_once('/') {
            Some((org, repo)) if !org.is_empty() && !repo.is_empty() && !repo.contains('/') => {
                Ok(self.github(org, repo))
            }
            _ => anyhow::bail!("incomplete repository spec `{spec}`, expected `org/repo`"),
        }
    }

    /// Source for a package, from its release metadata when it names a GitHub repository.
    pub fn for_release(&self, package: &str, release: &ReleaseMetadata) -> Arc<dyn SourceAdapter> {
        let (org, repo) = locate(package, release, &self.default_org);
        self.github(&org, &repo)
    }
}

impl SourceResolver for SourceFactory {
    fn resolve(&self, package: &str, release: &ReleaseMetadata) -> Arc<dyn SourceAdapter> {
        self.for_release(package, release)
    }
}

fn locate(package: &str, release: &ReleaseMetadata, default_org: &str) -> (String, String) {
    release
        .source_code_uri()
        .and_then(parse_github_url)
        .unwrap_or_else(|| (default_org.to_string(), package.to_string()))
}
