use super::{RegistryApi, ReleaseMetadata};
use crate::utils::Deferred;
use crate::version::PluginVersion;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct ReleaseIndex {
    /// Version strings, newest first.
    order: Vec<String>,
    by_version: HashMap<String, ReleaseMetadata>,
}

/// Memoized registry view of one package.
///
/// The full release list is fetched at most once per instance, on first
/// access, no matter how many threads ask concurrently. A fetch that fails
/// after retries is logged and cached as "no releases".
pub struct RegistryInfo {
    package: String,
    index: Deferred<ReleaseIndex>,
}

impl RegistryInfo {
    pub fn new(package: impl Into<String>, api: Arc<dyn RegistryApi>) -> Self {
        let package = package.into();
        let name = package.clone();
        Self {
            package,
            index: Deferred::new(move || load(&name, api.as_ref())),
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// All published versions, newest first, prereleases included.
    pub fn versions(&self) -> &[String] {
        &self.index.get().order
    }

    pub fn for_version(&self, version: &str) -> Option<&ReleaseMetadata> {
        self.index.get().by_version.get(version)
    }

    /// The newest release that is not a prerelease.
    pub fn latest(&self) -> Option<&ReleaseMetadata> {
        self.newest(false)
    }

    pub fn newest(&self, include_prerelease: bool) -> Option<&ReleaseMetadata> {
        let index = self.index.get();
        index
            .order
            .iter()
            .filter_map(|v| index.by_version.get(v))
            .find(|release| include_prerelease || !is_prerelease(release))
    }

    pub fn is_loaded(&self) -> bool {
        self.index.is_computed()
    }
}

impl std::fmt::Debug for RegistryInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryInfo")
            .field("package", &self.package)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

/// Registry flag or version shape; either marks a prerelease.
pub(crate) fn is_prerelease(release: &ReleaseMetadata) -> bool {
    release.prerelease
        || PluginVersion::parse(&release.number).map(|v| v.is_prerelease()).unwrap_or(false)
}

fn load(package: &str, api: &dyn RegistryApi) -> ReleaseIndex {
    let releases = match api.fetch_releases(package) {
        Ok(releases) => releases,
        Err(e) => {
            warn!("[registry:{package}] no release data available: {e:#}");
            return ReleaseIndex::default();
        }
    };

    let mut parsed: Vec<(PluginVersion, ReleaseMetadata)> = Vec::with_capacity(releases.len());
    let mut by_version = HashMap::with_capacity(releases.len());
    for release in releases {
        let version = match PluginVersion::parse(&release.number) {
            Ok(version) => version,
            Err(e) => {
                debug!("[registry:{package}] ignoring release: {e}");
                continue;
            }
        };
        if by_version.contains_key(&release.number) {
            continue;
        }
        by_version.insert(release.number.clone(), release.clone());
        parsed.push((version, release));
    }

    parsed.sort_by(|(a, _), (b, _)| b.cmp(a));
    let order = parsed.into_iter().map(|(_, release)| release.number).collect();
    debug!("[registry:{package}] loaded {} releases", by_version.len());

    ReleaseIndex {
        order,
        by_version,
    }
}
