//! Repositories: a package name bound to its source and registry history.
//!
//! A [`Repository`] is only built through its factories:
//!
//! - [`Repository::from_registry`] resolves the package in the registry first
//!   and asks the caller for a source based on the release metadata
//! - [`Repository::from_source`] binds a name to an already known source
//!
//! Both validate the package name before touching the network. Plugins are
//! handed out through a memoizing index, so asking twice for the same version
//! returns the same [`ArtifactPlugin`] instance and its cached state (such as
//! the embedded plugin list) is shared.

use crate::core::DocketError;
use crate::plugin::{ArtifactPlugin, PluginId};
use crate::registry::{RegistryApi, RegistryInfo, ReleaseMetadata};
use crate::source::SourceAdapter;
use crate::utils::ThreadsafeIndex;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::error;

/// State shared by a repository and every plugin it hands out.
#[derive(Debug)]
pub struct RepositoryCore {
    name: String,
    source: Arc<dyn SourceAdapter>,
    registry: RegistryInfo,
}

impl RepositoryCore {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &Arc<dyn SourceAdapter> {
        &self.source
    }

    pub fn registry(&self) -> &RegistryInfo {
        &self.registry
    }

    pub fn read_file(&self, path: &str, version: Option<&str>) -> Result<Option<String>> {
        self.source.read_file(path, version)
    }

    pub fn web_url(&self, path: &str, version: Option<&str>) -> String {
        self.source.web_url(path, version)
    }

    /// Publication time of `version`, from registry metadata.
    pub fn release_date(&self, version: &str) -> Option<DateTime<Utc>> {
        self.registry.for_version(version)?.created_at
    }
}

#[derive(Clone)]
pub struct Repository {
    core: Arc<RepositoryCore>,
    plugins: Arc<ThreadsafeIndex<Option<String>, Arc<ArtifactPlugin>>>,
}

impl Repository {
    /// Resolves `name` in the registry, at `version` or the latest release.
    ///
    /// Returns `Ok(None)`, after logging, when the registry knows no such
    /// package or release. `resolve_source` receives the metadata of the
    /// resolved release.
    pub fn from_registry(
        name: &str,
        version: Option<&str>,
        registry: Arc<dyn RegistryApi>,
        resolve_source: impl FnOnce(&ReleaseMetadata) -> Arc<dyn SourceAdapter>,
    ) -> Result<Option<Self>, DocketError> {
        let id = validate(name)?;
        let info = RegistryInfo::new(name, registry);

        let Some(version) = version.map(String::from).or_else(|| info.latest().map(|r| r.number.clone())) else {
            error!("[gem:{name}]: release metadata unavailable from registry");
            return Ok(None);
        };
        let Some(metadata) = info.for_version(&version) else {
            error!("[gem:{name}]: release `{version}` not published to registry");
            return Ok(None);
        };

        let source = resolve_source(metadata);
        Ok(Some(Self::new(id, name, source, info)))
    }

    /// Binds `name` to a known source; registry data is fetched on first use.
    pub fn from_source(
        name: &str,
        source: Arc<dyn SourceAdapter>,
        registry: Arc<dyn RegistryApi>,
    ) -> Result<Self, DocketError> {
        let id = validate(name)?;
        Ok(Self::new(id, name, source, RegistryInfo::new(name, registry)))
    }

    fn new(id: PluginId, name: &str, source: Arc<dyn SourceAdapter>, registry: RegistryInfo) -> Self {
        let core = Arc::new(RepositoryCore {
            name: name.to_string(),
            source,
            registry,
        });
        let plugins = {
            let core = Arc::clone(&core);
            ThreadsafeIndex::new(move |version: &Option<String>| {
                Arc::new(ArtifactPlugin::new(id.clone(), Arc::clone(&core), version.clone()))
            })
        };

        Self {
            core,
            plugins: Arc::new(plugins),
        }
    }

    pub fn name(&self) -> &str {
        &self.core.name
    }

    pub fn desc(&self) -> String {
        format!("[repository:{}]", self.core.name)
    }

    pub fn source(&self) -> &Arc<dyn SourceAdapter> {
        &self.core.source
    }

    pub fn registry(&self) -> &RegistryInfo {
        &self.core.registry
    }

    /// The plugin for `version`, or the floating main-branch plugin for `None`.
    pub fn released_plugin(&self, version: Option<&str>) -> Arc<ArtifactPlugin> {
        self.plugins.fetch(&version.map(String::from))
    }

    /// Every registry release, newest first.
    pub fn released_plugins(&self, include_prerelease: bool) -> impl Iterator<Item = Arc<ArtifactPlugin>> + '_ {
        self.registry()
            .versions()
            .iter()
            .filter(move |version| include_prerelease || !self.is_prerelease(version))
            .map(move |version| self.released_plugin(Some(version.as_str())))
    }

    /// Registry releases that also have a release tag in the source, newest first.
    pub fn source_tagged_releases(
        &self,
        include_prerelease: bool,
    ) -> Result<impl Iterator<Item = Arc<ArtifactPlugin>> + '_> {
        let tags: &BTreeSet<String> = self.core.source.release_tags()?;
        Ok(self.released_plugins(include_prerelease).filter(move |plugin| tags.contains(&plugin.tag())))
    }

    pub fn last_release(&self) -> Option<Arc<ArtifactPlugin>> {
        let latest = self.registry().latest()?;
        Some(self.released_plugin(Some(&latest.number)))
    }

    pub fn last_release_date(&self) -> Option<DateTime<Utc>> {
        self.registry().latest()?.created_at
    }

    fn is_prerelease(&self, version: &str) -> bool {
        self.registry().for_version(version).is_some_and(crate::registry::is_prerelease)
    }
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository").field("name", &self.core.name).field("source", &self.core.source).finish()
    }
}

fn validate(name: &str) -> Result<PluginId, DocketError> {
    PluginId::parse(name, "a top-level plugin", |_| true)
}
