use super::{EmbeddedPlugin, PluginId, Release};
use crate::constants::PLUGIN_DOC_PATH;
use crate::core::{DocketError, PluginType};
use crate::repository::RepositoryCore;
use crate::utils::Deferred;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A plugin published as its own package.
///
/// Obtained through [`Repository::released_plugin`](crate::repository::Repository::released_plugin),
/// which validates the package name and hands out one shared instance per version.
/// For `integration` packages the embedded plugin list is computed from registry
/// metadata on first request and reused afterwards.
pub struct ArtifactPlugin {
    id: PluginId,
    release: Arc<Release>,
    embedded: Deferred<Result<Vec<EmbeddedPlugin>, DocketError>>,
}

impl ArtifactPlugin {
    pub(crate) fn new(id: PluginId, repository: Arc<RepositoryCore>, version: Option<String>) -> Self {
        let release = Arc::new(Release {
            repository,
            version,
        });
        let embedded = {
            let id = id.clone();
            let release = Arc::clone(&release);
            Deferred::new(move || generate_embedded_plugins(&id, &release))
        };

        Self {
            id,
            release,
            embedded,
        }
    }

    pub fn id(&self) -> &PluginId {
        &self.id
    }

    pub fn version(&self) -> Option<&str> {
        self.release.version.as_deref()
    }

    pub fn tag(&self) -> String {
        self.release.tag()
    }

    pub fn release_date(&self) -> Option<DateTime<Utc>> {
        self.release.release_date()
    }

    pub fn changelog_url(&self) -> String {
        self.release.changelog_url()
    }

    pub fn documentation(&self) -> Result<Option<String>> {
        self.release.read_file(PLUGIN_DOC_PATH)
    }

    pub fn desc(&self) -> String {
        format!("[plugin:{}@{}]", self.id.canonical_name(), self.tag())
    }

    pub fn repository_name(&self) -> &str {
        self.release.repository.name()
    }

    /// Plugins bundled in this release, in the order the package declares them.
    pub fn embedded_plugins(&self) -> Result<&[EmbeddedPlugin]> {
        self.embedded.get().as_deref().map_err(|e| e.clone().into())
    }
}

fn generate_embedded_plugins(id: &PluginId, release: &Arc<Release>) -> Result<Vec<EmbeddedPlugin>, DocketError> {
    if id.plugin_type() != PluginType::Integration {
        return Ok(Vec::new());
    }

    let registry = release.repository.registry();
    let metadata = match release.version.as_deref() {
        Some(version) => registry.for_version(version),
        None => registry.latest(),
    };
    let metadata = metadata.ok_or_else(|| DocketError::NoReleases {
        package: format!("{}@{}", id.canonical_name(), release.tag()),
    })?;

    let embedded = metadata
        .integration_plugins()
        .iter()
        .map(|name| {
            PluginId::parse(name, "an embedded plugin", PluginType::is_embeddable)
                .map(|embedded_id| EmbeddedPlugin::new(embedded_id, id.clone(), Arc::clone(release)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    debug!("[plugin:{}@{}] {} embedded plugins", id.canonical_name(), release.tag(), embedded.len());
    Ok(embedded)
}

impl PartialEq for ArtifactPlugin {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.version() == other.version() && self.repository_name() == other.repository_name()
    }
}

impl Eq for ArtifactPlugin {}

impl fmt::Debug for ArtifactPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactPlugin")
            .field("id", &self.id)
            .field("version", &self.version())
            .field("repository", &self.repository_name())
            .finish()
    }
}
