use super::{PluginId, Release};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

/// A plugin that ships only inside an integration package.
///
/// Shares the release (version, date, changelog) of its owning artifact and
/// reads `docs/<type>-<name>.asciidoc` from the owner's source tree.
#[derive(Clone)]
pub struct EmbeddedPlugin {
    id: PluginId,
    artifact: PluginId,
    release: Arc<Release>,
}

impl EmbeddedPlugin {
    pub(crate) fn new(id: PluginId, artifact: PluginId, release: Arc<Release>) -> Self {
        Self {
            id,
            artifact,
            release,
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
        self.release.read_file(&self.doc_path())
    }

    pub fn doc_path(&self) -> String {
        format!("docs/{}-{}.asciidoc", self.id.plugin_type(), self.id.name())
    }

    pub fn desc(&self) -> String {
        format!("[plugin:{}/{}@{}]", self.artifact.canonical_name(), self.id.canonical_name(), self.tag())
    }

    pub fn repository_name(&self) -> &str {
        self.release.repository.name()
    }
}

impl PartialEq for EmbeddedPlugin {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.version() == other.version()
            && self.artifact == other.artifact
            && self.repository_name() == other.repository_name()
    }
}

impl Eq for EmbeddedPlugin {}

impl fmt::Debug for EmbeddedPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedPlugin")
            .field("id", &self.id)
            .field("artifact", &self.artifact)
            .field("version", &self.version())
            .finish()
    }
}
