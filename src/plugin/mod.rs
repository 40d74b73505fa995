//! The plugin domain model.
//!
//! A [`Plugin`] is one documentable unit. It is one of three variants:
//!
//! - [`ArtifactPlugin`] - a package release, obtained from a [`Repository`](crate::repository::Repository)
//! - [`EmbeddedPlugin`] - a plugin bundled inside an `integration` package release
//! - [`AliasPlugin`] - a renamed view over one of the above
//!
//! Every variant answers the same questions: its identity (type and name), the
//! release it documents (`version`, `tag`, `release_date`, `changelog_url`),
//! its documentation text, and a log-friendly `desc`.
//!
//! # Traversal
//!
//! One top-level release expands into every unit it documents:
//!
//! ```text
//! with_wrapped_plugins(aliases)
//!   = for p in with_embedded_plugins(): p.with_alias(aliases)
//! ```
//!
//! `with_embedded_plugins` yields the plugin itself followed by its embedded
//! plugins in declaration order; `with_alias` yields the plugin followed by one
//! alias per matching alias definition.
//!
//! # Equality
//!
//! Two plugins are equal when they are the same variant with the same type,
//! name and version. Artifacts additionally compare their repository, embedded
//! plugins their owning artifact. Aliases compare only their own identity, so
//! two aliases with the same name are equal whatever they wrap.

mod alias;
mod artifact;
mod embedded;

pub use alias::AliasPlugin;
pub use artifact::ArtifactPlugin;
pub use embedded::EmbeddedPlugin;

use crate::alias::AliasDefinitions;
use crate::constants::PLUGIN_PREFIX;
use crate::core::{DocketError, PluginType};
use crate::repository::RepositoryCore;
use crate::source::reference;
use anyhow::Result;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::fmt;
use std::sync::{Arc, LazyLock};

static PLUGIN_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^{PLUGIN_PREFIX}-(?P<type>[a-z]+)-(?P<name>[A-Za-z0-9_][A-Za-z0-9_-]*)$"))
        .expect("plugin name pattern is valid")
});

/// Type and short name of a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PluginId {
    plugin_type: PluginType,
    name: String,
}

impl PluginId {
    pub fn new(plugin_type: PluginType, name: impl Into<String>) -> Self {
        Self {
            plugin_type,
            name: name.into(),
        }
    }

    /// Parses `<prefix>-<type>-<name>`.
    ///
    /// `role` names what the plugin is being built as, for the error raised
    /// when the type is not accepted by `accept`.
    pub fn parse(
        canonical_name: &str,
        role: &str,
        accept: impl Fn(&PluginType) -> bool,
    ) -> Result<Self, DocketError> {
        let captures = PLUGIN_NAME.captures(canonical_name).ok_or_else(|| DocketError::InvalidPluginName {
            name: canonical_name.to_string(),
        })?;
        let type_name = &captures["type"];
        let unsupported = || DocketError::UnsupportedPluginType {
            desc: format!("[plugin:{canonical_name}]"),
            plugin_type: type_name.to_string(),
            role: role.to_string(),
        };
        let plugin_type = PluginType::from_name(type_name).ok_or_else(unsupported)?;
        if !accept(&plugin_type) {
            return Err(unsupported());
        }
        Ok(Self::new(plugin_type, &captures["name"]))
    }

    pub fn plugin_type(&self) -> PluginType {
        self.plugin_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn canonical_name(&self) -> String {
        format!("{PLUGIN_PREFIX}-{}-{}", self.plugin_type, self.name)
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_name())
    }
}

/// A release of a repository: the state shared by an artifact and its embedded plugins.
#[derive(Debug)]
pub(crate) struct Release {
    pub(crate) repository: Arc<RepositoryCore>,
    pub(crate) version: Option<String>,
}

impl Release {
    pub(crate) fn tag(&self) -> String {
        reference(self.version.as_deref())
    }

    pub(crate) fn release_date(&self) -> Option<DateTime<Utc>> {
        self.repository.release_date(self.version.as_deref()?)
    }

    pub(crate) fn changelog_url(&self) -> String {
        self.repository.web_url(crate::constants::CHANGELOG_PATH, self.version.as_deref())
    }

    pub(crate) fn read_file(&self, path: &str) -> Result<Option<String>> {
        self.repository.read_file(path, self.version.as_deref())
    }
}

/// Any documentable plugin.
#[derive(Debug, Clone)]
pub enum Plugin {
    Artifact(Arc<ArtifactPlugin>),
    Embedded(EmbeddedPlugin),
    Alias(AliasPlugin),
}

impl Plugin {
    pub fn id(&self) -> &PluginId {
        match self {
            Plugin::Artifact(p) => p.id(),
            Plugin::Embedded(p) => p.id(),
            Plugin::Alias(p) => p.id(),
        }
    }

    pub fn plugin_type(&self) -> PluginType {
        self.id().plugin_type()
    }

    pub fn name(&self) -> &str {
        self.id().name()
    }

    pub fn canonical_name(&self) -> String {
        self.id().canonical_name()
    }

    /// The pinned version; `None` for a floating view of the main branch.
    pub fn version(&self) -> Option<&str> {
        match self {
            Plugin::Artifact(p) => p.version(),
            Plugin::Embedded(p) => p.version(),
            Plugin::Alias(p) => p.version(),
        }
    }

    pub fn tag(&self) -> String {
        match self {
            Plugin::Artifact(p) => p.tag(),
            Plugin::Embedded(p) => p.tag(),
            Plugin::Alias(p) => p.tag(),
        }
    }

    pub fn release_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Plugin::Artifact(p) => p.release_date(),
            Plugin::Embedded(p) => p.release_date(),
            Plugin::Alias(p) => p.release_date(),
        }
    }

    pub fn changelog_url(&self) -> String {
        match self {
            Plugin::Artifact(p) => p.changelog_url(),
            Plugin::Embedded(p) => p.changelog_url(),
            Plugin::Alias(p) => p.changelog_url(),
        }
    }

    /// Raw documentation, `None` when the source has no document for this release.
    pub fn documentation(&self) -> Result<Option<String>> {
        match self {
            Plugin::Artifact(p) => p.documentation(),
            Plugin::Embedded(p) => p.documentation(),
            Plugin::Alias(p) => p.documentation(),
        }
    }

    pub fn desc(&self) -> String {
        match self {
            Plugin::Artifact(p) => p.desc(),
            Plugin::Embedded(p) => p.desc(),
            Plugin::Alias(p) => p.desc(),
        }
    }

    /// Name of the repository the documented release comes from.
    pub fn repository_name(&self) -> &str {
        match self {
            Plugin::Artifact(p) => p.repository_name(),
            Plugin::Embedded(p) => p.repository_name(),
            Plugin::Alias(p) => p.canonical_plugin().repository_name(),
        }
    }

    /// This plugin, then the plugins embedded in it, in declaration order.
    pub fn with_embedded_plugins(&self) -> Result<Vec<Plugin>> {
        let mut plugins = vec![self.clone()];
        if let Plugin::Artifact(artifact) = self {
            plugins.extend(artifact.embedded_plugins()?.iter().cloned().map(Plugin::Embedded));
        }
        Ok(plugins)
    }

    /// This plugin, then one alias per alias definition targeting it.
    pub fn with_alias(&self, aliases: &AliasDefinitions) -> Result<Vec<Plugin>> {
        let mut plugins = vec![self.clone()];
        for definition in aliases.targeting(self.plugin_type(), self.name()) {
            let alias = AliasPlugin::new(self.clone(), &definition.alias, definition.docs.clone())?;
            plugins.push(Plugin::Alias(alias));
        }
        Ok(plugins)
    }

    /// Every unit documented by this plugin: embedded plugins, and the aliases of each.
    pub fn with_wrapped_plugins(&self, aliases: &AliasDefinitions) -> Result<Vec<Plugin>> {
        let mut plugins = Vec::new();
        for plugin in self.with_embedded_plugins()? {
            plugins.extend(plugin.with_alias(aliases)?);
        }
        Ok(plugins)
    }
}

impl PartialEq for Plugin {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Plugin::Artifact(a), Plugin::Artifact(b)) => a == b,
            (Plugin::Embedded(a), Plugin::Embedded(b)) => a == b,
            (Plugin::Alias(a), Plugin::Alias(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Plugin {}

impl From<Arc<ArtifactPlugin>> for Plugin {
    fn from(plugin: Arc<ArtifactPlugin>) -> Self {
        Plugin::Artifact(plugin)
    }
}

impl fmt::Display for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.desc())
    }
}
