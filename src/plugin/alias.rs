use super::{Plugin, PluginId};
use crate::alias::DocRewrite;
use crate::core::DocketError;
use anyhow::Result;
use chrono::{DateTime, Utc};

/// A renamed view over an artifact or embedded plugin.
///
/// Everything but the name comes from the canonical plugin. Documentation is
/// the canonical text with each rewrite applied, in declaration order, to
/// every occurrence.
#[derive(Debug, Clone)]
pub struct AliasPlugin {
    id: PluginId,
    canonical: Box<Plugin>,
    rewrites: Vec<DocRewrite>,
}

impl AliasPlugin {
    pub fn new(canonical: Plugin, alias_name: &str, rewrites: Vec<DocRewrite>) -> Result<Self, DocketError> {
        let plugin_type = canonical.plugin_type();
        if !plugin_type.is_embeddable() {
            return Err(DocketError::UnsupportedPluginType {
                desc: canonical.desc(),
                plugin_type: plugin_type.to_string(),
                role: "an alias".to_string(),
            });
        }
        if let Plugin::Alias(inner) = &canonical {
            return Err(DocketError::Other {
                message: format!("{} cannot be aliased again as `{alias_name}`", inner.desc()),
            });
        }

        Ok(Self {
            id: PluginId::new(plugin_type, alias_name),
            canonical: Box::new(canonical),
            rewrites,
        })
    }

    pub fn id(&self) -> &PluginId {
        &self.id
    }

    pub fn canonical_plugin(&self) -> &Plugin {
        &self.canonical
    }

    pub fn version(&self) -> Option<&str> {
        self.canonical.version()
    }

    pub fn tag(&self) -> String {
        self.canonical.tag()
    }

    pub fn release_date(&self) -> Option<DateTime<Utc>> {
        self.canonical.release_date()
    }

    pub fn changelog_url(&self) -> String {
        self.canonical.changelog_url()
    }

    pub fn documentation(&self) -> Result<Option<String>> {
        Ok(self.canonical.documentation()?.map(|content| self.rewrite(&content)))
    }

    /// Applies the rewrites to `content`; the input is left untouched.
    pub fn rewrite(&self, content: &str) -> String {
        self.rewrites.iter().fold(content.to_string(), |text, rule| text.replace(&rule.replace, &rule.with))
    }

    pub fn desc(&self) -> String {
        format!("[plugin:{}@{}]", self.id.canonical_name(), self.tag())
    }
}

impl PartialEq for AliasPlugin {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.version() == other.version()
    }
}

impl Eq for AliasPlugin {}
