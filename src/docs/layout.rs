//! Paths inside the documentation repository.
//!
//! ```text
//! <root>/docs/plugins/<type>s/<name>.asciidoc
//! <root>/docs/versioned-plugins/<type>s-index.asciidoc
//! <root>/docs/versioned-plugins/<type>s/<name>-index.asciidoc
//! <root>/docs/versioned-plugins/<type>s/<name>-<tag>.asciidoc
//! ```

use crate::core::PluginType;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct DocsLayout {
    root: PathBuf,
}

impl DocsLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    /// Current documentation of a plugin.
    pub fn plugin_doc(&self, plugin_type: PluginType, name: &str) -> PathBuf {
        self.root.join("docs").join("plugins").join(plugin_type.plural()).join(format!("{name}.asciidoc"))
    }

    pub fn versioned_root(&self) -> PathBuf {
        self.root.join("docs").join("versioned-plugins")
    }

    /// Documentation of one release of a plugin.
    pub fn versioned_doc(&self, plugin_type: PluginType, name: &str, tag: &str) -> PathBuf {
        self.versioned_root().join(plugin_type.plural()).join(format!("{name}-{tag}.asciidoc"))
    }

    /// Versions index of a plugin, or the redirect index of an alias.
    pub fn versions_index(&self, plugin_type: PluginType, name: &str) -> PathBuf {
        self.versioned_root().join(plugin_type.plural()).join(format!("{name}-index.asciidoc"))
    }

    pub fn type_index(&self, plugin_type: PluginType) -> PathBuf {
        self.versioned_root().join(format!("{}-index.asciidoc", plugin_type.plural()))
    }
}
