//! Index documents of the versioned tree, rendered from templates bundled in the binary.

use super::layout::DocsLayout;
use crate::core::{DocketError, PluginType};
use crate::utils::safe_write;
use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;
use tera::{Context as TeraContext, Tera};

const PLUGIN_INDEX: &str = "plugin-index.asciidoc";
const ALIAS_INDEX: &str = "alias-index.asciidoc";
const TYPE_INDEX: &str = "type-index.asciidoc";

/// One row of a plugin's versions index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionEntry {
    pub tag: String,
    pub date: String,
}

impl VersionEntry {
    pub fn new(tag: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            date: date.into(),
        }
    }
}

/// Renders and writes the versions, alias and type indexes.
#[derive(Debug)]
pub struct IndexWriter {
    tera: Tera,
    layout: DocsLayout,
}

impl IndexWriter {
    pub fn new(layout: DocsLayout) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (PLUGIN_INDEX, include_str!("../../templates/plugin-index.asciidoc.tera")),
            (ALIAS_INDEX, include_str!("../../templates/alias-index.asciidoc.tera")),
            (TYPE_INDEX, include_str!("../../templates/type-index.asciidoc.tera")),
        ])
        .map_err(|e| DocketError::TemplateError {
            name: "index".to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            tera,
            layout,
        })
    }

    /// Versions index of a plugin; `versions` are expected newest first.
    pub fn render_versions_index(&self, plugin_type: PluginType, name: &str, versions: &[VersionEntry]) -> Result<String> {
        let mut context = TeraContext::new();
        context.insert("type", plugin_type.as_str());
        context.insert("name", name);
        context.insert("versions", versions);
        self.render(PLUGIN_INDEX, &context)
    }

    pub fn render_alias_index(&self, plugin_type: PluginType, alias_name: &str, target: &str) -> Result<String> {
        let mut context = TeraContext::new();
        context.insert("type", plugin_type.as_str());
        context.insert("alias_name", alias_name);
        context.insert("target", target);
        self.render(ALIAS_INDEX, &context)
    }

    pub fn render_type_index(&self, plugin_type: PluginType, names: &[String]) -> Result<String> {
        let mut context = TeraContext::new();
        context.insert("type", plugin_type.as_str());
        context.insert("plugins", names);
        self.render(TYPE_INDEX, &context)
    }

    pub fn write_versions_index(
        &self,
        plugin_type: PluginType,
        name: &str,
        versions: &[VersionEntry],
    ) -> Result<PathBuf> {
        let path = self.layout.versions_index(plugin_type, name);
        safe_write(&path, &self.render_versions_index(plugin_type, name, versions)?)?;
        Ok(path)
    }

    pub fn write_alias_index(&self, plugin_type: PluginType, alias_name: &str, target: &str) -> Result<PathBuf> {
        let path = self.layout.versions_index(plugin_type, alias_name);
        safe_write(&path, &self.render_alias_index(plugin_type, alias_name, target)?)?;
        Ok(path)
    }

    pub fn write_type_index(&self, plugin_type: PluginType, names: &[String]) -> Result<PathBuf> {
        let path = self.layout.type_index(plugin_type);
        safe_write(&path, &self.render_type_index(plugin_type, names)?)?;
        Ok(path)
    }

    fn render(&self, template: &str, context: &TeraContext) -> Result<String> {
        self.tera.render(template, context).map_err(|e| {
            DocketError::TemplateError {
                name: template.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}
