//! `docket placeholder`: empty versions index for a plugin that has no
//! release yet, so links to it resolve until the first versioned run.

use crate::constants::{DOCS_CHECKOUT_DIR, PLACEHOLDER_BRANCH, PLACEHOLDER_TYPES};
use crate::core::{DocketError, PluginType};
use crate::docs::{DocsLayout, IndexWriter};
use crate::git::DocsCheckout;
use crate::github::GithubClient;
use crate::publish::{Publication, Publisher};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub struct PlaceholderCommand {
    /// Directory holding the `logstash-docs` checkout
    #[arg(long, value_name = "OUTPUT")]
    pub output_path: PathBuf,

    /// Type of the new plugin (only `integration` is supported)
    #[arg(long, value_name = "TYPE")]
    pub plugin_type: String,

    /// Name of the new plugin, without prefix and type
    #[arg(long, value_name = "NAME")]
    pub plugin_name: String,

    /// Write the placeholder but do not commit or open a pull request
    #[arg(long)]
    pub dry_run: bool,
}

impl PlaceholderCommand {
    pub async fn execute(self) -> Result<()> {
        let plugin_type = supported_type(&self.plugin_type)?;
        let checkout = DocsCheckout::open(self.output_path.join(DOCS_CHECKOUT_DIR));

        let path = write_placeholder(checkout.path(), plugin_type, &self.plugin_name)?;
        info!("[plugin:{}] placeholder written to {}", self.plugin_name, path.display());

        let publication = Publication::new(
            PLACEHOLDER_BRANCH,
            "create an empty placeholder for new plugin",
            "A placeholder for new plugin",
        );
        Publisher::new(GithubClient::from_env()?, self.dry_run).publish(&checkout, &publication).await?;
        Ok(())
    }
}

fn supported_type(name: &str) -> Result<PluginType> {
    match PluginType::from_name(name) {
        Some(plugin_type) if PLACEHOLDER_TYPES.contains(&name) => Ok(plugin_type),
        _ => Err(DocketError::UnsupportedPluginType {
            desc: "[placeholder]".to_string(),
            plugin_type: name.to_string(),
            role: format!("a placeholder (supported: {})", PLACEHOLDER_TYPES.join(", ")),
        }
        .into()),
    }
}

fn write_placeholder(docs_root: &std::path::Path, plugin_type: PluginType, name: &str) -> Result<PathBuf> {
    IndexWriter::new(DocsLayout::new(docs_root))?.write_versions_index(plugin_type, name, &[])
}
