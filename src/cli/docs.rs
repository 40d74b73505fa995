//! `docket docs`: current reference documentation from a plugin versions report.

use crate::alias::AliasDefinitionsLoader;
use crate::config::{PluginsReport, Settings};
use crate::constants::DEFAULT_PARALLELISM;
use crate::docs::{DocsOptions, DocsPipeline, DocsSummary};
use crate::github::GithubClient;
use crate::registry::RubygemsClient;
use crate::source::SourceFactory;
use crate::utils::BlockingRuntime;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct DocsCommand {
    /// Top level of the documentation repository to write into
    #[arg(long, value_name = "OUTPUT")]
    pub output_path: PathBuf,

    /// Settings document (YAML, or TOML/JSON by extension)
    #[arg(long = "settings", value_name = "SETTINGS", default_value = "settings.yml")]
    pub settings_path: PathBuf,

    /// Number of packages processed concurrently
    #[arg(long, default_value_t = DEFAULT_PARALLELISM)]
    pub parallelism: usize,

    /// Read documentation from the main branch instead of the reported release
    #[arg(long)]
    pub main: bool,

    /// Keep existing documents whose declared version is unchanged
    #[arg(long)]
    pub skip_existing: bool,

    /// Plugin versions report (JSON)
    #[arg(value_name = "PLUGINS_JSON")]
    pub plugins_json: PathBuf,
}

impl DocsCommand {
    pub async fn execute(self) -> Result<()> {
        let settings = Settings::load(&self.settings_path)?;
        let report = PluginsReport::load(&self.plugins_json)?;

        let client = GithubClient::from_env()?;
        let runtime = BlockingRuntime::current()?;
        let aliases = AliasDefinitionsLoader::new(client.clone()).load().await?;
        let registry = Arc::new(RubygemsClient::new(runtime.clone())?);
        let sources = Arc::new(SourceFactory::new(client, runtime).with_env_org());

        let mut options = DocsOptions::new(&self.output_path);
        options.parallelism = self.parallelism;
        options.use_main = self.main;
        options.skip_existing = self.skip_existing;

        info!("writing to {}", self.output_path.display());
        let summary = DocsPipeline::new(options, settings, aliases, registry, sources).run(&report).await?;

        info!("{}", outcome_line(&summary));
        if summary.failures > 0 {
            warn!("{} packages failed; see errors above", summary.failures);
        }
        Ok(())
    }
}

fn outcome_line(summary: &DocsSummary) -> String {
    if summary.written.is_empty() {
        "No new documentation; nothing to do".to_string()
    } else {
        format!("wrote {} documents", summary.written.len())
    }
}
