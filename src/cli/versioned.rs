//! `docket versioned`: versioned documentation for every tagged release.
//!
//! Clones (or reuses) the documentation repository under `--output-path`,
//! regenerates the versioned documents of plugins released since the
//! reference time and proposes the result as a pull request.

use crate::alias::AliasDefinitionsLoader;
use crate::config::Settings;
use crate::constants::{
    DEFAULT_PARALLELISM, DEFAULT_PLUGIN_REGEX, DOCS_CHECKOUT_DIR, DOCS_CLONE_URL, DOCS_TARGET_BRANCH,
    GITHUB_RATE_LIMIT_WARNING, VERSIONED_DOCS_BRANCH,
};
use crate::docs::{StackVersionsLoader, VersionedOptions, VersionedPipeline};
use crate::git::DocsCheckout;
use crate::github::GithubClient;
use crate::publish::{Publication, Publisher};
use crate::registry::{RegistryApi, RubygemsClient};
use crate::repository::Repository;
use crate::source::SourceFactory;
use crate::utils::BlockingRuntime;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use clap::Args;
use regex::Regex;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct VersionedCommand {
    /// Directory the documentation repository is cloned into
    #[arg(long, value_name = "OUTPUT")]
    pub output_path: PathBuf,

    /// Settings document (YAML, or TOML/JSON by extension)
    #[arg(long = "settings", value_name = "SETTINGS", default_value = "settings.yml")]
    pub settings_path: PathBuf,

    /// Keep versioned documents that already exist
    #[arg(long)]
    pub skip_existing: bool,

    /// Only document the latest release of each plugin
    #[arg(long)]
    pub latest_only: bool,

    /// Only consider organisation repositories matching this pattern
    #[arg(long, value_name = "REGEX", default_value = DEFAULT_PLUGIN_REGEX)]
    pub plugin_regex: String,

    /// Write documents but do not commit or open a pull request
    #[arg(long)]
    pub dry_run: bool,

    /// Rebuild plugins released at or after this date (YYYY-MM-DD or RFC 3339)
    ///
    /// Defaults to one day before the last commit of the documentation branch.
    #[arg(long, value_name = "DATE", value_parser = parse_since)]
    pub since: Option<DateTime<Utc>>,

    /// Number of repositories processed concurrently
    #[arg(long, default_value_t = DEFAULT_PARALLELISM)]
    pub parallelism: usize,
}

impl VersionedCommand {
    pub async fn execute(self) -> Result<()> {
        let settings = Settings::load(&self.settings_path)?;
        let filter = Regex::new(&self.plugin_regex)
            .with_context(|| format!("Invalid --plugin-regex `{}`", self.plugin_regex))?;

        let client = GithubClient::from_env()?;
        info!("{}using a github token", if client.is_authenticated() { "" } else { "not " });
        check_rate_limit(&client).await;

        let checkout =
            DocsCheckout::clone_or_open(DOCS_CLONE_URL, self.output_path.join(DOCS_CHECKOUT_DIR), DOCS_TARGET_BRANCH)
                .await?;
        let stack = StackVersionsLoader::new(client.clone()).load().await?;
        let aliases = AliasDefinitionsLoader::new(client.clone()).load().await?;

        let since = match self.since {
            Some(since) => since,
            None => reference_time(checkout.last_commit_date().await?),
        };

        let runtime = BlockingRuntime::current()?;
        let registry: Arc<dyn RegistryApi> = Arc::new(RubygemsClient::new(runtime.clone())?);
        let factory = SourceFactory::new(client.clone(), runtime).with_env_org();

        info!("writing to {}", checkout.path().display());
        let names = client.org_repositories(factory.default_org()).await?;
        let specs = select_repositories(names, &filter, &settings, factory.default_org());
        info!("found {} repos", specs.len());

        let mut repositories = Vec::with_capacity(specs.len());
        for spec in &specs {
            let name = spec.rsplit('/').next().unwrap_or(spec);
            info!("[{spec}]: loading releases...");
            match Repository::from_source(name, factory.from_spec(spec)?, Arc::clone(&registry)) {
                Ok(repository) => repositories.push(repository),
                Err(e) => warn!("[{spec}]: {e}; skipping"),
            }
        }

        let mut options = VersionedOptions::new(checkout.path(), since);
        options.parallelism = self.parallelism;
        options.skip_existing = self.skip_existing;
        options.latest_only = self.latest_only;

        let summary = VersionedPipeline::new(options, aliases, stack).run(repositories).await?;
        info!(
            "{} versioned documents, {} plugin indexes, {} type indexes",
            summary.documents,
            summary.reindexed.len(),
            summary.types.len()
        );
        if summary.failures > 0 {
            warn!("{} repositories failed; see errors above", summary.failures);
        }

        let publication = Publication::new(
            VERSIONED_DOCS_BRANCH,
            "updated versioned plugin docs",
            "auto generated update of versioned plugin documentation",
        );
        Publisher::new(client, self.dry_run).publish(&checkout, &publication).await?;
        Ok(())
    }
}

async fn check_rate_limit(client: &GithubClient) {
    match client.rate_limit_remaining().await {
        Ok(remaining) => {
            info!("Current GitHub rate limit remaining: {remaining}");
            if remaining < GITHUB_RATE_LIMIT_WARNING {
                warn!("Api rate limit is close to being reached, this run may fail");
            }
        }
        Err(e) => warn!("Could not read GitHub rate limit: {e:#}"),
    }
}

/// `org/repo` specs of the matching organisation repositories, minus the skip
/// list, followed by the configured additional repositories.
fn select_repositories(names: Vec<String>, filter: &Regex, settings: &Settings, org: &str) -> Vec<String> {
    let mut selected: Vec<String> = names
        .into_iter()
        .filter(|name| filter.is_match(name) && !settings.is_skipped(name))
        .collect();
    selected.sort();
    selected.dedup();

    let mut specs: Vec<String> = selected.into_iter().map(|name| format!("{org}/{name}")).collect();
    specs.extend(settings.additional_repositories.iter().cloned());
    specs
}

/// One day before the last documentation commit.
fn reference_time(last_commit: NaiveDate) -> DateTime<Utc> {
    last_commit.and_time(NaiveTime::MIN).and_utc() - Duration::hours(24)
}

fn parse_since(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Ok(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| format!("invalid date `{value}`, expected YYYY-MM-DD or RFC 3339"))
}
