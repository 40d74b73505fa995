//! Current plugin documentation, driven by a plugin versions report.
//!
//! Every report entry is resolved through the registry at the reported
//! version (or the main branch with `use_main`) and expanded into all the
//! units it documents: embedded plugins of integrations and their aliases.
//! Integration entries run to completion before any other entry is scheduled,
//! so plugins absorbed into an integration are documented from it and the
//! stale standalone package is skipped by the processed-name guard.

use super::content::{ReleaseFields, inject_default_plugin, no_version_bump, substitute_placeholders};
use super::layout::DocsLayout;
use super::workers::run_blocking;
use crate::alias::AliasDefinitions;
use crate::config::{PluginsReport, ReportEntry, Settings};
use crate::constants::DEFAULT_PARALLELISM;
use crate::core::PluginType;
use crate::plugin::{Plugin, PluginId};
use crate::registry::RegistryApi;
use crate::repository::Repository;
use crate::source::{SourceResolver, reference};
use crate::utils::{SyncSet, read_if_exists, safe_write};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct DocsOptions {
    /// Root of the documentation repository
    pub output_path: PathBuf,
    pub parallelism: usize,
    /// Read documentation from the main branch instead of the reported release
    pub use_main: bool,
    /// Keep an existing document when its declared version is unchanged
    pub skip_existing: bool,
}

impl DocsOptions {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            parallelism: DEFAULT_PARALLELISM,
            use_main: false,
            skip_existing: false,
        }
    }
}

/// Outcome of a docs run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocsSummary {
    /// Canonical names of the documents written, sorted
    pub written: Vec<String>,
    /// Entries that failed with an error
    pub failures: usize,
}

pub struct DocsPipeline {
    options: DocsOptions,
    layout: DocsLayout,
    settings: Settings,
    aliases: AliasDefinitions,
    registry: Arc<dyn RegistryApi>,
    sources: Arc<dyn SourceResolver>,
    processed: SyncSet<String>,
    written: SyncSet<String>,
}

impl DocsPipeline {
    pub fn new(
        options: DocsOptions,
        settings: Settings,
        aliases: AliasDefinitions,
        registry: Arc<dyn RegistryApi>,
        sources: Arc<dyn SourceResolver>,
    ) -> Self {
        Self {
            layout: DocsLayout::new(&options.output_path),
            options,
            settings,
            aliases,
            registry,
            sources,
            processed: SyncSet::new(),
            written: SyncSet::new(),
        }
    }

    pub async fn run(self, report: &PluginsReport) -> Result<DocsSummary> {
        let parallelism = self.options.parallelism;
        let pipeline = Arc::new(self);

        let (integrations, standalone): (Vec<_>, Vec<_>) = report
            .successful
            .iter()
            .map(|(name, entry)| (name.clone(), entry.clone()))
            .partition(|(name, _)| is_integration(name));
        info!("documenting {} integration and {} other packages", integrations.len(), standalone.len());

        let mut failures = 0;
        for phase in [integrations, standalone] {
            let worker = Arc::clone(&pipeline);
            let work = Arc::new(move |(name, entry): (String, ReportEntry)| worker.process(&name, &entry));
            failures += run_blocking(phase, parallelism, work).await;
        }

        Ok(DocsSummary {
            written: pipeline.written.to_vec(),
            failures,
        })
    }

    fn process(&self, name: &str, entry: &ReportEntry) -> Result<()> {
        if !self.processed.insert(name.to_string()) {
            info!("[repository:{name}]: already documented from an integration; skipping");
            return Ok(());
        }
        if self.settings.is_skipped(name) {
            warn!("Skipping {name}");
            return Ok(());
        }

        let version = (!self.options.use_main).then_some(entry.version.as_str());
        let sources = Arc::clone(&self.sources);
        let Some(repository) =
            Repository::from_registry(name, version, Arc::clone(&self.registry), |release| sources.resolve(name, release))?
        else {
            warn!("[repository:{name}]: failed to find release package `{}` via registry; skipping", reference(version));
            return Ok(());
        };

        let released = Plugin::from(repository.released_plugin(version));
        if released.plugin_type() == PluginType::Integration && !entry.is_default() {
            warn!("[repository:{name}]: Skipping non-default Integration Plugin");
            return Ok(());
        }

        let fields = ReleaseFields::of(&released);
        for plugin in released.with_wrapped_plugins(&self.aliases)? {
            let canonical = plugin.canonical_name();
            // the package itself was claimed above
            if canonical != name && !self.processed.insert(canonical) {
                info!("{}: already processed; skipping", plugin.desc());
                continue;
            }
            self.write_doc(&plugin, &fields, entry.is_default())?;
        }
        Ok(())
    }

    /// Writes one document; `Ok(false)` when it was skipped.
    fn write_doc(&self, plugin: &Plugin, fields: &ReleaseFields, is_default: bool) -> Result<bool> {
        let desc = plugin.desc();
        info!("{desc}: fetching documentation");
        let content = match plugin.documentation() {
            Ok(Some(content)) => content,
            Ok(None) => {
                warn!("{desc}: failed to fetch doc; skipping");
                return Ok(false);
            }
            Err(e) => {
                warn!("{desc}: failed to fetch doc ({e:#}); skipping");
                return Ok(false);
            }
        };

        let content = inject_default_plugin(&substitute_placeholders(&content, fields), is_default);
        let path = self.layout.plugin_doc(plugin.plugin_type(), plugin.name());

        if self.options.skip_existing {
            if let Some(existing) = read_if_exists(&path)? {
                if no_version_bump(&existing, &content) {
                    info!("{desc}: skipping since no version bump and doc exists.");
                    return Ok(false);
                }
            }
        }

        safe_write(&path, &content)?;
        debug!("{desc}: wrote {}", path.display());
        self.written.insert(plugin.canonical_name());
        println!("{}@{}: {}", plugin.canonical_name(), plugin.tag(), fields.release_date);
        Ok(true)
    }
}

fn is_integration(name: &str) -> bool {
    PluginId::parse(name, "a top-level plugin", |_| true)
        .is_ok_and(|id| id.plugin_type() == PluginType::Integration)
}
