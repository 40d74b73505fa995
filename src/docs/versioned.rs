//! Versioned plugin documentation: one document per tagged release.
//!
//! A run works from a fixed set of repositories in three steps:
//!
//! 1. **Mark**: every repository whose latest release is newer than the
//!    reference time marks the canonical names of that release and of its
//!    embedded plugins for rebuild. A plugin absorbed into an integration is
//!    marked by the integration even though its old standalone repository
//!    has no new release.
//! 2. **Rebuild**: marked repositories walk their registry releases that are
//!    also tagged in the source, newest first, writing a versioned document
//!    for every plugin of every release. Unmarked repositories only report
//!    the plugin names that already have a versions index.
//! 3. **Index**: alias indexes, the versions index of every rebuilt plugin,
//!    and one index per plugin type are rendered.

use super::content::{ReleaseFields, StackVersions, apply_stack_versions, versioned};
use super::index::{IndexWriter, VersionEntry};
use super::layout::DocsLayout;
use super::workers::run_blocking;
use crate::alias::AliasDefinitions;
use crate::constants::DEFAULT_PARALLELISM;
use crate::core::PluginType;
use crate::plugin::{Plugin, PluginId};
use crate::repository::Repository;
use crate::utils::{SyncSet, ThreadsafeIndex, safe_write};
use crate::version::PluginVersion;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct VersionedOptions {
    /// Root of the documentation repository
    pub output_path: PathBuf,
    pub parallelism: usize,
    /// Keep versioned documents that already exist
    pub skip_existing: bool,
    /// Only document the newest tagged release of each repository
    pub latest_only: bool,
    /// Releases published at or after this instant trigger a rebuild
    pub since: DateTime<Utc>,
}

impl VersionedOptions {
    pub fn new(output_path: impl Into<PathBuf>, since: DateTime<Utc>) -> Self {
        Self {
            output_path: output_path.into(),
            parallelism: DEFAULT_PARALLELISM,
            skip_existing: false,
            latest_only: false,
            since,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionedSummary {
    /// Versioned documents written or kept
    pub documents: usize,
    /// Canonical names whose versions index was rebuilt, sorted
    pub reindexed: Vec<String>,
    /// Plugin types whose type index was rewritten
    pub types: Vec<PluginType>,
    /// Repositories that failed with an error
    pub failures: usize,
}

/// A documented release, ordered by version.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct IndexedRelease {
    version: Option<PluginVersion>,
    tag: String,
    date: String,
}

type NameSet = Arc<SyncSet<String>>;
type ReleaseSet = Arc<SyncSet<IndexedRelease>>;

pub struct VersionedPipeline {
    options: VersionedOptions,
    layout: DocsLayout,
    aliases: AliasDefinitions,
    stack: StackVersions,
    requiring_rebuild: SyncSet<String>,
    indexes_to_rebuild: SyncSet<String>,
    version_index: ThreadsafeIndex<String, ReleaseSet>,
    names_by_type: ThreadsafeIndex<PluginType, NameSet>,
    documents: AtomicUsize,
}

impl VersionedPipeline {
    pub fn new(options: VersionedOptions, aliases: AliasDefinitions, stack: StackVersions) -> Self {
        Self {
            layout: DocsLayout::new(&options.output_path),
            options,
            aliases,
            stack,
            requiring_rebuild: SyncSet::new(),
            indexes_to_rebuild: SyncSet::new(),
            version_index: ThreadsafeIndex::new(|_| Arc::new(SyncSet::new())),
            names_by_type: ThreadsafeIndex::new(|_| Arc::new(SyncSet::new())),
            documents: AtomicUsize::new(0),
        }
    }

    pub async fn run(self, repositories: Vec<Repository>) -> Result<VersionedSummary> {
        let parallelism = self.options.parallelism;
        let pipeline = Arc::new(self);
        info!("Generating docs since {}", pipeline.options.since.to_rfc2822());

        let worker = Arc::clone(&pipeline);
        let mut failures =
            run_blocking(repositories.clone(), parallelism, Arc::new(move |r: Repository| worker.mark(&r))).await;

        let worker = Arc::clone(&pipeline);
        failures += run_blocking(repositories, parallelism, Arc::new(move |r: Repository| worker.rebuild(&r))).await;

        let worker = Arc::clone(&pipeline);
        let (reindexed, types) = tokio::task::spawn_blocking(move || worker.write_indexes())
            .await
            .context("Index task failed")??;

        Ok(VersionedSummary {
            documents: pipeline.documents.load(Ordering::SeqCst),
            reindexed,
            types,
            failures,
        })
    }

    fn mark(&self, repository: &Repository) -> Result<()> {
        let Some(latest) = repository.last_release() else {
            info!("{}: no releases on registry.", repository.desc());
            return Ok(());
        };
        match latest.release_date() {
            Some(date) if date >= self.options.since => {}
            _ => {
                info!("{}: no new releases.", repository.desc());
                return Ok(());
            }
        }

        info!("{}: found new release", repository.desc());
        for plugin in Plugin::from(latest).with_embedded_plugins()? {
            if self.requiring_rebuild.insert(plugin.canonical_name()) {
                info!("{}: marking for reindex", plugin.desc());
            }
        }
        Ok(())
    }

    fn rebuild(&self, repository: &Repository) -> Result<()> {
        if !self.requiring_rebuild.contains(&repository.name().to_string()) {
            info!("[repo:{}]: rebuild not required. skipping.", repository.name());
            if let Some(latest) = repository.last_release() {
                for plugin in Plugin::from(latest).with_embedded_plugins()? {
                    if self.layout.versions_index(plugin.plugin_type(), plugin.name()).exists() {
                        self.names(plugin.plugin_type()).insert(plugin.name().to_string());
                    }
                }
            }
            return Ok(());
        }

        info!("[repo:{}]: rebuilding versioned docs", repository.name());
        'releases: for released in repository.source_tagged_releases(false)? {
            for plugin in Plugin::from(released).with_embedded_plugins()? {
                if !self.expand_plugin_doc(&plugin)? {
                    warn!("{}: documentation not available; skipping remaining releases from repository", plugin.desc());
                    break 'releases;
                }
                self.record(&plugin);
            }
            if self.options.latest_only {
                break;
            }
        }
        Ok(())
    }

    /// Writes the versioned document of `plugin`; `Ok(false)` when it has none.
    fn expand_plugin_doc(&self, plugin: &Plugin) -> Result<bool> {
        let desc = plugin.desc();
        let fields = ReleaseFields::of(plugin);
        let path = self.layout.versioned_doc(plugin.plugin_type(), plugin.name(), &fields.tag);

        if self.options.skip_existing && path.exists() {
            info!("{desc}: skipping - file already exists");
            self.documents.fetch_add(1, Ordering::SeqCst);
            return Ok(true);
        }

        info!("{desc}: fetching documentation");
        let content = match plugin.documentation() {
            Ok(Some(content)) => content,
            Ok(None) => {
                warn!("{desc}: doc not found");
                return Ok(false);
            }
            Err(e) => {
                warn!("{desc}: doc not available ({e:#})");
                return Ok(false);
            }
        };

        let content = versioned(&content, &fields, plugin.plugin_type(), plugin.name());
        let content = apply_stack_versions(&content, plugin.plugin_type(), &self.stack);
        safe_write(&path, &content)?;
        self.documents.fetch_add(1, Ordering::SeqCst);
        println!("{desc}: {}", fields.release_date);
        Ok(true)
    }

    fn record(&self, plugin: &Plugin) {
        let canonical = plugin.canonical_name();
        let release = IndexedRelease {
            version: plugin.version().and_then(|v| PluginVersion::parse(v).ok()),
            tag: plugin.tag(),
            date: ReleaseFields::of(plugin).release_date,
        };
        self.version_index.fetch(&canonical).insert(release);
        self.indexes_to_rebuild.insert(canonical);
        self.names(plugin.plugin_type()).insert(plugin.name().to_string());
    }

    fn names(&self, plugin_type: PluginType) -> NameSet {
        self.names_by_type.fetch(&plugin_type)
    }

    fn write_indexes(&self) -> Result<(Vec<String>, Vec<PluginType>)> {
        let writer = IndexWriter::new(self.layout.clone())?;

        info!("REINDEXING PLUGINS ALIASES... {}", self.aliases.len());
        for (plugin_type, definition) in self.aliases.iter() {
            self.names(plugin_type).insert(definition.alias.clone());
            info!("[plugin:{}] reindexing", definition.alias);
            writer.write_alias_index(plugin_type, &definition.alias, &definition.from)?;
        }

        let reindexed = self.indexes_to_rebuild.to_vec();
        info!("REINDEXING PLUGINS... {}", reindexed.len());
        for canonical in &reindexed {
            info!("[plugin:{canonical}] reindexing");
            let id = PluginId::parse(canonical, "an indexed plugin", |_| true)?;
            let versions: Vec<VersionEntry> = self
                .version_index
                .fetch(canonical)
                .to_vec()
                .into_iter()
                .rev()
                .map(|release| VersionEntry::new(release.tag, release.date))
                .collect();
            writer.write_versions_index(id.plugin_type(), id.name(), &versions)?;
        }

        let mut by_type = self.names_by_type.entries();
        by_type.sort_by_key(|(plugin_type, _)| *plugin_type);
        info!("REINDEXING TYPES... {}", by_type.len());
        let mut types = Vec::with_capacity(by_type.len());
        for (plugin_type, names) in by_type {
            info!("[type:{plugin_type}] reindexing");
            writer.write_type_index(plugin_type, &names.to_vec())?;
            types.push(plugin_type);
        }

        Ok((reindexed, types))
    }
}
