//! `docket versioned` pipeline runs against fakes.

use super::fixtures::{plugin_doc, read};
use docket_cli::alias::{AliasDefinition, AliasDefinitions};
use docket_cli::core::PluginType;
use docket_cli::docs::{StackVersions, VersionedOptions, VersionedPipeline, VersionedSummary};
use docket_cli::registry::{INTEGRATION_PLUGINS_KEY, RegistryApi, ReleaseMetadata};
use docket_cli::repository::Repository;
use docket_cli::test_utils::{FakeRegistry, FakeSource, date, init_test_logging};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const VERSIONED: &str = "docs/versioned-plugins";

fn stack() -> StackVersions {
    StackVersions {
        branch: "8.13".to_string(),
        ecs: "8.11".to_string(),
    }
}

fn beats_registry() -> FakeRegistry {
    FakeRegistry::new()
        .with_release("logstash-input-beats", ReleaseMetadata::new("9.0.0").with_created_at(date("2024-03-01")))
        .with_release("logstash-input-beats", ReleaseMetadata::new("8.0.0").with_created_at(date("2023-06-01")))
        .with_release("logstash-input-beats", ReleaseMetadata::new("7.0.0").with_created_at(date("2022-01-01")))
}

/// Beats source tagged for every release, with documentation for `documented` versions.
fn beats_source(documented: &[&str]) -> FakeSource {
    let mut source = FakeSource::new().named("logstash-input-beats");
    for version in ["9.0.0", "8.0.0", "7.0.0"] {
        source = source.with_tag(&format!("v{version}"));
    }
    for version in documented {
        source = source.with_file("docs/index.asciidoc", Some(version), &plugin_doc("input", "beats"));
    }
    source
}

fn beats(registry: FakeRegistry, documented: &[&str]) -> Repository {
    let registry: Arc<dyn RegistryApi> = Arc::new(registry);
    Repository::from_source("logstash-input-beats", Arc::new(beats_source(documented)), registry).unwrap()
}

async fn run(
    root: &Path,
    since: &str,
    configure: impl FnOnce(&mut VersionedOptions),
    aliases: AliasDefinitions,
    repositories: Vec<Repository>,
) -> VersionedSummary {
    init_test_logging(None);
    let mut options = VersionedOptions::new(root, date(since));
    options.parallelism = 2;
    configure(&mut options);
    VersionedPipeline::new(options, aliases, stack()).run(repositories).await.unwrap()
}

#[tokio::test]
async fn test_new_release_rebuilds_every_tagged_version() {
    let temp = TempDir::new().unwrap();
    let repository = beats(beats_registry(), &["9.0.0", "8.0.0", "7.0.0"]);

    let summary = run(temp.path(), "2024-01-01", |_| {}, AliasDefinitions::default(), vec![repository]).await;

    assert_eq!(summary.documents, 3);
    assert_eq!(summary.reindexed, vec!["logstash-input-beats"]);
    assert_eq!(summary.types, vec![PluginType::Input]);
    assert_eq!(summary.failures, 0);

    let doc = read(temp.path(), &format!("{VERSIONED}/inputs/beats-v8.0.0.asciidoc"));
    assert!(doc.contains(":version: v8.0.0\n"));
    assert!(doc.contains(":release_date: 2023-06-01\n"));
    assert!(doc.contains("[id=\"{version}-plugins-{type}s-{plugin}\"]\n=== beats input plugin {version}\n"));
    assert!(doc.contains("<<{version}-plugins-{type}s-{plugin}-options>>"));
    assert!(doc.contains("<<{version}-plugins-{type}s-{plugin}-common-options>>"));

    let index = read(temp.path(), &format!("{VERSIONED}/inputs/beats-index.asciidoc"));
    assert!(index.starts_with(":plugin: beats\n:type: input\n"));
    let newest = index.find("| <<v9.0.0-plugins-inputs-beats,v9.0.0>> | 2024-03-01").unwrap();
    let middle = index.find("| <<v8.0.0-plugins-inputs-beats,v8.0.0>> | 2023-06-01").unwrap();
    let oldest = index.find("| <<v7.0.0-plugins-inputs-beats,v7.0.0>> | 2022-01-01").unwrap();
    assert!(newest < middle && middle < oldest);
    assert!(index.contains("include::beats-v9.0.0.asciidoc[]"));

    let types = read(temp.path(), &format!("{VERSIONED}/inputs-index.asciidoc"));
    assert!(types.contains("== Input plugins"));
    assert!(types.contains("include::inputs/beats-index.asciidoc[]"));
}

#[tokio::test]
async fn test_latest_only_stops_after_first_release() {
    let temp = TempDir::new().unwrap();
    let repository = beats(beats_registry(), &["9.0.0", "8.0.0", "7.0.0"]);

    let summary = run(
        temp.path(),
        "2024-01-01",
        |options| options.latest_only = true,
        AliasDefinitions::default(),
        vec![repository],
    )
    .await;

    assert_eq!(summary.documents, 1);
    assert!(temp.path().join(VERSIONED).join("inputs/beats-v9.0.0.asciidoc").exists());
    assert!(!temp.path().join(VERSIONED).join("inputs/beats-v8.0.0.asciidoc").exists());
}

#[tokio::test]
async fn test_missing_documentation_stops_the_walk() {
    let temp = TempDir::new().unwrap();
    let repository = beats(beats_registry(), &["9.0.0", "7.0.0"]);

    let summary = run(temp.path(), "2024-01-01", |_| {}, AliasDefinitions::default(), vec![repository]).await;

    assert_eq!(summary.documents, 1);
    assert_eq!(summary.failures, 0);
    assert!(temp.path().join(VERSIONED).join("inputs/beats-v9.0.0.asciidoc").exists());
    assert!(!temp.path().join(VERSIONED).join("inputs/beats-v7.0.0.asciidoc").exists());
}

#[tokio::test]
async fn test_untagged_releases_are_not_documented() {
    let temp = TempDir::new().unwrap();
    let registry: Arc<dyn RegistryApi> = Arc::new(beats_registry());
    let source = FakeSource::new()
        .with_tag("v9.0.0")
        .with_file("docs/index.asciidoc", Some("9.0.0"), &plugin_doc("input", "beats"))
        .with_file("docs/index.asciidoc", Some("8.0.0"), &plugin_doc("input", "beats"));
    let repository = Repository::from_source("logstash-input-beats", Arc::new(source), registry).unwrap();

    let summary = run(temp.path(), "2024-01-01", |_| {}, AliasDefinitions::default(), vec![repository]).await;

    assert_eq!(summary.documents, 1);
    assert!(!temp.path().join(VERSIONED).join("inputs/beats-v8.0.0.asciidoc").exists());
}

#[tokio::test]
async fn test_repository_without_new_release_is_only_indexed() {
    let temp = TempDir::new().unwrap();
    let existing = temp.path().join(VERSIONED).join("inputs/beats-index.asciidoc");
    std::fs::create_dir_all(existing.parent().unwrap()).unwrap();
    std::fs::write(&existing, ":plugin: beats\n").unwrap();
    let repository = beats(beats_registry(), &["9.0.0", "8.0.0", "7.0.0"]);

    let summary = run(temp.path(), "2025-01-01", |_| {}, AliasDefinitions::default(), vec![repository]).await;

    assert_eq!(summary.documents, 0);
    assert!(summary.reindexed.is_empty());
    assert_eq!(summary.types, vec![PluginType::Input]);
    assert_eq!(read(temp.path(), &format!("{VERSIONED}/inputs/beats-index.asciidoc")), ":plugin: beats\n");
    assert!(read(temp.path(), &format!("{VERSIONED}/inputs-index.asciidoc"))
        .contains("include::inputs/beats-index.asciidoc[]"));
}

#[tokio::test]
async fn test_integration_release_rebuilds_absorbed_plugin() {
    let temp = TempDir::new().unwrap();
    let registry: Arc<dyn RegistryApi> = Arc::new(
        FakeRegistry::new()
            .with_release(
                "logstash-integration-kafka",
                ReleaseMetadata::new("11.0.0")
                    .with_created_at(date("2024-05-01"))
                    .with_metadata(INTEGRATION_PLUGINS_KEY, "logstash-input-kafka"),
            )
            .with_release("logstash-input-kafka", ReleaseMetadata::new("10.0.0").with_created_at(date("2020-01-01"))),
    );
    let integration = FakeSource::new()
        .named("logstash-integration-kafka")
        .with_tag("v11.0.0")
        .with_file("docs/index.asciidoc", Some("11.0.0"), &plugin_doc("integration", "kafka"))
        .with_file("docs/input-kafka.asciidoc", Some("11.0.0"), &plugin_doc("input", "kafka"));
    let standalone = FakeSource::new()
        .named("logstash-input-kafka")
        .with_tag("v10.0.0")
        .with_file("docs/index.asciidoc", Some("10.0.0"), &plugin_doc("input", "kafka"));
    let repositories = vec![
        Repository::from_source("logstash-input-kafka", Arc::new(standalone), Arc::clone(&registry)).unwrap(),
        Repository::from_source("logstash-integration-kafka", Arc::new(integration), registry).unwrap(),
    ];

    let summary = run(temp.path(), "2024-01-01", |_| {}, AliasDefinitions::default(), repositories).await;

    assert_eq!(summary.documents, 3);
    assert_eq!(summary.reindexed, vec!["logstash-input-kafka", "logstash-integration-kafka"]);
    assert_eq!(summary.types, vec![PluginType::Input, PluginType::Integration]);

    let index = read(temp.path(), &format!("{VERSIONED}/inputs/kafka-index.asciidoc"));
    let absorbed = index.find("<<v11.0.0-plugins-inputs-kafka,v11.0.0>>").unwrap();
    let standalone = index.find("<<v10.0.0-plugins-inputs-kafka,v10.0.0>>").unwrap();
    assert!(absorbed < standalone);
}

#[tokio::test]
async fn test_aliases_get_an_index_and_a_type_entry() {
    let temp = TempDir::new().unwrap();
    let aliases = AliasDefinitions::default().with_definition(
        PluginType::Input,
        AliasDefinition {
            alias: "elastic_agent".to_string(),
            from: "beats".to_string(),
            docs: Vec::new(),
        },
    );
    let repository = beats(beats_registry(), &["9.0.0", "8.0.0", "7.0.0"]);

    run(temp.path(), "2024-01-01", |options| options.latest_only = true, aliases, vec![repository]).await;

    let alias = read(temp.path(), &format!("{VERSIONED}/inputs/elastic_agent-index.asciidoc"));
    assert!(alias.contains("[id=\"plugins-inputs-elastic_agent-index\"]"));
    assert!(alias.contains("<<plugins-inputs-beats-index,beats>>"));

    let types = read(temp.path(), &format!("{VERSIONED}/inputs-index.asciidoc"));
    let beats = types.find("include::inputs/beats-index.asciidoc[]").unwrap();
    let agent = types.find("include::inputs/elastic_agent-index.asciidoc[]").unwrap();
    assert!(beats < agent);
}

#[tokio::test]
async fn test_stack_versions_are_applied() {
    let temp = TempDir::new().unwrap();
    let registry: Arc<dyn RegistryApi> = Arc::new(beats_registry());
    let doc = ":plugin: beats\n:type: input\n[\":branch: %BRANCH%\"]\nSee {ecs-ref}/%ECS_VERSION%/index.html\n";
    let source = FakeSource::new().with_tag("v9.0.0").with_file("docs/index.asciidoc", Some("9.0.0"), doc);
    let repository = Repository::from_source("logstash-input-beats", Arc::new(source), registry).unwrap();

    run(temp.path(), "2024-01-01", |options| options.latest_only = true, AliasDefinitions::default(), vec![repository])
        .await;

    let written = read(temp.path(), &format!("{VERSIONED}/inputs/beats-v9.0.0.asciidoc"));
    assert!(written.contains(":type: input\n:branch: 8.13\n:ecs_version: 8.11\n"));
    assert!(written.contains("{ecs-ref}/8.11/index.html"));
    assert!(!written.contains('%'));
}
