//! `docket docs` pipeline runs against fakes.

use super::fixtures::{Sources, plugin_doc, read};
use docket_cli::alias::{AliasDefinition, AliasDefinitions, DocRewrite};
use docket_cli::config::{PluginsReport, ReportEntry, Settings};
use docket_cli::core::PluginType;
use docket_cli::docs::{DocsOptions, DocsPipeline, DocsSummary};
use docket_cli::registry::{INTEGRATION_PLUGINS_KEY, ReleaseMetadata};
use docket_cli::test_utils::{FakeRegistry, FakeSource, date, init_test_logging};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const BEATS_DOC: &str = "docs/plugins/inputs/beats.asciidoc";

fn report(entries: &[(&str, &str, &str)]) -> PluginsReport {
    let mut report = PluginsReport::default();
    for (name, version, from) in entries {
        report.successful.insert(
            name.to_string(),
            ReportEntry {
                version: version.to_string(),
                from: Some(from.to_string()),
            },
        );
    }
    report
}

fn beats_registry() -> FakeRegistry {
    FakeRegistry::new()
        .with_release("logstash-input-beats", ReleaseMetadata::new("9.0.0").with_created_at(date("2024-03-01")))
        .with_release("logstash-input-beats", ReleaseMetadata::new("8.0.0").with_created_at(date("2023-01-01")))
}

fn beats_sources() -> Sources {
    Sources::new().with(
        "logstash-input-beats",
        FakeSource::new()
            .with_file("docs/index.asciidoc", Some("9.0.0"), &plugin_doc("input", "beats"))
            .with_file("docs/index.asciidoc", None, &plugin_doc("input", "beats")),
    )
}

fn elastic_agent_alias() -> AliasDefinitions {
    AliasDefinitions::default().with_definition(
        PluginType::Input,
        AliasDefinition {
            alias: "elastic_agent".to_string(),
            from: "beats".to_string(),
            docs: vec![DocRewrite::new(":plugin: beats", ":plugin: elastic_agent")],
        },
    )
}

async fn run(
    root: &Path,
    configure: impl FnOnce(&mut DocsOptions),
    settings: Settings,
    aliases: AliasDefinitions,
    registry: Arc<FakeRegistry>,
    sources: Sources,
    report: &PluginsReport,
) -> DocsSummary {
    init_test_logging(None);
    let mut options = DocsOptions::new(root);
    options.parallelism = 2;
    configure(&mut options);
    DocsPipeline::new(options, settings, aliases, registry, Arc::new(sources)).run(report).await.unwrap()
}

#[tokio::test]
async fn test_reported_release_is_documented() {
    let temp = TempDir::new().unwrap();
    let registry = Arc::new(beats_registry());
    let report = report(&[("logstash-input-beats", "9.0.0", "default")]);

    let summary =
        run(temp.path(), |_| {}, Settings::default(), AliasDefinitions::default(), registry, beats_sources(), &report)
            .await;

    assert_eq!(summary.written, vec!["logstash-input-beats"]);
    assert_eq!(summary.failures, 0);

    let doc = read(temp.path(), BEATS_DOC);
    assert!(doc.contains(":version: v9.0.0\n"));
    assert!(doc.contains(":release_date: 2024-03-01\n"));
    assert!(doc.contains(":changelog_url: https://example.test/logstash-input-beats/blob/v9.0.0/CHANGELOG.md\n"));
    assert!(doc.contains(":type: input\n:default_plugin: 1\n"));
    assert!(!doc.contains('%'));
}

#[tokio::test]
async fn test_non_default_plugin_is_flagged() {
    let temp = TempDir::new().unwrap();
    let registry = Arc::new(beats_registry());
    let report = report(&[("logstash-input-beats", "9.0.0", "installed")]);

    run(temp.path(), |_| {}, Settings::default(), AliasDefinitions::default(), registry, beats_sources(), &report).await;

    assert!(read(temp.path(), BEATS_DOC).contains(":type: input\n:default_plugin: 0\n"));
}

#[tokio::test]
async fn test_alias_documented_alongside_target() {
    let temp = TempDir::new().unwrap();
    let registry = Arc::new(beats_registry());
    let report = report(&[("logstash-input-beats", "9.0.0", "default")]);

    let summary =
        run(temp.path(), |_| {}, Settings::default(), elastic_agent_alias(), registry, beats_sources(), &report).await;

    assert_eq!(summary.written, vec!["logstash-input-beats", "logstash-input-elastic_agent"]);
    let alias = read(temp.path(), "docs/plugins/inputs/elastic_agent.asciidoc");
    assert!(alias.starts_with(":plugin: elastic_agent\n"));
    assert!(alias.contains(":version: v9.0.0\n"));
    assert!(read(temp.path(), BEATS_DOC).starts_with(":plugin: beats\n"));
}

#[tokio::test]
async fn test_integration_claims_absorbed_plugins() {
    let temp = TempDir::new().unwrap();
    let registry = Arc::new(
        FakeRegistry::new()
            .with_release(
                "logstash-integration-kafka",
                ReleaseMetadata::new("11.0.0")
                    .with_created_at(date("2024-05-01"))
                    .with_metadata(INTEGRATION_PLUGINS_KEY, "logstash-input-kafka,logstash-output-kafka"),
            )
            .with_release("logstash-input-kafka", ReleaseMetadata::new("10.0.0").with_created_at(date("2020-01-01"))),
    );
    let sources = Sources::new()
        .with(
            "logstash-integration-kafka",
            FakeSource::new()
                .with_file("docs/index.asciidoc", Some("11.0.0"), &plugin_doc("integration", "kafka"))
                .with_file("docs/input-kafka.asciidoc", Some("11.0.0"), &plugin_doc("input", "kafka"))
                .with_file("docs/output-kafka.asciidoc", Some("11.0.0"), &plugin_doc("output", "kafka")),
        )
        .with(
            "logstash-input-kafka",
            FakeSource::new().with_file("docs/index.asciidoc", Some("10.0.0"), &plugin_doc("input", "kafka")),
        );
    let report = report(&[
        ("logstash-input-kafka", "10.0.0", "default"),
        ("logstash-integration-kafka", "11.0.0", "default"),
    ]);

    let summary =
        run(temp.path(), |_| {}, Settings::default(), AliasDefinitions::default(), registry.clone(), sources, &report)
            .await;

    assert_eq!(
        summary.written,
        vec!["logstash-input-kafka", "logstash-integration-kafka", "logstash-output-kafka"]
    );
    assert!(read(temp.path(), "docs/plugins/inputs/kafka.asciidoc").contains(":version: v11.0.0\n"));
    assert!(read(temp.path(), "docs/plugins/outputs/kafka.asciidoc").contains(":version: v11.0.0\n"));
    assert!(read(temp.path(), "docs/plugins/integrations/kafka.asciidoc").contains(":version: v11.0.0\n"));
    assert_eq!(registry.fetch_count("logstash-input-kafka"), 0);
}

#[tokio::test]
async fn test_non_default_integration_is_skipped() {
    let temp = TempDir::new().unwrap();
    let registry = Arc::new(FakeRegistry::new().with_release(
        "logstash-integration-acme",
        ReleaseMetadata::new("1.0.0").with_metadata(INTEGRATION_PLUGINS_KEY, "logstash-filter-acme"),
    ));
    let sources = Sources::new().with(
        "logstash-integration-acme",
        FakeSource::new()
            .with_file("docs/index.asciidoc", Some("1.0.0"), &plugin_doc("integration", "acme"))
            .with_file("docs/filter-acme.asciidoc", Some("1.0.0"), &plugin_doc("filter", "acme")),
    );
    let report = report(&[("logstash-integration-acme", "1.0.0", "installed")]);

    let summary =
        run(temp.path(), |_| {}, Settings::default(), AliasDefinitions::default(), registry, sources, &report).await;

    assert!(summary.written.is_empty());
    assert!(!temp.path().join("docs/plugins").exists());
}

#[tokio::test]
async fn test_skip_list_is_honoured_before_registry() {
    let temp = TempDir::new().unwrap();
    let registry = Arc::new(beats_registry());
    let settings = Settings {
        skip: vec!["logstash-input-beats".to_string()],
        ..Settings::default()
    };
    let report = report(&[("logstash-input-beats", "9.0.0", "default")]);

    let summary =
        run(temp.path(), |_| {}, settings, AliasDefinitions::default(), registry.clone(), beats_sources(), &report)
            .await;

    assert!(summary.written.is_empty());
    assert_eq!(registry.total_fetches(), 0);
}

#[tokio::test]
async fn test_unpublished_version_is_skipped() {
    let temp = TempDir::new().unwrap();
    let registry = Arc::new(beats_registry());
    let report = report(&[("logstash-input-beats", "7.0.0", "default")]);

    let summary =
        run(temp.path(), |_| {}, Settings::default(), AliasDefinitions::default(), registry, beats_sources(), &report)
            .await;

    assert!(summary.written.is_empty());
    assert_eq!(summary.failures, 0);
}

#[tokio::test]
async fn test_skip_existing_keeps_unchanged_version() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(BEATS_DOC);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, ":version: v9.0.0\nhand edited\n").unwrap();
    let report = report(&[("logstash-input-beats", "9.0.0", "default")]);

    let summary = run(
        temp.path(),
        |options| options.skip_existing = true,
        Settings::default(),
        AliasDefinitions::default(),
        Arc::new(beats_registry()),
        beats_sources(),
        &report,
    )
    .await;
    assert!(summary.written.is_empty());
    assert_eq!(read(temp.path(), BEATS_DOC), ":version: v9.0.0\nhand edited\n");

    std::fs::write(&path, ":version: v8.0.0\nhand edited\n").unwrap();
    let summary = run(
        temp.path(),
        |options| options.skip_existing = true,
        Settings::default(),
        AliasDefinitions::default(),
        Arc::new(beats_registry()),
        beats_sources(),
        &report,
    )
    .await;
    assert_eq!(summary.written, vec!["logstash-input-beats"]);
    assert!(read(temp.path(), BEATS_DOC).contains(":version: v9.0.0\n:release_date: 2024-03-01\n"));
}

#[tokio::test]
async fn test_main_branch_documentation() {
    let temp = TempDir::new().unwrap();
    let report = report(&[("logstash-input-beats", "9.0.0", "default")]);

    let summary = run(
        temp.path(),
        |options| options.use_main = true,
        Settings::default(),
        AliasDefinitions::default(),
        Arc::new(beats_registry()),
        beats_sources(),
        &report,
    )
    .await;

    assert_eq!(summary.written, vec!["logstash-input-beats"]);
    let doc = read(temp.path(), BEATS_DOC);
    assert!(doc.contains(":version: main\n"));
    assert!(doc.contains(":release_date: unreleased\n"));
}
