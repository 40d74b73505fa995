//! Global constants used throughout the docket codebase.
//!
//! Endpoints, retry parameters, documentation paths and naming rules that are
//! shared by more than one module live here so they stay discoverable.

use std::time::Duration;

/// Prefix shared by every plugin package name (`<prefix>-<type>-<name>`).
pub const PLUGIN_PREFIX: &str = "logstash";

/// Organisation used when registry metadata does not declare a source URL.
///
/// Overridable through the `PLUGIN_ORG` environment variable.
pub const DEFAULT_PLUGIN_ORG: &str = "logstash-plugins";

/// Reference used for source reads when a plugin has no pinned version.
pub const FLOATING_REF: &str = "main";

/// Base URL of the rubygems.org versions API.
pub const RUBYGEMS_API_URL: &str = "https://rubygems.org/api/v1";

/// Base URL for raw file content on GitHub.
pub const GITHUB_RAW_URL: &str = "https://raw.githubusercontent.com";

/// Base URL for browsable files on GitHub.
pub const GITHUB_WEB_URL: &str = "https://github.com";

/// Base URL of the GitHub REST API.
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Central alias registry document (YAML).
pub const ALIAS_DEFINITIONS_URL: &str = "https://raw.githubusercontent.com/elastic/logstash/main/logstash-core/src/main/resources/org/logstash/plugins/AliasRegistry.yml";

/// Directory holding the shared stack version documents.
pub const STACK_VERSIONS_BASE_URL: &str =
    "https://raw.githubusercontent.com/elastic/docs/master/shared/versions/stack/";

/// Maximum number of attempts for a registry request (initial try included).
pub const REGISTRY_MAX_ATTEMPTS: usize = 5;

/// Starting delay for registry retry backoff (milliseconds).
pub const REGISTRY_RETRY_BASE_MS: u64 = 250;

/// Maximum delay between two registry attempts.
pub const REGISTRY_RETRY_MAX_DELAY: Duration = Duration::from_secs(4);

/// Timeout applied to every outbound HTTP request.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Default number of repositories processed concurrently.
pub const DEFAULT_PARALLELISM: usize = 4;

/// Remaining GitHub API calls under which a warning is emitted.
pub const GITHUB_RATE_LIMIT_WARNING: u64 = 100;

/// Documentation file of a standalone plugin inside its source tree.
pub const PLUGIN_DOC_PATH: &str = "docs/index.asciidoc";

/// Changelog file inside a plugin source tree.
pub const CHANGELOG_PATH: &str = "CHANGELOG.md";

/// Repository receiving generated documentation pull requests.
pub const DOCS_REPOSITORY: &str = "elastic/logstash-docs";

/// Branch that documentation pull requests target.
pub const DOCS_TARGET_BRANCH: &str = "versioned_plugin_docs";

/// Branch used for generated versioned documentation.
pub const VERSIONED_DOCS_BRANCH: &str = "versioned_docs_new_content";

/// Branch used for new plugin placeholders.
pub const PLACEHOLDER_BRANCH: &str = "new_plugin_placeholder";

/// Default filter applied to organisation repositories in versioned mode.
pub const DEFAULT_PLUGIN_REGEX: &str = "logstash-(?:codec|filter|input|output|integration)";

/// Clone URL of the documentation repository.
pub const DOCS_CLONE_URL: &str = "git@github.com:elastic/logstash-docs.git";

/// Directory under `--output-path` holding the documentation checkout.
pub const DOCS_CHECKOUT_DIR: &str = "logstash-docs";

/// Plugin types a placeholder can be created for.
pub const PLACEHOLDER_TYPES: &[&str] = &["integration"];
