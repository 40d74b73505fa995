//! Text transformations applied to plugin documentation before it is written.
//!
//! Documentation sources carry placeholder tokens (`%VERSION%`,
//! `%RELEASE_DATE%`, `%CHANGELOG_URL%`) that are resolved per release. The
//! versioned tree additionally scopes every anchor to the release so several
//! versions of one plugin can live in the same book.

use crate::core::PluginType;
use crate::plugin::Plugin;
use chrono::{DateTime, Utc};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static TYPE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^:type: .*$").expect("type line pattern is valid"));

static DECLARED_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^:version: (.*?)\n").expect("version line pattern is valid"));

static PLUGIN_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^=== .+? [Pp]lugin$").expect("plugin header pattern is valid"));

const UNRELEASED: &str = "unreleased";

/// Resolved values for the placeholder tokens of one release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseFields {
    pub tag: String,
    pub release_date: String,
    pub changelog_url: String,
}

impl ReleaseFields {
    pub fn new(tag: impl Into<String>, release_date: Option<DateTime<Utc>>, changelog_url: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            release_date: format_release_date(release_date),
            changelog_url: changelog_url.into(),
        }
    }

    /// Fields of the release `plugin` documents.
    pub fn of(plugin: &Plugin) -> Self {
        Self::new(plugin.tag(), plugin.release_date(), plugin.changelog_url())
    }
}

/// `YYYY-MM-DD`, or `unreleased` when the registry has no timestamp.
pub fn format_release_date(date: Option<DateTime<Utc>>) -> String {
    date.map_or_else(|| UNRELEASED.to_string(), |d| d.format("%Y-%m-%d").to_string())
}

/// Replaces every placeholder token with the release's values.
pub fn substitute_placeholders(content: &str, fields: &ReleaseFields) -> String {
    content
        .replace("%VERSION%", &fields.tag)
        .replace("%RELEASE_DATE%", &fields.release_date)
        .replace("%CHANGELOG_URL%", &fields.changelog_url)
}

/// Adds `:default_plugin: 1|0` right after the first `:type:` attribute line.
///
/// Documents without a `:type:` line are returned unchanged.
pub fn inject_default_plugin(content: &str, is_default: bool) -> String {
    let flag = u8::from(is_default);
    TYPE_LINE
        .replace(content, |caps: &Captures<'_>| format!("{}\n:default_plugin: {flag}", &caps[0]))
        .into_owned()
}

/// The value of the first `:version:` attribute line.
pub fn declared_version(content: &str) -> Option<&str> {
    DECLARED_VERSION.captures(content).and_then(|caps| caps.get(1)).map(|m| m.as_str())
}

/// True when both documents declare the same `:version:`.
///
/// Two documents that both lack the attribute count as unchanged.
pub fn no_version_bump(existing: &str, generated: &str) -> bool {
    declared_version(existing) == declared_version(generated)
}

/// Rewrites a plugin document for the versioned tree.
///
/// The `=== ... plugin` title gets a `{version}` suffix and every anchor id and
/// cross-reference is scoped by `{version}`.
pub fn versioned(content: &str, fields: &ReleaseFields, plugin_type: PluginType, name: &str) -> String {
    let content = substitute_placeholders(content, fields)
        .replace(":include_path: ../../../../logstash/docs/include", ":include_path: ../include/6.x");

    let content = PLUGIN_HEADER
        .replace(&content, |caps: &Captures<'_>| format!("{} {{version}}", &caps[0]))
        .into_owned();

    let plural = plugin_type.plural();
    content
        .replace("[id=\"plugins-", "[id=\"{version}-plugins-")
        .replace(
            "<<plugins-{type}s-common-options>>",
            "<<{version}-plugins-{type}s-{plugin}-common-options>>",
        )
        .replace("<<plugins-{type}-{plugin}", "<<plugins-{type}s-{plugin}")
        .replace("<<plugins-{type}s-{plugin}", "<<{version}-plugins-{type}s-{plugin}")
        .replace(&format!("<<plugins-{plural}-{name}"), &format!("<<{{version}}-plugins-{plural}-{name}"))
        .replace("[[dlq-policy]]", "[id=\"{version}-dlq-policy\"]")
        .replace("<<dlq-policy>>", "<<{version}-dlq-policy>>")
}

/// Stack and ECS `major.minor` versions referenced by versioned documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackVersions {
    pub branch: String,
    pub ecs: String,
}

/// Resolves `%BRANCH%` and `%ECS_VERSION%`.
///
/// Documents that still carry the legacy `[":branch: %BRANCH%"]` marker get the
/// two attribute lines added after their `:type:` line first.
pub fn apply_stack_versions(content: &str, plugin_type: PluginType, stack: &StackVersions) -> String {
    let mut content = content.to_string();
    if content.contains("[\":branch: %BRANCH%\"]") {
        let type_entry = format!(":type: {plugin_type}\n");
        if let Some(index) = content.find(&type_entry) {
            content.insert_str(index + type_entry.len(), ":branch: %BRANCH%\n:ecs_version: %ECS_VERSION%\n");
        }
    }
    content.replace("%BRANCH%", &stack.branch).replace("%ECS_VERSION%", &stack.ecs)
}
