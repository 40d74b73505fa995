//! Lookup of the current stack and ECS versions.
//!
//! The shared versions directory holds a `current.asciidoc` that includes the
//! document of the current stack release; that document declares `:version:`
//! and `:ecs_version:` attributes.

use super::content::StackVersions;
use crate::constants::STACK_VERSIONS_BASE_URL;
use crate::core::DocketError;
use crate::github::GithubClient;
use crate::version::PluginVersion;
use anyhow::{Context, Result};
use regex::Regex;
use std::sync::LazyLock;
use tracing::info;

static CURRENT_INCLUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)include::(.*?)\.asciidoc").expect("include pattern is valid"));

static STACK_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":version:\s+(.*?)\n").expect("stack version pattern is valid"));

static ECS_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":ecs_version:\s+(.*?)\n").expect("ecs version pattern is valid"));

pub struct StackVersionsLoader {
    client: GithubClient,
    base_url: String,
}

impl StackVersionsLoader {
    pub fn new(client: GithubClient) -> Self {
        Self {
            client,
            base_url: STACK_VERSIONS_BASE_URL.to_string(),
        }
    }

    /// Overrides the versions directory; must end with `/`.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub async fn load(&self) -> Result<StackVersions> {
        let current = self.fetch("current").await?;
        let linked = CURRENT_INCLUDE
            .captures(&current)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .with_context(|| format!("{}current.asciidoc does not include a versions document", self.base_url))?;

        let document = self.fetch(&linked).await?;
        let versions = parse_stack_versions(&document)?;
        info!("Stack version: {}", versions.branch);
        info!("ECS version: {}", versions.ecs);
        Ok(versions)
    }

    async fn fetch(&self, name: &str) -> Result<String> {
        let url = format!("{}{name}.asciidoc", self.base_url);
        self.client.fetch_text(&url).await?.ok_or_else(|| {
            DocketError::SourceRequest {
                url,
                reason: "not found".to_string(),
            }
            .into()
        })
    }
}

/// Reads `:version:` and `:ecs_version:` reduced to `major.minor`.
pub fn parse_stack_versions(document: &str) -> Result<StackVersions> {
    Ok(StackVersions {
        branch: major_minor(&STACK_VERSION, document, "version")?,
        ecs: major_minor(&ECS_VERSION, document, "ecs_version")?,
    })
}

fn major_minor(pattern: &Regex, document: &str, attribute: &str) -> Result<String> {
    let raw = pattern
        .captures(document)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .with_context(|| format!("stack versions document has no `:{attribute}:` attribute"))?;
    PluginVersion::parse(raw)?.major_minor().ok_or_else(|| {
        DocketError::InvalidVersion {
            version: raw.to_string(),
        }
        .into()
    })
}
