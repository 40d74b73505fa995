//! The registry-wide alias table.
//!
//! Maps a plugin type to the aliases declared for it. An alias renames an
//! existing plugin (`from`) and carries the header rewrites that turn the
//! canonical plugin's documentation into the alias's:
//!
//! ```yaml
//! input:
//!   - alias: elastic_agent
//!     from: beats
//!     docs:
//!       - replace: ":plugin: beats"
//!         with: ":plugin: elastic_agent"
//! ```
//!
//! The table is required: [`AliasDefinitionsLoader::load`] fails with
//! [`DocketError::AliasDefinitionsUnavailable`] when the document cannot be
//! fetched, does not parse, or is empty.

use crate::constants::ALIAS_DEFINITIONS_URL;
use crate::core::{DocketError, PluginType};
use crate::github::GithubClient;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// One `replace` → `with` substitution applied to alias documentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocRewrite {
    pub replace: String,
    pub with: String,
}

impl DocRewrite {
    pub fn new(replace: impl Into<String>, with: impl Into<String>) -> Self {
        Self {
            replace: replace.into(),
            with: with.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasDefinition {
    /// Name the plugin is also known as
    pub alias: String,
    /// Name of the plugin being aliased
    pub from: String,
    #[serde(default)]
    pub docs: Vec<DocRewrite>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasDefinitions {
    by_type: BTreeMap<PluginType, Vec<AliasDefinition>>,
}

impl AliasDefinitions {
    /// Parses the registry document. Unknown type keys are ignored with a warning.
    pub fn from_yaml(text: &str) -> Result<Self, DocketError> {
        let raw: Option<BTreeMap<String, Option<Vec<AliasDefinition>>>> =
            serde_yaml::from_str(text).map_err(|e| DocketError::AliasDefinitionsUnavailable {
                reason: format!("malformed alias document: {e}"),
            })?;
        let raw = raw.unwrap_or_default();

        let mut by_type = BTreeMap::new();
        for (key, definitions) in raw {
            let Some(plugin_type) = PluginType::from_name(&key) else {
                warn!("Ignoring alias definitions for unknown plugin type `{key}`");
                continue;
            };
            let definitions = definitions.unwrap_or_default();
            if !definitions.is_empty() {
                by_type.insert(plugin_type, definitions);
            }
        }

        if by_type.is_empty() {
            return Err(DocketError::AliasDefinitionsUnavailable {
                reason: "alias document is empty".to_string(),
            });
        }
        Ok(Self {
            by_type,
        })
    }

    #[must_use]
    pub fn with_definition(mut self, plugin_type: PluginType, definition: AliasDefinition) -> Self {
        self.by_type.entry(plugin_type).or_default().push(definition);
        self
    }

    /// Definitions aliasing the plugin `name` of `plugin_type`, in declaration order.
    pub fn targeting<'a>(
        &'a self,
        plugin_type: PluginType,
        name: &'a str,
    ) -> impl Iterator<Item = &'a AliasDefinition> + 'a {
        self.of_type(plugin_type).iter().filter(move |d| d.from == name)
    }

    pub fn of_type(&self, plugin_type: PluginType) -> &[AliasDefinition] {
        self.by_type.get(&plugin_type).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PluginType, &AliasDefinition)> {
        self.by_type.iter().flat_map(|(t, defs)| defs.iter().map(move |d| (*t, d)))
    }

    pub fn len(&self) -> usize {
        self.by_type.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fetches the alias table from its central location.
#[derive(Debug, Clone)]
pub struct AliasDefinitionsLoader {
    client: GithubClient,
    url: String,
}

impl AliasDefinitionsLoader {
    pub fn new(client: GithubClient) -> Self {
        Self {
            client,
            url: ALIAS_DEFINITIONS_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub async fn load(&self) -> Result<AliasDefinitions> {
        let unavailable = |reason: String| DocketError::AliasDefinitionsUnavailable {
            reason,
        };
        let text = self
            .client
            .fetch_text(&self.url)
            .await
            .map_err(|e| unavailable(format!("{e:#}")))?
            .ok_or_else(|| unavailable(format!("{} not found", self.url)))?;

        let definitions = AliasDefinitions::from_yaml(&text)?;
        info!("Loaded {} alias definitions", definitions.len());
        Ok(definitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DOCUMENT: &str = r#"
input:
  - alias: elastic_agent
    from: beats
    docs:
      - replace: ":plugin: beats"
        with: ":plugin: elastic_agent"
      - replace: ":plugin-uc: Beats"
        with: ":plugin-uc: Elastic Agent"
output:
  - alias: elastic_cloud
    from: elasticsearch
mixin: []
"#;

    #[test]
    fn test_from_yaml() {
        let definitions = AliasDefinitions::from_yaml(DOCUMENT).unwrap();
        assert_eq!(definitions.len(), 2);

        let beats: Vec<_> = definitions.targeting(PluginType::Input, "beats").collect();
        assert_eq!(beats.len(), 1);
        assert_eq!(beats[0].alias, "elastic_agent");
        assert_eq!(beats[0].docs[1], DocRewrite::new(":plugin-uc: Beats", ":plugin-uc: Elastic Agent"));

        assert!(definitions.of_type(PluginType::Output)[0].docs.is_empty());
        assert_eq!(definitions.targeting(PluginType::Output, "beats").count(), 0);
    }

    #[test]
    fn test_empty_document_is_fatal() {
        for text in ["", "---\n", "input: []\n", "{}"] {
            let error = AliasDefinitions::from_yaml(text).unwrap_err();
            assert!(matches!(error, DocketError::AliasDefinitionsUnavailable { .. }), "{text:?}");
        }
        assert!(AliasDefinitions::from_yaml("input: [[[").is_err());
    }

    #[tokio::test]
    async fn test_loader_fetches_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/AliasRegistry.yml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(DOCUMENT))
            .mount(&server)
            .await;

        let loader = AliasDefinitionsLoader::new(GithubClient::new(None).unwrap())
            .with_url(format!("{}/AliasRegistry.yml", server.uri()));
        assert_eq!(loader.load().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_loader_missing_document_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).respond_with(ResponseTemplate::new(404)).mount(&server).await;

        let loader = AliasDefinitionsLoader::new(GithubClient::new(None).unwrap())
            .with_url(format!("{}/AliasRegistry.yml", server.uri()));
        let error = loader.load().await.unwrap_err();
        assert!(matches!(
            error.downcast_ref::<DocketError>(),
            Some(DocketError::AliasDefinitionsUnavailable { .. })
        ));
    }
}
