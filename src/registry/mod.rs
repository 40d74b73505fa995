//! Package registry access.
//!
//! - [`ReleaseMetadata`] - one published release as reported by the registry
//! - [`RegistryApi`] - the blocking capability the domain model depends on
//! - [`RubygemsClient`] - the HTTP implementation, with bounded retries
//! - [`RegistryInfo`] - the per-package, compute-once cache over a [`RegistryApi`]

mod info;
mod rubygems;

pub use info::RegistryInfo;
pub(crate) use info::is_prerelease;
pub use rubygems::RubygemsClient;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata key holding the URL of a package's source repository.
pub const SOURCE_CODE_URI_KEY: &str = "source_code_uri";

/// Metadata key listing the canonical names bundled by an integration package.
pub const INTEGRATION_PLUGINS_KEY: &str = "integration_plugins";

/// A published release of a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseMetadata {
    /// The version string, e.g. `9.0.0`
    pub number: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub metadata: Option<BTreeMap<String, String>>,
}

impl ReleaseMetadata {
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            created_at: None,
            prerelease: false,
            metadata: None,
        }
    }

    #[must_use]
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.get_or_insert_with(BTreeMap::new).insert(key.into(), value.into());
        self
    }

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.as_ref()?.get(key).map(String::as_str)
    }

    pub fn source_code_uri(&self) -> Option<&str> {
        self.metadata_value(SOURCE_CODE_URI_KEY)
    }

    /// Canonical names listed in `integration_plugins`, in declaration order.
    pub fn integration_plugins(&self) -> Vec<String> {
        self.metadata_value(INTEGRATION_PLUGINS_KEY)
            .map(|list| {
                list.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect()
            })
            .unwrap_or_default()
    }
}

/// Blocking access to a package registry.
///
/// `Ok(vec![])` means the registry has no record of the package. `Err` means the
/// registry could not answer (after whatever retries the implementation does).
pub trait RegistryApi: Send + Sync {
    fn fetch_releases(&self, package: &str) -> Result<Vec<ReleaseMetadata>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_registry_payload() {
        let json = r#"[
            {
                "number": "9.0.0",
                "created_at": "2024-03-01T12:30:00.000Z",
                "prerelease": false,
                "metadata": {"source_code_uri": "https://github.com/logstash-plugins/logstash-input-beats"}
            },
            {"number": "9.1.0.pre", "created_at": "2024-04-01T00:00:00Z", "prerelease": true, "metadata": null},
            {"number": "1.0.0"}
        ]"#;
        let releases: Vec<ReleaseMetadata> = serde_json::from_str(json).unwrap();

        assert_eq!(releases.len(), 3);
        assert_eq!(
            releases[0].source_code_uri(),
            Some("https://github.com/logstash-plugins/logstash-input-beats")
        );
        assert_eq!(releases[0].created_at.unwrap().format("%Y-%m-%d").to_string(), "2024-03-01");
        assert!(releases[1].prerelease);
        assert!(releases[1].metadata.is_none());
        assert!(releases[2].created_at.is_none());
    }

    #[test]
    fn test_integration_plugins_preserve_order() {
        let release = ReleaseMetadata::new("1.0.0")
            .with_metadata(INTEGRATION_PLUGINS_KEY, "logstash-filter-foo, logstash-codec-bar,");
        assert_eq!(release.integration_plugins(), vec!["logstash-filter-foo", "logstash-codec-bar"]);
        assert!(ReleaseMetadata::new("1.0.0").integration_plugins().is_empty());
    }
}
