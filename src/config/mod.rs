//! Configuration documents read by docket.
//!
//! # Settings
//!
//! YAML (or TOML, by extension) listing packages never to document and extra
//! repositories to include in versioned runs:
//!
//! ```yaml
//! skip:
//!   - logstash-input-example
//! additional_repositories:
//!   - elastic/logstash-filter-elastic_integration
//! ```
//!
//! # Plugin versions report
//!
//! JSON produced by the distribution build, naming the exact release of every
//! bundled plugin and where it came from:
//!
//! ```json
//! {"successful": {"logstash-input-beats": {"version": "9.0.0", "from": "default"}}}
//! ```

mod parser;

pub use parser::{Format, parse_config};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Value of `from` for plugins shipped with the default distribution.
pub const DEFAULT_SOURCE: &str = "default";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Package names never processed
    #[serde(default)]
    pub skip: Vec<String>,
    /// `org/repo` specs added to the organisation's repositories in versioned runs
    #[serde(default)]
    pub additional_repositories: Vec<String>,
}

impl Settings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        parse_config(path)
    }

    pub fn is_skipped(&self, package: &str) -> bool {
        self.skip.iter().any(|name| name == package)
    }
}

/// Release of one package as recorded in the versions report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub version: String,
    #[serde(default)]
    pub from: Option<String>,
}

impl ReportEntry {
    pub fn is_default(&self) -> bool {
        self.from.as_deref() == Some(DEFAULT_SOURCE)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginsReport {
    #[serde(default)]
    pub successful: BTreeMap<String, ReportEntry>,
}

impl PluginsReport {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        parse_config(path)
    }
}
