//! Plugin types known to the documentation tooling.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of pipeline component a plugin provides.
///
/// `Integration` is special: an integration package provides no component of
/// its own but bundles several embedded plugins of the other four types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginType {
    Input,
    Output,
    Filter,
    Codec,
    Integration,
}

impl PluginType {
    /// All types, in documentation order.
    pub const ALL: [PluginType; 5] = [
        PluginType::Input,
        PluginType::Output,
        PluginType::Filter,
        PluginType::Codec,
        PluginType::Integration,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            PluginType::Input => "input",
            PluginType::Output => "output",
            PluginType::Filter => "filter",
            PluginType::Codec => "codec",
            PluginType::Integration => "integration",
        }
    }

    /// Directory name used in the documentation tree (`inputs`, `codecs`, ...).
    #[must_use]
    pub fn plural(&self) -> String {
        format!("{}s", self.as_str())
    }

    /// Whether a plugin of this type may live inside an integration package.
    #[must_use]
    pub const fn is_embeddable(&self) -> bool {
        !matches!(self, PluginType::Integration)
    }

    /// Exact, case-sensitive lookup as used by package-name parsing.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for PluginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PluginType {
    type Err = crate::core::DocketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(&s.to_lowercase()).ok_or_else(|| crate::core::DocketError::UnsupportedPluginType {
            desc: format!("[type:{s}]"),
            plugin_type: s.to_string(),
            role: "a plugin".to_string(),
        })
    }
}
