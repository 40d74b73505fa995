//! Document parsing shared by every configuration file.

use crate::core::DocketError;
use anyhow::Result;
use std::path::Path;

/// Format of a configuration document, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Toml,
    Json,
}

impl Format {
    /// `.toml` and `.json` are recognised; anything else is read as YAML.
    pub fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("toml") => Format::Toml,
            Some("json") => Format::Json,
            _ => Format::Yaml,
        }
    }
}

/// Reads and deserializes `path`, mapping every failure to [`DocketError::SettingsError`].
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let settings_error = |reason: String| DocketError::SettingsError {
        path: path.display().to_string(),
        reason,
    };

    let content = std::fs::read_to_string(path).map_err(|e| settings_error(e.to_string()))?;

    let config: T = match Format::of(path) {
        Format::Toml => toml::from_str(&content).map_err(|e| settings_error(e.to_string()))?,
        Format::Json => serde_json::from_str(&content).map_err(|e| settings_error(e.to_string()))?,
        Format::Yaml => serde_yaml::from_str(&content).map_err(|e| settings_error(e.to_string()))?,
    };

    Ok(config)
}
