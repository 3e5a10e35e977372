//! Forms configuration
//!
//! Loaded from TOML. Every section is optional and falls back to defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::application::dto::ExportOptions;
use crate::domain::services::ValidationOptions;
use crate::domain::value_objects::FormId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsConfig {
    pub log_level: String,
    pub validation: ValidationOptions,
    pub share: ShareConfig,
    pub export: ExportConfig,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            validation: ValidationOptions::default(),
            share: ShareConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

/// Public fill-out link settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    pub base_url: String,
    /// Supports `{base_url}` and `{form_id}` placeholders
    pub link_template: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            link_template: "{base_url}/forms/{form_id}/fill".to_string(),
        }
    }
}

impl ShareConfig {
    pub fn link_for(&self, form_id: &FormId) -> String {
        self.link_template
            .replace("{base_url}", self.base_url.trim_end_matches('/'))
            .replace("{form_id}", form_id.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub delimiter: char,
    pub file_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        let options = ExportOptions::default();
        Self { delimiter: options.delimiter, file_prefix: options.file_prefix }
    }
}

impl From<&ExportConfig> for ExportOptions {
    fn from(config: &ExportConfig) -> Self {
        Self { delimiter: config.delimiter, file_prefix: config.file_prefix.clone() }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to encode config: {0}")]
    Encode(#[from] toml::ser::Error),
}

impl FormsConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn export_options(&self) -> ExportOptions {
        (&self.export).into()
    }
}
