//! CG-002: Settings file (`cfn-glue.toml`).
//!
//! A missing file means defaults. CLI flags override whatever is loaded.

use super::error::{CfnError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default settings file name, looked up in the working directory.
pub const SETTINGS_FILE: &str = "cfn-glue.toml";

/// Template output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub render: RenderSettings,
    pub validate: ValidateSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidateSettings {
    /// Accept resource types outside `AWS::Glue::*` (S3 buckets, IAM roles, ...)
    pub allow_foreign_types: bool,
    /// Report a missing `AWSTemplateFormatVersion`
    pub require_format_version: bool,
}

impl Default for ValidateSettings {
    fn default() -> Self {
        Self {
            allow_foreign_types: true,
            require_format_version: false,
        }
    }
}

impl Settings {
    /// Load settings from `path`; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| CfnError::Io(format!("failed to read {}: {}", path.display(), e)))?;
        let settings = Self::parse(&content)
            .map_err(|e| CfnError::Config(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), ?settings, "loaded settings");
        Ok(settings)
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// TOML text for `init`.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CfnError::Config(e.to_string()))
    }
}
