//! User configuration
//!
//! Read from `<config dir>/client-import/config.toml`. Every key is optional.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::import::IDENTIFIER_FIELD;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub import: ImportConfig,
}

/// Defaults for import runs, overridable from the command line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Field key used for duplicate detection
    pub identifier_field: String,
    /// Rows shown in the preview table
    pub preview_rows: usize,
    /// Snapshot of registered identifiers used when `--existing` is not given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_identifiers: Option<PathBuf>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            identifier_field: IDENTIFIER_FIELD.to_string(),
            preview_rows: 10,
            existing_identifiers: None,
        }
    }
}

impl Config {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("client-import").join("config.toml"))
    }

    /// Load from the default location, falling back to defaults if absent
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                log::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML")
    }
}
