//! Settings data types.

use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::validation;

/// Tool settings, read from `config.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Enable debug logging to file
    pub debug: bool,

    /// Path to log directory
    pub log_path: PathBuf,

    /// Also read `packages-dev` from the lock file
    pub include_dev: bool,

    /// Hide informational restriction lines
    pub quiet: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            log_path: default_log_path(),
            include_dev: true,
            quiet: false,
        }
    }
}

impl Settings {
    /// Validate settings and return errors if invalid.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }
}

/// Default log path, used when no config directory is known.
pub fn default_log_path() -> PathBuf {
    default_log_path_for_config_dir(None)
}

/// Get log path based on config directory.
pub fn default_log_path_for_config_dir(config_dir: Option<&Path>) -> PathBuf {
    config_dir
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
                .join("monolith-versions")
        })
        .join("logs")
}
