//! Settings service for loading and generating settings files.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::types::default_log_path_for_config_dir;
use super::Settings;

/// Settings service.
pub struct SettingsService;

impl SettingsService {
    /// Get the default settings file path.
    /// Always uses ~/.config/monolith-versions/config.toml for cross-platform consistency.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("monolith-versions")
            .join("config.toml")
    }

    /// Load settings from file.
    ///
    /// If `path` is `None`, uses the default path. A missing file yields the
    /// defaults. Log path defaults to the directory of the settings file.
    pub fn load(path: Option<&Path>) -> Result<Settings> {
        let path = path.map(PathBuf::from).unwrap_or_else(Self::default_path);
        let config_dir = path.parent();

        let mut settings = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

            toml::from_str::<Settings>(&content)
                .with_context(|| format!("Failed to parse settings file: {}", path.display()))?
        } else {
            Settings::default()
        };

        // If log_path was not explicitly set, use the settings file directory
        let general_default = default_log_path_for_config_dir(None);
        if settings.log_path == general_default {
            settings.log_path = default_log_path_for_config_dir(config_dir);
        }

        settings
            .validate()
            .with_context(|| format!("Invalid settings in {}", path.display()))?;

        Ok(settings)
    }

    /// Generate default settings file at the default path.
    pub fn generate_default() -> Result<()> {
        Self::generate_at(&Self::default_path())
    }

    /// Generate default settings file at the specified path.
    pub fn generate_at(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory: {}", parent.display())
            })?;
        }

        fs::write(path, Self::default_content())
            .with_context(|| format!("Failed to write settings file: {}", path.display()))?;

        Ok(())
    }

    /// Default settings content with comments.
    fn default_content() -> &'static str {
        r#"# monolith-versions settings
#
# Monolith groups themselves are configured per project, in composer.json:
#
# "extra": {
#     "monolith-versions": {
#         "rollersearch": { "package": "rollerworks/search-*", "constraint": "^2.0" }
#     }
# }
#
# Override a group's constraint for one run with COMPOSER_MONOLITH_<GROUP>,
# e.g. COMPOSER_MONOLITH_ROLLERSEARCH="^3.0".

# Enable debug logging to file (default: false)
debug = false

# Path to log directory (default: same directory as config.toml/logs)
# log_path = "~/.config/monolith-versions/logs"

# Also restrict packages from "packages-dev" in composer.lock (default: true)
include_dev = true

# Hide "Restricting package ..." lines (default: false)
quiet = false
"#
    }
}
