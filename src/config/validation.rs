//! Settings validation.

use anyhow::{bail, Result};

use super::Settings;

/// Validate settings.
pub fn validate(settings: &Settings) -> Result<()> {
    if settings.log_path.as_os_str().is_empty() {
        bail!("Invalid log_path: cannot be empty");
    }

    // Path will be created if it doesn't exist, so just check it's valid
    if settings.log_path.to_string_lossy().contains('\0') {
        bail!("Invalid log_path: contains null character");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(validate(&Settings::default()).is_ok());
    }

    #[test]
    fn test_rejects_bad_log_path() {
        let settings = Settings {
            log_path: PathBuf::from("logs\0"),
            ..Settings::default()
        };
        assert!(validate(&settings).is_err());

        let settings = Settings {
            log_path: PathBuf::new(),
            ..Settings::default()
        };
        assert!(validate(&settings).is_err());
    }
}
