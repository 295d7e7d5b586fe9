//! Settings management module.
//!
//! Handles TOML settings file loading, validation, and default generation.

mod service;
mod types;
mod validation;

pub use service::SettingsService;
pub use types::Settings;
pub use validation::validate;
