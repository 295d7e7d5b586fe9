//! Error types for monolith-versions.

use thiserror::Error;

/// Main error type for monolith-versions.
#[derive(Debug, Error)]
pub enum MonolithError {
    /// Every validation problem found in one configuration root.
    #[error("Invalid configuration detected in \"{}\": {}", .root, format_errors(.errors))]
    Configuration { root: String, errors: Vec<String> },

    /// The configuration root exists but has the wrong shape.
    #[error("{0}")]
    InvalidOptions(String),

    /// Constraint supplied through the environment could not be parsed.
    #[error("Monolith config \"{rule}\" constraint by ENV is not valid. Message: {message}.")]
    EnvConstraint { rule: String, message: String },

    /// Packages were restricted but the root package is not part of the pool.
    #[error("Root package \"{0}\" is not part of the package pool")]
    RootPackageMissing(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MonolithError {
    /// Individual validation messages, empty for other variants.
    pub fn errors(&self) -> &[String] {
        match self {
            MonolithError::Configuration { errors, .. } => errors,
            _ => &[],
        }
    }
}

fn format_errors(errors: &[String]) -> String {
    errors.iter().map(|e| format!("\n - {}", e)).collect()
}

/// A version constraint that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Could not parse version constraint {constraint}: {reason}")]
pub struct ConstraintError {
    pub constraint: String,
    pub reason: String,
}

/// Malformed package pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error(". Vendor name cannot contain expends or wildcard.")]
    InvalidVendor,

    #[error(". Cannot contain both a wildcard and expands.")]
    WildcardAndExpand,

    #[error(". Missing closing expands \"}}\" character.")]
    UnclosedExpand,

    #[error(". Cannot contain more than one expands.")]
    MultipleExpands,

    #[error(". Cannot contain more than one wildcard.")]
    MultipleWildcards,

    #[error(".")]
    InvalidName,

    #[error(". Name cannot be empty, use a wildcard \"*\" instead.")]
    EmptyName,
}

pub type Result<T> = std::result::Result<T, MonolithError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_lists_every_problem() {
        let err = MonolithError::Configuration {
            root: "extra.monolith-versions".to_string(),
            errors: vec!["first".to_string(), "second".to_string()],
        };

        assert_eq!(
            err.to_string(),
            "Invalid configuration detected in \"extra.monolith-versions\": \n - first\n - second"
        );
        assert_eq!(err.errors().len(), 2);
    }

    #[test]
    fn test_pattern_error_suffixes() {
        assert_eq!(
            PatternError::UnclosedExpand.to_string(),
            ". Missing closing expands \"}\" character."
        );
        assert_eq!(PatternError::InvalidName.to_string(), ".");
    }
}
