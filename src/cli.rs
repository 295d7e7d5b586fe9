//! CLI argument parsing and command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Keep monolith package families on one version line
#[derive(Parser)]
#[command(
    name = "monolith-versions",
    version,
    about = "Keep monolith package families on one version line",
    long_about = "Restricts every package of a configured monolith group to the group's \
                  version constraint before the dependency resolver runs."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to settings file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Validate the monolith configuration of a manifest
    Check {
        /// Path to the root manifest
        #[arg(long, short = 'm', default_value = "composer.json")]
        manifest: PathBuf,
    },
    /// Restrict the locked package pool and print it as JSON
    Resolve {
        /// Path to the root manifest
        #[arg(long, short = 'm', default_value = "composer.json")]
        manifest: PathBuf,
        /// Path to the lock file
        #[arg(long, short = 'l', default_value = "composer.lock")]
        lock: PathBuf,
    },
    /// Generate default settings file
    Init {
        /// Path where to create the settings file
        #[arg(long, short = 'p')]
        path: Option<PathBuf>,
    },
    /// Display version information
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let cli = Cli::parse_from(["monolith-versions", "resolve"]);
        match cli.command {
            Commands::Resolve { manifest, lock } => {
                assert_eq!(manifest, PathBuf::from("composer.json"));
                assert_eq!(lock, PathBuf::from("composer.lock"));
            }
            _ => panic!("expected resolve"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["monolith-versions", "check", "-m", "app.json", "--quiet"]);
        assert!(cli.quiet);
        assert!(!cli.debug);
        assert!(matches!(cli.command, Commands::Check { manifest } if manifest == PathBuf::from("app.json")));
    }
}
