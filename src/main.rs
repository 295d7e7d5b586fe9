//! monolith-versions: keep monolith package families on one version line
//!
//! Validates the `extra.monolith-versions` section of a root manifest and
//! restricts the locked package pool the way the package manager plugin does.

mod cli;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use monolith_versions::config::{self, SettingsService};
use monolith_versions::domain::{self, ConsoleReporter, ProcessEnvironment};
use monolith_versions::service::ResolveService;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load settings
    let mut settings = SettingsService::load(cli.config.as_deref())?;
    settings.quiet |= cli.quiet;

    // Initialize logging if debug mode
    if cli.debug || settings.debug {
        domain::logger::init(&settings)?;
    }

    let reporter = Arc::new(ConsoleReporter::new(settings.quiet));

    // Execute command
    match cli.command {
        Commands::Check { manifest } => {
            config::validate(&settings)?;
            let service = ResolveService::new(&settings, reporter);
            let rules = service.check(&manifest)?;
            if !settings.quiet {
                for rule in &rules {
                    eprintln!(
                        "{}: {} <- {}",
                        rule.name(),
                        rule.constraint_text(),
                        rule.matcher().as_str()
                    );
                }
                eprintln!("Configuration is valid.");
            }
        }
        Commands::Resolve { manifest, lock } => {
            let service = ResolveService::new(&settings, reporter);
            service.run(&manifest, &lock, &ProcessEnvironment)?;
        }
        Commands::Init { path } => {
            let settings_path = if let Some(p) = path {
                SettingsService::generate_at(&p)?;
                p
            } else {
                SettingsService::generate_default()?;
                SettingsService::default_path()
            };
            if !settings.quiet {
                eprintln!("Settings file created at: {}", settings_path.display());
            }
        }
        Commands::Version => {
            println!("monolith-versions {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
