//! Resolution service used by the CLI.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::Settings;
use crate::domain::{Environment, Package, Reporter, RuleSet};
use crate::service::adapter::PoolAdapter;
use crate::service::plugin::{MonolithPlugin, PrePoolCreateEvent};

/// Service running the plugin against project files.
pub struct ResolveService {
    adapter: PoolAdapter,
    reporter: Arc<dyn Reporter>,
}

impl ResolveService {
    pub fn new(settings: &Settings, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            adapter: PoolAdapter::new(settings.include_dev),
            reporter,
        }
    }

    /// Validate the monolith configuration of a manifest.
    pub fn check(&self, manifest_path: &Path) -> Result<RuleSet> {
        let content = read(manifest_path)?;
        let manifest = self
            .adapter
            .parse_manifest(&content)
            .with_context(|| format!("Invalid manifest: {}", manifest_path.display()))?;

        let plugin = MonolithPlugin::activate_strict(&manifest.extra, self.reporter.clone())
            .with_context(|| format!("Invalid manifest: {}", manifest_path.display()))?;

        Ok(plugin.rules().clone())
    }

    /// Build the pool from manifest and lock file and restrict it.
    pub fn resolve(
        &self,
        manifest_path: &Path,
        lock_path: &Path,
        env: &dyn Environment,
    ) -> Result<Vec<Package>> {
        let manifest = self
            .adapter
            .parse_manifest(&read(manifest_path)?)
            .with_context(|| format!("Invalid manifest: {}", manifest_path.display()))?;
        let lockfile = self
            .adapter
            .parse_lockfile(&read(lock_path)?)
            .with_context(|| format!("Invalid lock file: {}", lock_path.display()))?;

        let root = self.adapter.root_package(&manifest);
        let plugin = MonolithPlugin::activate(&manifest.extra, self.reporter.clone());

        let mut event = PrePoolCreateEvent::new(self.adapter.build_pool(&root, &lockfile));
        for subscribed in plugin.subscribed_events() {
            debug!("Dispatching {:?}", subscribed);
            plugin.on_pre_pool_create(&root, &mut event, env)?;
        }

        let packages = event.into_packages();
        info!("Resolved pool of {} packages", packages.len());

        Ok(packages)
    }

    /// Resolve and write the pool as JSON to stdout.
    pub fn run(&self, manifest_path: &Path, lock_path: &Path, env: &dyn Environment) -> Result<()> {
        let packages = self.resolve(manifest_path, lock_path, env)?;
        let output = self.adapter.render_pool(&packages)?;

        let stdout = io::stdout();
        let mut stdout = stdout.lock();
        writeln!(stdout, "{}", output)?;

        Ok(())
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
