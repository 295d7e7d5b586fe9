//! Adapter between project files and the package pool.
//!
//! This module provides:
//! - Root package loading from `composer.json`
//! - Pool construction from `composer.lock` (packages, dev packages, aliases)
//! - JSON rendering of a restricted pool

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::domain::{
    AliasPackage, CompletePackage, Constraint, Link, Package, Requirements, RootPackage,
    VersionParser,
};

/// Version given to a root package that does not declare one.
const DEFAULT_ROOT_VERSION: &str = "1.0.0";

/// Root manifest (`composer.json`).
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub name: String,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub require: Map<String, Value>,

    #[serde(default, rename = "require-dev")]
    pub require_dev: Map<String, Value>,

    #[serde(default)]
    pub extra: Value,
}

/// Lock file (`composer.lock`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Lockfile {
    #[serde(default)]
    pub packages: Vec<LockedPackage>,

    #[serde(default, rename = "packages-dev")]
    pub packages_dev: Vec<LockedPackage>,

    #[serde(default)]
    pub aliases: Vec<LockedAlias>,
}

/// A package entry of the lock file.
#[derive(Debug, Clone, Deserialize)]
pub struct LockedPackage {
    pub name: String,
    pub version: String,

    #[serde(default, rename = "type")]
    pub package_type: Option<String>,

    #[serde(default)]
    pub require: Map<String, Value>,
}

/// A branch alias entry of the lock file.
#[derive(Debug, Clone, Deserialize)]
pub struct LockedAlias {
    pub package: String,
    pub version: String,
    pub alias: String,
}

/// Adapter for converting project files into pool packages.
pub struct PoolAdapter {
    parser: VersionParser,
    include_dev: bool,
}

impl PoolAdapter {
    /// Create a new adapter; `include_dev` also loads dev requirements and packages.
    pub fn new(include_dev: bool) -> Self {
        Self {
            parser: VersionParser::new(),
            include_dev,
        }
    }

    /// Parse `composer.json` content.
    pub fn parse_manifest(&self, content: &str) -> Result<Manifest> {
        serde_json::from_str(content).context("Failed to parse manifest")
    }

    /// Parse `composer.lock` content.
    pub fn parse_lockfile(&self, content: &str) -> Result<Lockfile> {
        serde_json::from_str(content).context("Failed to parse lock file")
    }

    /// Build the root package declared by the manifest.
    pub fn root_package(&self, manifest: &Manifest) -> RootPackage {
        let version = manifest
            .version
            .clone()
            .unwrap_or_else(|| DEFAULT_ROOT_VERSION.to_string());
        let mut root = RootPackage::new(manifest.name.clone(), version);

        root.requires = self.requirements(&manifest.name, &manifest.require);
        if self.include_dev {
            root.requires = root
                .requires
                .merged(&self.requirements(&manifest.name, &manifest.require_dev));
        }

        root
    }

    /// Build the pool: locked packages, their aliases, then the root package.
    pub fn build_pool(&self, root: &RootPackage, lockfile: &Lockfile) -> Vec<Package> {
        let mut pool: Vec<Package> = lockfile
            .packages
            .iter()
            .chain(
                lockfile
                    .packages_dev
                    .iter()
                    .filter(|_| self.include_dev),
            )
            .map(|locked| Package::Complete(self.complete_package(locked)))
            .collect();

        for alias in &lockfile.aliases {
            let aliased = pool.iter().find(|p| {
                p.alias_of().is_none() && p.name() == alias.package && p.version() == alias.version
            });

            match aliased {
                Some(aliased) => {
                    let package = Package::Alias(AliasPackage {
                        name: alias.package.clone(),
                        version: alias.alias.clone(),
                        alias_of: Box::new(aliased.clone()),
                    });
                    pool.push(package);
                }
                None => warn!(
                    "Alias {} of {} ({}) has no locked package, skipping",
                    alias.alias, alias.package, alias.version
                ),
            }
        }

        pool.push(Package::Root(root.clone()));
        debug!("Built pool with {} packages", pool.len());

        pool
    }

    /// Render the pool as pretty JSON.
    pub fn render_pool(&self, packages: &[Package]) -> Result<String> {
        serde_json::to_string_pretty(packages).context("Failed to render package pool")
    }

    fn complete_package(&self, locked: &LockedPackage) -> CompletePackage {
        let mut package = CompletePackage::new(locked.name.clone(), locked.version.clone());
        if let Some(package_type) = &locked.package_type {
            package.package_type = package_type.clone();
        }
        package.requires = self.requirements(&locked.name, &locked.require);
        package
    }

    /// Convert a `require` map; constraints the parser does not understand are kept as written.
    fn requirements(&self, source: &str, require: &Map<String, Value>) -> Requirements {
        let mut requirements = Requirements::new();

        for (target, constraint) in require {
            let Some(text) = constraint.as_str() else {
                warn!("{}: requirement on {} is not a string, skipping", source, target);
                continue;
            };

            let constraint = self.parser.parse_constraints(text).unwrap_or_else(|e| {
                debug!("{}: keeping requirement on {} as written: {}", source, target, e);
                Constraint::raw(text)
            });
            requirements.insert(Link::new(source, target.clone(), constraint));
        }

        requirements
    }
}
