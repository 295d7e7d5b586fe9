//! Plugin lifecycle as seen by the package manager host.
//!
//! The host activates the plugin with the root manifest's `extra` section and
//! dispatches [`HostEvent::PrePoolCreate`] right before it builds the pool of
//! installable packages.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{
    Environment, Package, PackageFilter, Reporter, Result, RootPackage, RuleSet,
};

/// Host events the plugin can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    PrePoolCreate,
}

/// Packages about to be turned into the resolver pool.
#[derive(Debug, Clone, Default)]
pub struct PrePoolCreateEvent {
    packages: Vec<Package>,
}

impl PrePoolCreateEvent {
    pub fn new(packages: Vec<Package>) -> Self {
        Self { packages }
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn set_packages(&mut self, packages: Vec<Package>) {
        self.packages = packages;
    }

    pub fn into_packages(self) -> Vec<Package> {
        self.packages
    }
}

/// Keeps monolith package families on their configured constraint.
pub struct MonolithPlugin {
    filter: PackageFilter,
    active: bool,
}

impl MonolithPlugin {
    /// Activate from the root manifest's `extra` section.
    ///
    /// An invalid configuration is reported as a warning and leaves the plugin
    /// inactive, so the host keeps working without it.
    pub fn activate(extra: &Value, reporter: Arc<dyn Reporter>) -> Self {
        match RuleSet::from_extra(extra) {
            Ok(rules) => Self::with_rules(rules, reporter),
            Err(e) => {
                warn!("Monolith versions disabled: {}", e);
                reporter.warning(&e.to_string());
                Self::with_rules(RuleSet::empty(), reporter)
            }
        }
    }

    /// Activate, failing on an invalid configuration.
    pub fn activate_strict(extra: &Value, reporter: Arc<dyn Reporter>) -> Result<Self> {
        let rules = RuleSet::from_extra(extra)?;
        Ok(Self::with_rules(rules, reporter))
    }

    fn with_rules(rules: RuleSet, reporter: Arc<dyn Reporter>) -> Self {
        let active = !rules.is_empty();
        debug!("Activated with {} monolith configs", rules.len());

        Self {
            filter: PackageFilter::new(rules, reporter),
            active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn rules(&self) -> &RuleSet {
        self.filter.rules()
    }

    pub fn subscribed_events(&self) -> Vec<HostEvent> {
        if self.active {
            vec![HostEvent::PrePoolCreate]
        } else {
            Vec::new()
        }
    }

    /// Nothing to tear down.
    pub fn deactivate(&mut self) {}

    /// Stop handling events for the rest of the process.
    pub fn uninstall(&mut self) {
        self.active = false;
    }

    /// Replace the event's packages with the restricted pool.
    pub fn on_pre_pool_create(
        &self,
        root: &RootPackage,
        event: &mut PrePoolCreateEvent,
        env: &dyn Environment,
    ) -> Result<()> {
        if !self.active {
            return Ok(());
        }

        let packages = std::mem::take(&mut event.packages);
        event.set_packages(self.filter.enforce_constraints(root, packages, env)?);

        Ok(())
    }
}
