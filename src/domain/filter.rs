//! Constraint enforcement over a package pool.
//!
//! Once the pool is built every requirement is already resolved, so changing
//! the constraint of a matched package means adding new requirements. For
//! each rule that matched at least one package a metapackage named after the
//! rule is added to the pool. It requires every matched package with the
//! rule's constraint, and the root package requires the metapackage.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::constraint::{Constraint, VersionParser};
use super::environment::Environment;
use super::error::{MonolithError, Result};
use super::package::{CompletePackage, Dist, Link, Package, Requirements, RootPackage};
use super::reporter::Reporter;
use super::rules::{GroupRule, RuleSet};

/// Prefix of the environment variables overriding a rule's constraint.
pub const ENV_PREFIX: &str = "COMPOSER_MONOLITH_";

/// Version of every generated metapackage.
pub const AGGREGATE_VERSION: &str = "dev-main";

pub const AGGREGATE_TYPE: &str = "metapackage";

/// Empty artifact the generated metapackages are "installed" from.
pub const PLACEHOLDER_DIST_URL: &str =
    concat!("file://", env!("CARGO_MANIFEST_DIR"), "/assets/dummy-package");

/// Environment variable that overrides the constraint of `rule_name`.
///
/// `symfony-bundles` becomes `COMPOSER_MONOLITH_SYMFONY_BUNDLES`.
pub fn env_var_name(rule_name: &str) -> String {
    format!("{}{}", ENV_PREFIX, rule_name.to_uppercase().replace('-', "_"))
}

/// Restricts matched packages to the constraint of their monolith rule.
pub struct PackageFilter {
    rules: RuleSet,
    reporter: Arc<dyn Reporter>,
    parser: VersionParser,
}

/// State of a single `enforce_constraints` call.
struct Pass<'r> {
    rules: Vec<&'r GroupRule>,
    effective: Vec<Option<Constraint>>,
    links: Vec<Requirements>,
    winners: HashMap<String, usize>,
    assigned: Vec<(String, usize)>,
    reported_conflicts: Vec<(usize, String)>,
}

impl PackageFilter {
    pub fn new(rules: RuleSet, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            rules,
            reporter,
            parser: VersionParser::new(),
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Restrict `packages` according to the configured rules.
    ///
    /// Returns the pool unchanged when nothing matched. Otherwise the root
    /// package inside the pool receives one requirement per activated rule and
    /// the generated metapackages are appended to the pool.
    ///
    /// # Errors
    ///
    /// Fails when an environment override is not a valid constraint, or when
    /// packages matched but `root` is not part of the pool.
    pub fn enforce_constraints(
        &self,
        root: &RootPackage,
        mut packages: Vec<Package>,
        env: &dyn Environment,
    ) -> Result<Vec<Package>> {
        if self.rules.is_empty() {
            return Ok(packages);
        }

        debug!(
            "Checking {} packages against {} monolith configs",
            packages.len(),
            self.rules.len()
        );

        let mut pass = Pass::new(&self.rules);
        let mut root_index = None;

        for (index, package) in packages.iter().enumerate() {
            let name = package.resolved_name();

            if name == root.name {
                root_index = Some(index);
                continue;
            }

            for rule_index in 0..pass.rules.len() {
                self.match_package(&mut pass, rule_index, name, env)?;
            }
        }

        for (name, rule_index) in &pass.assigned {
            self.reporter.info(&format!(
                "Restricting package \"{}\" to \"{}\" by monolith config \"{}\"",
                name,
                pass.constraint(*rule_index).pretty(),
                pass.rules[*rule_index].name()
            ));
        }

        if pass.assigned.is_empty() {
            return Ok(packages);
        }

        let root_index =
            root_index.ok_or_else(|| MonolithError::RootPackageMissing(root.name.clone()))?;

        let mut aggregates = Vec::new();
        let mut added_requires = Requirements::new();

        for rule_index in pass.activation_order() {
            let rule = pass.rules[rule_index];

            aggregates.push(Package::Complete(CompletePackage {
                name: rule.name().to_string(),
                version: AGGREGATE_VERSION.to_string(),
                package_type: AGGREGATE_TYPE.to_string(),
                requires: pass.links[rule_index].clone(),
                dist: Some(Dist {
                    kind: "path".to_string(),
                    url: PLACEHOLDER_DIST_URL.to_string(),
                    reference: AGGREGATE_VERSION.to_string(),
                }),
            }));

            added_requires.insert(Link::new(
                root.name.clone(),
                rule.name(),
                Constraint::branch_pin(AGGREGATE_VERSION),
            ));
        }

        debug!(
            "Adding {} monolith metapackages to \"{}\"",
            aggregates.len(),
            root.name
        );

        packages[root_index].set_requires(root.requires.merged(&added_requires));
        packages.extend(aggregates);

        Ok(packages)
    }

    fn match_package(
        &self,
        pass: &mut Pass<'_>,
        rule_index: usize,
        name: &str,
        env: &dyn Environment,
    ) -> Result<()> {
        let rule = pass.rules[rule_index];

        if !rule.applies_to(name) {
            return Ok(());
        }

        if let Some(&winner) = pass.winners.get(name) {
            // Keep checking the remaining rules, only to report conflicts.
            if winner != rule_index && pass.first_conflict(rule_index, name) {
                self.reporter.warning(&format!(
                    "Monolith config \"{}\" conflicts with \"{}\" for package \"{}\" (ignored).",
                    rule.name(),
                    pass.rules[winner].name(),
                    name
                ));
            }
            return Ok(());
        }

        if pass.effective[rule_index].is_none() {
            pass.effective[rule_index] = Some(self.effective_constraint(rule, env)?);
        }

        let link = Link::new(rule.name(), name, pass.constraint(rule_index).clone());
        pass.links[rule_index].insert(link);
        pass.winners.insert(name.to_string(), rule_index);
        pass.assigned.push((name.to_string(), rule_index));

        Ok(())
    }

    /// The rule's constraint, or the one set through its environment variable.
    fn effective_constraint(&self, rule: &GroupRule, env: &dyn Environment) -> Result<Constraint> {
        let var = env_var_name(rule.name());

        let Some(value) = env.var(&var) else {
            return Ok(rule.constraint().clone());
        };
        let value = value
            .into_string()
            .map_err(|raw| MonolithError::EnvConstraint {
                rule: rule.name().to_string(),
                message: format!(
                    "{} is not valid UTF-8 (\"{}\")",
                    var,
                    raw.to_string_lossy()
                ),
            })?;

        let constraint =
            self.parser
                .parse_constraints(&value)
                .map_err(|e| MonolithError::EnvConstraint {
                    rule: rule.name().to_string(),
                    message: e.to_string(),
                })?;

        debug!("{} is set, overriding \"{}\"", var, rule.constraint_text());
        self.reporter.info(&format!(
            "Monolith config \"{}\" overwritten by ENV configuration to \"{}\".",
            rule.name(),
            constraint.pretty()
        ));

        Ok(constraint)
    }
}

impl<'r> Pass<'r> {
    fn new(rules: &'r RuleSet) -> Self {
        let rules: Vec<&GroupRule> = rules.iter().collect();
        let count = rules.len();

        Self {
            rules,
            effective: vec![None; count],
            links: vec![Requirements::new(); count],
            winners: HashMap::new(),
            assigned: Vec::new(),
            reported_conflicts: Vec::new(),
        }
    }

    /// Effective constraint of a rule that already matched a package.
    fn constraint(&self, rule_index: usize) -> &Constraint {
        self.effective[rule_index]
            .as_ref()
            .unwrap_or_else(|| self.rules[rule_index].constraint())
    }

    /// Records the conflict; false when it was reported before.
    fn first_conflict(&mut self, rule_index: usize, name: &str) -> bool {
        let seen = self
            .reported_conflicts
            .iter()
            .any(|(index, package)| *index == rule_index && package == name);
        if !seen {
            self.reported_conflicts.push((rule_index, name.to_string()));
        }
        !seen
    }

    /// Rules with at least one package, in the order they first matched.
    fn activation_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = Vec::new();
        for (_, rule_index) in &self.assigned {
            if !order.contains(rule_index) {
                order.push(*rule_index);
            }
        }
        order
    }
}
