//! Monolith group rules and their validation.
//!
//! Rules are read from the `monolith-versions` key of a manifest's `extra`
//! section:
//!
//! ```json
//! {
//!     "rollersearch": { "package": "rollerworks/search-*", "constraint": "^2.0" },
//!     "symfony": {
//!         "package": ["symfony/*-bundle", "symfony/*-bridge"],
//!         "constraint": "^6.4",
//!         "exclude": ["symfony/translation-contracts"]
//!     }
//! }
//! ```
//!
//! Validation never stops at the first problem: every entry is checked and all
//! messages are returned together.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};

use super::constraint::{Constraint, VersionParser};
use super::error::{MonolithError, Result};
use super::pattern::{PackageMatcher, PackagePattern};

/// Key holding the rules inside `extra`.
pub const CONFIG_KEY: &str = "monolith-versions";

/// Name used for the configuration root in messages.
pub const CONFIG_ROOT: &str = "extra.monolith-versions";

/// Rule names double as environment variable suffixes, hence the strict format.
const RULE_NAME_FORMAT_SOURCE: &str = "^[a-z]((-{1,2})?[a-z0-9]+)*$";

static RULE_NAME_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(RULE_NAME_FORMAT_SOURCE).expect("valid rule name regex"));

static PACKAGE_NAME_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"^[a-z0-9]([_.-]?[a-z0-9]+)*/[a-z0-9](([_.]|-{1,2})?[a-z0-9]+)*$")
        .case_insensitive(true)
        .build()
        .expect("valid package name regex")
});

/// One named monolith group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRule {
    name: String,
    patterns: Vec<PackagePattern>,
    matcher: PackageMatcher,
    constraint: Constraint,
    exclude: Vec<String>,
}

impl GroupRule {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn patterns(&self) -> &[PackagePattern] {
        &self.patterns
    }

    pub fn matcher(&self) -> &PackageMatcher {
        &self.matcher
    }

    /// The configured constraint.
    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    pub fn constraint_text(&self) -> &str {
        self.constraint.pretty()
    }

    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    pub fn is_excluded(&self, package_name: &str) -> bool {
        self.exclude.iter().any(|e| e == package_name)
    }

    /// Whether the pattern covers the package and it is not excluded.
    pub fn applies_to(&self, package_name: &str) -> bool {
        !self.is_excluded(package_name) && self.matcher.is_match(package_name)
    }
}

/// Validated rules in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<GroupRule>,
}

impl RuleSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read rules from a manifest `extra` section.
    ///
    /// A missing or `null` `monolith-versions` key yields an empty set.
    pub fn from_extra(extra: &Value) -> Result<Self> {
        match extra.get(CONFIG_KEY) {
            None | Some(Value::Null) => Ok(Self::empty()),
            Some(options) => Self::parse(options),
        }
    }

    /// Validate the value stored under `monolith-versions`.
    ///
    /// # Errors
    ///
    /// Returns [`MonolithError::Configuration`] holding every problem found,
    /// or [`MonolithError::InvalidOptions`] if the value is not a mapping.
    pub fn parse(options: &Value) -> Result<Self> {
        let entries = match options {
            Value::Object(entries) => entries,
            Value::Array(items) if items.is_empty() => return Ok(Self::empty()),
            _ => {
                return Err(MonolithError::InvalidOptions(format!(
                    "The \"{}\" option must be an object.",
                    CONFIG_ROOT
                )))
            }
        };

        let mut validator = Validator {
            parser: VersionParser::new(),
            errors: Vec::new(),
        };

        let rules: Vec<GroupRule> = entries
            .iter()
            .filter_map(|(name, config)| validator.validate_entry(name, config))
            .collect();

        if !validator.errors.is_empty() {
            return Err(MonolithError::Configuration {
                root: CONFIG_ROOT.to_string(),
                errors: validator.errors,
            });
        }

        Ok(Self { rules })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GroupRule> {
        self.rules.iter()
    }

    pub fn get(&self, name: &str) -> Option<&GroupRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a GroupRule;
    type IntoIter = std::slice::Iter<'a, GroupRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

struct Validator {
    parser: VersionParser,
    errors: Vec<String>,
}

impl Validator {
    fn validate_entry(&mut self, name: &str, config: &Value) -> Option<GroupRule> {
        if !RULE_NAME_FORMAT.is_match(name) {
            self.errors.push(format!(
                "\"{}\" is not a valid config name, must match \"{}\" (lowercase only).",
                name, RULE_NAME_FORMAT_SOURCE
            ));
            return None;
        }

        let Value::Object(config) = config else {
            self.errors.push(format!(
                "config \"{}\" must be an object with keys: \"require\" and \"package\".",
                name
            ));
            return None;
        };

        let (Some(constraint), Some(package)) = (present(config, "constraint"), present(config, "package"))
        else {
            self.errors
                .push(format!("\"{}\" must contain \"constraint\" and \"package\".", name));
            return None;
        };

        let Value::String(constraint) = constraint else {
            self.errors
                .push(format!("\"{}\": \"constraint\" must be a string.", name));
            return None;
        };

        if !matches!(package, Value::String(_) | Value::Array(_)) {
            self.errors.push(format!(
                "\"{}\": \"package\" must be a string or array of strings.",
                name
            ));
            return None;
        }

        let constraint = match self.parser.parse_constraints(constraint) {
            Ok(constraint) => constraint,
            Err(e) => {
                self.errors
                    .push(format!("\"{}\" constraint is not valid. Message: {}.", name, e));
                return None;
            }
        };

        let exclude = self.validate_exclude(name, present(config, "exclude"));
        let patterns = self.validate_patterns(name, package)?;

        match PackageMatcher::compile(&patterns) {
            Ok(matcher) => Some(GroupRule {
                name: name.to_string(),
                patterns,
                matcher,
                constraint,
                exclude,
            }),
            Err(e) => {
                self.errors.push(format!(
                    "\"{}\": package patterns could not be compiled: {}.",
                    name, e
                ));
                None
            }
        }
    }

    fn validate_exclude(&mut self, name: &str, exclude: Option<&Value>) -> Vec<String> {
        let items = match exclude {
            None => return Vec::new(),
            Some(Value::Array(items)) => items,
            Some(_) => {
                self.errors.push(format!(
                    "\"{}\": exclude-packages (when set) must contain an array of packages.",
                    name
                ));
                return Vec::new();
            }
        };

        let mut exclude = Vec::new();
        for item in items {
            match item {
                Value::String(package) if PACKAGE_NAME_FORMAT.is_match(package) => {
                    exclude.push(package.clone());
                }
                Value::String(package) => self.errors.push(format!(
                    "\"{}\": exclude-package \"{}\" is not valid, must be a valid package name in the format \"vendor/package\".",
                    name, package
                )),
                other => self.errors.push(format!(
                    "\"{}\": exclude-package only allows strings, \"{}\" given.",
                    name,
                    type_name(other)
                )),
            }
        }
        exclude
    }

    fn validate_patterns(&mut self, name: &str, package: &Value) -> Option<Vec<PackagePattern>> {
        let items: Vec<&Value> = match package {
            Value::Array(items) => items.iter().collect(),
            single => vec![single],
        };

        if items.is_empty() {
            self.errors.push(format!(
                "\"{}\": \"package\" must contain at least one package pattern.",
                name
            ));
            return None;
        }

        let mut patterns = Vec::new();
        let mut valid = true;

        for item in items {
            let Value::String(source) = item else {
                self.errors.push(format!(
                    "\"{}\": package array only allows strings, \"{}\" given.",
                    name,
                    type_name(item)
                ));
                valid = false;
                continue;
            };

            match PackagePattern::parse(source) {
                Ok(pattern) => patterns.push(pattern),
                Err(e) => {
                    self.errors.push(format!(
                        "\"{}\": package \"{}\" is not valid{}",
                        name, source, e
                    ));
                    valid = false;
                }
            }
        }

        valid.then_some(patterns)
    }
}

/// A key counts as present only when it holds a non-null value.
fn present<'v>(config: &'v Map<String, Value>, key: &str) -> Option<&'v Value> {
    config.get(key).filter(|v| !v.is_null())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
