//! Version constraint parsing.
//!
//! Accepts the constraint syntax found in package manifests and checks every
//! comparator against `semver`:
//!
//! - `^2.0`, `~1.4`, `>=1.0 <2.0`, `>=1.0,<2.0` (all comparators must match)
//! - `^1.0 || ^2.0` (any alternative may match, `|` works too)
//! - `1.0 - 2.0` (inclusive hyphen range)
//! - `!=2.0`, `<>2.0` (negation)
//! - `2.0`, `2.0-beta1`, `2.0.*` (bare versions and wildcards)
//! - `dev-main`, `== dev-main`, `2.x-dev`, `1.0.x-dev` (branches)
//!
//! Picking versions is left to the resolver, so a parsed constraint only
//! keeps the text it was written as.

use std::fmt;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use semver::VersionReq;
use serde::{Serialize, Serializer};

use super::error::ConstraintError;

static ALTERNATIVE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\|\|?\s*").expect("valid separator regex"));

static HYPHEN_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+)\s+-\s+(\S+)$").expect("valid hyphen range regex"));

static BRANCH_ALIAS: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"^v?\d+(\.\d+)*\.[x*]-dev$")
        .case_insensitive(true)
        .build()
        .expect("valid branch alias regex")
});

static STABILITY_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(
        r"^(\d+(?:\.\d+){0,2})[._-]?(stable|beta|b|alpha|a|rc|patch|pl|p|dev)(?:[._-]?(\d+))?$",
    )
    .case_insensitive(true)
    .build()
    .expect("valid stability regex")
});

const OPERATOR_CHARS: [char; 6] = ['<', '>', '=', '!', '^', '~'];

/// A validated version constraint, kept in its written form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pretty: String,
}

impl Constraint {
    /// Exact pin on a development branch, e.g. `== dev-main`.
    pub fn branch_pin(branch: &str) -> Self {
        Self {
            pretty: format!("== {}", branch),
        }
    }

    /// Constraint text taken over as is, without validation.
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            pretty: text.into(),
        }
    }

    /// The constraint as it was written.
    pub fn pretty(&self) -> &str {
        &self.pretty
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty)
    }
}

impl Serialize for Constraint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.pretty)
    }
}

/// Parser for version constraint strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionParser;

impl VersionParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a constraint string.
    ///
    /// # Errors
    ///
    /// Returns error if any alternative or comparator is not understood.
    pub fn parse_constraints(&self, text: &str) -> Result<Constraint, ConstraintError> {
        let fail = |reason: String| ConstraintError {
            constraint: text.to_string(),
            reason,
        };

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(fail("Empty constraint".to_string()));
        }

        for part in ALTERNATIVE_SEPARATOR.split(trimmed) {
            if part.is_empty() {
                return Err(fail("Empty alternative".to_string()));
            }
            check_alternative(part).map_err(fail)?;
        }

        Ok(Constraint {
            pretty: text.to_string(),
        })
    }
}

fn check_alternative(part: &str) -> Result<(), String> {
    let unprefixed = part.trim_start_matches('=').trim_start();
    if let Some(branch) = unprefixed.strip_prefix("dev-") {
        if branch.is_empty() || branch.contains(char::is_whitespace) {
            return Err(format!("Invalid branch name \"{}\"", unprefixed));
        }
        return Ok(());
    }
    if BRANCH_ALIAS.is_match(unprefixed) {
        return Ok(());
    }

    let comparators = match HYPHEN_RANGE.captures(part) {
        Some(range) => vec![
            format!(">={}", normalize_version(&range[1])),
            format!("<={}", normalize_version(&range[2])),
        ],
        None => split_comparators(part)?,
    };

    VersionReq::parse(&comparators.join(", "))
        .map(|_| ())
        .map_err(|e| format!("Invalid version string \"{}\": {}", part, e))
}

/// Split an alternative into comparators, normalised for `semver`.
fn split_comparators(part: &str) -> Result<Vec<String>, String> {
    let mut comparators = Vec::new();
    let mut pending_op: Option<&str> = None;

    for token in part.split(|c: char| c == ',' || c.is_whitespace()) {
        if token.is_empty() {
            continue;
        }

        if token.chars().all(|c| OPERATOR_CHARS.contains(&c)) {
            if pending_op.is_some() {
                return Err(format!("Dangling operator in \"{}\"", part));
            }
            pending_op = Some(token);
            continue;
        }

        let comparator = match pending_op.take() {
            Some(op) => format!("{}{}", op, token),
            None => token.to_string(),
        };
        comparators.push(normalize_comparator(&comparator));
    }

    if pending_op.is_some() {
        return Err(format!("Dangling operator in \"{}\"", part));
    }

    Ok(comparators)
}

fn normalize_comparator(comparator: &str) -> String {
    // Stability flags (`@dev`, `@stable`) carry no range information.
    let comparator = comparator.split('@').next().unwrap_or(comparator);

    let op_len = comparator
        .find(|c: char| !OPERATOR_CHARS.contains(&c))
        .unwrap_or(comparator.len());
    let (op, version) = comparator.split_at(op_len);
    let version = normalize_version(version);

    match op {
        "" if is_wildcard(&version) => version,
        // `!=` and `<>` exclude one exact version.
        "" | "==" | "!=" | "<>" => format!("={}", version),
        _ => format!("{}{}", op, version),
    }
}

/// Strip the `v` prefix and spell stability suffixes the way `semver` expects.
///
/// `2.0-beta1` becomes `2.0.0-beta1`, `2.0RC` becomes `2.0.0-rc`.
fn normalize_version(version: &str) -> String {
    let version = version
        .strip_prefix('v')
        .or_else(|| version.strip_prefix('V'))
        .unwrap_or(version);

    let Some(caps) = STABILITY_SUFFIX.captures(version) else {
        return version.to_string();
    };

    let mut core: Vec<&str> = caps[1].split('.').collect();
    core.resize(3, "0");
    let core = core.join(".");

    let stability = caps[2].to_lowercase();
    if stability == "stable" {
        return core;
    }

    let number = caps.get(3).map_or("", |n| n.as_str());
    format!("{}-{}{}", core, stability, number)
}

fn is_wildcard(version: &str) -> bool {
    version
        .split('.')
        .any(|part| matches!(part, "*" | "x" | "X"))
}
