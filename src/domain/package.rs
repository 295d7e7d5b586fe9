//! Package model of the dependency pool.
//!
//! Only the parts of a package the constraint filter works with are modelled:
//! its name, what it aliases, and its declared requirements.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::constraint::Constraint;

/// A `require` edge from one package to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub source: String,
    pub target: String,
    pub constraint: Constraint,
}

impl Link {
    pub fn new(source: impl Into<String>, target: impl Into<String>, constraint: Constraint) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            constraint,
        }
    }
}

/// Requirements keyed by target package name, in declaration order.
///
/// Inserting a link for a target that is already present replaces it in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirements {
    links: Vec<Link>,
}

impl Requirements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, link: Link) {
        match self.links.iter_mut().find(|l| l.target == link.target) {
            Some(existing) => *existing = link,
            None => self.links.push(link),
        }
    }

    /// Copy of `self` with `other` merged on top.
    pub fn merged(&self, other: &Requirements) -> Requirements {
        let mut merged = self.clone();
        for link in other.iter() {
            merged.insert(link.clone());
        }
        merged
    }

    pub fn iter(&self) -> impl Iterator<Item = &Link> {
        self.links.iter()
    }

    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.links.iter().map(|l| l.target.as_str())
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl FromIterator<Link> for Requirements {
    fn from_iter<I: IntoIterator<Item = Link>>(iter: I) -> Self {
        let mut requirements = Requirements::new();
        for link in iter {
            requirements.insert(link);
        }
        requirements
    }
}

impl Serialize for Requirements {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.links.len()))?;
        for link in &self.links {
            map.serialize_entry(&link.target, &link.constraint)?;
        }
        map.end()
    }
}

/// Where an installable unit is fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dist {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub reference: String,
}

/// A regular package with a concrete version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletePackage {
    pub name: String,
    pub version: String,
    #[serde(rename = "type")]
    pub package_type: String,
    #[serde(rename = "require")]
    pub requires: Requirements,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dist: Option<Dist>,
}

impl CompletePackage {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            package_type: "library".to_string(),
            requires: Requirements::new(),
            dist: None,
        }
    }
}

/// A package version that stands in for another package (e.g. a branch alias).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasPackage {
    pub name: String,
    pub version: String,
    pub alias_of: Box<Package>,
}

/// The project being resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RootPackage {
    pub name: String,
    pub version: String,
    #[serde(rename = "require")]
    pub requires: Requirements,
}

impl RootPackage {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            requires: Requirements::new(),
        }
    }
}

/// Any package that can appear in the dependency pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Package {
    Complete(CompletePackage),
    Alias(AliasPackage),
    Root(RootPackage),
}

impl Package {
    pub fn name(&self) -> &str {
        match self {
            Package::Complete(p) => &p.name,
            Package::Alias(p) => &p.name,
            Package::Root(p) => &p.name,
        }
    }

    pub fn version(&self) -> &str {
        match self {
            Package::Complete(p) => &p.version,
            Package::Alias(p) => &p.version,
            Package::Root(p) => &p.version,
        }
    }

    /// The aliased package, if this is an alias.
    pub fn alias_of(&self) -> Option<&Package> {
        match self {
            Package::Alias(p) => Some(&p.alias_of),
            _ => None,
        }
    }

    /// Name of the package this one ultimately resolves to.
    pub fn resolved_name(&self) -> &str {
        match self.alias_of() {
            Some(aliased) => aliased.resolved_name(),
            None => self.name(),
        }
    }

    pub fn requires(&self) -> &Requirements {
        match self {
            Package::Complete(p) => &p.requires,
            Package::Alias(p) => p.alias_of.requires(),
            Package::Root(p) => &p.requires,
        }
    }

    pub fn set_requires(&mut self, requires: Requirements) {
        match self {
            Package::Complete(p) => p.requires = requires,
            Package::Alias(p) => p.alias_of.set_requires(requires),
            Package::Root(p) => p.requires = requires,
        }
    }
}

impl From<CompletePackage> for Package {
    fn from(package: CompletePackage) -> Self {
        Package::Complete(package)
    }
}

impl From<RootPackage> for Package {
    fn from(package: RootPackage) -> Self {
        Package::Root(package)
    }
}
