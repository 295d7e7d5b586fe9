//! Package name patterns.
//!
//! A pattern is `vendor/name` where the name part may hold either a single
//! `*` wildcard or a single `{a, b, c}` expansion, never both:
//!
//! - `rollerworks/search-*` matches `rollerworks/search-doctrine-orm`
//! - `lifthill/{common, core-bundle}` matches `lifthill/common` and
//!   `lifthill/core-bundle`
//!
//! Whitespace is only allowed around the items of an expansion.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use super::error::PatternError;

static VENDOR_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"^[a-z0-9]([_.-]?[a-z0-9]+)*$")
        .case_insensitive(true)
        .build()
        .expect("valid vendor regex")
});

static NAME_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"^([a-z0-9.-]*\*?[a-z0-9.-]*|[a-z0-9.-]*\{[^{}]*\}[a-z0-9.-]*)$")
        .case_insensitive(true)
        .build()
        .expect("valid name regex")
});

/// Regex fragment a `*` expands to.
const WILDCARD_CLASS: &str = "[a-z0-9-.]+";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Wildcard,
    Expand(Vec<String>),
}

/// A validated package name pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagePattern {
    source: String,
    vendor: String,
    segments: Vec<Segment>,
}

impl PackagePattern {
    /// Validate a raw pattern.
    ///
    /// # Errors
    ///
    /// Returns the first grammar violation found.
    pub fn parse(source: &str) -> Result<Self, PatternError> {
        let (vendor, name) = source
            .split_once('/')
            .filter(|(vendor, _)| VENDOR_FORMAT.is_match(vendor))
            .ok_or(PatternError::InvalidVendor)?;

        if source.contains('*') && source.contains('{') {
            return Err(PatternError::WildcardAndExpand);
        }

        if source.contains('{') {
            if !source.contains('}') {
                return Err(PatternError::UnclosedExpand);
            }
            if source.matches('{').count() > 1 {
                return Err(PatternError::MultipleExpands);
            }
        }

        if source.matches('*').count() > 1 {
            return Err(PatternError::MultipleWildcards);
        }

        if !NAME_FORMAT.is_match(name) {
            return Err(PatternError::InvalidName);
        }

        if name.is_empty() {
            return Err(PatternError::EmptyName);
        }

        Ok(Self {
            source: source.to_string(),
            vendor: vendor.to_string(),
            segments: parse_segments(name)?,
        })
    }

    /// The pattern as configured.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Regex fragment for this pattern, wrapped in a group.
    fn regex_fragment(&self) -> String {
        let mut fragment = format!("({}/", escape_literal(&self.vendor));
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => fragment.push_str(&escape_literal(text)),
                Segment::Wildcard => fragment.push_str(WILDCARD_CLASS),
                Segment::Expand(items) => {
                    let items: Vec<String> = items.iter().map(|i| escape_literal(i)).collect();
                    fragment.push('(');
                    fragment.push_str(&items.join("|"));
                    fragment.push(')');
                }
            }
        }
        fragment.push(')');
        fragment
    }
}

fn parse_segments(name: &str) -> Result<Vec<Segment>, PatternError> {
    let mut segments = Vec::new();

    if let Some((before, after)) = name.split_once('*') {
        push_literal(&mut segments, before);
        segments.push(Segment::Wildcard);
        push_literal(&mut segments, after);
    } else if let Some((before, rest)) = name.split_once('{') {
        let (inner, after) = rest.split_once('}').ok_or(PatternError::UnclosedExpand)?;
        push_literal(&mut segments, before);
        segments.push(Segment::Expand(parse_expand_items(inner)?));
        push_literal(&mut segments, after);
    } else {
        push_literal(&mut segments, name);
    }

    Ok(segments)
}

fn push_literal(segments: &mut Vec<Segment>, text: &str) {
    if !text.is_empty() {
        segments.push(Segment::Literal(text.to_string()));
    }
}

/// Split `a, b ,c` into trimmed items; a single trailing comma is allowed.
fn parse_expand_items(inner: &str) -> Result<Vec<String>, PatternError> {
    let mut items: Vec<&str> = inner.split(',').map(|i| i.trim_matches([' ', '\t'])).collect();
    if items.len() > 1 && items.last() == Some(&"") {
        items.pop();
    }

    let valid = |item: &&str| {
        !item.is_empty()
            && item
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
    };

    if !items.iter().all(valid) {
        return Err(PatternError::InvalidName);
    }

    Ok(items.into_iter().map(str::to_string).collect())
}

fn escape_literal(text: &str) -> String {
    text.replace('.', r"\.")
}

/// Compiled, case-insensitive matcher over full package names.
#[derive(Debug, Clone)]
pub struct PackageMatcher {
    regex: Regex,
}

impl PackageMatcher {
    /// Combine patterns into one anchored alternation.
    ///
    /// # Errors
    ///
    /// Returns error if the generated expression is rejected by the regex engine.
    pub fn compile(patterns: &[PackagePattern]) -> Result<Self, regex::Error> {
        let fragments: Vec<String> = patterns.iter().map(PackagePattern::regex_fragment).collect();
        let source = format!("^({})$", fragments.join("|"));

        let regex = RegexBuilder::new(&source).case_insensitive(true).build()?;
        Ok(Self { regex })
    }

    pub fn is_match(&self, package_name: &str) -> bool {
        self.regex.is_match(package_name)
    }

    /// The generated expression.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl PartialEq for PackageMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for PackageMatcher {}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(patterns: &[&str]) -> PackageMatcher {
        let parsed: Vec<PackagePattern> = patterns
            .iter()
            .map(|p| PackagePattern::parse(p).unwrap())
            .collect();
        PackageMatcher::compile(&parsed).unwrap()
    }

    #[test]
    fn test_wildcard_suffix() {
        let m = matcher(&["rollerworks/search-*"]);
        assert_eq!(m.as_str(), "^((rollerworks/search-[a-z0-9-.]+))$");

        assert!(m.is_match("rollerworks/search-doctrine-dbal"));
        assert!(m.is_match("Rollerworks/Search-Elasticsearch"));
        assert!(m.is_match("rollerworks/search-core.v2"));
        assert!(!m.is_match("rollerworks/search"));
        assert!(!m.is_match("rollerworks/search-"));
        assert!(!m.is_match("other/rollerworks/search-core"));
    }

    #[test]
    fn test_wildcard_prefix() {
        let m = matcher(&["vendor/*-bundle"]);
        assert_eq!(m.as_str(), "^((vendor/[a-z0-9-.]+-bundle))$");
        assert!(m.is_match("vendor/framework-bundle"));
        assert!(!m.is_match("vendor/framework-bridge"));
    }

    #[test]
    fn test_wildcard_in_the_middle() {
        let m = matcher(&["acme/he-*-now"]);
        assert!(m.is_match("acme/he-there-now"));
        assert!(!m.is_match("acme/he-there"));
    }

    #[test]
    fn test_expand_trims_whitespace() {
        let m = matcher(&["lifthill/{common, core-bundle }"]);
        assert_eq!(m.as_str(), "^((lifthill/(common|core-bundle)))$");
        assert!(m.is_match("lifthill/common"));
        assert!(m.is_match("lifthill/core-bundle"));
        assert!(!m.is_match("lifthill/core"));
    }

    #[test]
    fn test_expand_with_surrounding_literals_and_trailing_comma() {
        let m = matcher(&["vendor/{a, b,}"]);
        assert_eq!(m.as_str(), "^((vendor/(a|b)))$");

        let m = matcher(&["acme/search-{core,orm}-bundle"]);
        assert!(m.is_match("acme/search-orm-bundle"));
        assert!(!m.is_match("acme/search-dbal-bundle"));
    }

    #[test]
    fn test_multiple_patterns_are_combined() {
        let m = matcher(&["symfony/*-bundle", "symfony/*-bridge"]);
        assert_eq!(
            m.as_str(),
            "^((symfony/[a-z0-9-.]+-bundle)|(symfony/[a-z0-9-.]+-bridge))$"
        );
        assert!(m.is_match("symfony/twig-bridge"));
        assert!(m.is_match("symfony/twig-bundle"));
        assert!(!m.is_match("symfony/twig"));
    }

    #[test]
    fn test_dots_are_literal() {
        let m = matcher(&["acme/lib.core"]);
        assert!(m.is_match("acme/lib.core"));
        assert!(!m.is_match("acme/libxcore"));
    }

    #[test]
    fn test_pattern_errors() {
        let cases = [
            ("*/search", PatternError::InvalidVendor),
            ("search", PatternError::InvalidVendor),
            ("rollersearch/", PatternError::EmptyName),
            ("rollersearch/he-*-{you,now}", PatternError::WildcardAndExpand),
            ("rollersearch/{you, now}-{how}", PatternError::MultipleExpands),
            ("rollersearch/he-*-*", PatternError::MultipleWildcards),
            ("rollersearch/he-{now", PatternError::UnclosedExpand),
            ("rollersearch/he now", PatternError::InvalidName),
            ("rollersearch/he-}now", PatternError::InvalidName),
            ("rollersearch/{}", PatternError::InvalidName),
            ("rollersearch/{a,,b}", PatternError::InvalidName),
            ("rollersearch/ *", PatternError::InvalidName),
        ];

        for (pattern, expected) in cases {
            assert_eq!(
                PackagePattern::parse(pattern).unwrap_err(),
                expected,
                "pattern: {}",
                pattern
            );
        }
    }

    #[test]
    fn test_source_is_kept() {
        let pattern = PackagePattern::parse("acme/{a, b}").unwrap();
        assert_eq!(pattern.source(), "acme/{a, b}");
    }
}
