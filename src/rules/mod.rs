//! Built-in rule sets and site-specific rule lookup.
//!
//! The generic pre- and post-extraction sets ship as JSON documents next to
//! this module and are compiled on first use. Site rules map a host regex
//! to an operation set.

use std::fmt;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::transform::OperationSet;
use crate::url_utils;

const GENERIC_PRE_JSON: &str = include_str!("generic_pre.json");
const GENERIC_POST_JSON: &str = include_str!("generic_post.json");
const SITES_JSON: &str = include_str!("sites.json");

#[allow(clippy::expect_used)]
static GENERIC_PRE: LazyLock<OperationSet> = LazyLock::new(|| {
    OperationSet::from_json(GENERIC_PRE_JSON).expect("generic_pre.json is a valid rule set")
});

#[allow(clippy::expect_used)]
static GENERIC_POST: LazyLock<OperationSet> = LazyLock::new(|| {
    OperationSet::from_json(GENERIC_POST_JSON).expect("generic_post.json is a valid rule set")
});

#[allow(clippy::expect_used)]
static BUILTIN_SITES: LazyLock<SiteRules> =
    LazyLock::new(|| SiteRules::from_json(SITES_JSON).expect("sites.json is valid site rules"));

/// Boilerplate stripping applied to every page before readability runs.
///
/// Removes scripts, forms, navigation and ad containers, filters noisy
/// `div`s by id/class keyword, promotes long spans to paragraphs, drops
/// hidden elements and teaser articles, and repairs split article bodies.
#[must_use]
pub fn generic_pre_rules() -> &'static OperationSet {
    &GENERIC_PRE
}

/// Ebook-safe cleanup applied to the extracted content.
///
/// Stretches large images, drops `<meta>`, unwraps semantic containers,
/// turns `section`/`center`/`aside` into `div`, flattens `code` to text,
/// marks right-to-left paragraphs and strips microdata/tracking attributes.
#[must_use]
pub fn generic_post_rules() -> &'static OperationSet {
    &GENERIC_POST
}

/// Host-pattern → operation set table.
///
/// Patterns are unanchored, case-insensitive regexes tested against the
/// source URL's host. When several patterns match, the one added last wins.
#[derive(Debug, Clone, Default)]
pub struct SiteRules {
    rules: Vec<(Regex, OperationSet)>,
}

impl SiteRules {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules shipped with the crate.
    #[must_use]
    pub fn builtin() -> Self {
        BUILTIN_SITES.clone()
    }

    /// Add a host pattern and its operations.
    pub fn push(&mut self, host_pattern: &str, set: OperationSet) -> Result<&mut Self> {
        let pattern = RegexBuilder::new(host_pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| Error::InvalidPattern {
                operation: "siteRules",
                source,
            })?;
        self.rules.push((pattern, set));
        Ok(self)
    }

    /// Load a table from a JSON object mapping host regex to operation set.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Merge another table after this one, so its patterns take precedence.
    pub fn extend(&mut self, other: SiteRules) {
        self.rules.extend(other.rules);
    }

    /// Number of host patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The operation set for `url`'s host.
    ///
    /// Every pattern is tested and the last match is kept.
    #[must_use]
    pub fn lookup(&self, url: &str) -> Option<&OperationSet> {
        let host = url_utils::host(url)?;
        let mut found = None;
        for (pattern, set) in &self.rules {
            if pattern.is_match(&host) {
                found = Some(set);
            }
        }
        found
    }
}

impl<'de> Deserialize<'de> for SiteRules {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct RulesVisitor;

        impl<'de> Visitor<'de> for RulesVisitor {
            type Value = SiteRules;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map from host pattern to an operation set")
            }

            fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> std::result::Result<SiteRules, M::Error> {
                let mut rules = SiteRules::new();
                while let Some((pattern, set)) = map.next_entry::<String, OperationSet>()? {
                    rules.push(&pattern, set).map_err(de::Error::custom)?;
                }
                Ok(rules)
            }
        }

        deserializer.deserialize_map(RulesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{OperationKind, run_operations};

    #[test]
    fn test_builtin_rule_sets_load() {
        assert!(!generic_pre_rules().is_empty());
        assert!(!generic_post_rules().is_empty());
        assert!(!SiteRules::builtin().is_empty());
    }

    #[test]
    fn test_lookup_matches_host_only() {
        let rules = SiteRules::builtin();
        assert!(rules.lookup("https://en.wikipedia.org/wiki/Rust").is_some());
        assert!(rules.lookup("https://example.com/?ref=wikipedia.org").is_none());
        assert!(rules.lookup("not a url").is_none());
    }

    #[test]
    fn test_lookup_last_match_wins() {
        let mut rules = SiteRules::new();
        let first = OperationSet::new().with(OperationKind::RemoveElement, ["h1"]).unwrap();
        let second = OperationSet::new().with(OperationKind::RemoveElement, ["h2"]).unwrap();
        rules.push("example", first).unwrap();
        rules.push(r"example\.com$", second).unwrap();

        let set = rules.lookup("http://www.example.com/a").unwrap();
        assert_eq!(run_operations("<h1>a</h1><h2>b</h2>", set), "<h1>a</h1>");

        let set = rules.lookup("http://example.org/a").unwrap();
        assert_eq!(run_operations("<h1>a</h1><h2>b</h2>", set), "<h2>b</h2>");
    }

    #[test]
    fn test_site_rules_json_rejects_bad_pattern() {
        let err = SiteRules::from_json(r#"{"(": {"removeElement": ["p"]}}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidRuleSet(_)));
    }

    #[test]
    fn test_generic_post_rules_make_content_ebook_safe() {
        let html = r#"<article><section><p itemprop="text">Body</p><img src="a.png"><code><b>x</b></code></section><meta name="x"></article>"#;
        let out = run_operations(html, generic_post_rules());
        assert_eq!(
            out,
            r#"<div><p>Body</p><img src="a.png" style="height: auto; width: 100%;"><code>x</code></div>"#
        );
    }
}
