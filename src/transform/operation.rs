//! Operation descriptors and ordered operation sets.
//!
//! An operation set is data: an ordered mapping from operation name to a
//! list of arguments. Sets are compiled once when they are built or loaded,
//! so selectors and regex fragments are validated before any document is
//! touched and unknown operation names never reach the engine.

use std::fmt;

use dom_query::{Document, Matcher};
use regex::{Regex, RegexBuilder};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

use super::handlers;
use crate::error::{Error, Result};

/// Every structural operation the engine knows.
///
/// Names serialize in camelCase (`removeElement`, `filterDivs`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    RemoveElement,
    FilterDivs,
    ReplaceWithChildren,
    ReplaceDivsWithChildren,
    InsertMissingParagraphTags,
    ConvertToParagraph,
    FilterParagraphless,
    RemoveHidden,
    RemoveDuplicates,
    MergeNodes,
    SetRootNode,
    AssignDirProperty,
    MaximizeSize,
    RemoveInvalidAttributes,
    ConvertToDiv,
    ReplaceWithInnerText,
}

/// Handler taking a CSS selector.
pub(crate) type SelectorFn = fn(&Document, &str);

/// Handler taking a compiled id/class pattern.
pub(crate) type PatternFn = fn(&Document, &Regex);

/// Statically typed handler bound to an operation kind.
#[derive(Clone, Copy)]
pub(crate) enum Handler {
    Selector(SelectorFn),
    Pattern(PatternFn),
}

impl OperationKind {
    /// The camelCase name used in rule set documents.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::RemoveElement => "removeElement",
            Self::FilterDivs => "filterDivs",
            Self::ReplaceWithChildren => "replaceWithChildren",
            Self::ReplaceDivsWithChildren => "replaceDivsWithChildren",
            Self::InsertMissingParagraphTags => "insertMissingParagraphTags",
            Self::ConvertToParagraph => "convertToParagraph",
            Self::FilterParagraphless => "filterParagraphless",
            Self::RemoveHidden => "removeHidden",
            Self::RemoveDuplicates => "removeDuplicates",
            Self::MergeNodes => "mergeNodes",
            Self::SetRootNode => "setRootNode",
            Self::AssignDirProperty => "assignDirProperty",
            Self::MaximizeSize => "maximizeSize",
            Self::RemoveInvalidAttributes => "removeInvalidAttributes",
            Self::ConvertToDiv => "convertToDiv",
            Self::ReplaceWithInnerText => "replaceWithInnerText",
        }
    }

    pub(crate) fn handler(self) -> Handler {
        match self {
            Self::RemoveElement => Handler::Selector(handlers::remove_element),
            Self::FilterDivs => Handler::Pattern(handlers::filter_divs),
            Self::ReplaceWithChildren => Handler::Selector(handlers::replace_with_children),
            Self::ReplaceDivsWithChildren => Handler::Pattern(handlers::replace_divs_with_children),
            Self::InsertMissingParagraphTags => {
                Handler::Selector(handlers::insert_missing_paragraph_tags)
            }
            Self::ConvertToParagraph => Handler::Selector(handlers::convert_to_paragraph),
            Self::FilterParagraphless => Handler::Selector(handlers::filter_paragraphless),
            Self::RemoveHidden => Handler::Selector(handlers::remove_hidden),
            Self::RemoveDuplicates => Handler::Selector(handlers::remove_duplicates),
            Self::MergeNodes => Handler::Selector(handlers::merge_nodes),
            Self::SetRootNode => Handler::Selector(handlers::set_root_node),
            Self::AssignDirProperty => Handler::Selector(handlers::assign_dir_property),
            Self::MaximizeSize => Handler::Selector(handlers::maximize_size),
            Self::RemoveInvalidAttributes => Handler::Selector(handlers::remove_invalid_attributes),
            Self::ConvertToDiv => Handler::Selector(handlers::convert_to_div),
            Self::ReplaceWithInnerText => Handler::Selector(handlers::replace_with_inner_text),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One argument of an operation: a single selector/fragment, or a list of
/// them applied as one step.
///
/// Lists are joined with `|` for pattern operations (case-insensitive,
/// unanchored alternation) and with `, ` for selector operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Argument {
    One(String),
    Many(Vec<String>),
}

impl Argument {
    fn joined(&self, separator: &str) -> String {
        match self {
            Self::One(s) => s.clone(),
            Self::Many(parts) => parts.join(separator),
        }
    }
}

impl From<&str> for Argument {
    fn from(s: &str) -> Self {
        Self::One(s.to_string())
    }
}

impl From<String> for Argument {
    fn from(s: String) -> Self {
        Self::One(s)
    }
}

impl From<Vec<String>> for Argument {
    fn from(parts: Vec<String>) -> Self {
        Self::Many(parts)
    }
}

impl From<&[&str]> for Argument {
    fn from(parts: &[&str]) -> Self {
        Self::Many(parts.iter().map(|p| (*p).to_string()).collect())
    }
}

#[derive(Debug, Clone)]
enum Steps {
    Selectors(Vec<String>),
    Patterns(Vec<Regex>),
}

/// A compiled operation: its kind plus validated arguments in list order.
#[derive(Debug, Clone)]
pub struct Operation {
    kind: OperationKind,
    steps: Steps,
}

impl Operation {
    /// Compile an operation, validating every argument.
    pub fn new<I, A>(kind: OperationKind, args: I) -> Result<Self>
    where
        I: IntoIterator<Item = A>,
        A: Into<Argument>,
    {
        let steps = match kind.handler() {
            Handler::Selector(_) => Steps::Selectors(
                args.into_iter()
                    .map(|arg| compile_selector(kind, &arg.into()))
                    .collect::<Result<_>>()?,
            ),
            Handler::Pattern(_) => Steps::Patterns(
                args.into_iter()
                    .map(|arg| compile_pattern(kind, &arg.into()))
                    .collect::<Result<_>>()?,
            ),
        };
        Ok(Self { kind, steps })
    }

    /// The operation's kind.
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Number of argument steps.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.steps {
            Steps::Selectors(s) => s.len(),
            Steps::Patterns(p) => p.len(),
        }
    }

    /// Whether the operation has no arguments (and so does nothing).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every argument step against the tree, in list order.
    pub fn apply(&self, doc: &Document) {
        match (self.kind.handler(), &self.steps) {
            (Handler::Selector(run), Steps::Selectors(selectors)) => {
                for selector in selectors {
                    run(doc, selector);
                }
            }
            (Handler::Pattern(run), Steps::Patterns(patterns)) => {
                for pattern in patterns {
                    run(doc, pattern);
                }
            }
            // `new` pairs steps with the kind's handler
            _ => {}
        }
    }
}

fn compile_selector(kind: OperationKind, arg: &Argument) -> Result<String> {
    let selector = arg.joined(", ");
    if Matcher::new(&selector).is_err() {
        return Err(Error::InvalidSelector {
            operation: kind.name(),
            selector,
        });
    }
    Ok(selector)
}

fn compile_pattern(kind: OperationKind, arg: &Argument) -> Result<Regex> {
    let pattern = arg.joined("|");
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| Error::InvalidPattern {
            operation: kind.name(),
            source,
        })
}

/// Ordered mapping from operation to its arguments.
///
/// Operations run in insertion order; an operation name appears at most
/// once, adding it again appends to its argument list.
#[derive(Debug, Clone, Default)]
pub struct OperationSet {
    operations: Vec<Operation>,
}

impl OperationSet {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation, compiling its arguments.
    pub fn push<I, A>(&mut self, kind: OperationKind, args: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = A>,
        A: Into<Argument>,
    {
        let op = Operation::new(kind, args)?;
        match self.operations.iter_mut().find(|existing| existing.kind == kind) {
            Some(existing) => match (&mut existing.steps, op.steps) {
                (Steps::Selectors(into), Steps::Selectors(more)) => into.extend(more),
                (Steps::Patterns(into), Steps::Patterns(more)) => into.extend(more),
                _ => {}
            },
            None => self.operations.push(op),
        }
        Ok(self)
    }

    /// Builder-style [`push`](Self::push).
    pub fn with<I, A>(mut self, kind: OperationKind, args: I) -> Result<Self>
    where
        I: IntoIterator<Item = A>,
        A: Into<Argument>,
    {
        self.push(kind, args)?;
        Ok(self)
    }

    /// Load a set from a JSON object such as
    /// `{"removeElement": ["script"], "filterDivs": [["ad", "promo"]]}`.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Operations in execution order.
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Number of distinct operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the set contains no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Run every operation against the tree, in order.
    pub fn apply(&self, doc: &Document) {
        for op in &self.operations {
            op.apply(doc);
        }
    }
}

impl<'de> Deserialize<'de> for OperationSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct SetVisitor;

        impl<'de> Visitor<'de> for SetVisitor {
            type Value = OperationSet;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map from operation name to a list of arguments")
            }

            fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> std::result::Result<OperationSet, M::Error> {
                let mut set = OperationSet::new();
                while let Some((kind, args)) = map.next_entry::<OperationKind, Vec<Argument>>()? {
                    set.push(kind, args).map_err(de::Error::custom)?;
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(SetVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_round_trip_through_serde() {
        let kind: OperationKind = serde_json::from_str("\"insertMissingParagraphTags\"").unwrap();
        assert_eq!(kind, OperationKind::InsertMissingParagraphTags);
        assert_eq!(kind.to_string(), "insertMissingParagraphTags");
    }

    #[test]
    fn test_from_json_keeps_key_order() {
        let set = OperationSet::from_json(
            r#"{"mergeNodes": [".a"], "removeElement": ["script", "style"], "filterDivs": [["ad", "promo"]]}"#,
        )
        .unwrap();
        let kinds: Vec<OperationKind> = set.operations().iter().map(Operation::kind).collect();
        assert_eq!(
            kinds,
            vec![
                OperationKind::MergeNodes,
                OperationKind::RemoveElement,
                OperationKind::FilterDivs
            ]
        );
        assert_eq!(set.operations()[1].len(), 2);
        assert_eq!(set.operations()[2].len(), 1);
    }

    #[test]
    fn test_unknown_operation_is_rejected() {
        let err = OperationSet::from_json(r#"{"removeEverything": ["*"]}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidRuleSet(_)));
        assert!(err.to_string().contains("removeEverything"));
    }

    #[test]
    fn test_invalid_selector_is_rejected() {
        let err = Operation::new(OperationKind::RemoveElement, ["div[[["]).unwrap_err();
        assert!(matches!(err, Error::InvalidSelector { operation: "removeElement", .. }));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let err = Operation::new(OperationKind::FilterDivs, ["(unclosed"]).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { operation: "filterDivs", .. }));
    }

    #[test]
    fn test_pattern_list_is_alternation() {
        let op = Operation::new(OperationKind::FilterDivs, [Argument::from(&["ad", "promo"][..])]).unwrap();
        let Steps::Patterns(patterns) = &op.steps else {
            panic!("expected patterns");
        };
        assert!(patterns[0].is_match("sidebar-PROMO"));
        assert!(patterns[0].is_match("header"));
        assert!(!patterns[0].is_match("story"));
    }

    #[test]
    fn test_push_same_kind_appends_arguments() {
        let mut set = OperationSet::new();
        set.push(OperationKind::RemoveElement, ["script"]).unwrap();
        set.push(OperationKind::ConvertToDiv, ["section"]).unwrap();
        set.push(OperationKind::RemoveElement, ["style"]).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.operations()[0].len(), 2);
    }
}
