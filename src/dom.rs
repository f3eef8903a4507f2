//! DOM Operations Adapter
//!
//! Small helpers over the `dom_query` crate shared by the transform
//! operations, the extractor and the image localizer: parsing, tag names,
//! body serialization, HTML escaping and inline `style` editing.

use std::sync::LazyLock;

use regex::Regex;

// Re-export core types for external use
pub use dom_query::{Document, NodeId, NodeRef, Selection};

// Re-export StrTendril for external use
pub use tendril::StrTendril;

/// Matches markup that carries its own document skeleton.
#[allow(clippy::expect_used)]
static DOCUMENT_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(?:!doctype|html|head|body)[\s>]").expect("valid regex"));

// === Parsing and serialization ===

/// Parse HTML string into document
///
/// Fragments are placed inside a synthesized `<body>`.
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

/// Whether `html` is a whole page rather than a content fragment.
#[must_use]
pub fn is_full_document(html: &str) -> bool {
    DOCUMENT_MARKER.is_match(html)
}

/// Serialize the contents of the document body.
#[must_use]
pub fn body_html(doc: &Document) -> String {
    doc.select("body").inner_html().to_string()
}

/// Serialize a document the way it was given: whole pages keep their
/// skeleton, fragments come back as body contents only.
#[must_use]
pub fn serialize(doc: &Document, full_document: bool) -> String {
    if full_document {
        doc.html().to_string()
    } else {
        body_html(doc)
    }
}

// === Node information ===

/// Get tag name (lowercase)
#[must_use]
pub fn tag_name(sel: &Selection) -> Option<String> {
    sel.nodes()
        .first()
        .and_then(NodeRef::node_name)
        .map(|t| t.to_ascii_lowercase())
}

/// Matched elements that are not nested inside another matched element,
/// in document order.
#[must_use]
pub fn top_level<'a>(sel: &Selection<'a>) -> Vec<NodeRef<'a>> {
    let nodes = sel.nodes();
    let ids: Vec<NodeId> = nodes.iter().map(|n| n.id).collect();

    nodes
        .iter()
        .filter(|node| !node.ancestors(None).into_iter().any(|anc| ids.contains(&anc.id)))
        .copied()
        .collect()
}

/// Whether the selection's first node has exactly one child and that child
/// is a text node.
#[must_use]
pub fn sole_text_child(sel: &Selection) -> Option<StrTendril> {
    let node = sel.nodes().first()?;
    let children: Vec<NodeRef> = node.children().into_iter().collect();
    match children.as_slice() {
        [only] if only.is_text() => Some(only.text()),
        _ => None,
    }
}

// === Text helpers ===

/// Escape text for inclusion as HTML character data.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape text the way the serializer writes text nodes (quotes untouched).
#[must_use]
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('\u{a0}', "&nbsp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

// === Inline style ===

/// An element's inline `style` attribute as an ordered declaration list.
///
/// Property names are compared case-insensitively and stored lowercase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    declarations: Vec<(String, String)>,
}

impl InlineStyle {
    /// Parse a `style` attribute value. Malformed declarations are skipped.
    #[must_use]
    pub fn parse(style: &str) -> Self {
        let declarations = style
            .split(';')
            .filter_map(|decl| {
                let (name, value) = decl.split_once(':')?;
                let name = name.trim().to_ascii_lowercase();
                let value = value.trim();
                (!name.is_empty() && !value.is_empty()).then(|| (name, value.to_string()))
            })
            .collect();
        Self { declarations }
    }

    /// Read the `style` attribute of a selection.
    #[must_use]
    pub fn of(sel: &Selection) -> Self {
        sel.attr("style").map(|s| Self::parse(&s)).unwrap_or_default()
    }

    /// Value of a property, if declared.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set a property, replacing an earlier declaration in place.
    pub fn set(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        match self.declarations.iter_mut().find(|(n, _)| *n == name) {
            Some(decl) => decl.1 = value.to_string(),
            None => self.declarations.push((name, value.to_string())),
        }
    }

    /// Remove a property. Returns whether it was declared.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.declarations.len();
        self.declarations.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        before != self.declarations.len()
    }

    /// Whether no declarations remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Write back to the selection, dropping the attribute when empty.
    pub fn apply(&self, sel: &Selection) {
        if self.is_empty() {
            sel.remove_attr("style");
        } else {
            sel.set_attr("style", &self.to_string());
        }
    }
}

impl std::fmt::Display for InlineStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (name, value)) in self.declarations.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{name}: {value};")?;
        }
        Ok(())
    }
}
