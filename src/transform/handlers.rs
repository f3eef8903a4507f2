//! Structural operation handlers.
//!
//! Each handler is a pure rewrite of the tree for one selector or pattern.
//! Handlers that replace matched elements with re-parsed markup walk the
//! matches in reverse document order, so nested matches are rewritten
//! before their ancestors serialize them.

use regex::Regex;

use super::direction::{self, Direction};
use crate::dom::{self, Document, InlineStyle, NodeRef, Selection};
use crate::patterns::{DISPLAY_NONE, VISIBILITY_HIDDEN};

/// Minimum trimmed length of a loose text node worth wrapping in `<p>`.
const MIN_LOOSE_TEXT_LEN: usize = 8;

/// Minimum length of an element's sole text child for it to become a paragraph.
const MIN_PARAGRAPH_TEXT_LEN: usize = 50;

/// Elements with fewer paragraphs than this are dropped by `filterParagraphless`.
const MIN_PARAGRAPHS: usize = 3;

/// Images wider than this are stretched to the page width.
const MAX_FIXED_IMAGE_WIDTH: i64 = 110;

/// Attributes stripped by `removeInvalidAttributes`.
pub const INVALID_ATTRIBUTES: &[&str] = &[
    "itemprop",
    "itemscope",
    "itemtype",
    "itemid",
    "property",
    "typeof",
    "vocab",
    "about",
    "datetime",
    "data-reactid",
    "data-react-checksum",
    "data-ga",
    "data-analytics",
    "data-track",
    "data-tracking",
    "data-event",
    "data-vars-ga",
    "onclick",
    "onload",
    "onerror",
    "onmouseover",
    "onmouseout",
    "ping",
];

fn matches<'a>(doc: &'a Document, selector: &str) -> Vec<NodeRef<'a>> {
    doc.select(selector).nodes().to_vec()
}

fn divs_matching<'a>(doc: &'a Document, pattern: &Regex) -> Vec<NodeRef<'a>> {
    doc.select("div")
        .nodes()
        .iter()
        .filter(|node| {
            let div = Selection::from(**node);
            div.attr("id").is_some_and(|id| pattern.is_match(&id))
                || div.attr("class").is_some_and(|class| pattern.is_match(&class))
        })
        .copied()
        .collect()
}

fn unwrap(el: &Selection) {
    let inner = el.inner_html().to_string();
    el.replace_with_html(inner);
}

/// Delete every element matching `selector`.
pub fn remove_element(doc: &Document, selector: &str) {
    doc.select(selector).remove();
}

/// Delete `div`s whose `id` or `class` matches `pattern`.
pub fn filter_divs(doc: &Document, pattern: &Regex) {
    for node in divs_matching(doc, pattern) {
        Selection::from(node).remove();
    }
}

/// Replace each match with its children.
pub fn replace_with_children(doc: &Document, selector: &str) {
    for node in matches(doc, selector).into_iter().rev() {
        unwrap(&Selection::from(node));
    }
}

/// Replace `div`s whose `id` or `class` matches `pattern` with their children.
pub fn replace_divs_with_children(doc: &Document, pattern: &Regex) {
    for node in divs_matching(doc, pattern).into_iter().rev() {
        unwrap(&Selection::from(node));
    }
}

/// Wrap loose text sitting directly inside each match in `<p>`.
///
/// Only direct text-node children are touched; text inside child elements
/// and attribute values is left alone.
pub fn insert_missing_paragraph_tags(doc: &Document, selector: &str) {
    for node in matches(doc, selector) {
        let loose: Vec<NodeRef> = node
            .children()
            .into_iter()
            .filter(|child| child.is_text() && child.text().trim().chars().count() >= MIN_LOOSE_TEXT_LEN)
            .collect();

        for text in loose {
            let wrapped = format!("<p>{}</p>", dom::escape_text(&text.text()));
            text.replace_with_html(wrapped);
        }
    }
}

/// Wrap a match in `<p>` when its only child is a long text node.
pub fn convert_to_paragraph(doc: &Document, selector: &str) {
    for node in matches(doc, selector).into_iter().rev() {
        let el = Selection::from(node);
        let long_text = dom::sole_text_child(&el)
            .is_some_and(|text| text.chars().count() >= MIN_PARAGRAPH_TEXT_LEN);
        if long_text {
            let outer = el.html().to_string();
            el.replace_with_html(format!("<p>{outer}</p>"));
        }
    }
}

/// Delete matches containing fewer than three `<p>` descendants.
pub fn filter_paragraphless(doc: &Document, selector: &str) {
    for node in matches(doc, selector) {
        let el = Selection::from(node);
        if el.select("p").length() < MIN_PARAGRAPHS {
            el.remove();
        }
    }
}

/// Delete matches hidden by their inline style.
pub fn remove_hidden(doc: &Document, selector: &str) {
    for node in matches(doc, selector) {
        let el = Selection::from(node);
        let hidden = el
            .attr("style")
            .is_some_and(|style| DISPLAY_NONE.is_match(&style) || VISIBILITY_HIDDEN.is_match(&style));
        if hidden {
            el.remove();
        }
    }
}

/// Keep the first top-level match; delete later top-level matches whose
/// inner HTML does not occur inside the first one's.
pub fn remove_duplicates(doc: &Document, selector: &str) {
    let top = dom::top_level(&doc.select(selector));
    let Some((first, rest)) = top.split_first() else {
        return;
    };

    let first_html = Selection::from(*first).inner_html().to_string();
    for node in rest {
        let el = Selection::from(*node);
        let inner = el.inner_html();
        if !first_html.contains(&*inner) {
            el.remove();
        }
    }
}

/// Fold every later match's children into the first match.
///
/// Matches nested inside another match travel with their ancestor's
/// content and are not merged a second time.
pub fn merge_nodes(doc: &Document, selector: &str) {
    let found = dom::top_level(&doc.select(selector));
    let Some((first, rest)) = found.split_first() else {
        return;
    };

    let target = Selection::from(*first);
    for node in rest {
        let el = Selection::from(*node);
        let children = el.inner_html().to_string();
        target.append_html(children);
        el.remove();
    }
}

/// Replace the body's contents with the first match's inner HTML.
pub fn set_root_node(doc: &Document, selector: &str) {
    let Some(root) = doc.select(selector).nodes().first().map(|n| Selection::from(*n)) else {
        return;
    };
    let inner = root.inner_html().to_string();
    doc.select("body").set_html(inner);
}

/// Mark matches whose text is not left-to-right with `dir="rtl"`.
pub fn assign_dir_property(doc: &Document, selector: &str) {
    for node in matches(doc, selector) {
        let el = Selection::from(node);
        if direction::detect(&el.text()) != Direction::Ltr {
            el.set_attr("dir", "rtl");
        }
    }
}

/// Stretch images to the page width unless they carry a small fixed width.
pub fn maximize_size(doc: &Document, selector: &str) {
    for node in matches(doc, selector) {
        let img = Selection::from(node);
        let width = img.attr("width").map(|w| w.trim().to_string());
        let numeric = width.as_deref().and_then(leading_integer);
        let percent = width.as_deref().is_some_and(|w| w.ends_with('%'));

        if percent || numeric.is_some_and(|w| w > MAX_FIXED_IMAGE_WIDTH) {
            img.remove_attr("width");
            img.remove_attr("height");
            stretch(&img);
        } else if numeric.is_none() {
            stretch(&img);
        }
    }
}

/// Strip tracking and microdata attributes from matches.
pub fn remove_invalid_attributes(doc: &Document, selector: &str) {
    let found = doc.select(selector);
    for attr in INVALID_ATTRIBUTES {
        found.remove_attr(attr);
    }
}

/// Replace each match with a `<div>` holding its inner HTML.
pub fn convert_to_div(doc: &Document, selector: &str) {
    for node in matches(doc, selector).into_iter().rev() {
        let el = Selection::from(node);
        let inner = el.inner_html().to_string();
        el.replace_with_html(format!("<div>{inner}</div>"));
    }
}

/// Replace each match's contents with its plain text.
pub fn replace_with_inner_text(doc: &Document, selector: &str) {
    for node in matches(doc, selector).into_iter().rev() {
        let el = Selection::from(node);
        let text = el.text().to_string();
        el.set_html(dom::escape_html(&text));
    }
}

// === Image sizing helpers ===

/// Force full-width, aspect-preserving sizing through the inline style.
pub fn stretch(img: &Selection) {
    let mut style = InlineStyle::of(img);
    style.set("height", "auto");
    style.set("width", "100%");
    style.apply(img);
}

/// Whether `stretch` (or the page itself) sized the image to full width.
#[must_use]
pub fn is_stretched(img: &Selection) -> bool {
    InlineStyle::of(img).get("width") == Some("100%")
}

/// Drop explicit widths so the image renders at its intrinsic size.
pub fn unstretch(img: &Selection) {
    let mut style = InlineStyle::of(img);
    style.remove("width");
    style.apply(img);
    img.remove_attr("width");
}

/// Leading decimal integer of an attribute value (`"300px"` → 300).
fn leading_integer(value: &str) -> Option<i64> {
    let digits: String = value.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}
