//! DOM Transform Engine
//!
//! Runs ordered [`OperationSet`]s over an HTML tree. Operations execute in
//! set order and, within an operation, once per argument in list order.
//!
//! Input may be markup or an already-parsed [`Document`]; the output mirrors
//! the input type, so stages can hand a tree to each other without
//! re-serializing in between:
//!
//! ```rust
//! use rs_ebook_clean::transform::{run_operations, OperationKind, OperationSet};
//!
//! let set = OperationSet::new()
//!     .with(OperationKind::RemoveElement, ["script"])?
//!     .with(OperationKind::ConvertToDiv, ["section"])?;
//!
//! let html: String = run_operations("<section>Hi<script>x()</script></section>", &set);
//! assert_eq!(html, "<div>Hi</div>");
//! # Ok::<(), rs_ebook_clean::Error>(())
//! ```

pub mod direction;
pub mod handlers;
mod operation;

pub use operation::{Argument, Operation, OperationKind, OperationSet};

use crate::dom::{self, Document};

/// Something the engine can transform. The associated output mirrors the
/// input: markup in, markup out; tree in, tree out.
pub trait Markup {
    /// Result of running a set over this input.
    type Output;

    /// Run `set` over this input.
    fn transform(self, set: &OperationSet) -> Self::Output;
}

impl Markup for &str {
    type Output = String;

    /// Whole pages come back as whole pages; fragments as body contents.
    fn transform(self, set: &OperationSet) -> String {
        let doc = dom::parse(self);
        set.apply(&doc);
        dom::serialize(&doc, dom::is_full_document(self))
    }
}

impl Markup for String {
    type Output = String;

    fn transform(self, set: &OperationSet) -> String {
        self.as_str().transform(set)
    }
}

impl Markup for &String {
    type Output = String;

    fn transform(self, set: &OperationSet) -> String {
        self.as_str().transform(set)
    }
}

impl<'d> Markup for &'d Document {
    type Output = &'d Document;

    fn transform(self, set: &OperationSet) -> &'d Document {
        set.apply(self);
        self
    }
}

/// Run an operation set over markup or a parsed tree.
pub fn run_operations<M: Markup>(input: M, set: &OperationSet) -> M::Output {
    input.transform(set)
}
