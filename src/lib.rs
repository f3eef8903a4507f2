//! # rs-ebook-clean
//!
//! Turns arbitrary web pages into clean, self-contained fragments for
//! embedding in an ebook.
//!
//! A page is cleaned by a rule-driven DOM transform engine, its article is
//! isolated by a readability extractor, its images are downloaded and
//! rewritten to local paths, and the result is checked against the input
//! for signs of over-aggressive extraction.
//!
//! ## Quick Start
//!
//! ```rust
//! use rs_ebook_clean::extract;
//!
//! let html = r#"<html><head><title>My Article</title></head>
//! <body><nav>Menu</nav><article><p>Main content here.</p></article></body></html>"#;
//!
//! let article = extract(html, Some("https://example.com/post"));
//! println!("Title: {:?}", article.title);
//! println!("Content: {}", article.content);
//! ```
//!
//! ## Rule sets
//!
//! Cleaning operations are data. An [`OperationSet`] is an ordered map from
//! operation name to selector or pattern arguments:
//!
//! ```rust
//! use rs_ebook_clean::{run_operations, OperationSet};
//!
//! let set = OperationSet::from_json(r#"{"removeElement": ["script"], "convertToDiv": ["section"]}"#)?;
//! assert_eq!(run_operations("<section>Hello World</section>", &set), "<div>Hello World</div>");
//! # Ok::<(), rs_ebook_clean::Error>(())
//! ```
//!
//! ## Features
//!
//! - **Transform engine**: sixteen structural operations, dispatched by a
//!   closed enum and validated when a rule set is loaded
//! - **Site rules**: per-host rule sets selected by URL pattern
//! - **Image localization**: bounded, size-capped concurrent downloads
//! - **Results validation**: advisory length and paragraph-count checks

mod error;
mod extract;
mod options;
mod patterns;
mod result;

/// DOM helpers over `dom_query`.
pub mod dom;

/// Named, data-driven tree operations and the engine that runs them.
pub mod transform;

/// Built-in generic rule sets and site rule lookup.
pub mod rules;

/// Size-capped streaming downloads.
pub mod download;

/// Image localization for content fragments.
pub mod images;

/// Before/after extraction checks.
pub mod validate;

/// Multi-section book pipeline.
pub mod pipeline;

/// Pipeline event reporting.
pub mod observer;

/// URL utilities for host lookup and image resolution.
pub mod url_utils;

/// Character encoding detection and transcoding.
pub mod encoding;

// Public API - re-exports
pub use error::{Error, Result};
pub use extract::{
    default_readability, document_title, extract, extraction_error, Extraction, Extractor, Readability, WholeBody,
};
#[cfg(feature = "readability")]
pub use extract::DomSmoothie;
pub use options::Options;
pub use result::{Article, Section};
pub use rules::SiteRules;
pub use transform::{run_operations, Argument, Operation, OperationKind, OperationSet};
