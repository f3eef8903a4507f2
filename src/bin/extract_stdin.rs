//! Simple CLI that reads HTML from stdin and outputs JSON to stdout.
//!
//! Usage: `extract_stdin [SOURCE_URL] < page.html`
//!
//! Prints `{"title": ..., "content": ..., "valid": ...}`. Set `RUST_LOG`
//! to see pipeline diagnostics on stderr.

use std::io::{self, Read};
use std::process::ExitCode;

use rs_ebook_clean::validate::ResultsValidator;
use rs_ebook_clean::Extractor;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
struct Output {
    title: Option<String>,
    content: String,
    valid: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let url = std::env::args().nth(1);

    let mut html = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut html) {
        eprintln!("Failed to read from stdin: {e}");
        return ExitCode::FAILURE;
    }

    let extraction = Extractor::new().extract_detailed(&html, url.as_deref());
    let valid =
        ResultsValidator::new(url.as_deref(), &extraction.preprocessed, &extraction.article.content).validate();

    let output = Output {
        title: extraction.article.title,
        content: extraction.article.content,
        valid,
    };

    match serde_json::to_string(&output) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to serialize output: {e}");
            ExitCode::FAILURE
        }
    }
}
