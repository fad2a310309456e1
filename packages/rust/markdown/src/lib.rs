//! Markup-to-structured-text conversion for commentary regions.
//!
//! Block-level markup (derivation boxes, headings, separators, spaced
//! divisions) becomes paragraph breaks, inline markup (bold, italic, links,
//! line breaks) stays inside its paragraph. The conversion runs in two
//! phases:
//! 1. [`tree::rewrite`]: copy the fragment into an owned tree and replace
//!    recognized elements with Markdown text around paragraph sentinels
//! 2. `cleanup`: join the text, split on sentinels, format derivation
//!    chains and tidy whitespace and punctuation

mod cleanup;
pub mod tree;

use scraper::ElementRef;
use tracing::{debug, instrument};

pub use tree::{Fragment, Node, rewrite};

/// Convert an HTML fragment (typically an element's inner HTML) to
/// structured Markdown-flavoured text.
///
/// Output contains no markup, so feeding it back in returns it unchanged.
#[instrument(level = "debug", skip_all, fields(html_len = html.len()))]
pub fn to_structured_text(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let rewritten = rewrite(&Fragment::parse(html));
    let text = cleanup::run_pipeline(&rewritten.joined_text());

    debug!(text_len = text.len(), "structured text ready");
    text
}

/// Whitespace-normalized text content of an element.
///
/// Runs of whitespace (including newlines from source indentation) become a
/// single space; the ends are trimmed.
pub fn element_text(el: &ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
