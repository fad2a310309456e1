//! Phase two: linearize rewritten text into paragraphs and tidy it.
//!
//! Each pass is a function `&str -> String` applied in sequence.

use std::sync::LazyLock;

use regex::Regex;

use crate::tree::PARA_MARK;

/// Arrow separating the steps of a derivation.
const ARROW: char = '→';

/// Run the full linearization pipeline on joined fragment text.
pub(crate) fn run_pipeline(text: &str) -> String {
    let mut result = collapse_spaces(text);

    result = paragraphs(&result);
    result = collapse_blank_lines(&result);
    result = drop_empty_emphasis(&result);
    result = collapse_blank_lines(&result);
    result = fix_punctuation_spacing(&result);

    result.trim().to_string()
}

// ---------------------------------------------------------------------------
// Pass 1: Collapse horizontal whitespace
// ---------------------------------------------------------------------------

fn collapse_spaces(text: &str) -> String {
    static SPACES_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[ \t]+").expect("valid regex"));

    SPACES_RE.replace_all(text, " ").to_string()
}

// ---------------------------------------------------------------------------
// Pass 2: Split on sentinels, format derivations, rejoin
// ---------------------------------------------------------------------------

// Blank lines inside a segment also separate blocks, so a block quote that
// ends up mid-segment is still recognized on a second run.

fn paragraphs(text: &str) -> String {
    text.split(PARA_MARK)
        .flat_map(|segment| segment.split("\n\n"))
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(format_derivation)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Put each step of an arrow-delimited derivation on its own paragraph.
///
/// Block quotes already hold a derivation box verbatim and are left alone.
fn format_derivation(para: &str) -> String {
    if !para.contains(ARROW) || para.starts_with('>') {
        return para.to_string();
    }

    para.split(ARROW)
        .enumerate()
        .filter_map(|(i, step)| {
            let step = step.trim();
            match (step.is_empty(), i) {
                (true, _) => None,
                (false, 0) => Some(step.to_string()),
                (false, _) => Some(format!("{ARROW} {step}")),
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

// ---------------------------------------------------------------------------
// Pass 3: Collapse runs of blank lines
// ---------------------------------------------------------------------------

/// Collapse three or more newlines into exactly two.
fn collapse_blank_lines(text: &str) -> String {
    static MULTI_NL_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

    MULTI_NL_RE.replace_all(text, "\n\n").to_string()
}

// ---------------------------------------------------------------------------
// Pass 4: Remove emphasis markers wrapping nothing
// ---------------------------------------------------------------------------

/// Remove `** **` pairs that stand alone.
///
/// The pair must start a line or follow whitespace, so the gap between two
/// adjacent bold runs (`**a** **b**`) is not mistaken for an empty pair.
fn drop_empty_emphasis(text: &str) -> String {
    static EMPTY_BOLD_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(^|\s)\*\*[ \t]*\*\*").expect("valid regex"));

    EMPTY_BOLD_RE.replace_all(text, "$1").to_string()
}

// ---------------------------------------------------------------------------
// Pass 5: Punctuation spacing
// ---------------------------------------------------------------------------

/// Remove whitespace before danda, double danda and Latin clause punctuation.
fn fix_punctuation_spacing(text: &str) -> String {
    static PUNCT_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\s+([।॥,;:.])").expect("valid regex"));

    PUNCT_RE.replace_all(text, "$1").to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
