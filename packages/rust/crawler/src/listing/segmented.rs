//! Listings whose entry URLs encode a three-level number (`/book/A/P/S`).

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::trace;

use grantha_markdown::element_text;
use grantha_shared::{EntrySummary, SITE_ORIGIN};

use crate::extract::{Rule, first_success, sel, select_text};

static NUMBER: LazyLock<Selector> = LazyLock::new(|| sel(".badge, .font-weight-bold"));
static ENTRY_TEXT: LazyLock<Selector> = LazyLock::new(|| sel(".sutra-text"));
static ITEM_TITLE: LazyLock<Selector> = LazyLock::new(|| sel(".list-item-title"));
static PLAIN_DIV: LazyLock<Selector> =
    LazyLock::new(|| sel("div:not(.badge):not(.float-right)"));
static CITATION: LazyLock<Selector> =
    LazyLock::new(|| sel(".float-right, .text-right, .text-dark"));

/// Text a citation must contain to be kept.
const CITATION_MARKER: &str = "कौमुदी";

/// Metadata key the citation is stored under.
pub const CITATION_KEY: &str = "kaumudi";

/// Prefix of listing lines that annotate the entry above them.
const NOTE_BULLET: char = '•';

pub(super) fn extract(doc: &Html, path_prefix: &str) -> Vec<EntrySummary> {
    let anchors = sel(&format!(
        "a.d-block[href^='{path_prefix}'], a[href^='{path_prefix}'].href"
    ));

    doc.select(&anchors)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            let Some(segments) = entry_segments(href) else {
                trace!(href, "not an entry link");
                return None;
            };
            Some(summarize(anchor, href, segments))
        })
        .collect()
}

/// The three numeric segments of `/book/A/P/S`, or `None` for any other shape.
pub(crate) fn entry_segments(href: &str) -> Option<[u32; 3]> {
    let parts: Vec<&str> = href.trim_matches('/').split('/').collect();
    let [_, a, p, s] = parts.as_slice() else {
        return None;
    };
    Some([a.parse().ok()?, p.parse().ok()?, s.parse().ok()?])
}

fn summarize(anchor: ElementRef<'_>, href: &str, [a, p, s]: [u32; 3]) -> EntrySummary {
    let number = select_text(anchor, &NUMBER).unwrap_or_else(|| format!("{a}.{p}.{s}"));

    let citation = anchor
        .select(&CITATION)
        .map(|el| element_text(&el))
        .find(|text| text.contains(CITATION_MARKER));

    let from_entry_text: Rule<'_, String> = &|| select_text(anchor, &ENTRY_TEXT);
    let from_item_title: Rule<'_, String> = &|| select_text(anchor, &ITEM_TITLE);
    let from_plain_div: Rule<'_, String> = &|| select_text(anchor, &PLAIN_DIV);
    let from_residue: Rule<'_, String> =
        &|| Some(residual_title(anchor, &number, citation.as_deref()));

    let title = first_success(&[from_entry_text, from_item_title, from_plain_div, from_residue])
        .unwrap_or_default();

    EntrySummary {
        number,
        title,
        url: format!("{SITE_ORIGIN}{href}"),
        notes: bullet_notes(anchor),
        metadata: citation
            .map(|c| vec![(CITATION_KEY.to_string(), c)])
            .unwrap_or_default(),
    }
}

/// Whole anchor text minus the number and the citation.
fn residual_title(anchor: ElementRef<'_>, number: &str, citation: Option<&str>) -> String {
    let mut text = element_text(&anchor);
    if !number.is_empty() {
        text = text.replacen(number, "", 1);
    }
    if let Some(citation) = citation {
        text = text.replacen(citation, "", 1);
    }
    text.trim().to_string()
}

/// Bulleted siblings after the anchor, up to the next anchor.
fn bullet_notes(anchor: ElementRef<'_>) -> Vec<String> {
    anchor
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .take_while(|el| el.value().name() != "a")
        .map(|el| element_text(&el))
        .filter(|text| text.starts_with(NOTE_BULLET))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::fixture;

    fn entries() -> Vec<EntrySummary> {
        extract(&Html::parse_document(&fixture("listing_sutraani.html")), "/sutraani/")
    }

    #[test]
    fn accepts_only_four_segment_numeric_paths() {
        assert_eq!(entry_segments("/sutraani/1/1/1"), Some([1, 1, 1]));
        assert_eq!(entry_segments("/sutraani/8/4/68/"), Some([8, 4, 68]));
        assert_eq!(entry_segments("/sutraani/z"), None);
        assert_eq!(entry_segments("/sutraani/skn"), None);
        assert_eq!(entry_segments("/sutraani/1/1/x"), None);
        assert_eq!(entry_segments("/sutraani/1/1/4/5"), None);
        assert_eq!(entry_segments("/sutraani/1/1"), None);
    }

    #[test]
    fn fixture_yields_valid_entries_in_order() {
        let urls: Vec<String> = entries().into_iter().map(|e| e.url).collect();
        assert_eq!(
            urls,
            vec![
                "https://ashtadhyayi.com/sutraani/1/1/1",
                "https://ashtadhyayi.com/sutraani/1/1/2",
                "https://ashtadhyayi.com/sutraani/1/1/3",
                "https://ashtadhyayi.com/sutraani/8/4/68",
            ]
        );
    }

    #[test]
    fn reads_number_title_citation_and_notes() {
        let first = &entries()[0];
        assert_eq!(first.number, "१.१.१");
        assert_eq!(first.title, "वृद्धिरादैच्");
        assert_eq!(
            first.metadata,
            vec![("kaumudi".to_string(), "कौमुदी - १८".to_string())]
        );
        assert_eq!(first.notes, vec!["• संज्ञासूत्रम्", "• वृद्धिसंज्ञा"]);
    }

    #[test]
    fn citation_without_marker_is_dropped() {
        let second = &entries()[1];
        assert_eq!(second.title, "अदेङ्गुणः");
        assert!(second.metadata.is_empty());
    }

    #[test]
    fn notes_stop_at_the_next_anchor() {
        let all = entries();
        assert_eq!(all[0].notes, vec!["• संज्ञासूत्रम्", "• वृद्धिसंज्ञा"]);
        assert_eq!(all[1].notes, vec!["• गुणसंज्ञा"]);
        assert!(all[2].notes.is_empty());
    }

    #[test]
    fn title_falls_back_to_residual_text() {
        let third = &entries()[2];
        assert_eq!(third.number, "१.१.३");
        assert_eq!(third.title, "इको गुणवृद्धी");
        assert_eq!(third.metadata[0].1, "कौमुदी - ३२");
    }

    #[test]
    fn number_is_synthesized_from_path() {
        let last = &entries()[3];
        assert_eq!(last.number, "8.4.68");
        assert_eq!(last.title, "अ अ");
    }
}
