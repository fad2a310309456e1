//! Detail-page extraction: title, primary explanation and named commentaries.

use std::sync::LazyLock;
use std::time::Duration;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

use grantha_markdown::{element_text, to_structured_text};
use grantha_shared::{DetailPage, Sections};

use crate::driver::{BrowserDriver, CONTENT_MARKER, load_page};
use crate::extract::{Rule, first_success, sel, select_text};

/// Section holding the summary rows (the entry's particulars).
pub const SUMMARY_SECTION: &str = "सूत्र-विवरण (Summary)";

/// Unlabelled summary rows at least this long are layout noise.
const MAX_PLAIN_ROW_CHARS: usize = 200;

static TITLE_FONT: LazyLock<Selector> = LazyLock::new(|| sel(".title-font"));
static LIST_TITLE: LazyLock<Selector> = LazyLock::new(|| sel(".list-group-title"));

static SUMMARY_REGION: LazyLock<Selector> = LazyLock::new(|| sel("#sutra-summary-region"));
static SUMMARY_ROWS: LazyLock<Selector> = LazyLock::new(|| sel(".list-group-item, .row"));
static ROW_LABEL: LazyLock<Selector> =
    LazyLock::new(|| sel(".col-3, .col-4, .text-muted, label"));
static ROW_VALUE: LazyLock<Selector> = LazyLock::new(|| sel(".col-9, .col-8"));

static SHORT_MEANING: LazyLock<Selector> =
    LazyLock::new(|| sel(".bigtext-font, .sutra-meaning-short"));
static PRIMARY: LazyLock<Selector> =
    LazyLock::new(|| sel("#sutra-commentary-sutrartha-region .sutra-commentary"));
static EMPHASIS_TEXT: LazyLock<Selector> =
    LazyLock::new(|| sel(".bigtext-font, .font-weight-bold"));

static COMMENTARY_REGIONS: LazyLock<Selector> =
    LazyLock::new(|| sel("[id^='sutra-commentary-'][id$='-region']"));
static REGION_HEADING: LazyLock<Selector> = LazyLock::new(|| sel(".list-item-title-color"));
static REGION_BODY: LazyLock<Selector> = LazyLock::new(|| sel(".sutra-commentary"));

/// Id fragment of the region consumed as the primary explanation.
const PRIMARY_REGION_ID: &str = "sutrartha";

/// Load `url` and extract it. `None` if the page could not be loaded.
#[instrument(skip(driver), fields(engine = driver.name()))]
pub async fn fetch_detail(
    driver: &mut dyn BrowserDriver,
    url: &str,
    settle: Duration,
    timeout: Duration,
) -> Option<DetailPage> {
    let html = load_page(driver, url, settle, CONTENT_MARKER, timeout).await?;
    Some(extract_detail(&html))
}

/// Extract a rendered detail page.
///
/// Never fails: a page with none of the known regions yields empty content
/// and no sections.
pub fn extract_detail(html: &str) -> DetailPage {
    let doc = Html::parse_document(html);
    let root = doc.root_element();

    let title_font: Rule<'_, String> = &|| select_text(root, &TITLE_FONT);
    let list_title: Rule<'_, String> = &|| select_text(root, &LIST_TITLE);
    let heading = first_success(&[title_font, list_title]).unwrap_or_default();
    let (number, title) = split_heading(&heading);

    let mut sections = Sections::new();
    if let Some(summary) = summary_rows(root) {
        sections.insert(SUMMARY_SECTION, summary);
    }

    let short_meaning = select_text(root, &SHORT_MEANING).map(|t| format!("**{t}**"));
    let explanation = root
        .select(&PRIMARY)
        .next()
        .map(|el| to_structured_text(&el.inner_html()))
        .filter(|t| !t.is_empty());

    let combined: Rule<'_, String> = &|| match (&short_meaning, &explanation) {
        (Some(short), Some(main)) => Some(format!("{short}\n\n{main}")),
        (Some(short), None) => Some(short.clone()),
        (None, Some(main)) => Some(main.clone()),
        (None, None) => None,
    };
    let plain_emphasis: Rule<'_, String> = &|| select_text(root, &EMPHASIS_TEXT);
    let content = first_success(&[combined, plain_emphasis]).unwrap_or_default();

    for (name, text) in commentary_sections(root) {
        sections.insert(name, text);
    }

    debug!(%number, sections = sections.len(), "detail extracted");

    DetailPage {
        number,
        title,
        content,
        sections,
    }
}

/// Split a heading like `१.१.१ वृद्धिरादैच्` at its first space.
///
/// A heading with no space is used as both number and title.
pub fn split_heading(heading: &str) -> (String, String) {
    match heading.split_once(' ') {
        Some((number, title)) => (number.trim().to_string(), title.trim().to_string()),
        None => (heading.trim().to_string(), heading.to_string()),
    }
}

/// Summary rows joined by blank lines, or `None` if there are none.
fn summary_rows(root: ElementRef<'_>) -> Option<String> {
    let region = root.select(&SUMMARY_REGION).next()?;

    let rows: Vec<String> = region
        .select(&SUMMARY_ROWS)
        .filter_map(summary_row)
        .collect();

    (!rows.is_empty()).then(|| rows.join("\n\n"))
}

fn summary_row(row: ElementRef<'_>) -> Option<String> {
    let label = row.select(&ROW_LABEL).next();
    let value = row.select(&ROW_VALUE).next();

    match (label, value) {
        (Some(label), Some(value)) => {
            let label = element_text(&label);
            let label = label.trim_end_matches(':').trim_end();
            let value = element_text(&value);
            (!label.is_empty() && !value.is_empty()).then(|| format!("**{label}:** {value}"))
        }
        _ => {
            let text = element_text(&row);
            (!text.is_empty() && text.chars().count() < MAX_PLAIN_ROW_CHARS).then_some(text)
        }
    }
}

/// Named commentary regions in page order, skipping blank ones.
fn commentary_sections(root: ElementRef<'_>) -> Vec<(String, String)> {
    root.select(&COMMENTARY_REGIONS)
        .filter(|region| {
            !region
                .value()
                .id()
                .is_some_and(|id| id.contains(PRIMARY_REGION_ID))
        })
        .filter_map(|region| {
            let name = select_text(region, &REGION_HEADING)?;
            let body = region.select(&REGION_BODY).next()?;
            let text = to_structured_text(&body.inner_html());
            (!text.trim().is_empty()).then_some((name, text))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testing::PageMapDriver;
    use crate::listing::fixture;

    fn sutra() -> DetailPage {
        extract_detail(&fixture("detail_sutra.html"))
    }

    #[test]
    fn heading_splits_on_first_space() {
        let page = sutra();
        assert_eq!(page.number, "१.१.१");
        assert_eq!(page.title, "वृद्धिरादैच्");

        assert_eq!(
            split_heading("१.१.२ अदेङ् गुणः"),
            ("१.१.२".to_string(), "अदेङ् गुणः".to_string())
        );
        assert_eq!(split_heading("अइउण्"), ("अइउण्".to_string(), "अइउण्".to_string()));
    }

    #[test]
    fn summary_is_first_section() {
        let page = sutra();
        assert_eq!(page.sections.names()[0], SUMMARY_SECTION);
        assert_eq!(
            page.sections.get(SUMMARY_SECTION),
            Some(
                "**पदच्छेदः:** वृद्धिः आत् ऐच्\n\n\
                 **समासः:** आच्च ऐच्च आदैच्, समाहारद्वन्द्वः\n\n\
                 सञ्ज्ञासूत्रम्"
            )
        );
    }

    #[test]
    fn content_is_short_meaning_then_explanation() {
        let page = sutra();
        assert!(
            page.content
                .starts_with("**आकार ऐकार औकार इत्येते वृद्धिसंज्ञकाः भवन्ति ।**\n\nआत् ऐच् च")
        );
        assert!(page.content.contains("> आ + ऐच्"));
        assert!(page.content.contains("उदाहरणम्\n\n→ *भागः*\n\n→ *ऐतिकायनः*"));
    }

    #[test]
    fn commentary_sections_in_page_order_without_blanks() {
        let page = sutra();
        assert_eq!(
            page.sections.names(),
            vec![SUMMARY_SECTION, "काशिका", "लघुसिद्धान्तकौमुदी"]
        );
        assert_eq!(
            page.sections.get("काशिका"),
            Some(
                "वृद्धिशब्दः संज्ञात्वेन विधीयते **आदैचाम्**।\n\n---\n\n\
                 [अदेङ्गुणः](/sutraani/1/1/2) इति अनन्तरसूत्रम्।"
            )
        );
        assert_eq!(
            page.sections.get("लघुसिद्धान्तकौमुदी"),
            Some("### व्याख्या\n\nआदैच्च वृद्धिसंज्ञः स्यात्।")
        );
        assert!(page.sections.iter().all(|(_, text)| !text.trim().is_empty()));
    }

    #[test]
    fn page_without_known_regions_is_empty_not_an_error() {
        let page = extract_detail(&fixture("detail_empty.html"));
        assert_eq!(page.number, "अइउण्");
        assert_eq!(page.content, "");
        assert!(page.sections.is_empty());
    }

    #[test]
    fn fallback_content_is_plain_emphasis_text() {
        let html = r#"<div class="title-font">१ अइउण्</div>
            <div class="font-weight-bold">अ <i>इ</i> उ</div>"#;
        let page = extract_detail(html);
        assert_eq!(page.content, "अ इ उ");
    }

    #[test]
    fn long_plain_summary_rows_are_dropped() {
        let long = "क".repeat(MAX_PLAIN_ROW_CHARS);
        let html = format!(
            r#"<div id="sutra-summary-region"><div class="row">{long}</div><div class="row">लघु</div></div>"#
        );
        let page = extract_detail(&html);
        assert_eq!(page.sections.get(SUMMARY_SECTION), Some("लघु"));
    }

    #[tokio::test]
    async fn failed_load_is_none() {
        let mut driver = PageMapDriver::default();
        let page = fetch_detail(
            &mut driver,
            "https://ashtadhyayi.com/sutraani/9/9/9",
            Duration::ZERO,
            Duration::ZERO,
        )
        .await;
        assert!(page.is_none());
    }

    #[tokio::test]
    async fn fetch_extracts_loaded_page() {
        let url = "https://ashtadhyayi.com/sutraani/1/1/1";
        let mut driver = PageMapDriver::default().with_page(url, &fixture("detail_sutra.html"));
        let page = fetch_detail(&mut driver, url, Duration::ZERO, Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(page.title, "वृद्धिरादैच्");
    }
}
