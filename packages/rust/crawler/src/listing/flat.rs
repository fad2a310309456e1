//! Listings made of plain list items, one entry per item.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use grantha_markdown::element_text;
use grantha_shared::{EntrySummary, SITE_ORIGIN};

use crate::extract::{sel, select_text};

static ITEMS: LazyLock<Selector> = LazyLock::new(|| sel("#list-group-content .list-group-item"));
static LINK: LazyLock<Selector> = LazyLock::new(|| sel("a[href]"));
static BADGE: LazyLock<Selector> = LazyLock::new(|| sel(".badge"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| sel(".list-item-title"));
static NOTES: LazyLock<Selector> = LazyLock::new(|| sel(".list-item-text, .text-primary"));

/// Class marking banner items (the book's preamble).
const BANNER_CLASS: &str = "bg-light";

pub(super) fn extract(doc: &Html, href_prefix: Option<&str>) -> Vec<EntrySummary> {
    let Ok(origin) = Url::parse(SITE_ORIGIN) else {
        return Vec::new();
    };

    doc.select(&ITEMS)
        .filter(|item| !is_banner(*item))
        .filter_map(|item| summarize(item, &origin))
        .filter(|entry| href_prefix.is_none_or(|prefix| url_path_starts_with(&entry.url, prefix)))
        .collect()
}

fn is_banner(item: ElementRef<'_>) -> bool {
    item.value().classes().any(|c| c == BANNER_CLASS)
}

fn summarize(item: ElementRef<'_>, origin: &Url) -> Option<EntrySummary> {
    let href = item.select(&LINK).next()?.value().attr("href")?.trim();
    if href.is_empty() || href == "#" {
        return None;
    }
    let url = origin.join(href).ok()?;

    Some(EntrySummary {
        number: select_text(item, &BADGE).unwrap_or_default(),
        title: select_text(item, &TITLE).unwrap_or_default(),
        url: url.to_string(),
        notes: item
            .select(&NOTES)
            .map(|el| element_text(&el))
            .filter(|text| !text.is_empty())
            .collect(),
        metadata: Vec::new(),
    })
}

fn url_path_starts_with(url: &str, prefix: &str) -> bool {
    Url::parse(url).is_ok_and(|u| u.path().starts_with(prefix))
}
