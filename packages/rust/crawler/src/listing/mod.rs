//! Listing-page parsing.
//!
//! Each book names its listing strategy in its static config
//! ([`ListingKind`]); this module dispatches on it and also reads the book's
//! preamble (title, header shlokas, closing title) from the same snapshot.

mod flat;
mod segmented;

pub use segmented::CITATION_KEY;

use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::{debug, instrument};

use grantha_markdown::element_text;
use grantha_shared::{BookVariant, EntrySummary, ListingKind};

use crate::extract::{sel, select_text};

static BOOK_TITLE: LazyLock<Selector> = LazyLock::new(|| sel(".list-group-title"));
static HEADER_ITEMS: LazyLock<Selector> = LazyLock::new(|| {
    sel("#list-group-content > .bg-light.list-group-item, \
         #list-group-content > .list-group-item.bg-light, \
         .list-group-item.text-center.bg-light")
});
static END_TITLE: LazyLock<Selector> = LazyLock::new(|| sel(".list-group-end-title"));
static ANY_LINK: LazyLock<Selector> = LazyLock::new(|| sel("a[href]"));

/// Book-level text around the entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preamble {
    pub title: String,
    pub header_shlokas: Vec<String>,
    pub footer_title: String,
}

/// Everything read from one listing snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub preamble: Preamble,
    pub entries: Vec<EntrySummary>,
}

/// Parse a listing snapshot for `book`, keeping at most `limit` entries.
#[instrument(skip_all, fields(book = %book, html_len = html.len()))]
pub fn parse_listing(html: &str, book: BookVariant, limit: Option<usize>) -> Listing {
    let doc = Html::parse_document(html);

    let mut entries = match book.config().listing {
        ListingKind::SegmentedPath { path_prefix } => segmented::extract(&doc, path_prefix),
        ListingKind::FlatList { href_prefix } => flat::extract(&doc, href_prefix),
    };
    if let Some(limit) = limit {
        entries.truncate(limit);
    }

    let preamble = parse_preamble(&doc);
    debug!(
        entries = entries.len(),
        shlokas = preamble.header_shlokas.len(),
        "listing parsed"
    );

    Listing { preamble, entries }
}

/// Title, linkless banner items and closing title of a listing.
pub fn parse_preamble(doc: &Html) -> Preamble {
    let root = doc.root_element();

    let header_shlokas = doc
        .select(&HEADER_ITEMS)
        .filter(|item| item.select(&ANY_LINK).next().is_none())
        .map(|item| element_text(&item))
        .filter(|text| !text.is_empty())
        .collect();

    Preamble {
        title: select_text(root, &BOOK_TITLE).unwrap_or_default(),
        header_shlokas,
        footer_title: select_text(root, &END_TITLE).unwrap_or_default(),
    }
}

#[cfg(test)]
pub(crate) fn fixture(name: &str) -> String {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../../fixtures/html")
        .join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
}
