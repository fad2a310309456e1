//! Domain records produced by a scrape.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::book::BookVariant;

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Named commentary sections in page order.
///
/// Re-inserting an existing name replaces its text but keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections {
    entries: Vec<(String, String)>,
}

impl Sections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        let name = name.into();
        let text = text.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = text,
            None => self.entries.push((name, text)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, t)| (n.as_str(), t.as_str()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Sections {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, text) in &self.entries {
            map.serialize_entry(name, text)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Listing and detail results
// ---------------------------------------------------------------------------

/// What the listing page says about one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntrySummary {
    /// Raw identifier; empty when the listing shows none.
    pub number: String,
    pub title: String,
    /// Absolute detail-page URL.
    pub url: String,
    pub notes: Vec<String>,
    /// Book-specific extras (e.g. `kaumudi`), in discovery order.
    pub metadata: Vec<(String, String)>,
}

/// What a detail page says about one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailPage {
    pub number: String,
    pub title: String,
    pub content: String,
    /// Never holds a blank value.
    pub sections: Sections,
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One fully scraped entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryRecord {
    pub number: String,
    pub title: String,
    pub url: String,
    pub content: String,
    pub sections: Sections,
    pub notes: Vec<String>,
    pub metadata: Vec<(String, String)>,
}

impl EntryRecord {
    /// Merge a listing summary with its detail page.
    ///
    /// The listing wins for number and title; the detail page fills them in
    /// when the listing had none. Without a detail page the number falls back
    /// to the 1-based `position`.
    pub fn merge(summary: EntrySummary, detail: Option<DetailPage>, position: usize) -> Self {
        let EntrySummary {
            number,
            title,
            url,
            notes,
            metadata,
        } = summary;

        let (content, sections, detail_number, detail_title) = match detail {
            Some(d) => (d.content, d.sections, Some(d.number), d.title),
            None => (String::new(), Sections::new(), None, String::new()),
        };

        let number = if !number.is_empty() {
            number
        } else {
            detail_number.unwrap_or_else(|| position.to_string())
        };
        let title = if title.is_empty() { detail_title } else { title };

        Self {
            number,
            title,
            url,
            content,
            sections,
            notes,
            metadata,
        }
    }

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A group of entries under one listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterRecord {
    pub number: String,
    pub name: String,
    pub url: String,
    pub entries: Vec<EntryRecord>,
}

/// Everything scraped for one book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookRecord {
    /// Display name (the variant key).
    pub name: String,
    /// Canonical title from the listing page.
    pub title: String,
    pub header_shlokas: Vec<String>,
    pub footer_title: String,
    pub source_url: String,
    pub variant: BookVariant,
    pub chapters: Vec<ChapterRecord>,
}

impl BookRecord {
    /// All entries across chapters, in order.
    pub fn entries(&self) -> impl Iterator<Item = &EntryRecord> {
        self.chapters.iter().flat_map(|c| c.entries.iter())
    }

    pub fn entry_count(&self) -> usize {
        self.chapters.iter().map(|c| c.entries.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(number: &str, title: &str) -> EntrySummary {
        EntrySummary {
            number: number.into(),
            title: title.into(),
            url: "https://ashtadhyayi.com/shivasutra/1".into(),
            notes: vec!["• note".into()],
            metadata: vec![],
        }
    }

    #[test]
    fn sections_keep_insertion_order() {
        let mut s = Sections::new();
        s.insert("काशिका", "one");
        s.insert("बालमनोरमा", "two");
        s.insert("काशिका", "three");
        assert_eq!(s.names(), vec!["काशिका", "बालमनोरमा"]);
        assert_eq!(s.get("काशिका"), Some("three"));
    }

    #[test]
    fn sections_serialize_as_ordered_map() {
        let mut s = Sections::new();
        s.insert("b", "1");
        s.insert("a", "2");
        assert_eq!(serde_json::to_string(&s).unwrap(), r#"{"b":"1","a":"2"}"#);
    }

    #[test]
    fn merge_prefers_listing_values() {
        let detail = DetailPage {
            number: "१".into(),
            title: "detail title".into(),
            content: "body".into(),
            sections: Sections::new(),
        };
        let entry = EntryRecord::merge(summary("1", "अइउण्"), Some(detail), 1);
        assert_eq!(entry.number, "1");
        assert_eq!(entry.title, "अइउण्");
        assert_eq!(entry.content, "body");
        assert_eq!(entry.notes, vec!["• note".to_string()]);
    }

    #[test]
    fn merge_falls_back_to_detail_then_position() {
        let detail = DetailPage {
            number: "१.१.१".into(),
            title: "वृद्धिरादैच्".into(),
            ..Default::default()
        };
        let entry = EntryRecord::merge(summary("", ""), Some(detail), 7);
        assert_eq!(entry.number, "१.१.१");
        assert_eq!(entry.title, "वृद्धिरादैच्");

        let entry = EntryRecord::merge(summary("", ""), None, 7);
        assert_eq!(entry.number, "7");
        assert!(entry.content.is_empty());
        assert!(entry.sections.is_empty());
    }
}
