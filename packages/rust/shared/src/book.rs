//! The closed set of supported books and their static configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GranthaError;

/// Origin every listing and detail URL is resolved against.
pub const SITE_ORIGIN: &str = "https://ashtadhyayi.com";

/// How entry files of a book are laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Organization {
    /// One file per entry in the book directory.
    Flat,
    /// `adhyaya_A/pada_P/sutra_SSS.md` from a three-part number.
    HierarchicalByNumber,
    /// Grouped by a category; the listing exposes none, so paths are flat.
    GroupedByCategory,
}

/// Which listing-extraction strategy a book uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    /// Bare anchors whose path is `/<book>/<a>/<p>/<s>`.
    SegmentedPath { path_prefix: &'static str },
    /// `.list-group-item` rows with badge, title and link sub-elements.
    FlatList { href_prefix: Option<&'static str> },
}

/// Static per-book configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookConfig {
    /// Listing page URL.
    pub url: &'static str,
    /// Detail URL template, `None` when the listing is the only page.
    pub detail_url_pattern: Option<&'static str>,
    /// Whether the listing loads more entries on scroll.
    pub infinite_scroll: bool,
    /// Output layout.
    pub organization: Organization,
    /// Advisory entry count; never enforced.
    pub expected_count: usize,
    /// Listing-extraction strategy.
    pub listing: ListingKind,
}

/// A supported book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookVariant {
    Shivasutra,
    Sutraani,
    Dhatu,
    Pratyahara,
    Ganapatha,
    Unadipatha,
    Linganushasanam,
    Shiksha,
}

impl BookVariant {
    /// Every variant, in presentation order.
    pub const ALL: [BookVariant; 8] = [
        BookVariant::Shivasutra,
        BookVariant::Sutraani,
        BookVariant::Dhatu,
        BookVariant::Pratyahara,
        BookVariant::Ganapatha,
        BookVariant::Unadipatha,
        BookVariant::Linganushasanam,
        BookVariant::Shiksha,
    ];

    /// The key used on the command line and in output directory names.
    pub fn key(self) -> &'static str {
        match self {
            BookVariant::Shivasutra => "shivasutra",
            BookVariant::Sutraani => "sutraani",
            BookVariant::Dhatu => "dhatu",
            BookVariant::Pratyahara => "pratyahara",
            BookVariant::Ganapatha => "ganapatha",
            BookVariant::Unadipatha => "unadipatha",
            BookVariant::Linganushasanam => "linganushasanam",
            BookVariant::Shiksha => "shiksha",
        }
    }

    pub fn config(self) -> BookConfig {
        let flat = ListingKind::FlatList { href_prefix: None };
        match self {
            BookVariant::Shivasutra => BookConfig {
                url: "https://ashtadhyayi.com/shivasutra/",
                detail_url_pattern: Some("/shivasutra/{num}"),
                infinite_scroll: false,
                organization: Organization::Flat,
                expected_count: 14,
                listing: flat,
            },
            BookVariant::Sutraani => BookConfig {
                url: "https://ashtadhyayi.com/sutraani",
                detail_url_pattern: Some("/sutraani/{a}/{p}/{s}"),
                infinite_scroll: true,
                organization: Organization::HierarchicalByNumber,
                expected_count: 3981,
                listing: ListingKind::SegmentedPath {
                    path_prefix: "/sutraani/",
                },
            },
            BookVariant::Dhatu => BookConfig {
                url: "https://ashtadhyayi.com/dhatu/",
                detail_url_pattern: Some("/dhatu/{id}"),
                infinite_scroll: true,
                organization: Organization::GroupedByCategory,
                expected_count: 2000,
                listing: ListingKind::FlatList {
                    href_prefix: Some("/dhatu/"),
                },
            },
            BookVariant::Pratyahara => BookConfig {
                url: "https://ashtadhyayi.com/pratyahara",
                detail_url_pattern: None,
                infinite_scroll: false,
                organization: Organization::Flat,
                expected_count: 44,
                listing: flat,
            },
            BookVariant::Ganapatha => BookConfig {
                url: "https://ashtadhyayi.com/ganapath/",
                detail_url_pattern: Some("/ganapath/{id}"),
                infinite_scroll: true,
                organization: Organization::Flat,
                expected_count: 450,
                listing: flat,
            },
            BookVariant::Unadipatha => BookConfig {
                url: "https://ashtadhyayi.com/unaadi/",
                detail_url_pattern: Some("/unaadi/{id}"),
                infinite_scroll: true,
                organization: Organization::Flat,
                expected_count: 750,
                listing: flat,
            },
            BookVariant::Linganushasanam => BookConfig {
                url: "https://ashtadhyayi.com/linganushasanam",
                detail_url_pattern: Some("/linganushasanam/{id}"),
                infinite_scroll: false,
                organization: Organization::Flat,
                expected_count: 200,
                listing: flat,
            },
            BookVariant::Shiksha => BookConfig {
                url: "https://ashtadhyayi.com/shiksha",
                detail_url_pattern: Some("/shiksha/{id}"),
                infinite_scroll: false,
                organization: Organization::Flat,
                expected_count: 60,
                listing: flat,
            },
        }
    }

    /// Comma-separated list of every key, for error messages.
    pub fn available() -> String {
        Self::ALL
            .iter()
            .map(|b| b.key())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for BookVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for BookVariant {
    type Err = GranthaError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|b| b.key() == wanted)
            .ok_or_else(|| GranthaError::UnknownBook {
                name: s.to_string(),
                available: Self::available(),
            })
    }
}
