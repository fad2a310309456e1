//! Page acquisition and extraction for grantha.
//!
//! This crate provides:
//! - [`driver`]: the [`BrowserDriver`] seam with Chromium and HTTP engines
//! - [`pagination`]: scroll-until-stable loading of infinite listings
//! - [`listing`]: per-book listing parsers and the book preamble
//! - [`detail`]: detail-page extraction into content and named sections

pub mod detail;
pub mod driver;
mod extract;
pub mod listing;
pub mod pagination;

pub use detail::{SUMMARY_SECTION, extract_detail, fetch_detail, split_heading};
pub use driver::{
    BrowserDriver, CONTENT_MARKER, ChromeDriver, HttpDriver, SCROLL_TO_BOTTOM, load_page,
    open_driver,
};
pub use listing::{CITATION_KEY, Listing, Preamble, parse_listing, parse_preamble};
pub use pagination::{Scrolled, StopReason, count_entry_anchors, load_all};
