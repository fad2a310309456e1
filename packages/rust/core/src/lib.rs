//! Pipeline orchestration and book assembly for grantha.
//!
//! This crate ties the crawler's listing, pagination and detail stages into
//! one `scrape_book` run and writes the result as a Markdown book directory.

pub mod assembler;
pub mod pipeline;

pub use assembler::{AssembleResult, BookManifest, ManifestEntry, assemble};
pub use pipeline::{
    Collected, ProgressReporter, ScrapeResult, SilentProgress, TOOL_VERSION, collect_book,
    scrape_book, scrape_with,
};
