//! Shared types, error model, and configuration for grantha.
//!
//! This crate is the foundation depended on by all other grantha crates.
//! It provides:
//! - [`GranthaError`]: the unified error type
//! - The book table ([`BookVariant`], [`BookConfig`])
//! - Domain records ([`EntryRecord`], [`ChapterRecord`], [`BookRecord`])
//! - Identifier normalization and output paths ([`ident`])
//! - Configuration ([`AppConfig`], [`ScrapeConfig`], config loading)

pub mod book;
pub mod config;
pub mod error;
pub mod ident;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use book::{BookConfig, BookVariant, ListingKind, Organization, SITE_ORIGIN};
pub use config::{
    AppConfig, BrowserConfig, DefaultsConfig, DriverKind, PaginationConfig, ScrapeConfig,
    config_dir, config_file_path, init_config, load_config, load_config_from,
};
pub use error::{GranthaError, Result};
pub use ident::{entry_path, to_ascii_digits};
pub use types::{BookRecord, ChapterRecord, DetailPage, EntryRecord, EntrySummary, Sections};
