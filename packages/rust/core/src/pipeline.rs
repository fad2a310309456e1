//! End-to-end `scrape` pipeline: listing → scroll → per-entry details → book directory.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use grantha_crawler::{
    BrowserDriver, CONTENT_MARKER, Listing, fetch_detail, load_all, load_page, open_driver,
    parse_listing,
};
use grantha_shared::{
    BookRecord, ChapterRecord, EntryRecord, GranthaError, Result, ScrapeConfig,
};

use crate::assembler;

/// Version written into every manifest.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result of a full scrape.
#[derive(Debug)]
pub struct ScrapeResult {
    /// Directory the book was written to.
    pub book_dir: PathBuf,
    /// Entries written.
    pub entry_count: usize,
    /// Entries whose detail page could not be loaded.
    pub missing_details: usize,
    /// Files written, including the index and manifest.
    pub files_written: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// A scraped book before it is written out.
#[derive(Debug, Clone)]
pub struct Collected {
    pub book: BookRecord,
    pub missing_details: usize,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called once the listing has been parsed.
    fn listing_loaded(&self, entries: usize);
    /// Called after each entry's detail page has been handled.
    fn entry_scraped(&self, number: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &ScrapeResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn listing_loaded(&self, _entries: usize) {}
    fn entry_scraped(&self, _number: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &ScrapeResult) {}
}

/// Run the full `scrape` pipeline for `config.book`.
///
/// 1. Validate the config and open a browser session
/// 2. Load the listing (scrolling it if the book needs that)
/// 3. Visit every entry's detail page
/// 4. Close the session
/// 5. Write the book directory
#[instrument(skip_all, fields(book = %config.book, driver = ?config.driver))]
pub async fn scrape_book(
    config: &ScrapeConfig,
    progress: &dyn ProgressReporter,
) -> Result<ScrapeResult> {
    config.validate()?;

    progress.phase("Starting browser");
    let mut driver = open_driver(config).await?;

    scrape_with(driver.as_mut(), config, progress).await
}

/// Like [`scrape_book`] with an already opened driver. The driver is closed
/// before this returns, whether or not collection succeeded.
pub async fn scrape_with(
    driver: &mut dyn BrowserDriver,
    config: &ScrapeConfig,
    progress: &dyn ProgressReporter,
) -> Result<ScrapeResult> {
    let start = Instant::now();

    let collected = collect_book(driver, config, progress).await;
    driver.close().await;
    let Collected {
        book,
        missing_details,
    } = collected?;

    progress.phase("Writing book");
    let assembled = assembler::assemble(&book, &config.output_root, TOOL_VERSION)?;

    let result = ScrapeResult {
        book_dir: assembled.book_dir,
        entry_count: book.entry_count(),
        missing_details,
        files_written: assembled.files_written,
        elapsed: start.elapsed(),
    };

    info!(
        entries = result.entry_count,
        missing = result.missing_details,
        elapsed_ms = result.elapsed.as_millis() as u64,
        path = %result.book_dir.display(),
        "scrape complete"
    );

    progress.done(&result);
    Ok(result)
}

/// Scrape a book into memory. Does not close `driver`.
///
/// Fails only when the listing page cannot be loaded; a detail page that
/// fails leaves its entry with listing data only.
pub async fn collect_book(
    driver: &mut dyn BrowserDriver,
    config: &ScrapeConfig,
    progress: &dyn ProgressReporter,
) -> Result<Collected> {
    let book = config.book;
    let book_config = book.config();
    let listing_url = config.listing_url();
    let timeout = config.browser.wait_timeout();

    info!(%listing_url, "loading listing");
    progress.phase("Loading listing");

    let snapshot = load_page(driver, listing_url, config.delay, CONTENT_MARKER, timeout)
        .await
        .ok_or_else(|| GranthaError::Navigation(format!("failed to load listing {listing_url}")))?;

    let html = if book_config.infinite_scroll {
        progress.phase("Scrolling listing");
        match load_all(driver, &config.pagination, config.limit).await {
            Ok(scrolled) => {
                debug!(
                    scrolls = scrolled.scrolls,
                    reason = ?scrolled.reason,
                    "listing fully loaded"
                );
                scrolled.html
            }
            Err(e) => {
                warn!(error = %e, "scrolling failed, using first snapshot");
                snapshot
            }
        }
    } else {
        snapshot
    };

    let Listing { preamble, entries } = parse_listing(&html, book, config.limit);
    let total = entries.len();
    info!(entries = total, expected = book_config.expected_count, "listing parsed");
    progress.listing_loaded(total);

    progress.phase("Scraping entries");
    let mut records = Vec::with_capacity(total);
    let mut missing_details = 0;

    for (i, summary) in entries.into_iter().enumerate() {
        let position = i + 1;
        let detail = fetch_detail(driver, &summary.url, config.delay, timeout).await;
        if detail.is_none() {
            missing_details += 1;
        }

        let record = EntryRecord::merge(summary, detail, position);
        progress.entry_scraped(&record.number, position, total);
        records.push(record);

        tokio::time::sleep(config.delay).await;
    }

    if missing_details > 0 {
        warn!(missing_details, "some detail pages could not be loaded");
    }

    let record = BookRecord {
        name: book.key().to_string(),
        title: preamble.title,
        header_shlokas: preamble.header_shlokas,
        footer_title: preamble.footer_title,
        source_url: listing_url.to_string(),
        variant: book,
        chapters: vec![ChapterRecord {
            number: "1".to_string(),
            name: book.key().to_string(),
            url: listing_url.to_string(),
            entries: records,
        }],
    };

    Ok(Collected {
        book: record,
        missing_details,
    })
}
