//! Scroll-driven loading of infinite listings.
//!
//! The site gives no signal when a batch of entries arrives, so the loop
//! re-counts entry anchors after every scroll and stops once the count has
//! not grown for a number of consecutive rounds.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::{debug, info, instrument};

use grantha_shared::{PaginationConfig, Result};

use crate::driver::{BrowserDriver, SCROLL_TO_BOTTOM};
use crate::extract::sel;

/// Anchors that count as loaded entries, for every listing layout.
static ENTRY_ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| sel("a[href].d-block, .list-group-item a[href]"));

/// Log a progress line every this many scrolls.
const PROGRESS_EVERY: u32 = 20;

/// Why the scroll loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The anchor count stopped growing.
    Stalled,
    /// The entry limit was reached.
    LimitReached,
    /// The scroll cap was hit.
    ScrollCap,
}

/// Result of loading a listing to completion.
#[derive(Debug, Clone)]
pub struct Scrolled {
    /// Markup after the last scroll.
    pub html: String,
    /// Highest anchor count observed.
    pub anchors: usize,
    /// Scrolls performed.
    pub scrolls: u32,
    pub reason: StopReason,
}

/// Count entry anchors in a page snapshot.
pub fn count_entry_anchors(html: &str) -> usize {
    Html::parse_document(html).select(&ENTRY_ANCHORS).count()
}

/// Scroll the current page until the listing stops growing.
///
/// Ends when the anchor count has been unchanged for
/// `stall_threshold` consecutive measurements, when it reaches `limit`, or
/// after `max_scrolls` scrolls.
#[instrument(skip_all, fields(engine = driver.name()))]
pub async fn load_all(
    driver: &mut dyn BrowserDriver,
    config: &PaginationConfig,
    limit: Option<usize>,
) -> Result<Scrolled> {
    let mut last_count = 0;
    let mut highest = 0;
    let mut stalls = 0;
    let mut scrolls = 0;

    let reason = loop {
        if scrolls >= config.max_scrolls {
            break StopReason::ScrollCap;
        }

        let count = count_entry_anchors(&driver.page_source().await?);
        highest = highest.max(count);

        if count == last_count {
            stalls += 1;
            if stalls >= config.stall_threshold {
                break StopReason::Stalled;
            }
        } else {
            stalls = 0;
            last_count = count;
        }

        if limit.is_some_and(|limit| count >= limit) {
            info!(count, "reached entry limit");
            break StopReason::LimitReached;
        }

        driver.execute_script(SCROLL_TO_BOTTOM).await?;
        tokio::time::sleep(config.scroll_pause()).await;
        scrolls += 1;

        if scrolls % PROGRESS_EVERY == 0 {
            info!(count, scrolls, "loading listing");
        }
    };

    debug!(?reason, scrolls, "scroll loop finished");
    info!(entries = highest, "listing loaded");

    Ok(Scrolled {
        html: driver.page_source().await?,
        anchors: highest,
        scrolls,
        reason,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;

    /// A listing that reveals `counts[n]` anchors after `n` scrolls.
    struct LazyListing {
        counts: Vec<usize>,
        scrolls: usize,
    }

    impl LazyListing {
        fn new(counts: Vec<usize>) -> Self {
            Self {
                counts,
                scrolls: 0,
            }
        }
    }

    #[async_trait]
    impl BrowserDriver for LazyListing {
        fn name(&self) -> &str {
            "lazy-listing"
        }

        async fn navigate(&mut self, _url: &str) -> Result<()> {
            Ok(())
        }

        async fn page_source(&mut self) -> Result<String> {
            let visible = self.counts[self.scrolls.min(self.counts.len() - 1)];
            let items: String = (0..visible)
                .map(|i| format!(r#"<a class="d-block" href="/sutraani/1/1/{i}">{i}</a>"#))
                .collect();
            Ok(format!("<html><body>{items}</body></html>"))
        }

        async fn execute_script(&mut self, script: &str) -> Result<()> {
            assert_eq!(script, SCROLL_TO_BOTTOM);
            self.scrolls += 1;
            Ok(())
        }

        async fn wait_until_present(&mut self, _selector: &str, _timeout: Duration) -> bool {
            true
        }

        async fn close(&mut self) {}
    }

    fn config(max_scrolls: u32) -> PaginationConfig {
        PaginationConfig {
            stall_threshold: 5,
            max_scrolls,
            scroll_pause_ms: 0,
        }
    }

    #[test]
    fn counts_both_anchor_styles() {
        let html = r##"
            <a class="d-block" href="/a">a</a>
            <div class="list-group-item"><a href="/b">b</a></div>
            <div class="list-group-item"><a class="d-block" href="/c">c</a></div>
            <a href="/d">plain</a>
            <a class="d-block">no href</a>"##;
        assert_eq!(count_entry_anchors(html), 3);
    }

    #[tokio::test]
    async fn stops_after_five_rounds_without_growth() {
        let mut driver = LazyListing::new(vec![10, 20, 30, 40, 50, 60]);
        let scrolled = load_all(&mut driver, &config(500), None).await.unwrap();

        assert_eq!(scrolled.reason, StopReason::Stalled);
        assert_eq!(scrolled.anchors, 60);
        // Last growth is seen after scroll 5, then five flat measurements.
        assert_eq!(scrolled.scrolls, 10);
        assert!(scrolled.scrolls - 5 <= 5);
        assert_eq!(count_entry_anchors(&scrolled.html), 60);
    }

    #[tokio::test]
    async fn never_exceeds_scroll_cap() {
        let growing: Vec<usize> = (1..=100).collect();
        let mut driver = LazyListing::new(growing);
        let scrolled = load_all(&mut driver, &config(7), None).await.unwrap();

        assert_eq!(scrolled.reason, StopReason::ScrollCap);
        assert_eq!(scrolled.scrolls, 7);
        assert_eq!(driver.scrolls, 7);
    }

    #[tokio::test]
    async fn stops_at_limit() {
        let mut driver = LazyListing::new(vec![10, 20, 30, 40]);
        let scrolled = load_all(&mut driver, &config(500), Some(25)).await.unwrap();

        assert_eq!(scrolled.reason, StopReason::LimitReached);
        assert_eq!(scrolled.anchors, 30);
        assert_eq!(scrolled.scrolls, 2);
    }

    #[tokio::test]
    async fn anchors_report_the_peak_count() {
        let mut driver = LazyListing::new(vec![10, 30, 20]);
        let scrolled = load_all(&mut driver, &config(500), None).await.unwrap();

        assert_eq!(scrolled.reason, StopReason::Stalled);
        assert_eq!(scrolled.anchors, 30);
        assert_eq!(count_entry_anchors(&scrolled.html), 20);
    }

    #[tokio::test]
    async fn empty_listing_stalls_out() {
        let mut driver = LazyListing::new(vec![0]);
        let scrolled = load_all(&mut driver, &config(500), None).await.unwrap();

        assert_eq!(scrolled.reason, StopReason::Stalled);
        assert_eq!(scrolled.anchors, 0);
        assert_eq!(scrolled.scrolls, 4);
    }
}
