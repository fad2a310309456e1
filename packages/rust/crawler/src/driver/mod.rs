//! The browser-driver seam.
//!
//! Everything above this module talks to a [`BrowserDriver`]; which engine
//! renders the pages is decided once, in [`open_driver`].

mod chrome;
mod http;

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use grantha_shared::{DriverKind, Result, ScrapeConfig};

pub use chrome::ChromeDriver;
pub use http::HttpDriver;

/// Marker present once the site's list container has rendered.
pub const CONTENT_MARKER: &str = "#list-group-content, .list-group-content, .list-group";

/// Script that scrolls the window to the end of the document.
pub const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight);";

/// A rendering browser session.
///
/// One driver is owned by one scrape at a time. Callers must call
/// [`close`](BrowserDriver::close) on every exit path.
#[async_trait]
pub trait BrowserDriver: Send {
    /// Short engine name for tracing.
    fn name(&self) -> &str;

    /// Load `url`, replacing the current page.
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Markup of the current page as rendered right now.
    async fn page_source(&mut self) -> Result<String>;

    /// Run a script in the current page, discarding its result.
    async fn execute_script(&mut self, script: &str) -> Result<()>;

    /// Wait until `selector` matches something, up to `timeout`.
    ///
    /// Returns `false` on timeout; a missing element is never an error.
    async fn wait_until_present(&mut self, selector: &str, timeout: Duration) -> bool;

    /// Release the session. Failures are logged, not returned.
    async fn close(&mut self);
}

/// Start the driver selected by `config`.
pub async fn open_driver(config: &ScrapeConfig) -> Result<Box<dyn BrowserDriver>> {
    match config.driver {
        DriverKind::Chrome => Ok(Box::new(
            ChromeDriver::launch(config.headless, &config.browser).await?,
        )),
        DriverKind::Http => Ok(Box::new(HttpDriver::new(&config.browser)?)),
    }
}

/// Navigate to `url`, let it settle and return the rendered markup.
///
/// Returns `None` if navigation or reading the page fails; a content marker
/// that never appears only logs.
pub async fn load_page(
    driver: &mut dyn BrowserDriver,
    url: &str,
    settle: Duration,
    wait_selector: &str,
    timeout: Duration,
) -> Option<String> {
    if let Err(e) = driver.navigate(url).await {
        warn!(%url, error = %e, "page failed to load");
        return None;
    }

    tokio::time::sleep(settle).await;

    if !driver.wait_until_present(wait_selector, timeout).await {
        debug!(%url, selector = wait_selector, "content marker did not appear");
    }

    match driver.page_source().await {
        Ok(html) => Some(html),
        Err(e) => {
            warn!(%url, error = %e, "could not read page source");
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory drivers for tests.

    use std::collections::HashMap;

    use scraper::{Html, Selector};

    use grantha_shared::GranthaError;

    use super::*;

    /// Serves fixed pages by URL; unknown URLs fail to navigate.
    #[derive(Default)]
    pub struct PageMapDriver {
        pub pages: HashMap<String, String>,
        pub current: Option<String>,
        pub visited: Vec<String>,
        pub scripts: Vec<String>,
        pub closed: bool,
    }

    impl PageMapDriver {
        pub fn with_page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }
    }

    #[async_trait]
    impl BrowserDriver for PageMapDriver {
        fn name(&self) -> &str {
            "page-map"
        }

        async fn navigate(&mut self, url: &str) -> Result<()> {
            self.visited.push(url.to_string());
            match self.pages.get(url) {
                Some(html) => {
                    self.current = Some(html.clone());
                    Ok(())
                }
                None => Err(GranthaError::Navigation(format!("{url}: not found"))),
            }
        }

        async fn page_source(&mut self) -> Result<String> {
            self.current
                .clone()
                .ok_or_else(|| GranthaError::Navigation("no page loaded".into()))
        }

        async fn execute_script(&mut self, script: &str) -> Result<()> {
            self.scripts.push(script.to_string());
            Ok(())
        }

        async fn wait_until_present(&mut self, selector: &str, _timeout: Duration) -> bool {
            let (Some(html), Ok(sel)) = (&self.current, Selector::parse(selector)) else {
                return false;
            };
            Html::parse_document(html).select(&sel).next().is_some()
        }

        async fn close(&mut self) {
            self.closed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::PageMapDriver;
    use super::*;

    #[tokio::test]
    async fn load_page_returns_markup() {
        let mut driver = PageMapDriver::default()
            .with_page("https://x.test/a", r#"<div class="list-group">ok</div>"#);
        let html = load_page(
            &mut driver,
            "https://x.test/a",
            Duration::ZERO,
            CONTENT_MARKER,
            Duration::ZERO,
        )
        .await;
        assert!(html.is_some_and(|h| h.contains("ok")));
    }

    #[tokio::test]
    async fn load_page_failure_is_none() {
        let mut driver = PageMapDriver::default();
        let html = load_page(
            &mut driver,
            "https://x.test/missing",
            Duration::ZERO,
            CONTENT_MARKER,
            Duration::ZERO,
        )
        .await;
        assert!(html.is_none());
        assert_eq!(driver.visited, vec!["https://x.test/missing"]);
    }

    #[tokio::test]
    async fn missing_marker_still_returns_page() {
        let mut driver = PageMapDriver::default().with_page("https://x.test/b", "<p>bare</p>");
        let html = load_page(
            &mut driver,
            "https://x.test/b",
            Duration::ZERO,
            CONTENT_MARKER,
            Duration::ZERO,
        )
        .await;
        assert!(html.is_some());
    }
}
