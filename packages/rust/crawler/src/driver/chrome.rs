//! Chromium driver built on `chromiumoxide`.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as LaunchConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use grantha_shared::{BrowserConfig, GranthaError, Result};

use super::BrowserDriver;

/// Interval between marker checks while waiting.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// A single Chromium tab driven over the DevTools protocol.
pub struct ChromeDriver {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromeDriver {
    /// Launch Chromium and open one blank tab.
    pub async fn launch(headless: bool, config: &BrowserConfig) -> Result<Self> {
        let mut builder = LaunchConfig::builder()
            .no_sandbox()
            .window_size(config.window_width, config.window_height)
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg(format!("--accept-lang={}", config.accept_language));
        if !headless {
            builder = builder.with_head();
        }
        let launch = builder
            .build()
            .map_err(|e| GranthaError::Driver(format!("invalid browser config: {e}")))?;

        let (mut browser, mut events) = Browser::launch(launch)
            .await
            .map_err(|e| GranthaError::Driver(format!("failed to launch browser: {e}")))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                handler.abort();
                return Err(GranthaError::Driver(format!("failed to open tab: {e}")));
            }
        };

        info!(headless, "browser started");
        Ok(Self {
            browser,
            page,
            handler,
        })
    }
}

#[async_trait]
impl BrowserDriver for ChromeDriver {
    fn name(&self) -> &str {
        "chrome"
    }

    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| GranthaError::Navigation(format!("{url}: {e}")))?;
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String> {
        self.page
            .content()
            .await
            .map_err(|e| GranthaError::Driver(format!("failed to read page: {e}")))
    }

    async fn execute_script(&mut self, script: &str) -> Result<()> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| GranthaError::Driver(format!("script failed: {e}")))?;
        Ok(())
    }

    async fn wait_until_present(&mut self, selector: &str, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.browser.close().await {
            warn!(error = %e, "browser did not close cleanly");
        }
        if let Err(e) = self.browser.wait().await {
            debug!(error = %e, "waiting for browser exit failed");
        }
        self.handler.abort();
        info!("browser closed");
    }
}
