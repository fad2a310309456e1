//! Script-less driver: plain HTTP fetches through `reqwest`.
//!
//! Serves books whose listings need no scrolling, and tests against a mock
//! server. Scripts are accepted and ignored, so a scroll loop over this driver
//! stalls out immediately.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use scraper::{Html, Selector};
use tracing::{debug, trace};

use grantha_shared::{BrowserConfig, GranthaError, Result};

use super::BrowserDriver;

/// User-Agent string for page requests.
const USER_AGENT: &str = concat!("grantha/", env!("CARGO_PKG_VERSION"));

/// Fetches pages over HTTP and keeps the last body as the "rendered" page.
pub struct HttpDriver {
    client: Client,
    current: Option<String>,
}

impl HttpDriver {
    pub fn new(config: &BrowserConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let language = HeaderValue::from_str(&config.accept_language).map_err(|e| {
            GranthaError::config(format!(
                "invalid accept_language '{}': {e}",
                config.accept_language
            ))
        })?;
        headers.insert(ACCEPT_LANGUAGE, language);

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(config.wait_timeout().max(Duration::from_secs(1)))
            .build()
            .map_err(|e| GranthaError::Driver(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            current: None,
        })
    }
}

#[async_trait]
impl BrowserDriver for HttpDriver {
    fn name(&self) -> &str {
        "http"
    }

    async fn navigate(&mut self, url: &str) -> Result<()> {
        debug!(%url, "fetching page");
        self.current = None;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GranthaError::Navigation(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GranthaError::Navigation(format!("{url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GranthaError::Navigation(format!("{url}: body read failed: {e}")))?;

        self.current = Some(body);
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String> {
        self.current
            .clone()
            .ok_or_else(|| GranthaError::Navigation("no page loaded".into()))
    }

    async fn execute_script(&mut self, script: &str) -> Result<()> {
        trace!(script, "http driver ignores scripts");
        Ok(())
    }

    async fn wait_until_present(&mut self, selector: &str, _timeout: Duration) -> bool {
        let Some(html) = &self.current else {
            return false;
        };
        let Ok(sel) = Selector::parse(selector) else {
            return false;
        };
        Html::parse_document(html).select(&sel).next().is_some()
    }

    async fn close(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{CONTENT_MARKER, load_page};

    fn driver() -> HttpDriver {
        HttpDriver::new(&BrowserConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn fetches_page_and_finds_marker() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/shiksha"))
            .and(wiremock::matchers::headers(
                "accept-language",
                vec!["hi", "sa", "en"],
            ))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_string(r#"<div id="list-group-content">शिक्षा</div>"#),
            )
            .mount(&server)
            .await;

        let mut driver = driver();
        let url = format!("{}/shiksha", server.uri());
        driver.navigate(&url).await.unwrap();

        assert!(
            driver
                .wait_until_present(CONTENT_MARKER, Duration::ZERO)
                .await
        );
        assert!(!driver.wait_until_present(".absent", Duration::ZERO).await);
        assert!(driver.page_source().await.unwrap().contains("शिक्षा"));
    }

    #[tokio::test]
    async fn http_error_is_navigation_error() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::path("/gone"))
            .respond_with(wiremock::ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let mut driver = driver();
        let err = driver
            .navigate(&format!("{}/gone", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, GranthaError::Navigation(_)));
        assert!(driver.page_source().await.is_err());
    }

    #[tokio::test]
    async fn load_page_over_http_failure_is_none() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::path("/broken"))
            .respond_with(wiremock::ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut driver = driver();
        let html = load_page(
            &mut driver,
            &format!("{}/broken", server.uri()),
            Duration::ZERO,
            CONTENT_MARKER,
            Duration::ZERO,
        )
        .await;
        assert!(html.is_none());
    }

    #[tokio::test]
    async fn scripts_are_ignored() {
        let mut driver = driver();
        assert!(driver.execute_script("window.scrollTo(0, 1);").await.is_ok());
    }

    #[test]
    fn rejects_unencodable_language() {
        let config = BrowserConfig {
            accept_language: "hi\nsa".into(),
            ..BrowserConfig::default()
        };
        assert!(HttpDriver::new(&config).is_err());
    }
}
