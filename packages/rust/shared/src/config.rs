//! Application configuration for grantha.
//!
//! User config lives at `~/.grantha/grantha.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::book::BookVariant;
use crate::error::{GranthaError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "grantha.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".grantha";

// ---------------------------------------------------------------------------
// Config structs (matching grantha.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Listing scroll loop.
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Browser session settings.
    #[serde(default)]
    pub browser: BrowserConfig,
}

/// Which browser driver renders pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// Headless Chromium; runs the site's JavaScript.
    #[default]
    Chrome,
    /// Plain HTTP fetch; no scripts, no scrolling.
    Http,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Root directory books are written under.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Pause after each navigation and between detail pages.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Run the browser without a window.
    #[serde(default = "default_true")]
    pub headless: bool,

    #[serde(default)]
    pub driver: DriverKind,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            delay_ms: default_delay_ms(),
            headless: true,
            driver: DriverKind::default(),
        }
    }
}

fn default_output_dir() -> String {
    "./books".into()
}
fn default_delay_ms() -> u64 {
    1500
}
fn default_true() -> bool {
    true
}

/// `[pagination]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Consecutive no-growth iterations that end the scroll loop.
    #[serde(default = "default_stall_threshold")]
    pub stall_threshold: u32,

    /// Hard cap on scroll iterations.
    #[serde(default = "default_max_scrolls")]
    pub max_scrolls: u32,

    /// Pause after each scroll before re-counting.
    #[serde(default = "default_scroll_pause_ms")]
    pub scroll_pause_ms: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            stall_threshold: default_stall_threshold(),
            max_scrolls: default_max_scrolls(),
            scroll_pause_ms: default_scroll_pause_ms(),
        }
    }
}

impl PaginationConfig {
    pub fn scroll_pause(&self) -> Duration {
        Duration::from_millis(self.scroll_pause_ms)
    }
}

fn default_stall_threshold() -> u32 {
    5
}
fn default_max_scrolls() -> u32 {
    500
}
fn default_scroll_pause_ms() -> u64 {
    500
}

/// `[browser]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Upper bound on waiting for a content marker.
    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,

    #[serde(default = "default_window_width")]
    pub window_width: u32,

    #[serde(default = "default_window_height")]
    pub window_height: u32,

    /// Sent as the browser's language preference.
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            wait_timeout_secs: default_wait_timeout_secs(),
            window_width: default_window_width(),
            window_height: default_window_height(),
            accept_language: default_accept_language(),
        }
    }
}

impl BrowserConfig {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }
}

fn default_wait_timeout_secs() -> u64 {
    15
}
fn default_window_width() -> u32 {
    1920
}
fn default_window_height() -> u32 {
    1080
}
fn default_accept_language() -> String {
    "hi,sa,en".into()
}

// ---------------------------------------------------------------------------
// Scrape config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime scrape configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub book: BookVariant,
    /// Replaces the book's listing URL (a mirror or a local server).
    pub listing_url: Option<String>,
    /// Root directory the book directory is created in.
    pub output_root: PathBuf,
    /// Stop after this many entries.
    pub limit: Option<usize>,
    /// Settle pause after navigation; also the throttle between detail pages.
    pub delay: Duration,
    pub headless: bool,
    pub driver: DriverKind,
    pub pagination: PaginationConfig,
    pub browser: BrowserConfig,
}

impl ScrapeConfig {
    /// Defaults from `config` for the given book; callers override fields.
    pub fn from_app(config: &AppConfig, book: BookVariant) -> Self {
        Self {
            book,
            listing_url: None,
            output_root: PathBuf::from(&config.defaults.output_dir),
            limit: None,
            delay: Duration::from_millis(config.defaults.delay_ms),
            headless: config.defaults.headless,
            driver: config.defaults.driver,
            pagination: config.pagination.clone(),
            browser: config.browser.clone(),
        }
    }

    /// The listing page to start from.
    pub fn listing_url(&self) -> &str {
        self.listing_url
            .as_deref()
            .unwrap_or_else(|| self.book.config().url)
    }

    /// Reject settings that would make the scroll loop or the limit meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.pagination.stall_threshold == 0 {
            return Err(GranthaError::config("pagination.stall_threshold must be at least 1"));
        }
        if self.limit == Some(0) {
            return Err(GranthaError::config("limit must be at least 1"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.grantha/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| GranthaError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.grantha/grantha.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| GranthaError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| GranthaError::parse(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| GranthaError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| GranthaError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| GranthaError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
