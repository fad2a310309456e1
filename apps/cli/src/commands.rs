//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use grantha_core::{ProgressReporter, ScrapeResult, scrape_book};
use grantha_shared::{
    AppConfig, BookVariant, DriverKind, Organization, ScrapeConfig, init_config, load_config,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// grantha — scrape grammar texts from ashtadhyayi.com into Markdown books.
#[derive(Parser)]
#[command(
    name = "grantha",
    version,
    about = "Scrape Sanskrit grammar texts from ashtadhyayi.com into Markdown books.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Browser driver choice on the command line.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum DriverArg {
    Chrome,
    Http,
}

impl From<DriverArg> for DriverKind {
    fn from(arg: DriverArg) -> Self {
        match arg {
            DriverArg::Chrome => DriverKind::Chrome,
            DriverArg::Http => DriverKind::Http,
        }
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Scrape one book and write it as a Markdown directory.
    Scrape {
        /// Book to scrape (see `grantha books`).
        #[arg(short, long)]
        book: BookVariant,

        /// Output root; the book is written to <out>/<book>.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Stop after this many entries.
        #[arg(short, long)]
        limit: Option<usize>,

        /// Seconds to wait after each page load.
        #[arg(short, long, value_parser = parse_delay)]
        delay: Option<Duration>,

        /// Show the browser window.
        #[arg(long)]
        no_headless: bool,

        /// Page driver.
        #[arg(long)]
        driver: Option<DriverArg>,

        /// Listing URL to use instead of the book's own (e.g. a mirror).
        #[arg(long)]
        url: Option<String>,
    },

    /// List the supported books.
    Books,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

fn parse_delay(s: &str) -> std::result::Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|e| format!("invalid delay '{s}': {e}"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid delay '{s}': {e}"))
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match (cli.quiet, cli.verbose) {
        (true, _) => "warn",
        (false, 0) => "grantha=info",
        (false, 1) => "grantha=debug",
        _ => "grantha=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Scrape {
            book,
            out,
            limit,
            delay,
            no_headless,
            driver,
            url,
        } => {
            let overrides = ScrapeOverrides {
                out,
                limit,
                delay,
                no_headless,
                driver,
                url,
            };
            cmd_scrape(book, overrides, cli.quiet).await
        }
        Command::Books => cmd_books(),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

/// Flags that override the config file for one scrape.
#[derive(Debug, Default)]
struct ScrapeOverrides {
    out: Option<PathBuf>,
    limit: Option<usize>,
    delay: Option<Duration>,
    no_headless: bool,
    driver: Option<DriverArg>,
    url: Option<String>,
}

fn scrape_config(app: &AppConfig, book: BookVariant, overrides: ScrapeOverrides) -> ScrapeConfig {
    let mut config = ScrapeConfig::from_app(app, book);
    if let Some(out) = overrides.out {
        config.output_root = out;
    }
    if let Some(delay) = overrides.delay {
        config.delay = delay;
    }
    if let Some(driver) = overrides.driver {
        config.driver = driver.into();
    }
    if overrides.no_headless {
        config.headless = false;
    }
    config.limit = overrides.limit;
    config.listing_url = overrides.url;
    config
}

async fn cmd_scrape(book: BookVariant, overrides: ScrapeOverrides, quiet: bool) -> Result<()> {
    let app = load_config()?;
    let config = scrape_config(&app, book, overrides);

    info!(
        %book,
        url = config.listing_url(),
        out = %config.output_root.display(),
        limit = ?config.limit,
        "scraping book"
    );

    let result = if quiet {
        scrape_book(&config, &grantha_core::SilentProgress).await?
    } else {
        scrape_book(&config, &CliProgress::new()).await?
    };

    if !quiet {
        println!();
        println!("  Book scraped successfully!");
        println!("  Book:     {book}");
        println!("  Entries:  {}", result.entry_count);
        if result.missing_details > 0 {
            println!("  Missing:  {} detail pages", result.missing_details);
        }
        println!("  Path:     {}", result.book_dir.display());
        println!("  Time:     {:.1}s", result.elapsed.as_secs_f64());
        println!();
    }

    if result.entry_count == 0 {
        return Err(eyre!("no entries found for {book}"));
    }
    Ok(())
}

fn cmd_books() -> Result<()> {
    println!(
        "{:<16} {:<42} {:<7} {:<24} {:>8}",
        "BOOK", "LISTING", "SCROLL", "LAYOUT", "EXPECTED"
    );
    for book in BookVariant::ALL {
        let config = book.config();
        println!(
            "{:<16} {:<42} {:<7} {:<24} {:>8}",
            book.key(),
            config.url,
            if config.infinite_scroll { "yes" } else { "no" },
            organization_label(config.organization),
            config.expected_count
        );
    }
    Ok(())
}

fn organization_label(organization: Organization) -> &'static str {
    match organization {
        Organization::Flat => "flat",
        Organization::HierarchicalByNumber => "hierarchical-by-number",
        Organization::GroupedByCategory => "grouped-by-category",
    }
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn listing_loaded(&self, entries: usize) {
        self.spinner
            .set_message(format!("Listing loaded: {entries} entries"));
    }

    fn entry_scraped(&self, number: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Scraping [{current}/{total}] {number}"));
    }

    fn done(&self, _result: &ScrapeResult) {
        self.spinner.finish_and_clear();
    }
}
