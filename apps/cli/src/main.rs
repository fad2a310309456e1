//! grantha CLI: scrape grammar texts from ashtadhyayi.com.
//!
//! Drives a browser over a book's listing and detail pages and writes the
//! result as a Markdown directory with an index and a JSON manifest.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
