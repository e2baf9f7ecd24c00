//! Event style scraper CLI.
//!
//! - `scrape` runs the extraction pipeline for one URL and exports the config
//! - `verify-color` checks a scraped color against the live page

mod cmd;
mod config;

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "style-scraper")]
#[command(version)]
#[command(about = "Extract styles and brand voice from event websites")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape an event website and export its style configuration
    Scrape(cmd::scrape::ScrapeArgs),

    /// Compare a scraped color against the element's style on the live page
    VerifyColor(cmd::verify::VerifyArgs),
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,style_scraper=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Scrape(args) => cmd::scrape::run(args).await,
        Commands::VerifyColor(args) => cmd::verify::run(args).await,
    }
}
