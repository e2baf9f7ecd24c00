//! `scrape`: run the pipeline for one URL and export the result.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use style_scraper::{ComputedStyleAnalyst, HttpStyleExtractor, StylePipeline};
use tracing::debug;

use crate::config::CliConfig;

#[derive(Args, Debug)]
pub struct ScrapeArgs {
    /// URL of the event website to scrape
    #[arg(long)]
    pub url: String,

    /// Timeout in seconds for scraping operations (default: 60)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Directory the configuration is written to (default: style-configs)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Fail when palette colors cannot be found on the page
    #[arg(long)]
    pub strict: bool,
}

pub async fn run(args: ScrapeArgs) -> ExitCode {
    match execute(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "❌ Scraping failed:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(args: ScrapeArgs) -> Result<()> {
    let env = CliConfig::from_env()?;
    let mut config = env.scraper_config(args.timeout, args.output_dir);
    if args.strict {
        config = config.with_strict_grounding(true);
    }
    debug!(?config, "Resolved scraper configuration");

    println!("🔍 Scraping website: {}", args.url);
    println!("⏱️  Timeout: {}s", config.timeout.as_secs());
    println!();

    let extractor =
        HttpStyleExtractor::from_config(&config).context("Failed to create HTTP client")?;
    let mut pipeline = StylePipeline::new(&args.url, extractor, ComputedStyleAnalyst::new(), config)?;

    println!("🤖 Starting style extraction...");
    let style = pipeline.start().await?;

    println!("{}", "✅ Style extraction completed!".green());
    println!();
    println!("   Event: {}", style.event_name);
    println!("   ID: {}", style.event_id);
    println!(
        "   Colors: {}, {}",
        style.colors.primary, style.colors.secondary
    );

    if let Some(report) = pipeline.grounding() {
        for entry in report.entries.iter().filter(|e| !e.grounded) {
            println!(
                "   {} {} {} not observed on the page",
                "⚠️".yellow(),
                entry.field,
                entry.value
            );
        }
    }
    println!();

    println!("💾 Exporting configuration...");
    let path = pipeline
        .export(&style)
        .with_context(|| format!("Failed to export {}", style.event_id))?;

    println!();
    println!("{}", "✅ Success! Configuration saved to:".green().bold());
    println!("   {}", path.display());

    Ok(())
}
