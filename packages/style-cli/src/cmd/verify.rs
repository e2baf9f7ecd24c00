//! `verify-color`: compare a scraped color with what the page shows.
//!
//! Exit codes: 0 when the scraped color matches within tolerance, 1 when it
//! does not, 2 on any operational error.

use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use style_scraper::{
    hex_to_channels, rgb_string_to_channels, ColorComparator, GuardedExtractor,
    HttpStyleExtractor, StyleExtractor, ToleranceComparison, DEFAULT_TOLERANCE,
};

use crate::config::CliConfig;

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Website URL to validate against
    #[arg(long)]
    pub url: String,

    /// Path to the scraped style config JSON
    #[arg(long)]
    pub config: PathBuf,

    /// CSS selector of the element to inspect
    #[arg(long)]
    pub selector: String,

    /// CSS property to check (e.g. backgroundColor, color)
    #[arg(long)]
    pub property: String,

    /// Expected hex color (e.g. #160822)
    #[arg(long)]
    pub expected: String,

    /// Max RGB difference allowed per channel
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    pub tolerance: u8,

    /// Page load timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Dotted path to the scraped color in the config
    #[arg(long, default_value = "colors.primary")]
    pub scraped_field: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Match,
    Mismatch,
}

pub async fn run(args: VerifyArgs) -> ExitCode {
    ExitCode::from(status(&execute(&args).await))
}

/// Process exit status for a verification result.
pub fn status(result: &Result<Outcome>) -> u8 {
    match result {
        Ok(Outcome::Match) => 0,
        Ok(Outcome::Mismatch) => 1,
        Err(e) => {
            eprintln!("{} {:#}", "❌ Error:".red().bold(), e);
            2
        }
    }
}

/// Walk a dotted path through nested JSON objects.
pub fn lookup_field<'a>(config: &'a Value, path: &str) -> Result<&'a Value> {
    let mut current = config;
    for part in path.split('.') {
        current = current.get(part).ok_or_else(|| {
            let available = current
                .as_object()
                .map(|map| map.keys().cloned().collect::<Vec<_>>().join(", "))
                .unwrap_or_default();
            anyhow!("Field not found in config: {path} (available fields: [{available}])")
        })?;
    }
    Ok(current)
}

fn verdict(result: &ToleranceComparison) -> colored::ColoredString {
    if result.matches {
        "✅ MATCH".green()
    } else {
        "❌ MISMATCH".red()
    }
}

/// Read the scraped color out of the exported config.
pub fn scraped_color(args: &VerifyArgs) -> Result<String> {
    let text = std::fs::read_to_string(&args.config)
        .with_context(|| format!("Config file not found: {}", args.config.display()))?;
    let config: Value = serde_json::from_str(&text)
        .with_context(|| format!("Config file is not valid JSON: {}", args.config.display()))?;

    let scraped = lookup_field(&config, &args.scraped_field)?
        .as_str()
        .with_context(|| format!("Field {} is not a string", args.scraped_field))?;
    Ok(scraped.to_string())
}

async fn actual_color(args: &VerifyArgs) -> Result<String> {
    let env = CliConfig::from_env()?;
    let user_agent = env.scraper_config(None, None).user_agent;
    let extractor = GuardedExtractor::new(HttpStyleExtractor::new(user_agent)?);
    let page = extractor
        .extract(&args.url, Duration::from_secs(args.timeout))
        .await?;

    let style = page.style_for(&args.selector)?;
    let actual = style.property(&args.property).with_context(|| {
        format!(
            "Property {} not available on {}",
            args.property, args.selector
        )
    })?;
    Ok(actual.to_string())
}

async fn execute(args: &VerifyArgs) -> Result<Outcome> {
    println!("🔍 Validating scraped color for {}", args.url);
    println!("📁 Config: {}", args.config.display());
    println!("🎯 Element: {}", args.selector);
    println!("🎨 Property: {}", args.property);
    println!();

    let scraped = scraped_color(args)?;
    println!("📋 Scraped color: {scraped}");

    println!("🌐 Fetching actual color from {}...", args.url);
    let actual = actual_color(args).await?;
    println!("{} {actual}", "✅ Actual color:".green());
    println!();

    compare_colors(args, &scraped, &actual)
}

/// Compare scraped and expected colors with the color read from the page.
pub fn compare_colors(args: &VerifyArgs, scraped: &str, actual: &str) -> Result<Outcome> {
    let scraped_rgb = hex_to_channels(scraped)?;
    let actual_rgb = rgb_string_to_channels(actual)?;
    let expected_rgb = hex_to_channels(&args.expected)?;

    let comparator = ColorComparator::new(args.tolerance);
    let scraped_result = comparator.compare(scraped_rgb, actual_rgb);
    let expected_result = comparator.compare(expected_rgb, actual_rgb);

    println!("📊 Comparison Results:");
    println!("  Scraped:  {scraped} → {scraped_rgb}");
    println!("  Expected: {} → {expected_rgb}", args.expected);
    println!("  Actual:   {actual} → {actual_rgb}");
    println!();
    println!(
        "  Scraped vs Actual:  Δ={} RGB units  {}",
        scraped_result.max_channel_diff,
        verdict(&scraped_result)
    );
    println!(
        "  Expected vs Actual: Δ={} RGB units  {}",
        expected_result.max_channel_diff,
        verdict(&expected_result)
    );
    println!();

    if scraped_result.matches {
        println!(
            "{}",
            "✅ SUCCESS: Scraped color matches the live page within tolerance".green()
        );
        println!(
            "   Difference: {} RGB units (max {} allowed)",
            scraped_result.max_channel_diff, args.tolerance
        );
        Ok(Outcome::Match)
    } else {
        println!(
            "{}",
            "❌ FAILURE: Scraped color differs from the live page beyond tolerance".red()
        );
        println!(
            "   Difference: {} RGB units (max {} allowed)",
            scraped_result.max_channel_diff, args.tolerance
        );
        println!();
        println!("Possible causes:");
        println!("  - Palette color invented instead of read from the page");
        println!("  - Wrong CSS selector or property");
        println!("  - Website styles changed since scraping");
        println!("  - Dynamic styles (light/dark mode, hover states, scripts)");
        Ok(Outcome::Mismatch)
    }
}
