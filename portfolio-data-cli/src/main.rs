//! Portfolio data builder CLI.
//!
//! One command: fetch 20 years of monthly data for the ticker universe plus
//! SPY, derive returns, compute the correlation matrix, and write
//! `portfolio_data.json`. Running with no flags reproduces the stock build;
//! the date window, output path, and universe file can be overridden.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use portfolio_data_core::data::YahooMonthlyProvider;
use portfolio_data_core::pipeline::{build_document, StdoutProgress};
use portfolio_data_core::registry::Registry;
use std::path::PathBuf;

/// Days of slack past 20 years so the window always covers 240 full months.
const LOOKBACK_DAYS: i64 = 20 * 365 + 60;

#[derive(Parser)]
#[command(
    name = "portfolio-data",
    about = "Build the pre-cached monthly-returns and correlation data file"
)]
struct Cli {
    /// Start date (YYYY-MM-DD). Defaults to 20 years (plus slack) ago.
    #[arg(long)]
    start: Option<String>,

    /// End date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    end: Option<String>,

    /// Output path for the JSON document.
    #[arg(long, default_value = "portfolio_data.json")]
    output: PathBuf,

    /// TOML universe file overriding the compiled-in ticker registry.
    #[arg(long)]
    registry: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let start_date = cli
        .start
        .as_deref()
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("invalid --start date")?
        .unwrap_or_else(|| {
            chrono::Local::now().date_naive() - chrono::Duration::days(LOOKBACK_DAYS)
        });

    let end_date = cli
        .end
        .as_deref()
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("invalid --end date")?
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let registry = match &cli.registry {
        Some(path) => Registry::from_file(path)
            .with_context(|| format!("load registry from {}", path.display()))?,
        None => Registry::default_universe(),
    };

    println!("Fetching monthly data from {start_date} to {end_date}");

    let provider = YahooMonthlyProvider::new();
    let (document, report) =
        build_document(&registry, &provider, start_date, end_date, &StdoutProgress)?;

    let bytes = document
        .write_to(&cli.output)
        .with_context(|| format!("write output to {}", cli.output.display()))?;

    println!(
        "\nSaved {} tickers + {} correlations to {} ({:.0} KB)",
        report.included,
        report.correlation_pairs,
        cli.output.display(),
        bytes as f64 / 1024.0
    );

    Ok(())
}
