//! Pipeline orchestration: fetch → align → returns → correlations → document.
//!
//! Per-symbol failures are collected as outcomes (included or skipped with a
//! reason) rather than propagated — one bad ticker never aborts the batch.
//! Only two conditions are fatal: the fetch returned no data at all, or the
//! benchmark could not be processed.

use crate::correlation::{benchmark_correlations, pair_correlations};
use crate::data::align::align_months;
use crate::data::provider::{MarketDataProvider, PriceTable};
use crate::document::{BenchmarkSeries, OutputDocument, TickerData};
use crate::registry::Registry;
use crate::returns::{observation_count, percentage_returns, ReturnSeries};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// The reference index fund all symbols are measured against.
pub const BENCHMARK_SYMBOL: &str = "SPY";

/// Symbols with fewer monthly observations than this are excluded —
/// short histories make correlation statistically unreliable.
pub const MIN_HISTORY_MONTHS: usize = 24;

/// Benchmark pairs need strictly more shared months than this.
pub const BENCHMARK_MIN_OVERLAP: usize = 12;

/// Fatal pipeline failures. Everything else is a per-symbol skip.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no data returned for any symbol")]
    EmptyFetch,

    #[error("benchmark {symbol} processing failed: {reason}")]
    Benchmark { symbol: String, reason: String },
}

/// Why a registry symbol was excluded from the output.
#[derive(Debug, Clone)]
pub enum SkipReason {
    /// The provider's result did not include the symbol.
    NotInData,
    /// Fewer than [`MIN_HISTORY_MONTHS`] non-missing monthly closes.
    ShortHistory { months: usize },
    /// The fetch itself failed for this symbol.
    FetchFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotInData => write!(f, "NOT IN DATA"),
            SkipReason::ShortHistory { months } => {
                write!(f, "only {months} months, skipping")
            }
            SkipReason::FetchFailed(reason) => write!(f, "FAILED ({reason})"),
        }
    }
}

/// Result-per-item outcome for one registry symbol.
#[derive(Debug, Clone)]
pub enum SymbolOutcome {
    Included { months: usize },
    Skipped { reason: SkipReason },
}

/// Progress reporting for the batch. Console output goes through this seam
/// so tests can run silently.
pub trait BuildProgress {
    /// Called before the fetch loop starts.
    fn on_fetch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called once the benchmark's return series is derived.
    fn on_benchmark(&self, months: usize) {
        let _ = months;
    }

    /// Called per registry symbol with its outcome.
    fn on_symbol(&self, symbol: &str, outcome: &SymbolOutcome) {
        let _ = (symbol, outcome);
    }

    /// Called after the correlation matrix is assembled.
    fn on_correlations(&self, pair_count: usize) {
        let _ = pair_count;
    }
}

/// Prints progress lines matching the job's console contract.
pub struct StdoutProgress;

impl BuildProgress for StdoutProgress {
    fn on_fetch_start(&self, total: usize) {
        println!("  Downloading {total} tickers...");
    }

    fn on_benchmark(&self, months: usize) {
        println!("  Processing {BENCHMARK_SYMBOL} ... {months} months");
    }

    fn on_symbol(&self, symbol: &str, outcome: &SymbolOutcome) {
        match outcome {
            SymbolOutcome::Included { months } => println!("  {symbol} ... {months} months"),
            SymbolOutcome::Skipped { reason } => println!("  {symbol} ... {reason}"),
        }
    }

    fn on_correlations(&self, pair_count: usize) {
        println!("  Computing correlation matrix... {pair_count} pairs");
    }
}

/// No-op progress for tests.
pub struct SilentProgress;

impl BuildProgress for SilentProgress {}

/// Summary of one build run.
#[derive(Debug)]
pub struct BuildReport {
    pub outcomes: Vec<(String, SymbolOutcome)>,
    pub included: usize,
    pub skipped: usize,
    pub correlation_pairs: usize,
}

/// Run the full pipeline and assemble the output document.
///
/// Fetches the benchmark plus every registry symbol (one attempt each),
/// aligns months, derives return series, applies the minimum-history gate,
/// and computes the correlation matrix.
pub fn build_document(
    registry: &Registry,
    provider: &dyn MarketDataProvider,
    start: NaiveDate,
    end: NaiveDate,
    progress: &dyn BuildProgress,
) -> Result<(OutputDocument, BuildReport), PipelineError> {
    // Fetch phase: benchmark first, then the universe. Per-symbol fetch
    // failures are recorded and resolved into skip outcomes below.
    let mut symbols: Vec<&str> = vec![BENCHMARK_SYMBOL];
    symbols.extend(registry.symbols());
    progress.on_fetch_start(symbols.len());

    let mut table = PriceTable::new();
    let mut fetch_errors: HashMap<String, String> = HashMap::new();
    for symbol in &symbols {
        match provider.fetch_monthly(symbol, start, end) {
            Ok(closes) => table.insert(*symbol, closes),
            Err(e) => {
                fetch_errors.insert(symbol.to_string(), e.to_string());
            }
        }
    }

    if table.is_empty() {
        return Err(PipelineError::EmptyFetch);
    }

    let aligned = align_months(&table);

    // Benchmark processing is fatal on failure.
    let spy_closes = aligned.get(BENCHMARK_SYMBOL).ok_or_else(|| {
        let reason = fetch_errors
            .get(BENCHMARK_SYMBOL)
            .cloned()
            .unwrap_or_else(|| "not in data".to_string());
        PipelineError::Benchmark {
            symbol: BENCHMARK_SYMBOL.to_string(),
            reason,
        }
    })?;
    let spy_returns = percentage_returns(&aligned.months, spy_closes);
    if spy_returns.is_empty() {
        return Err(PipelineError::Benchmark {
            symbol: BENCHMARK_SYMBOL.to_string(),
            reason: "no returns derivable".to_string(),
        });
    }
    progress.on_benchmark(spy_returns.len());

    // Per-symbol processing: gate on history length, collect outcomes.
    let mut outcomes: Vec<(String, SymbolOutcome)> = Vec::with_capacity(registry.len());
    let mut valid_order: Vec<String> = Vec::new();
    let mut return_series: HashMap<String, ReturnSeries> = HashMap::new();
    let mut tickers = std::collections::BTreeMap::new();

    for entry in &registry.tickers {
        let symbol = entry.symbol.as_str();

        let outcome = if let Some(reason) = fetch_errors.get(symbol) {
            SymbolOutcome::Skipped {
                reason: SkipReason::FetchFailed(reason.clone()),
            }
        } else if let Some(closes) = aligned.get(symbol) {
            let months = observation_count(closes);
            if months < MIN_HISTORY_MONTHS {
                SymbolOutcome::Skipped {
                    reason: SkipReason::ShortHistory { months },
                }
            } else {
                let series = percentage_returns(&aligned.months, closes);
                let month_count = series.len();

                tickers.insert(
                    symbol.to_string(),
                    TickerData {
                        name: entry.name.clone(),
                        sector: entry.sector.clone(),
                        dates: series.months.clone(),
                        returns: series.values.clone(),
                    },
                );
                valid_order.push(symbol.to_string());
                return_series.insert(symbol.to_string(), series);

                SymbolOutcome::Included {
                    months: month_count,
                }
            }
        } else {
            SymbolOutcome::Skipped {
                reason: SkipReason::NotInData,
            }
        };

        progress.on_symbol(symbol, &outcome);
        outcomes.push((symbol.to_string(), outcome));
    }

    // Correlations: upper triangle in registry order, then benchmark pairs.
    let mut correlations = pair_correlations(&valid_order, &return_series);
    correlations.extend(benchmark_correlations(
        BENCHMARK_SYMBOL,
        &spy_returns,
        &valid_order,
        &return_series,
        BENCHMARK_MIN_OVERLAP,
    ));
    progress.on_correlations(correlations.len());

    let included = valid_order.len();
    let report = BuildReport {
        skipped: outcomes.len() - included,
        included,
        correlation_pairs: correlations.len(),
        outcomes,
    };

    let document = OutputDocument {
        generated: chrono::Local::now().date_naive().to_string(),
        spy: BenchmarkSeries {
            dates: spy_returns.months,
            returns: spy_returns.values,
        },
        tickers,
        correlations,
    };

    Ok((document, report))
}
