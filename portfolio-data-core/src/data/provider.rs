//! Market data provider seam and structured error types.
//!
//! `MarketDataProvider` abstracts the external price source behind a narrow
//! interface (symbols, date range → monthly adjusted closes) so the concrete
//! Yahoo integration stays swappable and the pipeline is mockable in tests.

use chrono::NaiveDate;
use std::collections::HashMap;
use thiserror::Error;

/// One monthly observation: date and split/dividend-adjusted close.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyClose {
    pub date: NaiveDate,
    pub close: f64,
}

/// Closing prices per symbol, as returned by a provider.
///
/// Symbols the provider could not serve simply have no entry.
#[derive(Debug, Default)]
pub struct PriceTable {
    closes: HashMap<String, Vec<MonthlyClose>>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: impl Into<String>, series: Vec<MonthlyClose>) {
        self.closes.insert(symbol.into(), series);
    }

    pub fn get(&self, symbol: &str) -> Option<&[MonthlyClose]> {
        self.closes.get(symbol).map(|v| v.as_slice())
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.closes.contains_key(symbol)
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn symbol_count(&self) -> usize {
        self.closes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[MonthlyClose])> {
        self.closes.iter().map(|(s, v)| (s.as_str(), v.as_slice()))
    }
}

/// Structured errors for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("empty response for {symbol}")]
    EmptyResponse { symbol: String },

    #[error("data error: {0}")]
    Other(String),
}

/// Trait for monthly market data providers.
///
/// Interval is always monthly and closes are always adjusted; providers do
/// not expose other granularities. One attempt per call — no retries.
pub trait MarketDataProvider {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch monthly adjusted closes for one symbol over a date range,
    /// in ascending date order.
    fn fetch_monthly(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<MonthlyClose>, DataError>;
}
