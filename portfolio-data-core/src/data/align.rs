//! Month alignment across symbols.
//!
//! Collapses each symbol's dated closes to "YYYY-MM" labels and aligns all
//! symbols to the sorted union of months. Missing months are `None` — no
//! forward-fill of price data.

use super::provider::{MonthlyClose, PriceTable};
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeSet, HashMap};

/// "YYYY-MM" label for a date. Lexicographic order matches chronological.
pub fn month_label(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Collapse a close series to one observation per month.
///
/// Observations are sorted by date first; within a month the last one wins,
/// matching a monthly resample of adjusted closes.
pub fn collapse_to_months(closes: &[MonthlyClose]) -> Vec<(String, f64)> {
    let mut sorted: Vec<MonthlyClose> = closes.to_vec();
    sorted.sort_by_key(|c| c.date);

    let mut out: Vec<(String, f64)> = Vec::with_capacity(sorted.len());
    for c in sorted {
        let label = month_label(c.date);
        match out.last_mut() {
            Some((last, close)) if *last == label => *close = c.close,
            _ => out.push((label, c.close)),
        }
    }
    out
}

/// Close data for multiple symbols on a common month axis.
#[derive(Debug)]
pub struct AlignedTable {
    /// The common month axis (sorted ascending).
    pub months: Vec<String>,
    /// Closes per symbol, aligned to `months`. Each inner Vec has the same
    /// length as `months`; `None` marks a missing month.
    pub closes: HashMap<String, Vec<Option<f64>>>,
}

impl AlignedTable {
    pub fn get(&self, symbol: &str) -> Option<&[Option<f64>]> {
        self.closes.get(symbol).map(|v| v.as_slice())
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.closes.contains_key(symbol)
    }
}

/// Align all symbols in a price table to the union of their months.
pub fn align_months(table: &PriceTable) -> AlignedTable {
    let collapsed: HashMap<&str, Vec<(String, f64)>> = table
        .iter()
        .map(|(symbol, closes)| (symbol, collapse_to_months(closes)))
        .collect();

    let mut all_months = BTreeSet::new();
    for series in collapsed.values() {
        for (month, _) in series {
            all_months.insert(month.clone());
        }
    }
    let months: Vec<String> = all_months.into_iter().collect();

    let mut aligned: HashMap<String, Vec<Option<f64>>> = HashMap::new();
    for (symbol, series) in collapsed {
        let by_month: HashMap<&str, f64> =
            series.iter().map(|(m, c)| (m.as_str(), *c)).collect();
        let row: Vec<Option<f64>> = months
            .iter()
            .map(|m| by_month.get(m.as_str()).copied())
            .collect();
        aligned.insert(symbol.to_string(), row);
    }

    AlignedTable {
        months,
        closes: aligned,
    }
}
