//! End-to-end pipeline tests against a mock provider.
//!
//! These drive the full fetch → align → returns → correlations → document
//! path with synthetic price series whose correlations are known exactly.

use chrono::NaiveDate;
use portfolio_data_core::data::provider::{DataError, MarketDataProvider, MonthlyClose};
use portfolio_data_core::pipeline::{build_document, PipelineError, SilentProgress, SymbolOutcome};
use portfolio_data_core::registry::{Registry, TickerEntry};
use std::collections::HashMap;

struct MockProvider {
    series: HashMap<String, Vec<MonthlyClose>>,
}

impl MockProvider {
    fn new() -> Self {
        Self {
            series: HashMap::new(),
        }
    }

    fn with(mut self, symbol: &str, closes: Vec<MonthlyClose>) -> Self {
        self.series.insert(symbol.to_string(), closes);
        self
    }
}

impl MarketDataProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn fetch_monthly(
        &self,
        symbol: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<MonthlyClose>, DataError> {
        self.series
            .get(symbol)
            .cloned()
            .ok_or_else(|| DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
    }
}

fn entry(symbol: &str, name: &str, sector: &str) -> TickerEntry {
    TickerEntry {
        symbol: symbol.into(),
        name: name.into(),
        sector: sector.into(),
    }
}

/// First-of-month dates starting at 2020-01.
fn month_date(index: usize) -> NaiveDate {
    let year = 2020 + (index / 12) as i32;
    let month = (index % 12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1).unwrap()
}

/// Build a monthly close series from a start price and percentage returns.
fn closes_from_returns(start_price: f64, returns_pct: &[f64]) -> Vec<MonthlyClose> {
    let mut closes = vec![MonthlyClose {
        date: month_date(0),
        close: start_price,
    }];
    let mut price = start_price;
    for (i, r) in returns_pct.iter().enumerate() {
        price *= 1.0 + r / 100.0;
        closes.push(MonthlyClose {
            date: month_date(i + 1),
            close: price,
        });
    }
    closes
}

/// 24 varying monthly returns (25 prices) for the known-correlation tests.
fn base_returns() -> Vec<f64> {
    let cycle = [1.0, 2.5, -1.5, 0.5, 3.0, -2.0];
    cycle.iter().cycle().take(24).copied().collect()
}

fn known_setup() -> (Registry, MockProvider) {
    let registry = Registry {
        tickers: vec![
            entry("AAA", "Alpha Corp", "Technology"),
            entry("BBB", "Beta Corp", "Financials"),
            entry("CCC", "Gamma Corp", "Energy"),
            entry("DDD", "Delta Corp", "Utilities"),
        ],
    };

    let base = base_returns();
    let negated: Vec<f64> = base.iter().map(|r| -r).collect();
    let halved: Vec<f64> = base.iter().map(|r| r / 2.0).collect();
    // DDD has only 10 months of prices — below the 24-month gate
    let short: Vec<f64> = base.iter().take(9).copied().collect();

    let provider = MockProvider::new()
        .with("SPY", closes_from_returns(300.0, &halved))
        .with("AAA", closes_from_returns(100.0, &base))
        .with("BBB", closes_from_returns(50.0, &base))
        .with("CCC", closes_from_returns(80.0, &negated))
        .with("DDD", closes_from_returns(20.0, &short));

    (registry, provider)
}

fn window() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2022, 6, 30).unwrap(),
    )
}

#[test]
fn derived_returns_match_formula() {
    let (registry, provider) = known_setup();
    let (start, end) = window();
    let (doc, _) = build_document(&registry, &provider, start, end, &SilentProgress).unwrap();

    let aaa = &doc.tickers["AAA"];
    assert_eq!(aaa.returns.len(), 24);
    assert_eq!(aaa.dates.len(), 24);
    assert_eq!(aaa.dates[0], "2020-02");
    assert_eq!(aaa.dates[23], "2022-01");
    // Prices were built from these exact returns; 4-decimal rounding
    // recovers them
    assert_eq!(aaa.returns, base_returns());
    assert_eq!(aaa.name, "Alpha Corp");
    assert_eq!(aaa.sector, "Technology");
}

#[test]
fn known_correlations_to_three_decimals() {
    let (registry, provider) = known_setup();
    let (start, end) = window();
    let (doc, _) = build_document(&registry, &provider, start, end, &SilentProgress).unwrap();

    // AAA and BBB have identical returns → +1.0; CCC is the negation → -1.0
    assert_eq!(doc.correlations["AAA,BBB"], 1.0);
    assert_eq!(doc.correlations["AAA,CCC"], -1.0);
    assert_eq!(doc.correlations["BBB,CCC"], -1.0);

    // SPY's returns are a positive scaling of AAA's
    assert_eq!(doc.correlations["SPY,AAA"], 1.0);
    assert_eq!(doc.correlations["SPY,CCC"], -1.0);
}

#[test]
fn short_history_symbol_is_fully_excluded() {
    let (registry, provider) = known_setup();
    let (start, end) = window();
    let (doc, report) = build_document(&registry, &provider, start, end, &SilentProgress).unwrap();

    assert!(!doc.tickers.contains_key("DDD"));
    assert!(!doc.correlations.keys().any(|k| k.contains("DDD")));

    let (_, outcome) = report
        .outcomes
        .iter()
        .find(|(s, _)| s == "DDD")
        .unwrap();
    assert!(matches!(outcome, SymbolOutcome::Skipped { .. }));
    assert_eq!(report.included, 3);
    assert_eq!(report.skipped, 1);
}

#[test]
fn correlations_are_upper_triangle_and_finite() {
    let (registry, provider) = known_setup();
    let (start, end) = window();
    let (doc, _) = build_document(&registry, &provider, start, end, &SilentProgress).unwrap();

    for (key, value) in &doc.correlations {
        assert!(value.is_finite(), "{key} is not finite");
        assert!((-1.0..=1.0).contains(value), "{key} out of range: {value}");

        let (a, b) = key.split_once(',').unwrap();
        assert_ne!(a, b, "self pair: {key}");
        let mirrored = format!("{b},{a}");
        assert!(
            !doc.correlations.contains_key(&mirrored),
            "both {key} and {mirrored} present"
        );
    }

    // 3 valid tickers → 3 ticker pairs + 3 SPY pairs
    assert_eq!(doc.correlations.len(), 6);
}

#[test]
fn missing_symbol_is_skipped_not_fatal() {
    let (mut registry, provider) = known_setup();
    registry
        .tickers
        .push(entry("NOPE", "Ghost Corp", "Technology"));

    let (start, end) = window();
    let (doc, report) = build_document(&registry, &provider, start, end, &SilentProgress).unwrap();

    assert!(!doc.tickers.contains_key("NOPE"));
    let (_, outcome) = report
        .outcomes
        .iter()
        .find(|(s, _)| s == "NOPE")
        .unwrap();
    assert!(matches!(outcome, SymbolOutcome::Skipped { .. }));
    // The rest of the batch is unaffected
    assert_eq!(report.included, 3);
}

#[test]
fn empty_fetch_is_fatal() {
    let registry = Registry {
        tickers: vec![entry("AAA", "Alpha Corp", "Technology")],
    };
    let provider = MockProvider::new();
    let (start, end) = window();

    let err = build_document(&registry, &provider, start, end, &SilentProgress).unwrap_err();
    assert!(matches!(err, PipelineError::EmptyFetch));
}

#[test]
fn missing_benchmark_is_fatal() {
    let registry = Registry {
        tickers: vec![entry("AAA", "Alpha Corp", "Technology")],
    };
    let provider = MockProvider::new().with("AAA", closes_from_returns(100.0, &base_returns()));
    let (start, end) = window();

    let err = build_document(&registry, &provider, start, end, &SilentProgress).unwrap_err();
    assert!(matches!(err, PipelineError::Benchmark { .. }));
}

#[test]
fn rerun_on_identical_data_is_byte_identical_except_generated() {
    let (registry, provider) = known_setup();
    let (start, end) = window();

    let (mut doc1, _) = build_document(&registry, &provider, start, end, &SilentProgress).unwrap();
    let (mut doc2, _) = build_document(&registry, &provider, start, end, &SilentProgress).unwrap();

    // Pin the generation date; everything else must match byte for byte
    doc1.generated = "2026-08-26".into();
    doc2.generated = "2026-08-26".into();

    assert_eq!(
        doc1.to_minified_json().unwrap(),
        doc2.to_minified_json().unwrap()
    );
}

#[test]
fn document_json_has_expected_top_level_shape() {
    let (registry, provider) = known_setup();
    let (start, end) = window();
    let (doc, _) = build_document(&registry, &provider, start, end, &SilentProgress).unwrap();

    let json = doc.to_minified_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert!(value["generated"].is_string());
    assert!(value["spy"]["dates"].is_array());
    assert!(value["spy"]["returns"].is_array());
    assert_eq!(
        value["spy"]["dates"].as_array().unwrap().len(),
        value["spy"]["returns"].as_array().unwrap().len()
    );
    assert!(value["tickers"]["AAA"]["name"].is_string());
    assert!(value["correlations"].is_object());
}
