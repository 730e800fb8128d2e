//! Yahoo Finance monthly data provider.
//!
//! Fetches monthly bars from Yahoo's v8 chart API with
//! `interval=1mo&includeAdjustedClose=true` and keeps the adjusted closes.
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes. Each symbol gets exactly one request per run — a failure skips
//! the symbol rather than retrying.

use super::provider::{DataError, MarketDataProvider, MonthlyClose};
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

/// Yahoo Finance provider for monthly adjusted closes.
pub struct YahooMonthlyProvider {
    client: reqwest::blocking::Client,
}

impl YahooMonthlyProvider {
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .expect("failed to build HTTP client");

        Self { client }
    }

    /// Build the chart API URL for a symbol and date range.
    fn chart_url(symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp();
        let end_ts = end.and_hms_opt(23, 59, 59).unwrap().and_utc().timestamp();
        format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{symbol}\
             ?period1={start_ts}&period2={end_ts}&interval=1mo\
             &includeAdjustedClose=true"
        )
    }

    /// Parse the chart API response into monthly closes.
    ///
    /// Prefers adjusted closes; falls back to raw closes when the adjclose
    /// block is absent. Null observations are skipped.
    fn parse_response(symbol: &str, resp: ChartResponse) -> Result<Vec<MonthlyClose>, DataError> {
        let result = resp.chart.result.ok_or_else(|| {
            if let Some(err) = resp.chart.error {
                if err.code == "Not Found" {
                    DataError::SymbolNotFound {
                        symbol: symbol.to_string(),
                    }
                } else {
                    DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
                }
            } else {
                DataError::ResponseFormatChanged("empty result with no error".into())
            }
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        let timestamps = data
            .timestamp
            .ok_or_else(|| DataError::ResponseFormatChanged("no timestamps".into()))?;

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let adj_closes = data
            .indicators
            .adjclose
            .and_then(|v| v.into_iter().next())
            .map(|a| a.adjclose);

        let mut closes = Vec::with_capacity(timestamps.len());

        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            let close = adj_closes
                .as_ref()
                .and_then(|v| v.get(i).copied().flatten())
                .or_else(|| quote.close.get(i).copied().flatten());

            // Null close = no observation for that month
            if let Some(close) = close {
                closes.push(MonthlyClose { date, close });
            }
        }

        if closes.is_empty() {
            return Err(DataError::EmptyResponse {
                symbol: symbol.to_string(),
            });
        }

        Ok(closes)
    }
}

impl Default for YahooMonthlyProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketDataProvider for YahooMonthlyProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch_monthly(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<MonthlyClose>, DataError> {
        let url = Self::chart_url(symbol, start, end);

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        if !status.is_success() {
            return Err(DataError::Other(format!("HTTP {status} for {symbol}")));
        }

        let chart: ChartResponse = resp.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })?;

        Self::parse_response(symbol, chart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(symbol: &str, json: &str) -> Result<Vec<MonthlyClose>, DataError> {
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        YahooMonthlyProvider::parse_response(symbol, resp)
    }

    #[test]
    fn parses_adjusted_closes() {
        // Timestamps: 2024-01-01 and 2024-02-01 UTC
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704067200, 1706745600],
                    "indicators": {
                        "quote": [{"close": [480.0, 500.0]}],
                        "adjclose": [{"adjclose": [475.31, 495.12]}]
                    }
                }],
                "error": null
            }
        }"#;

        let closes = parse("SPY", json).unwrap();
        assert_eq!(closes.len(), 2);
        assert_eq!(closes[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(closes[0].close, 475.31);
        assert_eq!(closes[1].close, 495.12);
    }

    #[test]
    fn falls_back_to_raw_close_without_adjclose() {
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704067200],
                    "indicators": {
                        "quote": [{"close": [480.0]}]
                    }
                }],
                "error": null
            }
        }"#;

        let closes = parse("SPY", json).unwrap();
        assert_eq!(closes.len(), 1);
        assert_eq!(closes[0].close, 480.0);
    }

    #[test]
    fn skips_null_observations() {
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704067200, 1706745600, 1709251200],
                    "indicators": {
                        "quote": [{"close": [480.0, null, 510.0]}],
                        "adjclose": [{"adjclose": [475.31, null, 505.4]}]
                    }
                }],
                "error": null
            }
        }"#;

        let closes = parse("SPY", json).unwrap();
        assert_eq!(closes.len(), 2);
        assert_eq!(closes[0].close, 475.31);
        assert_eq!(closes[1].close, 505.4);
    }

    #[test]
    fn unknown_symbol_maps_to_not_found() {
        let json = r#"{
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found"}
            }
        }"#;

        let err = parse("ZZZZ", json).unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound { .. }));
    }

    #[test]
    fn all_null_closes_is_empty_response() {
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704067200],
                    "indicators": {
                        "quote": [{"close": [null]}],
                        "adjclose": [{"adjclose": [null]}]
                    }
                }],
                "error": null
            }
        }"#;

        let err = parse("SPY", json).unwrap_err();
        assert!(matches!(err, DataError::EmptyResponse { .. }));
    }

    #[test]
    fn chart_url_uses_monthly_interval() {
        let url = YahooMonthlyProvider::chart_url(
            "AAPL",
            NaiveDate::from_ymd_opt(2005, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        );
        assert!(url.contains("/v8/finance/chart/AAPL"));
        assert!(url.contains("interval=1mo"));
        assert!(url.contains("includeAdjustedClose=true"));
    }
}
