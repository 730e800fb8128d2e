//! Portfolio Data Core — the monthly-returns data build behind the
//! portfolio diversification app.
//!
//! The pipeline is a linear batch job:
//! - Ticker registry (symbol → name/sector, fixed universe)
//! - Monthly adjusted-close fetch through the `MarketDataProvider` seam
//! - Month alignment and percentage-return derivation
//! - Pairwise-complete Pearson correlation matrix
//! - One minified JSON document written to disk

pub mod correlation;
pub mod data;
pub mod document;
pub mod pipeline;
pub mod registry;
pub mod returns;
