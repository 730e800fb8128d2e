//! The output document: assembly, minified serialization, file write.
//!
//! The file is regenerated wholesale on each run and never patched. No
//! temp-file swap and no backup of a prior version — this is an offline
//! build step re-run on demand.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// The benchmark's return series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkSeries {
    pub dates: Vec<String>,
    pub returns: Vec<f64>,
}

/// One ticker's block: display metadata plus its labelled return series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerData {
    pub name: String,
    pub sector: String,
    pub dates: Vec<String>,
    pub returns: Vec<f64>,
}

/// The complete document written to `portfolio_data.json`.
///
/// Maps are BTreeMaps so repeated runs over identical data serialize
/// byte-identically (except `generated`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputDocument {
    /// Generation date, ISO date string (date only).
    pub generated: String,
    pub spy: BenchmarkSeries,
    pub tickers: BTreeMap<String, TickerData>,
    pub correlations: BTreeMap<String, f64>,
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("serialize output document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

impl OutputDocument {
    /// Serialize as minified JSON (no pretty-printing).
    pub fn to_minified_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Write the minified document to `path`. Returns the byte count written.
    pub fn write_to(&self, path: &Path) -> Result<usize, WriteError> {
        let json = self.to_minified_json()?;
        std::fs::write(path, &json).map_err(|source| WriteError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(json.len())
    }
}
