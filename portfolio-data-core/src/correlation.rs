//! Pairwise-complete Pearson correlation over monthly return series.
//!
//! Each pair is correlated over the months present in both series, not a
//! single common window — two symbols with little shared history still get
//! a coefficient over whatever they share. Undefined coefficients (fewer
//! than 2 shared months, or zero variance) are omitted entirely rather
//! than encoded as null; the consuming app assumes every present key is a
//! valid number.

use crate::returns::ReturnSeries;
use std::collections::{BTreeMap, HashMap};

/// Round to 3 decimal places.
pub fn round3(x: f64) -> f64 {
    (x * 1e3).round() / 1e3
}

/// Shared-month observation pairs for two series, in month order.
pub fn overlap(a: &ReturnSeries, b: &ReturnSeries) -> Vec<(f64, f64)> {
    let b_by_month = b.by_month();
    a.months
        .iter()
        .zip(a.values.iter())
        .filter_map(|(m, &x)| b_by_month.get(m.as_str()).map(|&y| (x, y)))
        .collect()
}

/// Pearson correlation coefficient over paired observations.
///
/// `None` when undefined: fewer than 2 pairs, zero variance in either
/// series, or a non-finite result.
pub fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    let n = pairs.len();
    if n < 2 {
        return None;
    }
    let nf = n as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / nf;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / nf;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for &(x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom <= 0.0 || !denom.is_finite() {
        return None;
    }

    let r = cov / denom;
    if r.is_finite() {
        // Floating-point accumulation can nudge a perfect pair past ±1
        Some(r.clamp(-1.0, 1.0))
    } else {
        None
    }
}

/// Upper-triangle pair correlations, keyed `"A,B"` with A preceding B in
/// the given symbol order. Self pairs and mirrored pairs never appear.
pub fn pair_correlations(
    order: &[String],
    series: &HashMap<String, ReturnSeries>,
) -> BTreeMap<String, f64> {
    let mut out = BTreeMap::new();
    for (i, a) in order.iter().enumerate() {
        for b in &order[i + 1..] {
            let (Some(sa), Some(sb)) = (series.get(a), series.get(b)) else {
                continue;
            };
            if let Some(r) = pearson(&overlap(sa, sb)) {
                out.insert(format!("{a},{b}"), round3(r));
            }
        }
    }
    out
}

/// Benchmark-to-symbol correlations, keyed `"<benchmark>,<symbol>"`.
///
/// A pair is emitted only when the shared history exceeds `min_overlap`
/// months; short or undefined pairs are silently omitted.
pub fn benchmark_correlations(
    benchmark_symbol: &str,
    benchmark: &ReturnSeries,
    order: &[String],
    series: &HashMap<String, ReturnSeries>,
    min_overlap: usize,
) -> BTreeMap<String, f64> {
    let mut out = BTreeMap::new();
    for symbol in order {
        let Some(s) = series.get(symbol) else {
            continue;
        };
        let pairs = overlap(benchmark, s);
        if pairs.len() <= min_overlap {
            continue;
        }
        if let Some(r) = pearson(&pairs) {
            out.insert(format!("{benchmark_symbol},{symbol}"), round3(r));
        }
    }
    out
}
