//! Percentage-return derivation — pure functions, aligned closes in,
//! labelled return series out.

use serde::{Deserialize, Serialize};

/// Monthly percentage returns with their "YYYY-MM" labels.
///
/// `months` and `values` always have equal length; months are strictly
/// increasing. The first present price has no prior-period return, so the
/// series is one shorter than the present observations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReturnSeries {
    pub months: Vec<String>,
    pub values: Vec<f64>,
}

impl ReturnSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Month → return lookup for overlap computations.
    pub fn by_month(&self) -> std::collections::BTreeMap<&str, f64> {
        self.months
            .iter()
            .map(|m| m.as_str())
            .zip(self.values.iter().copied())
            .collect()
    }
}

/// Round to 4 decimal places.
pub fn round4(x: f64) -> f64 {
    (x * 1e4).round() / 1e4
}

/// Number of non-missing observations in an aligned close row.
pub fn observation_count(closes: &[Option<f64>]) -> usize {
    closes.iter().filter(|c| c.is_some()).count()
}

/// Period-over-period percentage returns over the present observations.
///
/// Missing months are dropped first, so a return spans a gap when the
/// intermediate months are absent (pairwise over consecutive present
/// observations). Each return is `(p[t]/p[t-1] - 1) * 100`, rounded to
/// 4 decimals and labelled with the month of `p[t]`.
pub fn percentage_returns(months: &[String], closes: &[Option<f64>]) -> ReturnSeries {
    debug_assert_eq!(months.len(), closes.len());

    let present: Vec<(&String, f64)> = months
        .iter()
        .zip(closes.iter())
        .filter_map(|(m, c)| c.map(|v| (m, v)))
        .collect();

    let mut series = ReturnSeries::default();
    for window in present.windows(2) {
        let (_, prev) = window[0];
        let (month, cur) = window[1];
        series.months.push(month.clone());
        series.values.push(round4((cur / prev - 1.0) * 100.0));
    }
    series
}
