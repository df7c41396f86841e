//! Derived metrics over per-location series.
//!
//! Series are `Option<f64>` slices in date order; `None` is a missing value.
//! Missing values propagate through rolling windows and are skipped pairwise
//! by correlation.

use chrono::NaiveDate;
use serde::Serialize;

use super::error::DataError;
use super::model::Observation;

// ---------------------------------------------------------------------------
// Rolling mean
// ---------------------------------------------------------------------------

/// Trailing simple moving average over `window` observations.
///
/// `out[i]` is defined only when `i >= window - 1` and every value in
/// `series[i + 1 - window..=i]` is present. A zero window yields no values.
pub fn rolling_average(series: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; series.len()];
    if window == 0 || series.len() < window {
        return out;
    }

    for (i, slot) in out.iter_mut().enumerate().skip(window - 1) {
        let span = &series[i + 1 - window..=i];
        let sum: Option<f64> = span.iter().copied().sum();
        *slot = sum.map(|s| s / window as f64);
    }
    out
}

// ---------------------------------------------------------------------------
// Pearson correlation
// ---------------------------------------------------------------------------

/// Square, symmetric matrix of Pearson coefficients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    fields: Vec<String>,
    /// Row-major, `fields.len()²` entries. `None` where undefined.
    values: Vec<Option<f64>>,
}

impl CorrelationMatrix {
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Coefficient for a pair of fields; `None` if undefined or unknown.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.fields.iter().position(|f| f == a)?;
        let j = self.fields.iter().position(|f| f == b)?;
        self.at(i, j)
    }

    pub fn at(&self, i: usize, j: usize) -> Option<f64> {
        let n = self.fields.len();
        if i >= n || j >= n {
            return None;
        }
        self.values[i * n + j]
    }
}

/// Pearson correlation between the named numeric fields of `rows`.
///
/// Repeated names are ignored. Fewer than two distinct fields is an error;
/// a pair with fewer than two jointly present rows is left undefined.
pub fn correlation_matrix(rows: &[Observation], fields: &[&str]) -> Result<CorrelationMatrix, DataError> {
    let series: Vec<(&str, Vec<Option<f64>>)> = fields
        .iter()
        .map(|&f| (f, rows.iter().map(|o| o.value(f)).collect()))
        .collect();
    correlation_matrix_of_series(&series)
}

/// Same as [`correlation_matrix`] over already extracted named series.
pub fn correlation_matrix_of_series<S: AsRef<[Option<f64>]>>(
    series: &[(&str, S)],
) -> Result<CorrelationMatrix, DataError> {
    let mut columns: Vec<(&str, &[Option<f64>])> = Vec::with_capacity(series.len());
    for (name, values) in series {
        if !columns.iter().any(|(n, _)| n == name) {
            columns.push((*name, values.as_ref()));
        }
    }
    if columns.len() < 2 {
        return Err(DataError::insufficient("correlation matrix fields", 2, columns.len()));
    }

    let n = columns.len();
    let mut values = vec![None; n * n];
    for i in 0..n {
        for j in i..n {
            let r = pearson(columns[i].1, columns[j].1).map(|r| if i == j { 1.0 } else { r });
            values[i * n + j] = r;
            values[j * n + i] = r;
        }
    }

    Ok(CorrelationMatrix {
        fields: columns.iter().map(|(name, _)| name.to_string()).collect(),
        values,
    })
}

/// Pearson coefficient over rows where both sides are present.
pub fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for &(x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

// ---------------------------------------------------------------------------
// Descriptive statistics
// ---------------------------------------------------------------------------

/// Count, moments and quartiles of the present values of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; undefined for a single value.
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

pub fn describe(series: &[Option<f64>]) -> Result<SummaryStats, DataError> {
    let mut values: Vec<f64> = series.iter().flatten().copied().collect();
    if values.is_empty() {
        return Err(DataError::insufficient("summary statistics", 1, 0));
    }
    values.sort_by(f64::total_cmp);

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let std = (count > 1).then(|| {
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (count - 1) as f64).sqrt()
    });

    Ok(SummaryStats {
        count,
        mean,
        std,
        min: values[0],
        q25: quantile(&values, 0.25),
        median: quantile(&values, 0.5),
        q75: quantile(&values, 0.75),
        max: values[count - 1],
    })
}

/// Linear-interpolated quantile of sorted, non-empty values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

// ---------------------------------------------------------------------------
// Peak lookup
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Peak {
    pub date: NaiveDate,
    pub value: f64,
}

/// Largest present value and its date; ties resolve to the earliest row.
pub fn peak(dates: &[NaiveDate], series: &[Option<f64>]) -> Option<Peak> {
    dates
        .iter()
        .zip(series)
        .filter_map(|(d, v)| v.map(|v| Peak { date: *d, value: v }))
        .fold(None, |best: Option<Peak>, p| match best {
            Some(b) if b.value >= p.value => Some(b),
            _ => Some(p),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn seven_constant_values_give_one_average() {
        let out = rolling_average(&some(&[100.0; 7]), 7);
        assert_eq!(out, vec![None, None, None, None, None, None, Some(100.0)]);
    }

    #[test]
    fn rolling_average_trails_the_current_row() {
        let out = rolling_average(&some(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3);
        assert_eq!(out, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn missing_values_propagate_through_the_window() {
        let series = vec![Some(1.0), None, Some(3.0), Some(4.0), Some(5.0)];
        let out = rolling_average(&series, 2);
        assert_eq!(out, vec![None, None, None, Some(3.5), Some(4.5)]);
    }

    #[test]
    fn short_series_and_zero_window_are_all_missing() {
        assert_eq!(rolling_average(&some(&[1.0, 2.0]), 7), vec![None, None]);
        assert_eq!(rolling_average(&some(&[1.0, 2.0]), 0), vec![None, None]);
        assert!(rolling_average(&[], 7).is_empty());
    }

    #[test]
    fn correlation_of_linear_series() {
        let a = some(&[1.0, 2.0, 3.0, 4.0]);
        let b = some(&[2.0, 4.0, 6.0, 8.0]);
        let c = some(&[4.0, 3.0, 2.0, 1.0]);
        let m = correlation_matrix_of_series(&[("a", a), ("b", b), ("c", c)]).unwrap();
        assert_eq!(m.get("a", "a"), Some(1.0));
        assert!((m.get("a", "b").unwrap() - 1.0).abs() < 1e-12);
        assert!((m.get("a", "c").unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(m.get("b", "c"), m.get("c", "b"));
    }

    #[test]
    fn correlation_uses_jointly_present_rows_only() {
        let a = vec![Some(1.0), Some(2.0), None, Some(4.0)];
        let b = vec![Some(1.0), None, Some(9.0), Some(3.0)];
        let m = correlation_matrix_of_series(&[("a", a), ("b", b)]).unwrap();
        // Joint rows: (1,1) and (4,3).
        assert!((m.get("a", "b").unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn undefined_pairs_are_none_not_errors() {
        let a = vec![Some(1.0), None, None];
        let b = vec![Some(2.0), Some(3.0), Some(4.0)];
        let flat = vec![Some(5.0), Some(5.0), Some(5.0)];
        let m = correlation_matrix_of_series(&[("a", a), ("b", b), ("flat", flat)]).unwrap();
        assert_eq!(m.get("a", "b"), None);
        assert_eq!(m.get("a", "a"), None);
        assert_eq!(m.get("flat", "flat"), None);
        assert_eq!(m.get("b", "b"), Some(1.0));
    }

    #[test]
    fn fewer_than_two_fields_is_insufficient() {
        let a = some(&[1.0, 2.0]);
        let err = correlation_matrix_of_series(&[("a", a.clone()), ("a", a)]).unwrap_err();
        assert!(matches!(err, DataError::InsufficientData { available: 1, .. }));
    }

    #[test]
    fn describe_matches_pandas_conventions() {
        let stats = describe(&[Some(1.0), None, Some(2.0), Some(3.0), Some(4.0)]).unwrap();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, 2.5);
        assert!((stats.std.unwrap() - 1.290_994_448_735_805_6).abs() < 1e-12);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.q25, 1.75);
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.q75, 3.25);
        assert_eq!(stats.max, 4.0);

        assert_eq!(describe(&[Some(7.0)]).unwrap().std, None);
        assert!(describe(&[None, None]).is_err());
    }

    #[test]
    fn peak_prefers_the_earliest_maximum() {
        let d = |day| NaiveDate::from_ymd_opt(2021, 5, day).unwrap();
        let dates = [d(1), d(2), d(3), d(4)];
        let series = [Some(5.0), Some(9.0), None, Some(9.0)];
        assert_eq!(peak(&dates, &series), Some(Peak { date: d(2), value: 9.0 }));
        assert_eq!(peak(&dates, &[None, None, None, None]), None);
    }
}
