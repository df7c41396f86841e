//! Per-country figures shared by the dashboard and the console report.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::data::error::DataError;
use crate::data::filter::LocationView;
use crate::data::metrics::{self, CorrelationMatrix, Peak, SummaryStats};
use crate::data::model::Dataset;
use crate::data::schema;

/// Fields the console report correlates, in print order.
pub const KEY_FIELDS: [&str; 4] = [
    schema::NEW_CASES,
    schema::NEW_DEATHS,
    schema::TOTAL_CASES,
    schema::TOTAL_DEATHS,
];

/// Shown wherever a figure cannot be computed.
pub const NOT_AVAILABLE: &str = "not available";

// ---------------------------------------------------------------------------
// CountryReport
// ---------------------------------------------------------------------------

/// A location view plus its trailing averages.
#[derive(Debug, Clone)]
pub struct CountryReport {
    pub view: LocationView,
    pub window: usize,
    /// Absent when the dataset has no `new_cases` column.
    pub new_cases_avg: Option<Vec<Option<f64>>>,
    /// Absent when the dataset has no `new_deaths` column.
    pub new_deaths_avg: Option<Vec<Option<f64>>>,
}

impl CountryReport {
    pub fn build(dataset: &Dataset, location: &str, window: usize) -> Self {
        Self::from_view(dataset.view(location), window)
    }

    pub fn from_view(view: LocationView, window: usize) -> Self {
        let new_cases_avg = view.rolling_average(schema::NEW_CASES, window);
        let new_deaths_avg = view.rolling_average(schema::NEW_DEATHS, window);
        CountryReport {
            view,
            window,
            new_cases_avg,
            new_deaths_avg,
        }
    }

    pub fn location(&self) -> &str {
        self.view.location()
    }

    pub fn summary(&self) -> CountrySummary {
        let as_count = |v: f64| v as i64;
        CountrySummary {
            location: self.view.location().to_string(),
            observations: self.view.len(),
            first_date: self.view.first_date(),
            last_date: self.view.last_date(),
            total_cases: self.view.max_value(schema::TOTAL_CASES).map(as_count),
            total_deaths: self.view.max_value(schema::TOTAL_DEATHS).map(as_count),
            peak_new_cases: self.view.peak(schema::NEW_CASES),
        }
    }

    /// Named numeric series of the view, optionally with the averages
    /// appended under their derived names.
    pub fn numeric_series(&self, include_averages: bool) -> Vec<(String, Vec<Option<f64>>)> {
        let mut series: Vec<(String, Vec<Option<f64>>)> = self
            .view
            .numeric_columns()
            .iter()
            .map(|c| (c.clone(), self.view.series(c)))
            .collect();
        if include_averages {
            if let Some(avg) = &self.new_cases_avg {
                series.push((schema::NEW_CASES_7D_AVG.to_string(), avg.clone()));
            }
            if let Some(avg) = &self.new_deaths_avg {
                series.push((schema::NEW_DEATHS_7D_AVG.to_string(), avg.clone()));
            }
        }
        series
    }

    /// Correlation over every numeric column of the view.
    pub fn correlation(&self, include_averages: bool) -> Result<CorrelationMatrix, DataError> {
        let series = self.numeric_series(include_averages);
        let named: Vec<(&str, &[Option<f64>])> = series
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
            .collect();
        metrics::correlation_matrix_of_series(&named)
    }

    /// Correlation over [`KEY_FIELDS`] that the view carries.
    pub fn key_correlation(&self) -> Result<CorrelationMatrix, DataError> {
        self.view.correlation_matrix(&KEY_FIELDS)
    }

    /// Descriptive statistics per numeric column and average.
    pub fn describe_all(&self) -> Vec<(String, Result<SummaryStats, DataError>)> {
        self.numeric_series(true)
            .into_iter()
            .map(|(name, values)| (name, metrics::describe(&values)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// CountrySummary
// ---------------------------------------------------------------------------

/// Headline figures for one location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountrySummary {
    pub location: String,
    pub observations: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    /// Maximum of the cumulative case series.
    pub total_cases: Option<i64>,
    /// Maximum of the cumulative death series.
    pub total_deaths: Option<i64>,
    pub peak_new_cases: Option<Peak>,
}

impl CountrySummary {
    /// Month of the highest daily case count, e.g. `May 2021`.
    pub fn surge_month(&self) -> Option<String> {
        self.peak_new_cases
            .map(|p| p.date.format("%B %Y").to_string())
    }
}

impl fmt::Display for CountrySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.peak_new_cases {
            Some(p) => writeln!(
                f,
                "Peak daily new cases in {}: {} on {}",
                self.location,
                format_count(p.value as i64),
                p.date
            )?,
            None => writeln!(f, "Peak daily new cases in {}: {NOT_AVAILABLE}", self.location)?,
        }
        writeln!(
            f,
            "Total confirmed cases in {}: {}",
            self.location,
            format_optional_count(self.total_cases)
        )?;
        write!(
            f,
            "Total deaths recorded in {}: {}",
            self.location,
            format_optional_count(self.total_deaths)
        )
    }
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Integer with `,` thousands separators.
pub fn format_count(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_optional_count(value: Option<i64>) -> String {
    value.map(format_count).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn format_optional_float(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => NOT_AVAILABLE.to_string(),
    }
}
