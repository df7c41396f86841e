use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use super::schema;

// ---------------------------------------------------------------------------
// CellValue – a single cell in a pass-through column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell for columns outside the canonical schema.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

/// Spellings of a missing value in exported tables, as pandas reads them.
pub const MISSING_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Whether a trimmed numeric cell spells a missing value.
pub fn is_missing_marker(s: &str) -> bool {
    MISSING_MARKERS.contains(&s.trim())
}

impl CellValue {
    /// Guess the type of a raw text cell: integer, float, bool, then string.
    /// Missing-value markers such as `NaN` or `N/A` become `Null`.
    pub fn guess(s: &str) -> CellValue {
        let s = s.trim();
        if s.is_empty() || is_missing_marker(s) {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        if s == "true" || s == "false" {
            return CellValue::Bool(s == "true");
        }
        CellValue::String(s.to_string())
    }

    /// Interpret the value as an `f64` for numeric computations.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if v.is_finite() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Observation – one (location, date) row
// ---------------------------------------------------------------------------

/// One cleaned row of the source table.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub location: String,
    pub country_code: Option<String>,
    pub new_cases: Option<i64>,
    pub total_cases: Option<i64>,
    pub new_deaths: Option<i64>,
    pub total_deaths: Option<i64>,
    /// Columns outside the canonical schema: normalized name → value.
    pub extra: BTreeMap<String, CellValue>,
}

impl Observation {
    /// An observation with every optional field empty.
    pub fn new(date: NaiveDate, location: impl Into<String>) -> Self {
        Observation {
            date,
            location: location.into(),
            country_code: None,
            new_cases: None,
            total_cases: None,
            new_deaths: None,
            total_deaths: None,
            extra: BTreeMap::new(),
        }
    }

    /// Count field by canonical name.
    pub fn count(&self, field: &str) -> Option<i64> {
        match field {
            schema::NEW_CASES => self.new_cases,
            schema::TOTAL_CASES => self.total_cases,
            schema::NEW_DEATHS => self.new_deaths,
            schema::TOTAL_DEATHS => self.total_deaths,
            _ => None,
        }
    }

    pub(crate) fn count_mut(&mut self, field: &str) -> Option<&mut Option<i64>> {
        match field {
            schema::NEW_CASES => Some(&mut self.new_cases),
            schema::TOTAL_CASES => Some(&mut self.total_cases),
            schema::NEW_DEATHS => Some(&mut self.new_deaths),
            schema::TOTAL_DEATHS => Some(&mut self.total_deaths),
            _ => None,
        }
    }

    /// Numeric value of any field: a count field or a numeric extra column.
    pub fn value(&self, field: &str) -> Option<f64> {
        if schema::is_count_field(field) {
            self.count(field).map(|v| v as f64)
        } else {
            self.extra.get(field).and_then(CellValue::as_f64)
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete cleaned table
// ---------------------------------------------------------------------------

/// Bookkeeping gathered while cleaning a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Data rows in the source, header excluded.
    pub rows_read: usize,
    /// Rows discarded because their date did not parse.
    pub rows_dropped: usize,
    /// Non-empty count cells that were not integers, treated as missing.
    pub invalid_numeric_cells: usize,
}

/// The cleaned dataset. Immutable once built; views are copies.
#[derive(Debug, Clone)]
pub struct Dataset {
    observations: Vec<Observation>,
    columns: Vec<String>,
    numeric_columns: Vec<String>,
    locations: BTreeSet<String>,
    report: LoadReport,
}

impl Dataset {
    /// Build column indices from cleaned observations.
    ///
    /// `columns` are the canonical names in source order. An extra column is
    /// numeric when every non-null cell it holds is a number.
    pub fn from_observations(
        observations: Vec<Observation>,
        columns: Vec<String>,
        report: LoadReport,
    ) -> Self {
        let numeric_columns = columns
            .iter()
            .filter(|col| {
                if schema::is_count_field(col) {
                    return true;
                }
                if col.as_str() == schema::DATE
                    || col.as_str() == schema::LOCATION
                    || col.as_str() == schema::COUNTRY_CODE
                {
                    return false;
                }
                observations.iter().all(|o| match o.extra.get(col.as_str()) {
                    None => true,
                    Some(v) => v.is_null() || v.as_f64().is_some(),
                })
            })
            .cloned()
            .collect();

        let locations = observations
            .iter()
            .filter(|o| !o.location.is_empty())
            .map(|o| o.location.clone())
            .collect();

        Dataset {
            observations,
            columns,
            numeric_columns,
            locations,
            report,
        }
    }

    /// All observations in source order.
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Canonical column names in source order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Columns usable as numeric series, in source order.
    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Sorted distinct non-empty locations.
    pub fn locations(&self) -> &BTreeSet<String> {
        &self.locations
    }

    pub fn load_report(&self) -> LoadReport {
        self.report
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}
