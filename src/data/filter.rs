use chrono::NaiveDate;

use super::error::DataError;
use super::metrics::{self, CorrelationMatrix, Peak};
use super::model::{CellValue, Dataset, Observation};

// ---------------------------------------------------------------------------
// Per-location view
// ---------------------------------------------------------------------------

/// Rows of one location, copied out of the dataset and sorted by date.
#[derive(Debug, Clone)]
pub struct LocationView {
    location: String,
    observations: Vec<Observation>,
    /// Numeric columns of the parent dataset.
    numeric_columns: Vec<String>,
}

impl Dataset {
    /// Copy every row whose `location` equals `location`, sorted ascending by
    /// date. Rows sharing a date keep their file order.
    pub fn view(&self, location: &str) -> LocationView {
        let mut observations: Vec<Observation> = self
            .observations()
            .iter()
            .filter(|o| o.location == location)
            .cloned()
            .collect();
        observations.sort_by_key(|o| o.date);

        LocationView {
            location: location.to_string(),
            observations,
            numeric_columns: self.numeric_columns().to_vec(),
        }
    }
}

impl LocationView {
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    pub fn has_column(&self, field: &str) -> bool {
        self.numeric_columns.iter().any(|c| c == field)
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.observations.iter().map(|o| o.date).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }

    /// Values of a numeric field in date order.
    pub fn series(&self, field: &str) -> Vec<Option<f64>> {
        self.observations.iter().map(|o| o.value(field)).collect()
    }

    /// Largest present value of a field.
    pub fn max_value(&self, field: &str) -> Option<f64> {
        self.observations
            .iter()
            .filter_map(|o| o.value(field))
            .reduce(f64::max)
    }

    /// Date and value of the largest present value of a field.
    pub fn peak(&self, field: &str) -> Option<Peak> {
        metrics::peak(&self.dates(), &self.series(field))
    }

    /// Trailing average of a field, or `None` when the column is absent.
    pub fn rolling_average(&self, field: &str, window: usize) -> Option<Vec<Option<f64>>> {
        self.has_column(field)
            .then(|| metrics::rolling_average(&self.series(field), window))
    }

    /// Pearson correlation between the given fields, skipping absent ones.
    pub fn correlation_matrix(&self, fields: &[&str]) -> Result<CorrelationMatrix, DataError> {
        let present: Vec<&str> = fields.iter().copied().filter(|f| self.has_column(f)).collect();
        metrics::correlation_matrix(&self.observations, &present)
    }

    /// A copy with every missing numeric value replaced by zero.
    pub fn zero_filled(&self) -> LocationView {
        let mut filled = self.clone();
        for obs in &mut filled.observations {
            for field in &self.numeric_columns {
                if let Some(slot) = obs.count_mut(field) {
                    slot.get_or_insert(0);
                    continue;
                }
                let cell = obs.extra.entry(field.clone()).or_insert(CellValue::Null);
                if cell.is_null() {
                    *cell = CellValue::Integer(0);
                }
            }
        }
        filled
    }

    /// A copy restricted to `start..=end`.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> LocationView {
        LocationView {
            location: self.location.clone(),
            observations: self
                .observations
                .iter()
                .filter(|o| o.date >= start && o.date <= end)
                .cloned()
                .collect(),
            numeric_columns: self.numeric_columns.clone(),
        }
    }
}
