use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use covid_dashboard::config::DashboardConfig;
use covid_dashboard::data::cache::DatasetCache;
use covid_dashboard::data::metrics::CorrelationMatrix;
use covid_dashboard::data::model::Dataset;
use covid_dashboard::report::CountryReport;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendTab {
    Cases,
    Deaths,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// File the current dataset came from.
    pub data_path: PathBuf,

    cache: DatasetCache,

    /// Loaded dataset (None until a load succeeds).
    pub dataset: Option<Arc<Dataset>>,

    /// Currently selected location; always passed explicitly to queries.
    pub selected_location: Option<String>,

    /// Figures for the selected location (cached per selection).
    pub report: Option<CountryReport>,

    /// Correlation of the selected location, `None` when not available.
    pub correlation: Option<CorrelationMatrix>,

    /// Optional inclusive date window applied to the trend charts.
    pub date_range: Option<(NaiveDate, NaiveDate)>,

    pub tab: TrendTab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let data_path = config.data_path.clone();
        Self {
            config,
            data_path,
            cache: DatasetCache::new(),
            dataset: None,
            selected_location: None,
            report: None,
            correlation: None,
            date_range: None,
            tab: TrendTab::Cases,
            status_message: None,
        }
    }

    /// Load `path` through the cache, keeping the selection when possible.
    pub fn load(&mut self, path: &Path) {
        match self.cache.get_or_load(path) {
            Ok(dataset) => {
                self.data_path = path.to_path_buf();
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load data: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Drop the cached dataset and read the current file again.
    pub fn reload(&mut self) {
        self.cache.invalidate();
        let path = self.data_path.clone();
        self.load(&path);
    }

    /// Ingest a newly loaded dataset and pick the initial location.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        let keep = self
            .selected_location
            .as_ref()
            .filter(|loc| dataset.locations().contains(*loc))
            .cloned();
        let default = Some(&self.config.default_location)
            .filter(|loc| dataset.locations().contains(*loc))
            .cloned();
        let location = keep
            .or(default)
            .or_else(|| dataset.locations().iter().next().cloned());

        let report = dataset.load_report();
        self.status_message = (report.rows_dropped > 0).then(|| {
            format!("{} rows with unparsable dates were skipped", report.rows_dropped)
        });
        self.dataset = Some(dataset);
        self.date_range = None;
        self.selected_location = None;
        match location {
            Some(loc) => self.select_location(&loc),
            None => {
                self.report = None;
                self.correlation = None;
            }
        }
    }

    /// Rebuild the per-location figures and clear the date window.
    /// Unknown locations are ignored.
    pub fn select_location(&mut self, location: &str) {
        let Some(dataset) = &self.dataset else {
            return;
        };
        if !dataset.locations().contains(location)
            || self.selected_location.as_deref() == Some(location)
        {
            return;
        }

        let report = CountryReport::build(dataset, location, self.config.rolling_window);
        self.correlation = match report.correlation(true) {
            Ok(m) => Some(m),
            Err(e) => {
                log::debug!("Correlation for {location} not available: {e}");
                None
            }
        };
        self.date_range = None;
        self.selected_location = Some(location.to_string());
        self.report = Some(report);
    }

    /// Whether a chart point on `date` falls inside the active date window.
    pub fn in_range(&self, date: NaiveDate) -> bool {
        match self.date_range {
            Some((start, end)) => date >= start && date <= end,
            None => true,
        }
    }
}
