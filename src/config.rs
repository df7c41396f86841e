use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::loader::DEFAULT_DATA_PATH;

/// Optional settings file looked up in the working directory.
pub const CONFIG_FILE: &str = "covid_dashboard.json";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Settings shared by the dashboard and the console report.
///
/// ```json
/// { "data_path": "data/covid_data.csv", "default_location": "India", "rolling_window": 7 }
/// ```
/// Every key is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Input table (`.csv` or `.parquet`).
    pub data_path: PathBuf,
    /// Location selected on start-up when present in the data.
    pub default_location: String,
    /// Trailing window of the rolling averages, in observations.
    pub rolling_window: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            default_location: "India".to_string(),
            rolling_window: 7,
        }
    }
}

impl DashboardConfig {
    /// Read [`CONFIG_FILE`] from the working directory, or use defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Read settings from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.rolling_window == 0 {
            bail!("rolling_window must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.data_path, PathBuf::from("data/covid_data.csv"));
        assert_eq!(config.rolling_window, 7);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, r#"{ "default_location": "Peru" }"#).unwrap();
        let config = DashboardConfig::load_from(&path).unwrap();
        assert_eq!(config.default_location, "Peru");
        assert_eq!(config.rolling_window, 7);
    }

    #[test]
    fn rejects_zero_window_and_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");

        std::fs::write(&path, r#"{ "rolling_window": 0 }"#).unwrap();
        assert!(DashboardConfig::load_from(&path).is_err());

        std::fs::write(&path, r#"{ "window": 14 }"#).unwrap();
        let err = DashboardConfig::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parsing config"));
    }
}
