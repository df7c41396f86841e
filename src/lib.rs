//! COVID-19 case/death pipeline shared by the dashboard and the console report.

pub mod config;
pub mod data;
pub mod report;

pub use data::error::DataError;
pub use data::loader::{load_and_clean_data, load_file};
pub use data::model::{Dataset, Observation};
