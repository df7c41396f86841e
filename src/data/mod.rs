/// Data layer: core types, loading, per-location views and derived metrics.
///
/// Architecture:
/// ```text
///  .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  raw table → normalize headers → rename → parse dates → drop
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Observation>, column index, distinct locations
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  location → date-sorted LocationView (a copy)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  metrics  │  rolling mean, Pearson correlation, describe, peak
///   └──────────┘
/// ```

pub mod cache;
pub mod error;
pub mod filter;
pub mod loader;
pub mod metrics;
pub mod model;
pub mod schema;
