/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .json / .csv / .parquet / catalogue dir
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Vec<Record> / Vec<Run>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  model    │  Record, SeriesConfig, Run, ColumnAssignment
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  filter expression → matched records
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
