//! Benchmark result explorer.
//!
//! Two pure entry points do the work; everything else loads inputs or draws:
//!
//! * [`analysis::run_analysis`] – filter records per series, fit a line per
//!   series and map all points into a shared 5–95 plotting box.
//! * [`hotspot::compare_runs`] – annotate ranked hotspot lists against the
//!   run to their left and lay them out as rows.

pub mod analysis;
pub mod config;
pub mod data;
pub mod expr;
pub mod hotspot;
pub mod report;

pub use analysis::{run_analysis, AnalysisResult};
pub use data::model::{ColumnAssignment, HotspotEntry, Record, Run, SeriesConfig};
pub use hotspot::{compare_runs, Comparison};
