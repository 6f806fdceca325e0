/// Series analysis: filter → sample → regress → scale.
///
/// ```text
///  &[Record] + &[SeriesConfig]
///        │
///        ▼
///   ┌──────────────┐
///   │ data::filter  │  filter_expr per series
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  x/y formulas → points → mean, R, α, β
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  scale    │  global Bounds → 5–95 plotting box
///   └──────────┘
///        │
///        ▼
///   AnalysisResult (pipeline)
/// ```

pub mod pipeline;
pub mod scale;
pub mod stats;

use serde::Serialize;
use thiserror::Error;

use crate::expr::ExprError;

pub use pipeline::{run_analysis, run_analysis_with, AnalysisResult, SeriesOutcome};
pub use scale::{Bounds, CoordinateScaler, ScaledLineSegment, ScaledPoint};
pub use stats::{Degenerate, Fit, Regression, SeriesStatistics};

/// A raw data point in the units of the series' formulas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Something that degraded a series without stopping the run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesIssue {
    #[error("filter: {0}")]
    InvalidFilter(ExprError),
    #[error("x axis: {0}")]
    InvalidXAxis(ExprError),
    #[error("y axis: {0}")]
    InvalidYAxis(ExprError),
    #[error("no regression line: {0}")]
    Degenerate(Degenerate),
}

impl SeriesIssue {
    /// Which part of the series editor the issue belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            SeriesIssue::InvalidFilter(_) => "filter",
            SeriesIssue::InvalidXAxis(_) => "x",
            SeriesIssue::InvalidYAxis(_) => "y",
            SeriesIssue::Degenerate(_) => "fit",
        }
    }
}
