/// Side-by-side comparison of ranked hotspot lists.
///
/// ```text
///  ColumnAssignment (column → Option<Run>)
///        │
///        ▼
///   ┌──────────┐
///   │ compare   │  delta / rank change vs. the column to the left
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ transpose │  ragged columns → rows of cells
///   └───────────┘
/// ```

pub mod compare;
pub mod transpose;

use serde::Serialize;

use crate::config::DeltaThresholds;
use crate::data::model::ColumnAssignment;

pub use compare::{annotate_deltas, classify_delta, classify_rank};
pub use transpose::{transpose, Cell, Row};

/// Annotated columns, ready to be laid out as a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Comparison {
    pub columns: ColumnAssignment,
}

impl Comparison {
    pub fn rows(&self) -> Vec<Row<'_>> {
        transpose(&self.columns)
    }
}

pub fn compare_runs(columns: ColumnAssignment) -> Comparison {
    compare_runs_with(columns, &DeltaThresholds::default())
}

pub fn compare_runs_with(mut columns: ColumnAssignment, thresholds: &DeltaThresholds) -> Comparison {
    annotate_deltas(&mut columns, thresholds);
    Comparison { columns }
}
