use serde::Serialize;

use crate::data::model::{ColumnAssignment, HotspotEntry};

/// One cell of the side-by-side table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell<'a> {
    Entry(&'a HotspotEntry),
    Empty,
}

impl<'a> Cell<'a> {
    pub fn entry(&self) -> Option<&'a HotspotEntry> {
        match self {
            Cell::Entry(e) => Some(e),
            Cell::Empty => None,
        }
    }
}

pub type Row<'a> = Vec<Cell<'a>>;

/// Turn per-column ranked lists into rows.
///
/// Row `r` holds the `r`-th hotspot of every column, or [`Cell::Empty`]
/// where a column is shorter or unassigned. Rows continue until a row would
/// be empty in every column.
pub fn transpose(columns: &ColumnAssignment) -> Vec<Row<'_>> {
    let mut rows = Vec::new();
    for r in 0.. {
        let row: Row<'_> = columns
            .iter()
            .map(|run| {
                run.and_then(|run| run.hotspots.get(r))
                    .map_or(Cell::Empty, Cell::Entry)
            })
            .collect();
        if row.iter().all(|cell| *cell == Cell::Empty) {
            break;
        }
        rows.push(row);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Run;

    fn run_of(len: usize) -> Run {
        Run::new(
            format!("run{len}"),
            (0..len).map(|i| HotspotEntry::new(format!("f{i}"), 10.0)).collect(),
        )
    }

    #[test]
    fn test_ragged_columns() {
        let cols = ColumnAssignment::from_columns(vec![Some(run_of(3)), Some(run_of(1)), Some(run_of(0))]);
        let rows = transpose(&cols);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|row| row.len() == 3));

        assert!(rows[0][0].entry().is_some());
        assert!(rows[0][1].entry().is_some());
        assert_eq!(rows[0][2], Cell::Empty);

        for row in &rows[1..] {
            assert!(row[0].entry().is_some());
            assert_eq!(row[1], Cell::Empty);
            assert_eq!(row[2], Cell::Empty);
        }
        assert_eq!(rows[2][0].entry().unwrap().function, "f2");
    }

    #[test]
    fn test_unassigned_column_is_placeholder() {
        let cols = ColumnAssignment::from_columns(vec![None, Some(run_of(2))]);
        let rows = transpose(&cols);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row[0] == Cell::Empty));
    }

    #[test]
    fn test_nothing_to_show() {
        assert!(transpose(&ColumnAssignment::new(3)).is_empty());
        assert!(transpose(&ColumnAssignment::new(0)).is_empty());
    }
}
