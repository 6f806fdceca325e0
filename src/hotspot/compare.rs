use crate::config::DeltaThresholds;
use crate::data::model::{ColumnAssignment, Delta, HotspotEntry, RankChange};

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Classify a percentage change: `-band <= diff < band` is unchanged.
pub fn classify_delta(diff: f64, thresholds: &DeltaThresholds) -> Delta {
    if diff < -thresholds.band {
        Delta::Improved
    } else if diff < thresholds.band {
        Delta::Unchanged
    } else {
        Delta::Regressed
    }
}

/// Compare list positions; a lower index is a higher rank.
pub fn classify_rank(index: usize, previous_index: usize) -> RankChange {
    match index.cmp(&previous_index) {
        std::cmp::Ordering::Equal => RankChange::None,
        std::cmp::Ordering::Greater => RankChange::Down,
        std::cmp::Ordering::Less => RankChange::Up,
    }
}

/// First entry named `function`, with its position.
pub fn find_previous<'a>(previous: &'a [HotspotEntry], function: &str) -> Option<(usize, &'a HotspotEntry)> {
    previous
        .iter()
        .enumerate()
        .find(|(_, entry)| entry.function == function)
}

// ---------------------------------------------------------------------------
// Annotation
// ---------------------------------------------------------------------------

/// Annotate every run with its change against the run in the column to its left.
///
/// Existing annotations are cleared first. Column 0, and any run whose left
/// neighbour column is empty, is left unannotated. Hotspot order is never
/// changed.
pub fn annotate_deltas(columns: &mut ColumnAssignment, thresholds: &DeltaThresholds) {
    let columns = columns.columns_mut();

    for run in columns.iter_mut().flatten() {
        run.hotspots.iter_mut().for_each(HotspotEntry::clear_annotations);
    }

    for i in 1..columns.len() {
        let (before, after) = columns.split_at_mut(i);
        let (Some(previous), Some(current)) = (before[i - 1].as_ref(), after[0].as_mut()) else {
            continue;
        };

        for (idx, entry) in current.hotspots.iter_mut().enumerate() {
            match find_previous(&previous.hotspots, &entry.function) {
                None => {
                    entry.delta = Some(Delta::Regressed);
                    entry.rank_change = Some(RankChange::Up);
                }
                Some((prev_idx, prev)) => {
                    entry.delta = Some(classify_delta(entry.percent - prev.percent, thresholds));
                    entry.rank_change = Some(classify_rank(idx, prev_idx));
                }
            }
        }

        log::debug!(
            "compared '{}' against '{}' ({} hotspots)",
            current.name,
            previous.name,
            current.hotspots.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Run;

    fn run(name: &str, entries: &[(&str, f64)]) -> Run {
        Run::new(
            name,
            entries.iter().map(|&(f, p)| HotspotEntry::new(f, p)).collect(),
        )
    }

    fn annotate(columns: Vec<Option<Run>>) -> ColumnAssignment {
        let mut cols = ColumnAssignment::from_columns(columns);
        annotate_deltas(&mut cols, &DeltaThresholds::default());
        cols
    }

    #[test]
    fn test_delta_bands() {
        let t = DeltaThresholds::default();
        assert_eq!(classify_delta(3.0, &t), Delta::Regressed);
        assert_eq!(classify_delta(2.0, &t), Delta::Regressed);
        assert_eq!(classify_delta(1.0, &t), Delta::Unchanged);
        assert_eq!(classify_delta(-2.0, &t), Delta::Unchanged);
        assert_eq!(classify_delta(-2.5, &t), Delta::Improved);
    }

    #[test]
    fn test_rank_changes() {
        assert_eq!(classify_rank(2, 2), RankChange::None);
        assert_eq!(classify_rank(3, 1), RankChange::Down);
        assert_eq!(classify_rank(0, 4), RankChange::Up);
    }

    #[test]
    fn test_slower_function_is_danger() {
        let cols = annotate(vec![Some(run("a", &[("f", 10.0)])), Some(run("b", &[("f", 13.0)]))]);
        let f = &cols.get(1).unwrap().hotspots[0];
        assert_eq!(f.delta, Some(Delta::Regressed));
        assert_eq!(f.rank_change, Some(RankChange::None));

        let cols = annotate(vec![Some(run("a", &[("f", 10.0)])), Some(run("b", &[("f", 11.0)]))]);
        assert_eq!(cols.get(1).unwrap().hotspots[0].delta, Some(Delta::Unchanged));
    }

    #[test]
    fn test_new_function_is_danger_and_up() {
        let cols = annotate(vec![Some(run("a", &[("f", 10.0)])), Some(run("b", &[("g", 1.0)]))]);
        let g = &cols.get(1).unwrap().hotspots[0];
        assert_eq!(g.delta, Some(Delta::Regressed));
        assert_eq!(g.rank_change, Some(RankChange::Up));
    }

    #[test]
    fn test_rank_and_delta_are_independent() {
        let cols = annotate(vec![
            Some(run("a", &[("f", 40.0), ("g", 30.0)])),
            Some(run("b", &[("g", 25.0), ("f", 24.0)])),
        ]);
        let b = cols.get(1).unwrap();
        assert_eq!(b.hotspots[0].rank_change, Some(RankChange::Up));
        assert_eq!(b.hotspots[0].delta, Some(Delta::Improved));
        assert_eq!(b.hotspots[1].rank_change, Some(RankChange::Down));
        assert_eq!(b.hotspots[1].delta, Some(Delta::Improved));
    }

    #[test]
    fn test_first_duplicate_wins() {
        let cols = annotate(vec![
            Some(run("a", &[("f", 10.0), ("f", 50.0)])),
            Some(run("b", &[("x", 1.0), ("f", 11.0)])),
        ]);
        let f = &cols.get(1).unwrap().hotspots[1];
        // Matched against index 0 (10%), not index 1 (50%).
        assert_eq!(f.delta, Some(Delta::Unchanged));
        assert_eq!(f.rank_change, Some(RankChange::Down));
    }

    #[test]
    fn test_gaps_do_not_crash_and_stay_unannotated() {
        let cols = annotate(vec![
            Some(run("a", &[("f", 10.0)])),
            None,
            Some(run("c", &[("f", 30.0)])),
            Some(run("d", &[("f", 30.5)])),
        ]);
        assert!(cols.get(0).unwrap().hotspots[0].delta.is_none());
        assert!(cols.get(2).unwrap().hotspots[0].delta.is_none());
        assert_eq!(cols.get(3).unwrap().hotspots[0].delta, Some(Delta::Unchanged));
    }

    #[test]
    fn test_reannotation_clears_stale_marks() {
        let mut cols = annotate(vec![Some(run("a", &[("f", 10.0)])), Some(run("b", &[("f", 20.0)]))]);
        let b = cols.unassign(1).unwrap();
        cols.assign(0, b);
        annotate_deltas(&mut cols, &DeltaThresholds::default());
        assert!(cols.get(0).unwrap().hotspots[0].delta.is_none());
    }

    #[test]
    fn test_order_is_preserved() {
        let cols = annotate(vec![
            Some(run("a", &[("f", 1.0), ("g", 2.0)])),
            Some(run("b", &[("g", 2.0), ("f", 1.0)])),
        ]);
        let names: Vec<&str> = cols.get(1).unwrap().hotspots.iter().map(|e| e.function.as_str()).collect();
        assert_eq!(names, ["g", "f"]);
    }
}
