use crate::expr::{ExprError, Expression};

use super::model::Record;

// ---------------------------------------------------------------------------
// Record filter: keep records for which the filter expression is truthy
// ---------------------------------------------------------------------------

/// Records that passed a filter, plus what went wrong along the way.
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome<'a> {
    pub matched: Vec<&'a Record>,
    /// Set by a failing evaluation and cleared again by the next successful
    /// one; a syntax error fails every record and so always stays set.
    pub error: Option<ExprError>,
    /// Number of records excluded because evaluation failed.
    pub failures: usize,
}

impl FilterOutcome<'_> {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Filter `records` with a user expression.
///
/// * Empty (or blank) `filter_expr` → every record passes, no error.
/// * Truthy result → included.
/// * Falsy result → excluded.
/// * Evaluation failure → excluded and reported in [`FilterOutcome::error`].
pub fn filter_records<'a, I>(records: I, filter_expr: &str) -> FilterOutcome<'a>
where
    I: IntoIterator<Item = &'a Record>,
{
    if filter_expr.trim().is_empty() {
        return FilterOutcome {
            matched: records.into_iter().collect(),
            error: None,
            failures: 0,
        };
    }

    let expr = match Expression::parse(filter_expr) {
        Ok(expr) => expr,
        Err(e) => {
            log::debug!("filter '{filter_expr}' does not parse: {e}");
            return FilterOutcome {
                matched: Vec::new(),
                failures: records.into_iter().count(),
                error: Some(e),
            };
        }
    };

    let mut outcome = FilterOutcome::default();
    for record in records {
        match expr.matches(record) {
            Ok(include) => {
                outcome.error = None;
                if include {
                    outcome.matched.push(record);
                }
            }
            Err(e) => {
                log::trace!("filter '{filter_expr}' failed on a record: {e}");
                outcome.failures += 1;
                outcome.error = Some(e);
            }
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<Record> {
        vec![
            Record::from([("a", 1), ("b", 10)]),
            Record::from([("a", 2), ("b", 20)]),
            Record::from([("a", 3), ("b", 30)]),
        ]
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let recs = records();
        let out = filter_records(&recs, "   ");
        assert_eq!(out.matched.len(), 3);
        assert!(out.is_ok());
    }

    #[test]
    fn test_truthy_results_are_kept() {
        let recs = records();
        let out = filter_records(&recs, "a >= 2");
        assert_eq!(out.matched.len(), 2);
        assert_eq!(out.failures, 0);

        // Numbers count as truthy when non-zero.
        let out = filter_records(&recs, "a - 1");
        assert_eq!(out.matched.len(), 2);
    }

    #[test]
    fn test_syntax_error_excludes_all() {
        let recs = records();
        let out = filter_records(&recs, "a >");
        assert!(out.matched.is_empty());
        assert_eq!(out.failures, 3);
        assert_eq!(out.error, Some(ExprError::UnexpectedEnd));
    }

    #[test]
    fn test_failure_flag_cleared_by_later_success() {
        let recs = vec![
            Record::from([("b", 1)]),
            Record::from([("a", 2)]),
        ];
        let out = filter_records(&recs, "a > 1");
        assert_eq!(out.matched.len(), 1);
        assert_eq!(out.failures, 1);
        assert!(out.error.is_none());

        let recs = vec![Record::from([("a", 2)]), Record::from([("b", 1)])];
        let out = filter_records(&recs, "a > 1");
        assert_eq!(out.failures, 1);
        assert_eq!(out.error, Some(ExprError::UnknownField("a".into())));
    }

    #[test]
    fn test_filter_is_idempotent() {
        let recs = records();
        let once = filter_records(&recs, "a != 2");
        let twice = filter_records(once.matched.iter().copied(), "a != 2");
        assert_eq!(once.matched, twice.matched);
    }
}
