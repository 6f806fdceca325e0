use serde::Serialize;

use crate::config::PlotBox;
use crate::data::filter::filter_records;
use crate::data::model::{Record, SeriesConfig};

use super::scale::{Bounds, CoordinateScaler, ScaledLineSegment, ScaledPoint};
use super::stats::{sample_points, Fit, Regression, SeriesStatistics};
use super::{Point, SeriesIssue};

// ---------------------------------------------------------------------------
// Per-series and whole-run results
// ---------------------------------------------------------------------------

/// Everything the view needs to draw and annotate one series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesOutcome {
    /// Points in formula units, one per matched record.
    pub raw_points: Vec<Point>,
    /// The same points in plotting-box coordinates.
    pub points: Vec<ScaledPoint>,
    pub statistics: SeriesStatistics,
    pub line: Option<ScaledLineSegment>,
    /// Records that passed the filter.
    pub matched: usize,
    /// Records dropped because the filter failed on them.
    pub filter_failures: usize,
    pub issues: Vec<SeriesIssue>,
}

impl SeriesOutcome {
    pub fn regression(&self) -> Option<&Regression> {
        self.statistics.fit.regression()
    }

    /// R rounded to three decimals, when the series has one.
    pub fn r_display(&self) -> Option<f64> {
        self.regression().and_then(Regression::r_rounded)
    }

    /// First issue attached to `field` (`"filter"`, `"x"`, `"y"` or `"fit"`).
    pub fn issue_for(&self, field: &str) -> Option<&SeriesIssue> {
        self.issues.iter().find(|issue| issue.field() == field)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisResult {
    pub series: Vec<SeriesOutcome>,
    /// Extent of every raw point of every series; `None` if nothing was plotted.
    pub bounds: Option<Bounds>,
}

impl AnalysisResult {
    pub fn axis_labels(&self) -> Option<Bounds> {
        self.bounds.as_ref().map(Bounds::rounded)
    }
}

/// Summary row used by the headless report.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesSummary<'a> {
    pub config: &'a SeriesConfig,
    pub matched: usize,
    pub filter_failures: usize,
    pub statistics: &'a SeriesStatistics,
    pub r: Option<f64>,
    pub r_squared: Option<f64>,
    pub points: &'a [ScaledPoint],
    pub line: Option<&'a ScaledLineSegment>,
    pub issues: Vec<IssueSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssueSummary {
    pub field: &'static str,
    pub message: String,
}

impl SeriesOutcome {
    pub fn summary<'a>(&'a self, config: &'a SeriesConfig) -> SeriesSummary<'a> {
        SeriesSummary {
            config,
            matched: self.matched,
            filter_failures: self.filter_failures,
            statistics: &self.statistics,
            r: self.r_display(),
            r_squared: self.regression().and_then(Regression::r_squared),
            points: &self.points,
            line: self.line.as_ref(),
            issues: self
                .issues
                .iter()
                .map(|issue| IssueSummary {
                    field: issue.field(),
                    message: issue.to_string(),
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run every series through filter → statistics → scaling.
///
/// Pure: the same records and configs always give the same result, and
/// nothing is carried over from earlier runs.
pub fn run_analysis(records: &[Record], configs: &[SeriesConfig]) -> AnalysisResult {
    run_analysis_with(records, configs, &PlotBox::default())
}

pub fn run_analysis_with(records: &[Record], configs: &[SeriesConfig], plot: &PlotBox) -> AnalysisResult {
    let mut series: Vec<SeriesOutcome> = configs.iter().map(|cfg| analyse_series(records, cfg)).collect();

    let bounds = series
        .iter()
        .filter_map(|s| Bounds::of(&s.raw_points))
        .reduce(Bounds::merge);

    if let Some(bounds) = bounds {
        let scaler = CoordinateScaler::new(bounds, *plot);
        for s in &mut series {
            s.points = s.raw_points.iter().map(|&p| scaler.scale_point(p)).collect();
            s.line = s.regression().map(|reg| scaler.scale_line(reg));
        }
    }

    log::debug!(
        "analysed {} records over {} series, bounds {:?}",
        records.len(),
        series.len(),
        bounds
    );

    AnalysisResult { series, bounds }
}

fn analyse_series(records: &[Record], cfg: &SeriesConfig) -> SeriesOutcome {
    let mut issues = Vec::new();

    let filtered = filter_records(records, &cfg.filter_expr);
    if let Some(e) = filtered.error {
        issues.push(SeriesIssue::InvalidFilter(e));
    }

    let sample = sample_points(filtered.matched.iter().copied(), &cfg.x_expr, &cfg.y_expr);
    if let Some(e) = sample.x_error {
        issues.push(SeriesIssue::InvalidXAxis(e));
    }
    if let Some(e) = sample.y_error {
        issues.push(SeriesIssue::InvalidYAxis(e));
    }

    let statistics = SeriesStatistics::compute(&sample.points);
    if let Fit::NoFit { reason } = statistics.fit {
        log::warn!(
            "series ({} vs {}) has no regression line: {reason}",
            cfg.y_expr,
            cfg.x_expr
        );
        issues.push(SeriesIssue::Degenerate(reason));
    }

    SeriesOutcome {
        raw_points: sample.points,
        points: Vec::new(),
        statistics,
        line: None,
        matched: filtered.matched.len(),
        filter_failures: filtered.failures,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::stats::Degenerate;
    use crate::expr::ExprError;

    fn ab_records() -> Vec<Record> {
        (1..=5).map(|a| Record::from([("a", a), ("b", 2 * a)])).collect()
    }

    #[test]
    fn test_bounds_are_global_across_series() {
        let recs = ab_records();
        let configs = [
            SeriesConfig::new("a", "b", "a <= 2"),
            SeriesConfig::new("a", "b", "a >= 4"),
        ];
        let result = run_analysis(&recs, &configs);
        let b = result.bounds.unwrap();
        assert_eq!((b.x_min, b.x_max, b.y_min, b.y_max), (1.0, 5.0, 2.0, 10.0));

        // Series 0 sits at the left, series 1 at the right of the shared box.
        assert_eq!(result.series[0].points[0].x, 5.0);
        assert_eq!(result.series[1].points[1].x, 95.0);
    }

    #[test]
    fn test_filter_error_is_reported_not_fatal() {
        let recs = ab_records();
        let configs = [SeriesConfig::new("a", "b", "c > 1"), SeriesConfig::new("a", "b", "")];
        let result = run_analysis(&recs, &configs);

        let broken = &result.series[0];
        assert_eq!(broken.matched, 0);
        assert_eq!(broken.filter_failures, 5);
        assert!(matches!(
            broken.issue_for("filter"),
            Some(SeriesIssue::InvalidFilter(ExprError::UnknownField(_)))
        ));
        assert_eq!(
            broken.issue_for("fit"),
            Some(&SeriesIssue::Degenerate(Degenerate::NoPoints))
        );
        assert!(broken.line.is_none());

        assert_eq!(result.series[1].points.len(), 5);
        assert!(result.series[1].issues.is_empty());
    }

    #[test]
    fn test_axis_error_zeroes_point() {
        let mut recs = ab_records();
        recs.push(Record::from([("a", 6)]));
        let result = run_analysis(&recs, &[SeriesConfig::new("a", "b", "")]);
        let s = &result.series[0];
        assert_eq!(s.raw_points.len(), 6);
        assert_eq!(s.raw_points[5], Point::new(6.0, 0.0));
        assert!(s.issue_for("y").is_some());
        assert!(s.issue_for("x").is_none());
        assert_eq!(result.bounds.unwrap().y_min, 0.0);
    }

    #[test]
    fn test_no_records_no_bounds() {
        let result = run_analysis(&[], &[SeriesConfig::new("a", "b", "")]);
        assert!(result.bounds.is_none());
        assert!(result.axis_labels().is_none());
        assert!(result.series[0].points.is_empty());
    }

    #[test]
    fn test_rerun_is_deterministic() {
        let recs = ab_records();
        let configs = [SeriesConfig::new("a", "b * a", "a != 3")];
        assert_eq!(run_analysis(&recs, &configs), run_analysis(&recs, &configs));
    }

    #[test]
    fn test_summary_lists_issues() {
        let recs = ab_records();
        let cfg = SeriesConfig::new("a +", "b", "");
        let result = run_analysis(&recs, std::slice::from_ref(&cfg));
        let summary = result.series[0].summary(&cfg);
        assert!(summary.issues.iter().any(|i| i.field == "x"));
        // Every x collapsed to 0 so there is no line either.
        assert!(summary.issues.iter().any(|i| i.field == "fit"));
        assert!(summary.r.is_none());
    }
}
