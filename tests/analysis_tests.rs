use benchscope::analysis::stats::Degenerate;
use benchscope::analysis::{run_analysis, Bounds, CoordinateScaler, Fit, Point, SeriesStatistics};
use benchscope::config::PlotBox;
use benchscope::data::filter::filter_records;
use benchscope::data::model::{FieldValue, Record, SeriesConfig};
use benchscope::expr::{evaluate, Expression, Value};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn job(procs: i64, duration: &str, status: &str) -> Record {
    Record::from([
        ("NUM_PROCS", FieldValue::from(procs)),
        ("DURATION", FieldValue::from(duration)),
        ("status", FieldValue::from(status)),
    ])
}

#[test]
fn test_end_to_end_perfect_line() {
    let records: Vec<Record> = (1..=5).map(|a| Record::from([("a", a), ("b", 2 * a)])).collect();
    let configs = [SeriesConfig::new("a", "b", "a > 0")];

    let result = run_analysis(&records, &configs);
    let series = &result.series[0];

    assert!(series.issues.is_empty(), "unexpected issues: {:?}", series.issues);
    assert_eq!(series.points.len(), 5);
    assert_eq!(series.matched, 5);

    let reg = series.regression().expect("series should have a line");
    assert!(close(reg.beta, 2.0));
    assert!(close(reg.alpha, 0.0));
    assert_eq!(series.r_display(), Some(1.0));

    // x_min at the left margin, y_max at the top.
    assert!(close(series.points[0].x, 5.0));
    assert!(close(series.points[0].y, 95.0));
    assert!(close(series.points[4].x, 95.0));
    assert!(close(series.points[4].y, 5.0));

    let line = series.line.expect("line is scaled");
    assert!(close(line.x1, 5.0) && close(line.y1, 95.0));
    assert!(close(line.x2, 95.0) && close(line.y2, 5.0));
}

#[test]
fn test_regression_of_offset_line() {
    let points: Vec<Point> = (0..10).map(|i| Point::new(i as f64, 2.0 * i as f64 + 3.0)).collect();
    let stats = SeriesStatistics::compute(&points);
    let reg = stats.fit.regression().expect("line fit");
    assert!(close(reg.beta, 2.0));
    assert!(close(reg.alpha, 3.0));
    assert_eq!(reg.r_rounded(), Some(1.0));
    assert_eq!(reg.r_squared().map(|r2| (r2 * 1000.0).round()), Some(1000.0));
}

#[test]
fn test_vertical_cloud_has_no_fit() {
    let points = [Point::new(2.0, 1.0), Point::new(2.0, 5.0), Point::new(2.0, 9.0)];
    let stats = SeriesStatistics::compute(&points);
    assert_eq!(
        stats.fit,
        Fit::NoFit {
            reason: Degenerate::ZeroXVariance
        }
    );
}

#[test]
fn test_scaler_edges_and_flat_axis() {
    let bounds = Bounds {
        x_min: 10.0,
        x_max: 20.0,
        y_min: 3.0,
        y_max: 3.0,
    };
    let scaler = CoordinateScaler::new(bounds, PlotBox::default());
    assert!(close(scaler.scale_x(10.0), 5.0));
    assert!(close(scaler.scale_x(20.0), 95.0));
    assert!(close(scaler.scale_x(15.0), 50.0));
    // Zero y range: everything on the midline.
    assert!(close(scaler.scale_y(3.0), 50.0));
}

#[test]
fn test_filter_on_text_and_lenient_axis_numbers() {
    let records = vec![
        job(16, "40.5s", "COMPLETED"),
        job(32, "21.0s", "COMPLETED"),
        job(64, "11.2s", "FAILED"),
    ];

    let outcome = filter_records(&records, "status == 'COMPLETED' && NUM_PROCS >= 32");
    assert!(outcome.is_ok());
    assert_eq!(outcome.matched.len(), 1);
    assert_eq!(outcome.matched[0].get("NUM_PROCS"), Some(&FieldValue::Integer(32)));

    // Text is not compared with numbers...
    assert!(evaluate(&records[0], "DURATION < 30").is_err());

    // ...but an axis formula reads the leading number of a unit-suffixed value.
    let duration: Expression = "DURATION".parse().unwrap();
    assert_eq!(duration.evaluate_number(&records[0]), Ok(40.5));
    assert_eq!(
        evaluate(&records[1], "NUM_PROCS * 2").ok(),
        Some(Value::Number(64.0))
    );
}

#[test]
fn test_broken_series_does_not_disturb_others() {
    let records: Vec<Record> = (1..=4).map(|a| Record::from([("a", a), ("b", a * a)])).collect();
    let configs = [
        SeriesConfig::new("a", "b", "a >"),
        SeriesConfig::new("a", "b", ""),
        SeriesConfig::new("missing", "b", ""),
    ];
    let result = run_analysis(&records, &configs);

    assert!(result.series[0].issue_for("filter").is_some());
    assert_eq!(result.series[0].filter_failures, 4);
    assert!(result.series[0].points.is_empty());

    assert!(result.series[1].issues.is_empty());
    assert_eq!(result.series[1].points.len(), 4);

    assert!(result.series[2].issue_for("x").is_some());

    let labels = result.axis_labels().expect("series 1 and 2 plotted points");
    assert_eq!((labels.y_min, labels.y_max), (1.0, 16.0));
}

#[test]
fn test_deeply_nested_formula_is_a_series_issue() {
    let records: Vec<Record> = (1..=3).map(|a| Record::from([("a", a), ("b", a)])).collect();
    let deep = format!("{}a{}", "(".repeat(100_000), ")".repeat(100_000));
    let configs = [SeriesConfig::new(deep, "b", ""), SeriesConfig::new("a", "b", "")];

    let result = run_analysis(&records, &configs);
    let issue = result.series[0].issue_for("x").expect("x formula rejected");
    assert!(issue.to_string().contains("nests deeper"));
    assert_eq!(result.series[1].r_display(), Some(1.0));
}

#[test]
fn test_sub_epsilon_series_is_plotted_across_the_box() {
    let records: Vec<Record> = (0..5)
        .map(|i| {
            let x = i as f64 * 1e-17;
            Record::from([("x", x), ("y", 2.0 * x + 3e-17)])
        })
        .collect();
    let result = run_analysis(&records, &[SeriesConfig::new("x", "y", "")]);
    let series = &result.series[0];
    assert!(series.regression().is_some());
    assert!(close(series.points[0].x, 5.0));
    assert!(close(series.points[4].x, 95.0));
}
