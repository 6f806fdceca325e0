//! Headless mode: run the engine on files and write the results as JSON.

use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::analysis::pipeline::SeriesSummary;
use crate::analysis::{run_analysis, AnalysisResult, Bounds};
use crate::config::Args;
use crate::data::loader::{load_records, load_runs, load_series};
use crate::data::model::{ColumnAssignment, SeriesConfig};
use crate::hotspot::{compare_runs_with, Comparison};

#[derive(Debug, Serialize)]
pub struct AnalysisReport<'a> {
    pub records: usize,
    pub bounds: Option<Bounds>,
    pub axis_labels: Option<Bounds>,
    pub series: Vec<SeriesSummary<'a>>,
}

impl<'a> AnalysisReport<'a> {
    pub fn new(records: usize, result: &'a AnalysisResult, configs: &'a [SeriesConfig]) -> Self {
        Self {
            records,
            bounds: result.bounds,
            axis_labels: result.axis_labels(),
            series: result
                .series
                .iter()
                .zip(configs)
                .map(|(outcome, cfg)| outcome.summary(cfg))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ComparisonReport<'a> {
    pub columns: &'a ColumnAssignment,
    /// Function name per cell, `null` for placeholders.
    pub rows: Vec<Vec<Option<&'a str>>>,
}

impl<'a> ComparisonReport<'a> {
    pub fn new(comparison: &'a Comparison) -> Self {
        Self {
            columns: &comparison.columns,
            rows: comparison
                .rows()
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|cell| cell.entry().map(|e| e.function.as_str()))
                        .collect()
                })
                .collect(),
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct Report<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisReport<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonReport<'a>>,
}

pub fn write_json<W: Write, T: Serialize>(mut writer: W, doc: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, doc).context("serializing report")?;
    writeln!(writer).context("writing report")?;
    writer.flush().context("flushing report")
}

/// Load the inputs named on the command line, run them, write the report.
///
/// Every run given with `--runs` gets its own column, in file order.
pub fn run_headless(args: &Args) -> Result<()> {
    if args.records.is_none() && args.runs.is_none() {
        bail!("headless mode needs --records and/or --runs");
    }

    let records = args.records.as_deref().map(load_records).transpose()?;
    let configs = match (&records, args.series.as_deref()) {
        (Some(_), Some(path)) => load_series(path)?,
        (Some(_), None) => bail!("--records in headless mode needs --series"),
        (None, _) => Vec::new(),
    };
    let analysis = records.as_ref().map(|recs| run_analysis(recs, &configs));

    let comparison = match args.runs.as_deref() {
        Some(path) => {
            let runs = load_runs(path)?;
            let columns = ColumnAssignment::from_columns(runs.into_iter().map(Some).collect());
            Some(compare_runs_with(columns, &args.thresholds()))
        }
        None => None,
    };

    let report = Report {
        analysis: analysis
            .as_ref()
            .zip(records.as_ref())
            .map(|(result, recs)| AnalysisReport::new(recs.len(), result, &configs)),
        comparison: comparison.as_ref().map(ComparisonReport::new),
    };

    match &args.export {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            write_json(BufWriter::new(file), &report)?;
            log::info!("Wrote report to {}", path.display());
        }
        None => write_json(std::io::stdout().lock(), &report)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{HotspotEntry, Record, Run};
    use crate::hotspot::compare_runs;

    #[test]
    fn test_analysis_report_shape() {
        let recs: Vec<Record> = (1..=3).map(|a| Record::from([("a", a), ("b", a * 3)])).collect();
        let configs = vec![SeriesConfig::new("a", "b", "")];
        let result = run_analysis(&recs, &configs);
        let report = AnalysisReport::new(recs.len(), &result, &configs);

        let mut buf = Vec::new();
        write_json(&mut buf, &report).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(json["records"], 3);
        assert_eq!(json["series"][0]["r"], 1.0);
        assert_eq!(json["series"][0]["statistics"]["fit"]["state"], "line");
        assert_eq!(json["series"][0]["points"][0]["x"], 5.0);
        assert_eq!(json["axis_labels"]["y_max"], 9.0);
    }

    #[test]
    fn test_comparison_report_uses_null_placeholders() {
        let cmp = compare_runs(ColumnAssignment::from_columns(vec![
            Some(Run::new("a", vec![HotspotEntry::new("f", 10.0), HotspotEntry::new("g", 1.0)])),
            Some(Run::new("b", vec![HotspotEntry::new("f", 13.0)])),
        ]));
        let json = serde_json::to_value(ComparisonReport::new(&cmp)).unwrap();
        assert_eq!(json["rows"], serde_json::json!([["f", "f"], ["g", null]]));
        assert_eq!(json["columns"][1]["hotspots"][0]["delta"], "danger");
    }
}
