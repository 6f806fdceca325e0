//! Command line arguments and the numeric constants of plotting and comparison.

use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "benchscope",
    about = "Explore benchmark results: filter, regress and compare hotspot runs",
    after_help = "\
EXAMPLES:
    benchscope --catalog ./results                     Browse templates in a results directory
    benchscope --records runs.parquet --series s.json  Open a record table with saved series
    benchscope --headless --records r.json --series s.json --export out.json"
)]
pub struct Args {
    /// Record table to analyse (.json, .csv or .parquet)
    #[arg(short, long, value_name = "FILE")]
    pub records: Option<PathBuf>,

    /// Hotspot runs to compare (.json)
    #[arg(long, value_name = "FILE")]
    pub runs: Option<PathBuf>,

    /// Directory holding benchmarks.json and data/<template>.json
    #[arg(short, long, value_name = "DIR")]
    pub catalog: Option<PathBuf>,

    /// Saved series definitions (.json array of {x_expr, y_expr, filter_expr})
    #[arg(short, long, value_name = "FILE")]
    pub series: Option<PathBuf>,

    /// Run without the GUI and print the results as JSON
    #[arg(long)]
    pub headless: bool,

    /// Write headless output here instead of stdout
    #[arg(long, value_name = "FILE", requires = "headless")]
    pub export: Option<PathBuf>,

    /// Percentage points a hotspot may move before it is flagged
    #[arg(long, default_value_t = DeltaThresholds::default().band)]
    pub threshold: f64,
}

impl Args {
    pub fn thresholds(&self) -> DeltaThresholds {
        DeltaThresholds {
            band: self.threshold,
        }
    }
}

/// Geometry of the percentage plotting box.
///
/// Data is mapped into `[margin, margin + span]` of an `extent`-sized square.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotBox {
    pub margin: f64,
    pub span: f64,
    pub extent: f64,
}

impl Default for PlotBox {
    fn default() -> Self {
        Self {
            margin: 5.0,
            span: 90.0,
            extent: 100.0,
        }
    }
}

impl PlotBox {
    pub fn midline(&self) -> f64 {
        self.extent / 2.0
    }
}

/// Tolerance used when classifying hotspot percentage changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeltaThresholds {
    /// `-band <= diff < band` counts as unchanged.
    pub band: f64,
}

impl Default for DeltaThresholds {
    fn default() -> Self {
        Self { band: 2.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["benchscope"]);
        assert!(!args.headless);
        assert_eq!(args.thresholds(), DeltaThresholds::default());
        assert_eq!(PlotBox::default().midline(), 50.0);
    }

    #[test]
    fn test_export_requires_headless() {
        assert!(Args::try_parse_from(["benchscope", "--export", "out.json"]).is_err());
        let args =
            Args::try_parse_from(["benchscope", "--headless", "--export", "out.json", "--threshold", "5"])
                .unwrap();
        assert_eq!(args.thresholds().band, 5.0);
    }
}
