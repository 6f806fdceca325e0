use std::path::Path;

use eframe::egui::Color32;

use benchscope::analysis::{run_analysis_with, AnalysisResult};
use benchscope::config::{Args, DeltaThresholds, PlotBox};
use benchscope::data::loader::{load_records, load_runs, load_series, Catalog};
use benchscope::data::model::{ColumnAssignment, Record, Run, SeriesConfig};
use benchscope::hotspot::{compare_runs_with, Comparison};

use crate::color::generate_palette;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Analysis,
    Hotspots,
}

/// The full UI state, independent of rendering.
///
/// Derived results (`analysis`, `comparison`) are recomputed from scratch
/// whenever their inputs change.
pub struct AppState {
    pub view: View,

    /// Results directory, when one was opened.
    pub catalog: Option<Catalog>,
    pub selected_template: Option<String>,

    /// Records under analysis.
    pub records: Vec<Record>,
    /// User-defined series.
    pub series: Vec<SeriesConfig>,
    /// Output of the last analysis run.
    pub analysis: AnalysisResult,
    /// One colour per series.
    pub palette: Vec<Color32>,

    /// Runs available for comparison.
    pub runs: Vec<Run>,
    /// Index into `runs` for each comparison column.
    pub column_runs: Vec<Option<usize>>,
    /// Output of the last comparison.
    pub comparison: Comparison,

    pub plot_box: PlotBox,
    pub thresholds: DeltaThresholds,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        let mut state = Self {
            view: View::default(),
            catalog: None,
            selected_template: None,
            records: Vec::new(),
            series: vec![SeriesConfig::default()],
            analysis: AnalysisResult::default(),
            palette: Vec::new(),
            runs: Vec::new(),
            column_runs: vec![None],
            comparison: Comparison::default(),
            plot_box: PlotBox::default(),
            thresholds: DeltaThresholds::default(),
            status_message: None,
        };
        state.replot();
        state.recompare();
        state
    }
}

impl AppState {
    /// Initial state from command line files. Load failures end up in the
    /// status line rather than aborting start-up.
    pub fn from_args(args: &Args) -> Self {
        let mut state = Self {
            thresholds: args.thresholds(),
            ..Self::default()
        };

        if let Some(path) = &args.catalog {
            state.open_catalog(path);
        }
        if let Some(path) = &args.series {
            match load_series(path) {
                Ok(series) if !series.is_empty() => {
                    state.series = series;
                    state.replot();
                }
                Ok(_) => {}
                Err(e) => state.report_error("loading series", &e),
            }
        }
        if let Some(path) = &args.records {
            state.open_records(path);
        }
        if let Some(path) = &args.runs {
            state.open_runs(path);
            if args.records.is_none() {
                state.view = View::Hotspots;
            }
        }
        state
    }

    pub fn report_error(&mut self, what: &str, err: &anyhow::Error) {
        log::error!("Failed {what}: {err:#}");
        self.status_message = Some(format!("Error {what}: {err:#}"));
    }

    // -- Inputs --

    pub fn open_records(&mut self, path: &Path) {
        match load_records(path) {
            Ok(records) => self.set_records(records),
            Err(e) => self.report_error("loading records", &e),
        }
    }

    pub fn open_runs(&mut self, path: &Path) {
        match load_runs(path) {
            Ok(runs) => self.set_runs(runs),
            Err(e) => self.report_error("loading runs", &e),
        }
    }

    pub fn open_catalog(&mut self, path: &Path) {
        match Catalog::open(path) {
            Ok(catalog) => {
                self.catalog = Some(catalog);
                self.selected_template = None;
                self.status_message = None;
            }
            Err(e) => self.report_error("opening catalogue", &e),
        }
    }

    pub fn set_records(&mut self, records: Vec<Record>) {
        self.records = records;
        self.status_message = None;
        self.replot();
    }

    /// Replace the available runs. Column assignments point into the old
    /// list, so they are cleared.
    pub fn set_runs(&mut self, runs: Vec<Run>) {
        self.runs = runs;
        self.column_runs.iter_mut().for_each(|c| *c = None);
        self.status_message = None;
        self.recompare();
    }

    pub fn set_view(&mut self, view: View) {
        if self.view != view {
            self.view = view;
            self.load_template_data();
        }
    }

    pub fn select_template(&mut self, name: &str) {
        self.selected_template = Some(name.to_string());
        self.load_template_data();
    }

    /// The template's data file holds records or runs; read it the way the
    /// current view needs it.
    fn load_template_data(&mut self) {
        let (Some(catalog), Some(name)) = (&self.catalog, &self.selected_template) else {
            return;
        };
        match self.view {
            View::Analysis => match catalog.records(name) {
                Ok(records) => self.set_records(records),
                Err(e) => self.report_error("loading template records", &e),
            },
            View::Hotspots => match catalog.runs(name) {
                Ok(runs) => self.set_runs(runs),
                Err(e) => self.report_error("loading template runs", &e),
            },
        }
    }

    // -- Analysis --

    pub fn add_series(&mut self) {
        self.series.push(SeriesConfig::default());
        self.replot();
    }

    pub fn remove_series(&mut self, index: usize) {
        if index < self.series.len() {
            self.series.remove(index);
            self.replot();
        }
    }

    pub fn replot(&mut self) {
        self.analysis = run_analysis_with(&self.records, &self.series, &self.plot_box);
        self.palette = generate_palette(self.series.len());
    }

    // -- Hotspot comparison --

    pub fn add_column(&mut self) {
        self.column_runs.push(None);
        self.recompare();
    }

    pub fn assign_run(&mut self, column: usize, run: Option<usize>) {
        if let Some(slot) = self.column_runs.get_mut(column) {
            *slot = run.filter(|&i| i < self.runs.len());
            self.recompare();
        }
    }

    pub fn recompare(&mut self) {
        let columns = ColumnAssignment::from_columns(
            self.column_runs
                .iter()
                .map(|idx| idx.and_then(|i| self.runs.get(i)).cloned())
                .collect(),
        );
        self.comparison = compare_runs_with(columns, &self.thresholds);
    }
}
