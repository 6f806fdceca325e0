use eframe::egui;

use crate::state::{AppState, View};
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct BenchscopeApp {
    pub state: AppState,
}

impl BenchscopeApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for BenchscopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        match self.state.view {
            View::Analysis => {
                // ---- Left side panel: series editor ----
                egui::SidePanel::left("series_panel")
                    .default_width(300.0)
                    .resizable(true)
                    .show(ctx, |ui| {
                        panels::series_panel(ui, &mut self.state);
                    });

                // ---- Central panel: scatter plot ----
                egui::CentralPanel::default().show(ctx, |ui| {
                    plot::analysis_plot(ui, &self.state);
                });
            }
            View::Hotspots => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    table::hotspot_table(ui, &mut self.state);
                });
            }
        }
    }
}
