use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use benchscope::analysis::SeriesIssue;

use crate::state::{AppState, View};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open records…").clicked() {
                open_records_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open runs…").clicked() {
                open_runs_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open results directory…").clicked() {
                open_catalog_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if ui
            .selectable_label(state.view == View::Analysis, "Analysis")
            .clicked()
        {
            state.set_view(View::Analysis);
        }
        if ui
            .selectable_label(state.view == View::Hotspots, "Hotspots")
            .clicked()
        {
            state.set_view(View::Hotspots);
        }

        ui.separator();

        template_selector(ui, state);

        match state.view {
            View::Analysis => {
                ui.label(format!("{} records loaded", state.records.len()));
            }
            View::Hotspots => {
                ui.label(format!("{} runs loaded", state.runs.len()));
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

fn template_selector(ui: &mut Ui, state: &mut AppState) {
    let Some(catalog) = &state.catalog else {
        return;
    };

    let current = state.selected_template.clone().unwrap_or_default();
    let mut picked: Option<String> = None;
    egui::ComboBox::from_id_salt("template")
        .selected_text(if current.is_empty() { "Select benchmark…" } else { current.as_str() })
        .show_ui(ui, |ui: &mut Ui| {
            for template in catalog.templates() {
                let vars: Vec<&str> = template.vars.iter().map(|v| v.name.as_str()).collect();
                let response = ui
                    .selectable_label(current == template.name, &template.name)
                    .on_hover_text(vars.join(", "));
                if response.clicked() {
                    picked = Some(template.name.clone());
                }
            }
        });

    if let Some(name) = picked {
        state.select_template(&name);
    }
    ui.separator();
}

// ---------------------------------------------------------------------------
// Left side panel – series editor
// ---------------------------------------------------------------------------

/// Render the series list: filter, x and y expressions plus fit summary.
pub fn series_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Series");
    ui.separator();

    let mut changed = false;
    let mut remove: Option<usize> = None;
    let mut add = false;
    let n_series = state.series.len();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (i, cfg) in state.series.iter_mut().enumerate() {
                let outcome = state.analysis.series.get(i);
                let color = state.palette.get(i).copied().unwrap_or(Color32::LIGHT_BLUE);

                ui.group(|ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        ui.label(RichText::new(format!("● Series {}", i + 1)).color(color).strong());
                        if n_series > 1 && ui.small_button("Remove").clicked() {
                            remove = Some(i);
                        }
                    });

                    let issue = |field: &str| outcome.and_then(|o| o.issue_for(field));
                    changed |= expression_field(ui, "Filter", &mut cfg.filter_expr, issue("filter"));
                    changed |= expression_field(ui, "X", &mut cfg.x_expr, issue("x"));
                    changed |= expression_field(ui, "Y", &mut cfg.y_expr, issue("y"));

                    if let Some(o) = outcome {
                        let fit = match (o.r_display(), o.regression()) {
                            (Some(r), Some(reg)) => {
                                format!("R = {r:.3}   y = {:.4} + {:.4}·x", reg.alpha, reg.beta)
                            }
                            (None, Some(reg)) => format!("flat line y = {:.4}", reg.alpha),
                            _ => issue("fit").map_or_else(String::new, ToString::to_string),
                        };
                        ui.label(RichText::new(format!("{} points  {fit}", o.matched)).small());
                        if o.filter_failures > 0 {
                            ui.label(
                                RichText::new(format!("{} records failed the filter", o.filter_failures))
                                    .small()
                                    .color(Color32::YELLOW),
                            );
                        }
                    }
                });
            }

            add = ui.button("Add series").clicked();
        });

    if add {
        state.add_series();
    } else if let Some(i) = remove {
        state.remove_series(i);
    } else if changed {
        state.replot();
    }
}

/// One labelled expression input; red when the expression failed.
fn expression_field(ui: &mut Ui, label: &str, text: &mut String, issue: Option<&SeriesIssue>) -> bool {
    let changed = ui
        .horizontal(|ui: &mut Ui| {
            ui.label(label);
            let mut edit = egui::TextEdit::singleline(text).hint_text("expression");
            if issue.is_some() {
                edit = edit.text_color(Color32::RED);
            }
            ui.add(edit).changed()
        })
        .inner;

    if let Some(issue) = issue {
        ui.label(RichText::new(issue.to_string()).small().color(Color32::RED));
    }
    changed
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_records_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open benchmark records")
        .add_filter("Supported files", &["parquet", "pq", "json", "csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.open_records(&path);
        state.set_view(View::Analysis);
    }
}

pub fn open_runs_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open hotspot runs")
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.open_runs(&path);
        state.set_view(View::Hotspots);
    }
}

pub fn open_catalog_dialog(state: &mut AppState) {
    if let Some(dir) = rfd::FileDialog::new()
        .set_title("Open results directory")
        .pick_folder()
    {
        state.open_catalog(&dir);
    }
}
