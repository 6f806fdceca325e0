use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use benchscope::hotspot::Cell;

use crate::color::{delta_color, rank_glyph};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Hotspot comparison (central panel)
// ---------------------------------------------------------------------------

/// Column run pickers followed by the side-by-side hotspot table.
pub fn hotspot_table(ui: &mut Ui, state: &mut AppState) {
    if state.runs.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open hotspot runs to compare them  (File → Open runs…)");
        });
        return;
    }

    let mut assignment: Option<(usize, Option<usize>)> = None;
    ui.horizontal(|ui: &mut Ui| {
        for (col, selected) in state.column_runs.iter().enumerate() {
            let label = selected
                .and_then(|i| state.runs.get(i))
                .map_or("(empty)", |run| run.name.as_str());
            egui::ComboBox::from_id_salt(("column", col))
                .selected_text(label)
                .show_ui(ui, |ui: &mut Ui| {
                    if ui.selectable_label(selected.is_none(), "(empty)").clicked() {
                        assignment = Some((col, None));
                    }
                    for (i, run) in state.runs.iter().enumerate() {
                        if ui.selectable_label(*selected == Some(i), &run.name).clicked() {
                            assignment = Some((col, Some(i)));
                        }
                    }
                });
        }
        if ui.button("Add column").clicked() {
            assignment = Some((state.column_runs.len(), None));
        }
    });

    if let Some((col, run)) = assignment {
        if col == state.column_runs.len() {
            state.add_column();
        } else {
            state.assign_run(col, run);
        }
    }

    ui.separator();

    let columns = &state.comparison.columns;
    let rows = state.comparison.rows();

    TableBuilder::new(ui)
        .striped(true)
        .columns(Column::remainder().at_least(160.0), columns.len())
        .header(22.0, |mut header| {
            for run in columns.iter() {
                header.col(|ui: &mut Ui| {
                    ui.strong(run.map_or("(empty)", |r| r.name.as_str()));
                });
            }
        })
        .body(|mut body| {
            for row in &rows {
                body.row(20.0, |mut table_row| {
                    for cell in row {
                        table_row.col(|ui: &mut Ui| hotspot_cell(ui, cell));
                    }
                });
            }
        });
}

fn hotspot_cell(ui: &mut Ui, cell: &Cell<'_>) {
    let Some(entry) = cell.entry() else {
        return;
    };
    let mut text = RichText::new(format!(
        "{} {}  {:.1}%",
        rank_glyph(entry.rank_change),
        entry.function,
        entry.percent
    ));
    if let Some(color) = delta_color(entry.delta) {
        text = text.color(color);
    }
    ui.label(text);
}
