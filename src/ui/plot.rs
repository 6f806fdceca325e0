use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Scatter plot with regression lines (central panel)
// ---------------------------------------------------------------------------

/// Render every series in the shared percentage box.
pub fn analysis_plot(ui: &mut Ui, state: &AppState) {
    if state.records.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open benchmark records to plot them  (File → Open records…)");
        });
        return;
    }

    match state.analysis.axis_labels() {
        Some(b) => ui.label(format!(
            "x: {} … {}      y: {} … {}",
            b.x_min, b.x_max, b.y_min, b.y_max
        )),
        None => ui.label("No points to plot."),
    };

    let extent = state.plot_box.extent;
    // Scaled y grows downwards, egui_plot's y grows upwards.
    let flip = |y: f64| extent - y;

    Plot::new("analysis_plot")
        .legend(Legend::default())
        .show_axes(false)
        .include_x(0.0)
        .include_x(extent)
        .include_y(0.0)
        .include_y(extent)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (i, outcome) in state.analysis.series.iter().enumerate() {
                let color = state.palette.get(i).copied().unwrap_or(Color32::LIGHT_BLUE);
                let name = format!("Series {}", i + 1);

                let points: PlotPoints = outcome
                    .points
                    .iter()
                    .map(|p| [p.x, flip(p.y)])
                    .collect();
                plot_ui.points(Points::new(points).name(&name).color(color).radius(3.0));

                if let Some(seg) = outcome.line {
                    let line: PlotPoints = vec![[seg.x1, flip(seg.y1)], [seg.x2, flip(seg.y2)]].into();
                    plot_ui.line(Line::new(line).name(&name).color(color).width(1.5));
                }
            }
        });
}
