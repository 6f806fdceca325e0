mod app;
mod color;
mod state;
mod ui;

use anyhow::Result;
use clap::Parser;
use eframe::egui;

use app::BenchscopeApp;
use benchscope::config::Args;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.headless {
        return benchscope::report::run_headless(&args);
    }

    let state = AppState::from_args(&args);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Benchscope – Benchmark Explorer",
        options,
        Box::new(move |_cc| Ok(Box::new(BenchscopeApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI terminated with an error: {e}"))
}
