mod app;
mod chart;
mod data;
mod export;
mod gui;

use app::CeViewerApp;
use chart::view::ChartSettings;

fn main() -> eframe::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    log::info!("Starting CE Trace Viewer v{}", env!("CARGO_PKG_VERSION"));

    let settings = ChartSettings::from_env();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 500.0])
            .with_title("CE Trace Viewer")
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "CE Trace Viewer",
        options,
        Box::new(move |cc| Ok(Box::new(CeViewerApp::new(cc, settings)))),
    )
}
