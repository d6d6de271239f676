//! Chart Drawer - desktop workbench
//!
//! Usage: `chart_drawer [config.json]`. The optional JSON file sets the figure
//! size, style and palette used for every chart.

use anyhow::{Context, Result};
use chart_drawer::gui::ChartDrawerApp;
use chart_drawer::telemetry::init_default_tracing;
use chart_drawer::DrawerConfig;
use eframe::egui;
use tracing::info;

fn main() -> Result<()> {
    let _ = init_default_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => DrawerConfig::from_json_file(&path)
            .with_context(|| format!("reading config {}", path))?,
        None => DrawerConfig::default(),
    };
    info!(
        style = %config.style,
        palette = %config.palette,
        "starting workbench"
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([1000.0, 600.0])
            .with_title("Chart Drawer"),
        ..Default::default()
    };

    eframe::run_native(
        "Chart Drawer",
        options,
        Box::new(move |cc| Ok(Box::new(ChartDrawerApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("workbench failed: {}", e))
}
