mod app;
mod color;
mod ui;

use anyhow::{Context, Result, anyhow};
use app::CosmoViewerApp;
use cosmo_viewer::config::ViewerConfig;
use cosmo_viewer::data::loader::load_observations;
use cosmo_viewer::state::AppState;
use eframe::egui;

fn main() -> Result<()> {
    env_logger::init();

    // Missing or malformed data is fatal before any window opens.
    let config = ViewerConfig::from_env().context("loading configuration")?;
    let dataset = load_observations(&config.table_path, &config.covariance_path)?;
    let state = AppState::new(config, dataset);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Cosmo Viewer – Supernova Fit",
        options,
        Box::new(|_cc| Ok(Box::new(CosmoViewerApp::new(state)))),
    )
    .map_err(|e| anyhow!("{e}"))
}
