mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::path::{Path, PathBuf};

use anyhow::Context;
use app::OutletLensApp;
use config::{DashboardConfig, CONFIG_FILE};
use eframe::egui;
use state::{AppState, Session};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut config = DashboardConfig::load_or_default(Path::new(CONFIG_FILE))?;
    if let Some(path) = std::env::args_os().nth(1) {
        config.data_path = PathBuf::from(path);
    }

    // The dataset must load before the window opens.
    let session = Session::from_file(&config.data_path, &config)
        .with_context(|| format!("cannot start without {}", config.data_path.display()))?;
    let state = AppState::new(config, session);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Outlet Lens – Retail Sales Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(OutletLensApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("window failed: {e}"))
}
