mod app;
mod color;
mod config;
mod data;
mod session;
mod ui;

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use app::StudentDashApp;
use config::DashboardConfig;
use eframe::egui;
use session::DashboardSession;

fn main() -> Result<()> {
    env_logger::init();

    let config = DashboardConfig::from_args(std::env::args_os());

    // A dataset that cannot be read ends the session before any window opens.
    let table = data::loader::load_table(&config.data_path)
        .inspect_err(|e| log::error!("Failed to load dataset: {e}"))
        .with_context(|| format!("failed to load dataset {}", config.data_path.display()))?;
    log::info!(
        "Loaded {} rows with columns {:?}",
        table.n_rows(),
        table.column_names().collect::<Vec<_>>()
    );

    let session = DashboardSession::new(Arc::new(table));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size(config.min_window_size),
        ..Default::default()
    };

    eframe::run_native(
        "Student Performance EDA Dashboard",
        options,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Ok(Box::new(StudentDashApp::new(session)))
        }),
    )
    .map_err(|e| anyhow!("{e}"))
}
