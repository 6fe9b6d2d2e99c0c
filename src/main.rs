mod app;
mod chart;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use app::DashboardApp;
use config::AppConfig;
use data::loader::{load_datasets, TableSource};
use data::model::Datasets;
use eframe::egui;
use state::AppState;
use ui::dialog::resolve_data_file;

fn main() -> ExitCode {
    env_logger::init();

    // Both tables are read exactly once, before the window exists.
    let (config, datasets) = match startup() {
        Ok(loaded) => loaded,
        Err(e) => {
            log::error!("Failed to load data: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    let state = AppState::new(Arc::new(datasets), &config);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 850.0])
            .with_min_inner_size([700.0, 450.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        ui::panels::APP_TITLE,
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    );

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("UI error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn startup() -> Result<(AppConfig, Datasets)> {
    let config = AppConfig::load().map_err(|e| anyhow!("reading configuration: {e}"))?;
    log::debug!("{config:?}");

    let faculties = resolve_data_file(&config.faculties_path, "Tabla de facultades")?;
    let programs = resolve_data_file(&config.programs_path, "Tabla de carreras")?;

    let datasets = load_datasets(
        TableSource {
            path: &faculties,
            sheet: config.faculties_sheet.as_deref(),
        },
        TableSource {
            path: &programs,
            sheet: config.programs_sheet.as_deref(),
        },
    )?;

    Ok((config, datasets))
}
