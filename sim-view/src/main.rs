//! Application entry point for the venation growth viewer.
//!
//! This binary sets up logging, optionally loads settings from a JSON
//! file given as the first argument, and delegates all interactive logic
//! and rendering to [`Viewer`] from the `viewer` module.

mod scene;
mod viewer;

use anyhow::Context;
use serde::Deserialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use venation_core::{DisplayFlags, Settings};
use viewer::Viewer;

/// Shape of the optional JSON settings file. Missing keys keep defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ViewerConfig {
    settings: Settings,
    display: DisplayFlags,
}

fn load_config(path: &str) -> anyhow::Result<ViewerConfig> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {path}"))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing {path}"))
}

/// Starts the native eframe application.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if eframe fails to create the native window or event loop.
fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("venation_view=info,venation_core=info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => match load_config(&path) {
            Ok(config) => {
                info!(%path, "loaded viewer config");
                config
            }
            Err(err) => {
                error!(%path, err = format!("{err:#}"), "could not load viewer config, using defaults");
                ViewerConfig::default()
            }
        },
        None => ViewerConfig::default(),
    };

    let viewer = match Viewer::new(config.settings, config.display) {
        Ok(viewer) => viewer,
        Err(err) => {
            error!(%err, "invalid settings, falling back to defaults");
            match Viewer::new(Settings::default(), config.display) {
                Ok(viewer) => viewer,
                Err(err) => {
                    error!(%err, "default scene could not be built");
                    std::process::exit(1);
                }
            }
        }
    };

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Venation",
        options,
        Box::new(|_cc| Ok(Box::new(viewer))),
    )
}
