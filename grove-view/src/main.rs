//! Application entry point for the heart-rate tree viewer.
//!
//! This binary parses the command line, loads the growth configuration,
//! sets up logging and eframe/egui, and delegates all interactive logic
//! and rendering to [`Viewer`] from the `viewer` module.

mod scene;
mod viewer;

use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::Parser;
use grove_core::{config::Config, controller::GrowthController, source::SyntheticSource};
use log::info;

use viewer::Viewer;

/// Grows a tree while your heart rate stays calm.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// TOML file overriding the default growth parameters.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the synthetic heart-rate feed (random if omitted).
    #[arg(long)]
    seed: Option<u64>,
}

/// Starts the native eframe application.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if the config cannot be loaded or eframe fails to create the
///   native window or event loop.
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let cfg = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };
    let ctrl = GrowthController::new(cfg).context("building growth controller")?;
    let source = match args.seed {
        Some(seed) => SyntheticSource::seeded(seed),
        None => SyntheticSource::from_entropy(),
    };

    info!(
        "starting session: scale {}..{}, threshold {} BPM",
        cfg.initial_scale, cfg.target_scale, cfg.growth_threshold
    );

    eframe::run_native(
        "Pulse Grove",
        eframe::NativeOptions::default(),
        Box::new(move |_cc| Ok(Box::new(Viewer::new(ctrl, source)))),
    )
    .map_err(|e| anyhow!("viewer exited with error: {e}"))
}
