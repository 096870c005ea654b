//! Command line front end over the autoshape pipeline stages.
use std::path::Path;

use log::info;
use thiserror::Error;

use autoshape::daylight::run_daylight;
use autoshape::illumination::read_intervals;
use autoshape::pipeline::{run_google, run_shapes};
use autoshape::prelude::*;

mod cli;
use cli::Cli;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("pipeline error")]
    Pipeline(#[from] autoshape::Error),
}

fn main() -> Result<(), CliError> {
    pretty_env_logger::init_timed();

    let cli = Cli::new();
    let engine = FlatEngine::new();

    match cli.stage() {
        ("daylight", matches) => {
            let layout = MissionLayout::new(Cli::workspace(matches), Cli::mission(matches));
            let intervals = read_intervals(Path::new(Cli::intervals_filepath(matches)))?;
            let summary = run_daylight(&engine, &layout, intervals, Cli::offset(matches))?;
            info!(
                "{} segment(s) exported, {} skipped, {} empty",
                summary.exported.len(),
                summary.skipped.len(),
                summary.empty.len()
            );
        },
        ("shapes", matches) => {
            let layout = MissionLayout::new(Cli::workspace(matches), Cli::mission(matches));
            let swap_lens = OrbitNumber::from_text(Cli::swap_lens(matches))?;
            run_shapes(&engine, &layout, swap_lens)?;
        },
        ("google", matches) => {
            let layout = MissionLayout::new(Cli::workspace(matches), Cli::mission(matches));
            let overlays = run_google(&engine, &layout)?;
            info!("{} overlay(s) generated", overlays);
        },
        ("calendar", matches) => {
            let intervals = read_intervals(Path::new(Cli::intervals_filepath(matches)))?;
            let exporter = CalendarExporter::from_text(Cli::base_orbit(matches))?;
            let events = exporter.export(&intervals, &Cli::output_filepath(matches))?;
            info!("{} event(s) written", events);
        },
        _ => unreachable!("subcommand is required"),
    }
    Ok(())
}
