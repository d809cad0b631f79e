#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives the AlgoView engine headlessly.

mod config;
mod render;

use std::io;

use algoview_core::{AlgorithmKind, Progress, WELCOME_BANNER};
use algoview_grid::Grid;
use algoview_system_controller::StepController;
use algoview_system_pacing::TickClock;
use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{Args, Settings};

/// Entry point for the AlgoView command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let settings = Settings::from_args(Args::parse())?;
    println!("{WELCOME_BANNER}");
    run(&settings)
}

fn run(settings: &Settings) -> Result<()> {
    let grid = Grid::new(settings.width, settings.height).with_context(|| {
        format!(
            "cannot build a {}x{} grid",
            settings.width, settings.height
        )
    })?;
    let seed = settings.seed.unwrap_or_else(rand::random);
    info!(
        seed,
        speed = settings.speed,
        ticks_per_second = settings.ticks_per_second,
        "engine configured"
    );

    let mut controller = StepController::new(grid, seed);
    let mut clock = TickClock::new(settings.speed, settings.ticks_per_second);

    for kind in &settings.algorithms {
        play(&mut controller, &mut clock, *kind, settings)?;
        println!("{}", render::frame(controller.grid()));
        if let Some(summary) = controller.last_run() {
            println!("{}", render::summary(&summary));
        }
    }
    Ok(())
}

/// Paces one run with the tick clock until it completes.
fn play(
    controller: &mut StepController,
    clock: &mut TickClock,
    kind: AlgorithmKind,
    settings: &Settings,
) -> Result<()> {
    if !controller.activate(kind) {
        bail!("{} could not start while another run is active", kind.label());
    }

    for _ in 0..settings.max_ticks {
        for _ in 0..clock.operations_for_next_tick() {
            if controller.advance() == Progress::Exhausted {
                return Ok(());
            }
        }
        if settings.frames {
            println!("{}", render::frame(controller.grid()));
        }
    }

    bail!(
        "{} did not finish within {} ticks",
        kind.label(),
        settings.max_ticks
    )
}
