//! Headless Lunar Lander Simulation
//!
//! Builds a procedural terrain, indexes it with the octree and flies the
//! lander onto the pad with a simple autopilot, logging the flight:
//! - Optional TOML / RON configuration file
//! - Fixed or variable time stepping driven by a jittery virtual frame clock
//! - Outcome, score and timing reported at the end
//!
//! Usage: `lander_sim [CONFIG] [--write-config PATH] [--frames N]`

mod autopilot;
mod terrain;

use std::path::PathBuf;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use lander_engine::config::{Config, ConfigError};
use lander_engine::core::config::{SimulationConfig, TimeStepMode};
use lander_engine::foundation::logging;
use lander_engine::foundation::time::{FixedTimestep, Stopwatch};
use lander_engine::game::{LanderGame, TickOutcome};

use autopilot::Autopilot;

/// Frames simulated when `--frames` is not given (two minutes at 60 fps)
const DEFAULT_FRAMES: u32 = 7_200;
/// Seed used for terrain and frame jitter when the config has none
const DEFAULT_SEED: u64 = 0x5eed;

/// Errors that end the simulation binary
#[derive(Error, Debug)]
enum AppError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid arguments: {0}")]
    Usage(String),
}

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    write_config: Option<PathBuf>,
    frames: Option<u32>,
}

impl Args {
    fn parse() -> Result<Self, AppError> {
        let mut args = Args::default();
        let mut iter = std::env::args().skip(1);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--write-config" => {
                    let path = iter.next().ok_or_else(|| AppError::Usage("--write-config needs a path".into()))?;
                    args.write_config = Some(PathBuf::from(path));
                }
                "--frames" => {
                    let count = iter.next().ok_or_else(|| AppError::Usage("--frames needs a count".into()))?;
                    let count = count
                        .parse()
                        .map_err(|_| AppError::Usage(format!("'{count}' is not a frame count")))?;
                    args.frames = Some(count);
                }
                flag if flag.starts_with("--") => {
                    return Err(AppError::Usage(format!("unknown option {flag}")));
                }
                path if args.config.is_none() => args.config = Some(PathBuf::from(path)),
                extra => return Err(AppError::Usage(format!("unexpected argument {extra}"))),
            }
        }
        Ok(args)
    }
}

fn load_config(args: &Args) -> Result<SimulationConfig, AppError> {
    let config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from {}", path.display());
            SimulationConfig::load_from_file(path)?
        }
        None => SimulationConfig::default(),
    };
    Ok(config.sanitized())
}

fn run(config: SimulationConfig, frames: u32) {
    let seed = config.rng_seed.unwrap_or(DEFAULT_SEED);

    let mesh = Arc::new(terrain::generate(&config.landing_zone, seed));
    log::info!(
        "Generated terrain: {} vertices, {} triangles",
        mesh.vertices().len(),
        mesh.triangle_count()
    );

    let mut game = LanderGame::with_mesh(mesh, config.clone());
    let autopilot = Autopilot::new(&config);
    let mut fixed = FixedTimestep::new(config.time_step.hz, config.time_step.max_substeps);
    let mut frame_clock = StdRng::seed_from_u64(seed.wrapping_add(2));

    log::info!("Time step: {:?} ({} Hz)", config.time_step.mode, config.time_step.hz);
    let stopwatch = Stopwatch::start_new();
    let mut simulated = 0.0_f32;
    let mut ticks = 0_u64;
    game.start();

    'frames: for frame in 0..frames {
        let frame_time: f32 = frame_clock.gen_range(0.010..0.025);
        let (steps, dt) = match config.time_step.mode {
            TimeStepMode::Fixed => (fixed.advance(frame_time), fixed.step()),
            TimeStepMode::Variable => (1, frame_time),
        };

        for _ in 0..steps {
            let input = autopilot.intent(&game);
            let outcome = game.tick(&input, dt);
            simulated += dt;
            ticks += 1;
            if matches!(outcome, TickOutcome::Crashed | TickOutcome::Landed(_)) {
                break 'frames;
            }
        }

        if frame % 120 == 0 {
            let lander = game.lander();
            log::info!(
                "t={:6.2}s pos=({:6.2}, {:6.2}, {:6.2}) vel=({:5.2}, {:5.2}, {:5.2}) height={:6.2} plume={}",
                simulated,
                lander.position.x,
                lander.position.y,
                lander.position.z,
                lander.velocity.x,
                lander.velocity.y,
                lander.velocity.z,
                game.state().distance_above_terrain,
                game.exhaust().system().len(),
            );
        }
    }

    let state = game.state();
    if state.ended() {
        log::info!("{:?}: {}", state.phase, state.message);
    } else {
        log::warn!("Frame limit reached before touchdown");
    }
    log::info!(
        "Score {} after {} ticks ({:.1}s simulated, {:.1} ms wall)",
        state.score,
        ticks,
        simulated,
        stopwatch.elapsed_millis()
    );
    println!("{:?} | score {} | {}", state.phase, state.score, state.message);
}

fn main() -> Result<(), AppError> {
    logging::init();

    let args = Args::parse()?;
    let config = load_config(&args)?;

    if let Some(path) = &args.write_config {
        config.save_to_file(path)?;
        log::info!("Wrote configuration to {}", path.display());
        return Ok(());
    }

    run(config, args.frames.unwrap_or(DEFAULT_FRAMES));
    Ok(())
}
