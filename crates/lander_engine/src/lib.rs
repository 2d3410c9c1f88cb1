//! # Lander Engine
//!
//! Collision and physics core for a 3D lunar-lander game.
//!
//! ## Features
//!
//! - **Terrain Octree**: static triangle-mesh index with point and ray queries
//! - **Particle Physics**: forces, semi-implicit Euler integration, emitters
//! - **Lander Rules**: foot probes, crash / landing / bounce resolution, scoring
//! - **Configuration**: TOML and RON simulation settings
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use lander_engine::prelude::*;
//!
//! let terrain = Arc::new(TriangleMesh::grid((-40.0, -40.0), 2.0, 40, 40, |_, _| -1.0));
//! let mut game = LanderGame::with_mesh(terrain, SimulationConfig::default());
//!
//! let input = InputIntent::default().with_thrust(Thrust::UP);
//! game.tick(&input, 1.0 / 60.0);
//! println!("{} above ground", game.state().distance_above_terrain);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;
pub mod config;
pub mod foundation;

// Simulation
pub mod spatial;
pub mod physics;
pub mod game;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        foundation::{
            math::{Vec3, Vec4},
            time::{FixedTimestep, Stopwatch},
        },
        spatial::{AABB, TriangleMesh, Octree, OctreeConfig, NO_TERRAIN_DISTANCE},
        physics::{Force, Particle, ParticleSystem, ParticleEmitter, ParticleVertex},
        game::{LanderGame, InputIntent, Thrust, GamePhase, GameState, LandingGrade, TickOutcome},
        core::config::{SimulationConfig, TimeStepMode, Config},
    };
}
