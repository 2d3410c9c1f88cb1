//! Scenario tests driving whole game ticks over small terrains


use std::sync::Arc;

use crate::core::config::SimulationConfig;
use crate::game::LanderGame;
use crate::spatial::TriangleMesh;

/// Fixed step used by every scenario
pub(super) const DT: f32 = 1.0 / 60.0;

fn game_over<F: Fn(f32, f32) -> f32>(height: F) -> LanderGame {
    let mesh = Arc::new(TriangleMesh::grid((-40.0, -40.0), 4.0, 20, 20, height));
    let config = SimulationConfig {
        rng_seed: Some(17),
        ..SimulationConfig::default()
    };
    LanderGame::with_mesh(mesh, config)
}

/// Flat ground at y = -1 covering the start point and the landing pad
pub(super) fn flat_game() -> LanderGame {
    game_over(|_, _| -1.0)
}

/// 45 degree ramp rising toward +X, at y = -1 along x = -20
pub(super) fn ramp_game() -> LanderGame {
    game_over(|x, _| x + 19.0)
}
