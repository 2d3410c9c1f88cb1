//! Simple autopilot that steers the lander onto the pad
//!
//! Stands in for keyboard input: it reads the game state and produces the
//! same per-tick intent a player would.

use lander_engine::core::config::SimulationConfig;
use lander_engine::foundation::math::{utils, Vec3};
use lander_engine::game::{InputIntent, LanderGame, Thrust};

/// Horizontal speed cap while travelling to the pad
const MAX_TRAVEL_SPEED: f32 = 3.0;
/// Velocity error tolerated before a thruster fires
const DEADBAND: f32 = 0.25;
/// Height kept while still away from the pad
const CRUISE_HEIGHT: f32 = 6.0;

/// Proportional controller over the five thrusters
#[derive(Debug, Clone)]
pub struct Autopilot {
    target: Vec3,
    radius: f32,
    idle: InputIntent,
}

impl Autopilot {
    /// Autopilot aiming for the configured landing zone
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            target: config.landing_zone.position,
            radius: config.landing_zone.radius,
            idle: InputIntent::idle(&config.controls),
        }
    }

    /// Intent for the next tick
    pub fn intent(&self, game: &LanderGame) -> InputIntent {
        let lander = game.lander();
        let offset = self.target - lander.position;
        let velocity = lander.velocity;
        let mut thrust = Thrust::empty();

        let desired_x = (offset.x * 0.3).clamp(-MAX_TRAVEL_SPEED, MAX_TRAVEL_SPEED);
        if velocity.x < desired_x - DEADBAND {
            thrust |= Thrust::RIGHT;
        } else if velocity.x > desired_x + DEADBAND {
            thrust |= Thrust::LEFT;
        }

        let desired_z = (offset.z * 0.3).clamp(-MAX_TRAVEL_SPEED, MAX_TRAVEL_SPEED);
        if velocity.z < desired_z - DEADBAND {
            thrust |= Thrust::BACK;
        } else if velocity.z > desired_z + DEADBAND {
            thrust |= Thrust::FORWARD;
        }

        let height = game.state().distance_above_terrain;
        let over_pad = utils::horizontal_distance(lander.position, self.target) < self.radius * 0.5;
        let desired_y = if !over_pad && height < CRUISE_HEIGHT {
            0.5
        } else if height > 8.0 {
            -4.0
        } else {
            -1.5
        };
        if velocity.y < desired_y {
            thrust |= Thrust::UP;
        }

        self.idle.with_thrust(thrust)
    }
}
