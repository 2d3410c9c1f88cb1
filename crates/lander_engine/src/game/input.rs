//! Per-tick player intent
//!
//! Key and slider handling live outside the engine; whatever drives the game
//! condenses its input into one [`InputIntent`] per tick.

use bitflags::bitflags;

use crate::core::config::ControlConfig;
use crate::foundation::math::{axes, Vec3};

bitflags! {
    /// Thrusters firing this tick
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Thrust: u8 {
        /// Main engine, +Y
        const UP = 1 << 0;
        /// -Z
        const FORWARD = 1 << 1;
        /// -X
        const LEFT = 1 << 2;
        /// +Z
        const BACK = 1 << 3;
        /// +X
        const RIGHT = 1 << 4;
    }
}

const THRUST_AXES: [(Thrust, fn() -> Vec3); 5] = [
    (Thrust::UP, axes::up),
    (Thrust::FORWARD, axes::forward),
    (Thrust::LEFT, axes::left),
    (Thrust::BACK, axes::back),
    (Thrust::RIGHT, axes::right),
];

impl Thrust {
    /// Unit direction of every active thruster
    pub fn directions(self) -> impl Iterator<Item = Vec3> {
        THRUST_AXES
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, direction)| direction())
    }
}

/// Everything the game needs from the player for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputIntent {
    /// Active thrusters
    pub thrust: Thrust,
    /// Gravity magnitude (positive = down)
    pub gravity: f32,
    /// Impulse magnitude per active thruster
    pub thrust_magnitude: f32,
    /// Bounce restitution
    pub restitution: f32,
}

impl Default for InputIntent {
    fn default() -> Self {
        Self::idle(&ControlConfig::default())
    }
}

impl InputIntent {
    /// No thrust, every slider at its default
    pub fn idle(controls: &ControlConfig) -> Self {
        Self {
            thrust: Thrust::empty(),
            gravity: controls.gravity.default,
            thrust_magnitude: controls.thrust_magnitude.default,
            restitution: controls.restitution.default,
        }
    }

    /// Builder: set the active thrusters
    #[must_use]
    pub fn with_thrust(mut self, thrust: Thrust) -> Self {
        self.thrust = thrust;
        self
    }

    /// Bring every parameter into its configured range
    #[must_use]
    pub fn clamped(self, controls: &ControlConfig) -> Self {
        Self {
            thrust: self.thrust,
            gravity: controls.gravity.clamp(self.gravity),
            thrust_magnitude: controls.thrust_magnitude.clamp(self.thrust_magnitude),
            restitution: controls.restitution.clamp(self.restitution),
        }
    }

    /// Bitwise equality; unlike `==`, a NaN parameter equals itself
    pub fn same_bits(&self, other: &Self) -> bool {
        self.thrust == other.thrust
            && self.gravity.to_bits() == other.gravity.to_bits()
            && self.thrust_magnitude.to_bits() == other.thrust_magnitude.to_bits()
            && self.restitution.to_bits() == other.restitution.to_bits()
    }

    /// One impulse vector per active thruster
    pub fn impulses(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.thrust.directions().map(|direction| direction * self.thrust_magnitude)
    }
}
