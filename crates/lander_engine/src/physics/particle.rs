//! Point-mass particle state

use crate::foundation::math::{Vec3, Vec4};

/// Point mass advanced by a particle system
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Position in world space
    pub position: Vec3,

    /// Velocity in units per second
    pub velocity: Vec3,

    /// Force accumulator, zero between ticks
    pub forces: Vec3,

    /// Per-step multiplicative velocity decay, in (0, 1]
    pub damping: f32,

    /// Mass, always positive
    pub mass: f32,

    /// Seconds left to live (`None` = lives forever)
    pub lifespan: Option<f32>,

    /// Seconds since the particle was spawned
    pub age: f32,

    /// Optional RGBA tag for rendering
    pub color: Option<Vec4>,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            velocity: Vec3::zeros(),
            forces: Vec3::zeros(),
            damping: 0.99,
            mass: 1.0,
            lifespan: None,
            age: 0.0,
            color: None,
        }
    }
}

impl Particle {
    /// Create a particle at rest at `position`
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Builder: initial velocity
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Builder: mass (non-positive values fall back to 1)
    #[must_use]
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = if mass > 0.0 { mass } else { 1.0 };
        self
    }

    /// Builder: damping clamped into (0, 1]
    #[must_use]
    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = if damping.is_nan() { 1.0 } else { damping.clamp(f32::EPSILON, 1.0) };
        self
    }

    /// Builder: finite lifespan in seconds
    #[must_use]
    pub fn with_lifespan(mut self, seconds: f32) -> Self {
        self.lifespan = Some(seconds);
        self
    }

    /// Builder: color tag
    #[must_use]
    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = Some(color);
        self
    }

    /// Current speed
    pub fn speed(&self) -> f32 {
        self.velocity.magnitude()
    }

    /// True once a finite lifespan has run out
    pub fn is_expired(&self) -> bool {
        self.lifespan.map_or(false, |remaining| remaining <= 0.0)
    }

    /// Advance one semi-implicit Euler step with the accumulated forces
    ///
    /// Clears the accumulator and ages the particle.
    pub fn integrate(&mut self, dt: f32) {
        let acceleration = self.forces / self.mass;
        self.velocity += acceleration * dt;
        self.velocity *= self.damping;
        self.position += self.velocity * dt;
        self.forces = Vec3::zeros();
        self.age += dt;
        if let Some(remaining) = self.lifespan.as_mut() {
            *remaining -= dt;
        }
    }

    /// Place the particle at rest at `position`
    pub fn reset(&mut self, position: Vec3) {
        self.position = position;
        self.velocity = Vec3::zeros();
        self.forces = Vec3::zeros();
        self.age = 0.0;
    }
}
