//! Particle emitter for exhaust plumes
//!
//! The emitter owns its own [`ParticleSystem`], so spawned particles only
//! feel the emitter's forces (typically turbulence), never the lander's
//! gravity or thrust.

use rand::Rng;

use crate::foundation::math::{Vec3, Vec4};
use crate::physics::{Force, Particle, ParticleSystem};

/// How spawned particles pick their initial velocity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmitterShape {
    /// Every particle gets the template velocity
    #[default]
    Directional,
    /// Random unit direction scaled by the template speed
    Radial,
}

/// Per-particle vertex for point-sprite rendering
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleVertex {
    /// World-space position
    pub position: [f32; 3],
    /// Point sprite size
    pub size: f32,
    /// RGBA color
    pub color: [f32; 4],
}

unsafe impl bytemuck::Pod for ParticleVertex {}
unsafe impl bytemuck::Zeroable for ParticleVertex {}

/// Spawns particles at a rate while started
#[derive(Debug, Clone)]
pub struct ParticleEmitter {
    system: ParticleSystem,

    /// Particles (groups) per second
    pub rate: f32,
    /// Lifespan of spawned particles in seconds
    pub lifespan: f32,
    /// Template velocity
    pub velocity: Vec3,
    /// Emit only while true
    pub started: bool,
    /// Spawn point
    pub position: Vec3,
    /// Velocity pattern
    pub shape: EmitterShape,
    /// Particles spawned per rate unit
    pub group_size: u32,
    /// Sprite size reported in [`ParticleVertex`]
    pub particle_size: f32,
    /// Color of spawned particles
    pub color: Vec4,

    spawn_budget: f32,
}

impl Default for ParticleEmitter {
    fn default() -> Self {
        Self::new(ParticleSystem::new())
    }
}

impl ParticleEmitter {
    /// Emitter around an existing (usually seeded) particle system
    pub fn new(system: ParticleSystem) -> Self {
        Self {
            system,
            rate: 1.0,
            lifespan: 1.0,
            velocity: Vec3::new(0.0, 1.0, 0.0),
            started: false,
            position: Vec3::zeros(),
            shape: EmitterShape::Directional,
            group_size: 1,
            particle_size: 1.0,
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            spawn_budget: 0.0,
        }
    }

    /// Add a force to the emitter's own system
    pub fn add_force(&mut self, force: Force) {
        self.system.add_force(force);
    }

    /// Begin emitting
    pub fn start(&mut self) {
        self.started = true;
    }

    /// Stop emitting; live particles keep flying
    pub fn stop(&mut self) {
        self.started = false;
        self.spawn_budget = 0.0;
    }

    /// Drop every live particle
    pub fn clear(&mut self) {
        self.system.clear();
        self.spawn_budget = 0.0;
    }

    /// The emitter's particle system
    pub fn system(&self) -> &ParticleSystem {
        &self.system
    }

    /// Spawn what the elapsed time allows, then advance all live particles
    pub fn update(&mut self, dt: f32) {
        if self.started && self.rate > 0.0 {
            self.spawn_budget += self.rate * dt;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let groups = self.spawn_budget.floor() as u32;
            self.spawn_budget -= groups as f32;
            for _ in 0..groups * self.group_size {
                self.spawn_one();
            }
        }
        self.system.update(dt);
    }

    fn spawn_one(&mut self) {
        let velocity = match self.shape {
            EmitterShape::Directional => self.velocity,
            EmitterShape::Radial => random_direction(self.system.rng_mut()) * self.velocity.magnitude(),
        };
        let particle = Particle::new(self.position)
            .with_velocity(velocity)
            .with_damping(1.0)
            .with_lifespan(self.lifespan)
            .with_color(self.color);
        self.system.add(particle);
    }

    /// Render data for every live particle
    pub fn vertices(&self) -> Vec<ParticleVertex> {
        self.system
            .particles()
            .iter()
            .map(|p| ParticleVertex {
                position: p.position.into(),
                size: self.particle_size,
                color: p.color.unwrap_or(self.color).into(),
            })
            .collect()
    }
}

/// Uniform random unit vector by rejection sampling
fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let candidate = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        let length_squared = candidate.magnitude_squared();
        if length_squared > 1.0e-6 && length_squared <= 1.0 {
            return candidate / length_squared.sqrt();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn exhaust() -> ParticleEmitter {
        let mut emitter = ParticleEmitter::new(ParticleSystem::with_seed(5));
        emitter.rate = 30.0;
        emitter.lifespan = 0.25;
        emitter.velocity = Vec3::new(0.0, -15.0, 0.0);
        emitter
    }

    #[test]
    fn test_idle_emitter_spawns_nothing() {
        let mut emitter = exhaust();
        emitter.update(1.0);
        assert!(emitter.system().is_empty());
    }

    #[test]
    fn test_rate_accumulates_fractional_budget() {
        let mut emitter = exhaust();
        emitter.start();
        emitter.update(0.02);
        assert_eq!(emitter.system().len(), 0);
        emitter.update(0.02);
        assert_eq!(emitter.system().len(), 1);
    }

    #[test]
    fn test_particles_expire_after_lifespan() {
        let mut emitter = exhaust();
        emitter.start();
        emitter.update(0.1);
        assert_eq!(emitter.system().len(), 3);
        emitter.stop();
        emitter.update(0.1);
        emitter.update(0.1);
        assert!(emitter.system().is_empty());
    }

    #[test]
    fn test_directional_velocity_and_vertices() {
        let mut emitter = exhaust();
        emitter.position = Vec3::new(1.0, 2.0, 3.0);
        emitter.particle_size = 20.0;
        emitter.start();
        emitter.update(0.1);
        let particle = &emitter.system().particles()[0];
        assert_relative_eq!(particle.velocity, Vec3::new(0.0, -15.0, 0.0));

        let vertices = emitter.vertices();
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[0].size, 20.0);
        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        assert_eq!(bytes.len(), 3 * std::mem::size_of::<ParticleVertex>());

        emitter.clear();
        assert!(emitter.vertices().is_empty());
    }

    #[test]
    fn test_radial_speed_matches_template() {
        let mut emitter = exhaust();
        emitter.shape = EmitterShape::Radial;
        emitter.group_size = 4;
        emitter.start();
        emitter.update(0.05);
        assert_eq!(emitter.system().len(), 4);
        for particle in emitter.system().particles() {
            assert_relative_eq!(particle.speed(), 15.0, epsilon = 1.0e-4);
        }
    }
}
