//! Particle system: owns particles and the forces acting on all of them

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::foundation::math::Vec3;
use crate::physics::{Force, Particle};

/// Collection of particles advanced together under shared forces
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    forces: Vec<Force>,
    rng: StdRng,
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl ParticleSystem {
    /// Empty system seeded from entropy
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            forces: Vec::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Empty system with a deterministic random source
    pub fn with_seed(seed: u64) -> Self {
        Self {
            particles: Vec::new(),
            forces: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Empty system seeded from `seed`, or from entropy when `None`
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::new, Self::with_seed)
    }

    /// Add a particle; returns its index
    pub fn add(&mut self, particle: Particle) -> usize {
        self.particles.push(particle);
        self.particles.len() - 1
    }

    /// Add a force acting on every particle
    pub fn add_force(&mut self, force: Force) {
        self.forces.push(force);
    }

    /// Forces currently registered
    pub fn forces(&self) -> &[Force] {
        &self.forces
    }

    /// Live particles in insertion order
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Random source shared by this system's forces
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Particle by index
    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    /// Number of live particles
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// True when no particle is alive
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Positions of all live particles, for rendering
    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.particles.iter().map(|p| p.position)
    }

    /// Set the acceleration of the persistent gravity force, adding one if missing
    pub fn set_gravity(&mut self, acceleration: Vec3) {
        let existing = self.forces.iter_mut().find(|f| f.is_gravity());
        match existing {
            Some(Force::Gravity { acceleration: current }) => *current = acceleration,
            _ => self.forces.push(Force::Gravity { acceleration }),
        }
    }

    /// Advance every particle one step, then drop expired particles and spent impulses
    pub fn update(&mut self, dt: f32) {
        let Self { particles, forces, rng } = self;
        for particle in particles.iter_mut() {
            for force in forces.iter_mut() {
                let contribution = force.contribution(particle, dt, &mut *rng);
                particle.forces += contribution;
            }
            particle.integrate(dt);
        }
        self.particles.retain(|p| !p.is_expired());
        self.retire_impulses();
    }

    /// Compute the state `particle` would reach after one step without
    /// storing it
    ///
    /// Impulses evaluated here count as applied; call
    /// [`retire_impulses`](Self::retire_impulses) once the tick is over.
    pub fn test(&mut self, particle: &Particle, dt: f32) -> Particle {
        let mut next = particle.clone();
        for force in &mut self.forces {
            let contribution = force.contribution(&next, dt, &mut self.rng);
            next.forces += contribution;
        }
        next.integrate(dt);
        next
    }

    /// Replace particle `index` with an accepted tentative state
    pub fn commit(&mut self, index: usize, state: Particle) {
        if let Some(particle) = self.particles.get_mut(index) {
            *particle = state;
        }
    }

    /// Remove impulses that have been applied
    pub fn retire_impulses(&mut self) {
        self.forces.retain(|f| !f.is_consumed());
    }

    /// Put particle `index` at rest at `position`
    pub fn reset(&mut self, index: usize, position: Vec3) {
        if let Some(particle) = self.particles.get_mut(index) {
            particle.reset(position);
        }
    }

    /// Set the velocity of particle `index`
    pub fn set_velocity(&mut self, index: usize, velocity: Vec3) {
        if let Some(particle) = self.particles.get_mut(index) {
            particle.velocity = velocity;
        }
    }

    /// Remove every particle; forces are kept
    pub fn clear(&mut self) {
        self.particles.clear();
    }
}
