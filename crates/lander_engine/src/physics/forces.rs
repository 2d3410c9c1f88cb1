//! Force generators
//!
//! A force is evaluated once per particle per integration step and returns
//! the vector to add to that particle's accumulator.

use rand::Rng;

use crate::foundation::math::{utils, Vec3};
use crate::physics::Particle;

/// Force generator applied by a particle system
#[derive(Debug, Clone, PartialEq)]
pub enum Force {
    /// Constant acceleration scaled by mass; persists across ticks
    Gravity {
        /// Acceleration vector (usually pointing down)
        acceleration: Vec3,
    },

    /// One-shot push, removed after the tick it was applied in
    Impulse {
        /// Force vector contributed once
        force: Vec3,
        /// Set after the first application
        applied: bool,
    },

    /// Random force resampled on every application
    Turbulence {
        /// Per-component lower bound
        min: Vec3,
        /// Per-component upper bound
        max: Vec3,
    },
}

impl Force {
    /// Downward gravity of the given magnitude
    pub fn gravity(magnitude: f32) -> Self {
        Self::Gravity {
            acceleration: Vec3::new(0.0, -magnitude, 0.0),
        }
    }

    /// Fresh one-shot impulse
    pub fn impulse(force: Vec3) -> Self {
        Self::Impulse { force, applied: false }
    }

    /// Turbulence bounded per component; reversed bounds are swapped
    pub fn turbulence(a: Vec3, b: Vec3) -> Self {
        Self::Turbulence {
            min: utils::component_min(a, b),
            max: utils::component_max(a, b),
        }
    }

    /// Evaluate the force for one particle
    ///
    /// Impulses mark themselves applied here; the owning system removes
    /// them at the end of the tick.
    pub fn contribution<R: Rng + ?Sized>(&mut self, particle: &Particle, _dt: f32, rng: &mut R) -> Vec3 {
        match self {
            Self::Gravity { acceleration } => *acceleration * particle.mass,
            Self::Impulse { force, applied } => {
                *applied = true;
                *force
            }
            Self::Turbulence { min, max } => Vec3::new(
                sample(rng, min.x, max.x),
                sample(rng, min.y, max.y),
                sample(rng, min.z, max.z),
            ),
        }
    }

    /// True for an impulse that has already been applied
    pub fn is_consumed(&self) -> bool {
        matches!(self, Self::Impulse { applied: true, .. })
    }

    /// True for a gravity force
    pub fn is_gravity(&self) -> bool {
        matches!(self, Self::Gravity { .. })
    }
}

fn sample<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if lo < hi {
        rng.gen_range(lo..=hi)
    } else {
        lo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_gravity_scales_with_mass() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut particle = Particle::new(Vec3::zeros());
        particle.mass = 3.0;
        let mut gravity = Force::gravity(2.0);
        assert_relative_eq!(gravity.contribution(&particle, 0.1, &mut rng), Vec3::new(0.0, -6.0, 0.0));
        assert!(!gravity.is_consumed());
    }

    #[test]
    fn test_impulse_consumed_after_first_use() {
        let mut rng = StdRng::seed_from_u64(0);
        let particle = Particle::new(Vec3::zeros());
        let mut impulse = Force::impulse(Vec3::new(0.0, 5.0, 0.0));
        assert!(!impulse.is_consumed());
        assert_eq!(impulse.contribution(&particle, 0.1, &mut rng), Vec3::new(0.0, 5.0, 0.0));
        assert!(impulse.is_consumed());
    }

    #[test]
    fn test_turbulence_within_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let particle = Particle::new(Vec3::zeros());
        let mut turbulence = Force::turbulence(Vec3::new(2.0, -1.0, 0.0), Vec3::new(-2.0, 1.0, 0.0));
        for _ in 0..100 {
            let f = turbulence.contribution(&particle, 0.1, &mut rng);
            assert!((-2.0..=2.0).contains(&f.x));
            assert!((-1.0..=1.0).contains(&f.y));
            assert_eq!(f.z, 0.0);
        }
    }

    #[test]
    fn test_turbulence_deterministic_with_seed() {
        let particle = Particle::new(Vec3::zeros());
        let mut a = Force::turbulence(Vec3::repeat(-5.0), Vec3::repeat(5.0));
        let mut b = a.clone();
        let mut rng_a = StdRng::seed_from_u64(9);
        let mut rng_b = StdRng::seed_from_u64(9);
        assert_eq!(
            a.contribution(&particle, 0.1, &mut rng_a),
            b.contribution(&particle, 0.1, &mut rng_b)
        );
    }
}
