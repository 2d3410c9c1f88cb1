//! Physics module for particle simulation and collision primitives
//!
//! Provides point-mass particles advanced under force generators, exhaust
//! emitters, and the ray / triangle primitives used by terrain queries.

pub mod collision;
pub mod emitter;
pub mod forces;
pub mod particle;
pub mod particle_system;

pub use collision::{PointContact, Ray, RayHit, Triangle};
pub use emitter::{EmitterShape, ParticleEmitter, ParticleVertex};
pub use forces::Force;
pub use particle::Particle;
pub use particle_system::ParticleSystem;
