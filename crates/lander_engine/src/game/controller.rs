//! Lander game loop: forces, foot probes and collision response
//!
//! Each tick the lander is advanced tentatively, the four feet of the
//! tentative state are probed against the terrain, and the result decides
//! whether the step is committed, the episode ends, or the lander bounces.
//!
//! ```text
//! NotStarted --thrust/start--> Running --contact, fast--> Crashed
//!                                 |   --contact, on pad--> Landed
//!                                 |   --contact, off pad--> Running (bounce)
//!   Crashed/Landed --restart--> Running
//! ```

use std::sync::Arc;

use crate::core::config::SimulationConfig;
use crate::foundation::math::{utils, Vec3};
use crate::physics::{Force, Particle, ParticleEmitter, ParticleSystem, PointContact};
use crate::spatial::{Octree, OctreeConfig, TriangleMesh};

use super::input::{InputIntent, Thrust};
use super::state::{GamePhase, GameState, LandingGrade};

/// Index of the lander in its particle system
const LANDER: usize = 0;

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Game not running; nothing moved
    Idle,
    /// No foot touched; the step was committed
    Flying,
    /// Touched down too fast
    Crashed,
    /// Touched down on the pad
    Landed(LandingGrade),
    /// Touched down off the pad; velocity reflected about `normal`
    Bounced {
        /// Surface normal of the nearest foot contact
        normal: Vec3,
    },
}

/// Single-lander game over a static terrain
#[derive(Debug, Clone)]
pub struct LanderGame {
    config: SimulationConfig,
    terrain: Octree,
    lander: ParticleSystem,
    exhaust: ParticleEmitter,
    state: GameState,
    /// Last raw input that needed clamping, so a stuck slider warns once
    clamped_input: Option<InputIntent>,
}

impl LanderGame {
    /// Game over an already built terrain index
    pub fn new(terrain: Octree, config: SimulationConfig) -> Self {
        let config = config.sanitized();

        let mut lander = ParticleSystem::from_seed(config.rng_seed);
        lander.add(
            Particle::new(config.lander.start_position)
                .with_mass(config.lander.mass)
                .with_damping(config.lander.damping),
        );
        lander.set_gravity(Vec3::new(0.0, -config.controls.gravity.default, 0.0));

        let exhaust_config = &config.exhaust;
        let mut exhaust = ParticleEmitter::new(ParticleSystem::from_seed(
            config.rng_seed.map(|seed| seed.wrapping_add(1)),
        ));
        exhaust.rate = exhaust_config.rate;
        exhaust.lifespan = exhaust_config.lifespan;
        exhaust.velocity = exhaust_config.velocity;
        exhaust.particle_size = exhaust_config.particle_size;
        exhaust.color = exhaust_config.color;
        exhaust.position = config.lander.start_position;
        exhaust.add_force(Force::turbulence(exhaust_config.turbulence_min, exhaust_config.turbulence_max));

        Self {
            config,
            terrain,
            lander,
            exhaust,
            state: GameState::default(),
            clamped_input: None,
        }
    }

    /// Build the terrain index from `mesh` and start a game over it
    pub fn with_mesh(mesh: Arc<TriangleMesh>, config: SimulationConfig) -> Self {
        let terrain = Octree::build(mesh, config.octree.clone());
        Self::new(terrain, config)
    }

    /// UI-facing state
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Sanitized configuration in use
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Terrain index
    pub fn terrain(&self) -> &Octree {
        &self.terrain
    }

    /// Lander particle system
    pub fn lander_system(&self) -> &ParticleSystem {
        &self.lander
    }

    /// Exhaust plume emitter
    pub fn exhaust(&self) -> &ParticleEmitter {
        &self.exhaust
    }

    /// Current lander state
    pub fn lander(&self) -> &Particle {
        &self.lander.particles()[LANDER]
    }

    /// Place the lander directly, e.g. to stage a scenario
    pub fn place_lander(&mut self, position: Vec3, velocity: Vec3) {
        self.lander.reset(LANDER, position);
        self.lander.set_velocity(LANDER, velocity);
        self.exhaust.position = position;
    }

    /// Foot probe points around `center`: +X, -X, +Z, -Z
    pub fn foot_positions(&self, center: Vec3) -> [Vec3; 4] {
        let offset = self.config.lander.foot_offset;
        [
            center + Vec3::new(offset, 0.0, 0.0),
            center + Vec3::new(-offset, 0.0, 0.0),
            center + Vec3::new(0.0, 0.0, offset),
            center + Vec3::new(0.0, 0.0, -offset),
        ]
    }

    /// Leave the waiting phase
    pub fn start(&mut self) {
        if self.state.phase == GamePhase::NotStarted {
            log::info!("Game started");
            self.state.phase = GamePhase::Running;
        }
    }

    /// Put the lander back at the start and resume flying; the score is kept
    pub fn restart(&mut self) {
        let start = self.config.lander.start_position;
        self.lander.reset(LANDER, start);
        self.lander.retire_impulses();
        self.exhaust.stop();
        self.exhaust.clear();
        self.exhaust.position = start;
        self.state.resume();
        log::info!("Game restarted, score {}", self.state.score);
    }

    /// Rebuild the terrain index with new parameters
    pub fn rebuild_terrain(&mut self, config: OctreeConfig) {
        self.terrain.rebuild(config.clone());
        self.config.octree = config;
    }

    /// Advance the game by `dt` seconds under `input`
    pub fn tick(&mut self, input: &InputIntent, dt: f32) -> TickOutcome {
        if self.state.phase == GamePhase::NotStarted && input.thrust.contains(Thrust::UP) {
            self.start();
        }
        if !self.state.running() {
            return TickOutcome::Idle;
        }

        let input = self.clamp_input(input);
        self.lander.set_gravity(Vec3::new(0.0, -input.gravity, 0.0));
        for impulse in input.impulses() {
            self.lander.add_force(Force::impulse(impulse));
        }

        let current = self.lander().clone();
        let tentative = self.lander.test(&current, dt);
        let contact = self.nearest_foot_contact(tentative.position);

        let outcome = match contact {
            None => {
                self.lander.commit(LANDER, tentative);
                self.update_exhaust(&input, dt);
                self.state.distance_above_terrain = self.terrain.height_above(self.lander().position);
                TickOutcome::Flying
            }
            Some(_) if current.speed() > self.config.lander.crash_speed => {
                log::info!("Crashed at speed {:.2}", current.speed());
                self.state.crash();
                TickOutcome::Crashed
            }
            Some(contact) => match LandingGrade::from_feet(self.feet_on_pad(tentative.position)) {
                Some(grade) => {
                    self.state.land(grade);
                    log::info!("Landed ({:?}), score {}", grade, self.state.score);
                    TickOutcome::Landed(grade)
                }
                None => {
                    let normal = contact.normal;
                    let bounce = input.restitution * (-current.velocity).dot(&normal) * normal;
                    log::debug!("Bounced off triangle {} with velocity {:?}", contact.triangle, bounce);
                    self.lander.set_velocity(LANDER, bounce);
                    TickOutcome::Bounced { normal }
                }
            },
        };

        self.lander.retire_impulses();
        outcome
    }

    fn clamp_input(&mut self, raw: &InputIntent) -> InputIntent {
        let clamped = raw.clamped(&self.config.controls);
        if clamped.same_bits(raw) {
            self.clamped_input = None;
        } else {
            if !self.clamped_input.is_some_and(|last| last.same_bits(raw)) {
                log::warn!("input parameters out of range, clamped {:?} to {:?}", raw, clamped);
            }
            self.clamped_input = Some(*raw);
        }
        clamped
    }

    fn nearest_foot_contact(&self, center: Vec3) -> Option<PointContact> {
        self.foot_positions(center)
            .into_iter()
            .filter_map(|foot| self.terrain.intersect_point(foot))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn feet_on_pad(&self, center: Vec3) -> u32 {
        let zone = &self.config.landing_zone;
        self.foot_positions(center)
            .into_iter()
            .filter(|&foot| utils::horizontal_distance(foot, zone.position) < zone.radius)
            .count() as u32
    }

    fn update_exhaust(&mut self, input: &InputIntent, dt: f32) {
        if input.thrust.contains(Thrust::UP) {
            self.exhaust.start();
        } else {
            self.exhaust.stop();
        }
        self.exhaust.position = self.lander().position;
        self.exhaust.update(dt);
    }
}
