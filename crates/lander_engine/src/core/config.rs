//! # Simulation Configuration
//!
//! Every tunable of the lander simulation in one serializable tree. The
//! defaults reproduce the classic lander setup: the body starts 20 units above
//! the origin, the landing pad sits at (15, -1, 17) with a radius of 6, and
//! the feet stick out 2.8 units along X and Z.
//!
//! ## Sections
//!
//! - **lander**: body start state, mass, damping, foot geometry, crash speed
//! - **landing_zone**: pad position and radius
//! - **controls**: live gravity / thrust / restitution parameters and ranges
//! - **exhaust**: plume emitter parameters
//! - **octree**: terrain index build and contact parameters
//! - **time_step**: fixed or variable integration step

use serde::{Serialize, Deserialize};

use crate::foundation::math::{Vec3, Vec4};
use crate::spatial::OctreeConfig;

pub use crate::config::{Config, ConfigError, ConfigFormat};

/// A live control parameter with its allowed range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterRange {
    /// Value used when nothing else is supplied
    pub default: f32,
    /// Smallest accepted value
    pub min: f32,
    /// Largest accepted value
    pub max: f32,
}

impl ParameterRange {
    /// Create a range, swapping the bounds if they arrive reversed
    pub fn new(default: f32, min: f32, max: f32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            default: default.clamp(min, max),
            min,
            max,
        }
    }

    /// Clamp a value into the range; NaN maps to the default
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.default
        } else {
            value.clamp(self.min, self.max)
        }
    }
}

/// Lander body parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanderConfig {
    /// Where the lander starts (and restarts)
    pub start_position: Vec3,
    /// Body mass
    pub mass: f32,
    /// Per-step multiplicative velocity decay, in (0, 1]
    pub damping: f32,
    /// Horizontal distance from the body center to each foot probe
    pub foot_offset: f32,
    /// Touching the ground faster than this is a crash
    pub crash_speed: f32,
}

impl Default for LanderConfig {
    fn default() -> Self {
        Self {
            start_position: Vec3::new(0.0, 20.0, 0.0),
            mass: 1.0,
            damping: 0.9999,
            foot_offset: 2.8,
            crash_speed: 7.0,
        }
    }
}

/// Landing pad
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandingZoneConfig {
    /// Pad center
    pub position: Vec3,
    /// Horizontal radius a foot must be within to count
    pub radius: f32,
}

impl Default for LandingZoneConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(15.0, -1.0, 17.0),
            radius: 6.0,
        }
    }
}

/// Live control parameters exposed as sliders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Downward gravitational acceleration
    pub gravity: ParameterRange,
    /// Thrust impulse magnitude per active direction per tick
    pub thrust_magnitude: ParameterRange,
    /// Fraction of normal velocity kept on a bounce
    pub restitution: ParameterRange,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            gravity: ParameterRange::new(2.5, 0.1, 10.0),
            thrust_magnitude: ParameterRange::new(5.0, 1.0, 200.0),
            restitution: ParameterRange::new(0.5, 0.1, 1.0),
        }
    }
}

/// Exhaust plume emitter parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExhaustConfig {
    /// Particles per second while thrusting
    pub rate: f32,
    /// Seconds each plume particle lives
    pub lifespan: f32,
    /// Initial particle velocity
    pub velocity: Vec3,
    /// Lower bound of the random turbulence force
    pub turbulence_min: Vec3,
    /// Upper bound of the random turbulence force
    pub turbulence_max: Vec3,
    /// Point sprite size handed to the renderer
    pub particle_size: f32,
    /// RGBA color tag
    pub color: Vec4,
}

impl Default for ExhaustConfig {
    fn default() -> Self {
        Self {
            rate: 30.0,
            lifespan: 0.25,
            velocity: Vec3::new(0.0, -15.0, 0.0),
            turbulence_min: Vec3::new(-90.0, -90.0, -90.0),
            turbulence_max: Vec3::new(90.0, 90.0, 90.0),
            particle_size: 20.0,
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
        }
    }
}

/// How the driver picks `dt`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeStepMode {
    /// Fixed-size substeps fed from real frame time
    Fixed,
    /// Real frame time used directly as `dt`
    Variable,
}

/// Integration step policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeStepConfig {
    /// Fixed or variable stepping
    pub mode: TimeStepMode,
    /// Steps per second in fixed mode
    pub hz: f32,
    /// Cap on substeps per frame in fixed mode
    pub max_substeps: u32,
}

impl Default for TimeStepConfig {
    fn default() -> Self {
        Self {
            mode: TimeStepMode::Fixed,
            hz: 60.0,
            max_substeps: 8,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for turbulence and emitter spread; `None` seeds from entropy
    pub rng_seed: Option<u64>,
    /// Lander body
    pub lander: LanderConfig,
    /// Landing pad
    pub landing_zone: LandingZoneConfig,
    /// Live control parameters
    pub controls: ControlConfig,
    /// Exhaust plume
    pub exhaust: ExhaustConfig,
    /// Terrain index
    pub octree: OctreeConfig,
    /// Step policy
    pub time_step: TimeStepConfig,
}

impl Config for SimulationConfig {}

impl SimulationConfig {
    /// Bring out-of-range values back into their valid domain
    ///
    /// Nothing here is an error: bad values are clamped and logged.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        let lander = &mut self.lander;
        if lander.mass.is_nan() || lander.mass <= 0.0 {
            log::warn!("lander mass {} is not positive, using 1.0", lander.mass);
            lander.mass = 1.0;
        }
        if lander.damping.is_nan() || lander.damping <= 0.0 || lander.damping > 1.0 {
            let clamped = if lander.damping > 1.0 { 1.0 } else { f32::EPSILON };
            log::warn!("lander damping {} outside (0, 1], using {}", lander.damping, clamped);
            lander.damping = clamped;
        }
        lander.foot_offset = lander.foot_offset.abs();
        lander.crash_speed = lander.crash_speed.max(0.0);

        self.landing_zone.radius = self.landing_zone.radius.max(0.0);

        let controls = &mut self.controls;
        controls.gravity = ParameterRange::new(controls.gravity.default, controls.gravity.min, controls.gravity.max);
        controls.thrust_magnitude = ParameterRange::new(
            controls.thrust_magnitude.default,
            controls.thrust_magnitude.min,
            controls.thrust_magnitude.max,
        );
        controls.restitution = ParameterRange::new(
            controls.restitution.default,
            controls.restitution.min,
            controls.restitution.max,
        );

        self.exhaust.rate = self.exhaust.rate.max(0.0);
        self.exhaust.lifespan = self.exhaust.lifespan.max(0.0);
        self.octree.contact_tolerance = self.octree.contact_tolerance.max(0.0);
        self
    }
}
