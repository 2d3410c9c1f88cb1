//! # Core Module
//!
//! Shared abstractions used throughout the engine.
//!
//! ## Organization
//!
//! - **Config**: the simulation configuration tree and its sections
//! - **Foundation**: low-level utilities (math, time, logging)

pub mod config;

// Re-export foundation modules for convenience
pub use crate::foundation;

// Re-export commonly used config types
pub use config::{
    SimulationConfig,
    LanderConfig,
    LandingZoneConfig,
    ControlConfig,
    ExhaustConfig,
    TimeStepConfig,
    TimeStepMode,
    ParameterRange,
    Config,
    ConfigError,
    ConfigFormat,
};
