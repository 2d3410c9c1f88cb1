//! Lander game rules on top of the spatial index and particle physics

pub mod controller;
pub mod input;
pub mod state;

#[cfg(test)]
mod tests;

pub use controller::{LanderGame, TickOutcome};
pub use input::{InputIntent, Thrust};
pub use state::{GamePhase, GameState, LandingGrade, CRASH_MESSAGE};
