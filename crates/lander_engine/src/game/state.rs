//! Game phase, score and outcome messages

use crate::spatial::NO_TERRAIN_DISTANCE;

/// Message shown after a crash
pub const CRASH_MESSAGE: &str = "oops, you crashed!";

/// Where the episode stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GamePhase {
    /// Waiting for the first thrust
    #[default]
    NotStarted,
    /// Lander in flight
    Running,
    /// Touched down too fast
    Crashed,
    /// Touched down with at least one foot on the pad
    Landed,
}

/// Landing quality by number of feet on the pad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandingGrade {
    /// One foot on the pad
    OneFoot,
    /// Two feet on the pad
    Half,
    /// Three feet on the pad
    Mostly,
    /// All four feet on the pad
    Perfect,
}

impl LandingGrade {
    /// Grade for a feet count, `None` when no foot is on the pad
    pub fn from_feet(count: u32) -> Option<Self> {
        match count {
            0 => None,
            1 => Some(Self::OneFoot),
            2 => Some(Self::Half),
            3 => Some(Self::Mostly),
            _ => Some(Self::Perfect),
        }
    }

    /// Feet on the pad for this grade
    pub fn feet(self) -> u32 {
        match self {
            Self::OneFoot => 1,
            Self::Half => 2,
            Self::Mostly => 3,
            Self::Perfect => 4,
        }
    }

    /// Outcome text for the player
    pub fn message(self) -> &'static str {
        match self {
            Self::OneFoot => "Good job, but you only got 1 foot in the landing area",
            Self::Half => "Good job, but you were only half in the landing area",
            Self::Mostly => "Good job, you were mostly in the landing area",
            Self::Perfect => "Great job, you landed perfectly!",
        }
    }
}

/// Values the UI reads every frame
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    /// Current phase
    pub phase: GamePhase,
    /// Accumulated score, reset to zero by a crash
    pub score: u32,
    /// Outcome message, empty while flying
    pub message: String,
    /// Distance straight down to the terrain
    pub distance_above_terrain: f32,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            phase: GamePhase::NotStarted,
            score: 0,
            message: String::new(),
            distance_above_terrain: NO_TERRAIN_DISTANCE,
        }
    }
}

impl GameState {
    /// True once the first thrust started the game
    pub fn started(&self) -> bool {
        self.phase != GamePhase::NotStarted
    }

    /// True after a crash or a landing
    pub fn ended(&self) -> bool {
        matches!(self.phase, GamePhase::Crashed | GamePhase::Landed)
    }

    /// True while the lander is in flight
    pub fn running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub(crate) fn crash(&mut self) {
        self.phase = GamePhase::Crashed;
        self.score = 0;
        self.message = CRASH_MESSAGE.to_owned();
    }

    pub(crate) fn land(&mut self, grade: LandingGrade) {
        self.phase = GamePhase::Landed;
        self.score += grade.feet();
        self.message = grade.message().to_owned();
    }

    pub(crate) fn resume(&mut self) {
        self.phase = GamePhase::Running;
        self.message.clear();
        self.distance_above_terrain = NO_TERRAIN_DISTANCE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grades_by_feet() {
        assert_eq!(LandingGrade::from_feet(0), None);
        assert_eq!(LandingGrade::from_feet(2), Some(LandingGrade::Half));
        assert_eq!(LandingGrade::from_feet(4), Some(LandingGrade::Perfect));
        assert_eq!(LandingGrade::Mostly.feet(), 3);
    }

    #[test]
    fn test_phase_views() {
        let mut state = GameState::default();
        assert!(!state.started());
        assert!(!state.ended());

        state.resume();
        assert!(state.started() && state.running());

        state.land(LandingGrade::Perfect);
        assert!(state.ended());
        assert_eq!(state.score, 4);

        state.resume();
        state.crash();
        assert_eq!(state.score, 0);
        assert_eq!(state.message, CRASH_MESSAGE);
    }
}
