use serde::Serialize;
use thiserror::Error;

use crate::catalog::Category;
use crate::generator::round::RoundSpec;

#[derive(Debug, Error)]
pub enum GameError {
    /// A category with no items reached the generator. Cannot happen with
    /// the compiled-in catalog; kept as a contract check.
    #[error("category '{}' has no items", .0.to_key())]
    InvalidCategory(Category),
    /// Distractors were required but the category has no item besides the
    /// target. A configuration error, never silently degraded.
    #[error("category '{}' cannot supply distractors", .0.to_key())]
    EmptyCandidatePool(Category),
    #[error("no game in progress")]
    NotPlaying,
    /// Answers arrived between a completed level and the next
    /// `generate_round` call.
    #[error("no active round")]
    NoActiveRound,
}

/// Final report when a game ends, by running out of stars or by quitting.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GameSummary {
    pub final_score: u64,
    pub level: u32,
    pub accuracy_percent: u32,
    pub play_time_secs: f64,
}

/// What one processed answer led to.
#[derive(Clone, Debug)]
pub enum Outcome {
    Continue { success: bool },
    RoundComplete { next_round: RoundSpec },
    LevelComplete { new_level: u32, bonus_score: u64 },
    GameOver(GameSummary),
}

impl Outcome {
    pub fn is_game_over(&self) -> bool {
        matches!(self, Outcome::GameOver(_))
    }
}
