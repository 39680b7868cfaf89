use std::time::Instant;

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::engine::adaptive::AdaptiveProfile;
use crate::engine::scoring;
use crate::generator::round::{self, RoundSpec};
use crate::session::observer::{AnswerObserver, AnswerRecord};
use crate::session::outcome::{GameError, GameSummary, Outcome};

const MAX_STARS: u32 = 3;
const STARTING_MAX_ROUNDS: u32 = 10;
const MAX_ROUNDS_CAP: u32 = 15;

// --- Difficulty mode ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyMode {
    Easy,
    Normal,
    Adaptive,
}

impl DifficultyMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DifficultyMode::Easy => "easy",
            DifficultyMode::Normal => "normal",
            DifficultyMode::Adaptive => "adaptive",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "easy" => Some(DifficultyMode::Easy),
            "normal" => Some(DifficultyMode::Normal),
            "adaptive" => Some(DifficultyMode::Adaptive),
            _ => None,
        }
    }
}

// --- Session state ---

/// Mutable per-game counters. Owned by `MatchGame`; everything outside the
/// engine sees it read-only.
#[derive(Clone, Debug)]
pub struct GameSession {
    pub score: u64,
    pub level: u32,
    pub stars: u32,
    pub current_round: u32,
    pub max_rounds: u32,
    pub correct_answers: u32,
    pub total_answers: u32,
    pub difficulty: DifficultyMode,
}

impl GameSession {
    pub fn new(difficulty: DifficultyMode) -> Self {
        Self {
            score: 0,
            level: 1,
            stars: MAX_STARS,
            current_round: 0,
            max_rounds: STARTING_MAX_ROUNDS,
            correct_answers: 0,
            total_answers: 0,
            difficulty,
        }
    }

    fn reset(&mut self) {
        *self = Self::new(self.difficulty);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GamePhase {
    Idle,
    Playing,
    Paused,
}

/// Read-only snapshot for display layers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GameState {
    pub score: u64,
    pub level: u32,
    pub stars: u32,
    pub round: u32,
    pub max_rounds: u32,
    pub progress_percent: f64,
}

// --- Engine ---

/// The scoring and progression engine: drives the round generator, scores
/// answers against the active round, feeds the adaptive profile, and walks
/// the Idle → Playing ⇄ Paused state machine. Single-threaded; every
/// operation completes before returning.
pub struct MatchGame {
    session: GameSession,
    profile: AdaptiveProfile,
    rng: SmallRng,
    phase: GamePhase,
    round: Option<RoundSpec>,
    matched: usize,
    started_at: Option<Instant>,
    observers: Vec<Box<dyn AnswerObserver>>,
}

impl MatchGame {
    pub fn new(config: &Config) -> Self {
        Self::with_rng(config, SmallRng::from_entropy())
    }

    /// Seeded construction for deterministic rounds; all randomness flows
    /// through this generator.
    pub fn with_rng(config: &Config, rng: SmallRng) -> Self {
        let difficulty = config.difficulty_mode();
        let mut profile = AdaptiveProfile::new(config.adaptive.clone());
        profile.set_difficulty_mode(difficulty);
        Self {
            session: GameSession::new(difficulty),
            profile,
            rng,
            phase: GamePhase::Idle,
            round: None,
            matched: 0,
            started_at: None,
            observers: Vec::new(),
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn profile(&self) -> &AdaptiveProfile {
        &self.profile
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn current_round(&self) -> Option<&RoundSpec> {
        self.round.as_ref()
    }

    pub fn add_observer(&mut self, observer: impl AnswerObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Reset all counters and the adaptive profile, then deal round one.
    pub fn start_new_game(&mut self) -> Result<RoundSpec, GameError> {
        self.session.reset();
        self.profile.reset();
        self.matched = 0;
        self.started_at = Some(Instant::now());
        self.phase = GamePhase::Playing;
        self.deal_round()
    }

    /// Deal the next round mid-game (after a completed level, the caller
    /// asks for the first round of the new level through this).
    pub fn generate_round(&mut self) -> Result<RoundSpec, GameError> {
        if self.phase != GamePhase::Playing {
            return Err(GameError::NotPlaying);
        }
        self.deal_round()
    }

    fn deal_round(&mut self) -> Result<RoundSpec, GameError> {
        self.matched = 0;
        let spec = round::generate_round(&mut self.session, &self.profile, &mut self.rng)?;
        self.round = Some(spec.clone());
        Ok(spec)
    }

    /// Score one tap. The caller supplies correctness (which grid cell was
    /// tapped) and the measured response time; times below zero are
    /// clamped rather than rejected.
    pub fn process_answer(&mut self, correct: bool, response_ms: f64) -> Result<Outcome, GameError> {
        if self.phase != GamePhase::Playing {
            return Err(GameError::NotPlaying);
        }
        let (category, needed) = match &self.round {
            Some(round) => (round.category, round.correct_matches),
            None => return Err(GameError::NoActiveRound),
        };

        let response_ms = response_ms.max(0.0);
        self.session.total_answers += 1;
        self.notify(AnswerRecord {
            correct,
            response_ms,
            level: self.session.level,
            round: self.session.current_round,
            category,
            timestamp: Utc::now(),
        });

        if correct {
            self.session.correct_answers += 1;
            self.session.score += scoring::score_for(response_ms, self.session.level);
            self.profile.record_success(response_ms);
            self.profile.bump_preference(category);
            self.matched += 1;

            if self.matched >= needed {
                if self.session.current_round >= self.session.max_rounds {
                    return Ok(self.complete_level());
                }
                let next_round = self.deal_round()?;
                return Ok(Outcome::RoundComplete { next_round });
            }
            Ok(Outcome::Continue { success: true })
        } else {
            self.session.stars = self.session.stars.saturating_sub(1);
            self.profile.record_failure();

            if self.session.stars == 0 {
                return Ok(Outcome::GameOver(self.to_idle()));
            }
            Ok(Outcome::Continue { success: false })
        }
    }

    fn complete_level(&mut self) -> Outcome {
        self.session.level += 1;
        self.session.current_round = 0;
        self.session.stars = (self.session.stars + 1).min(MAX_STARS);
        self.session.max_rounds = (self.session.max_rounds + 1).min(MAX_ROUNDS_CAP);
        self.matched = 0;
        self.round = None;

        let bonus_score = scoring::level_bonus(self.session.level);
        self.session.score += bonus_score;

        Outcome::LevelComplete {
            new_level: self.session.level,
            bonus_score,
        }
    }

    /// Quit mid-game; yields the same summary a game-over would.
    pub fn end_game(&mut self) -> Result<GameSummary, GameError> {
        if self.phase == GamePhase::Idle {
            return Err(GameError::NotPlaying);
        }
        Ok(self.to_idle())
    }

    fn to_idle(&mut self) -> GameSummary {
        let summary = GameSummary {
            final_score: self.session.score,
            level: self.session.level,
            accuracy_percent: scoring::accuracy_percent(
                self.session.correct_answers,
                self.session.total_answers,
            ),
            play_time_secs: self
                .started_at
                .map(|t| t.elapsed().as_secs_f64())
                .unwrap_or(0.0),
        };
        self.phase = GamePhase::Idle;
        self.round = None;
        self.matched = 0;
        summary
    }

    pub fn pause(&mut self) {
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Playing;
        }
    }

    pub fn get_game_state(&self) -> GameState {
        GameState {
            score: self.session.score,
            level: self.session.level,
            stars: self.session.stars,
            round: self.session.current_round,
            max_rounds: self.session.max_rounds,
            progress_percent: self.session.current_round as f64 / self.session.max_rounds as f64
                * 100.0,
        }
    }

    pub fn set_difficulty_mode(&mut self, mode: DifficultyMode) {
        self.session.difficulty = mode;
        self.profile.set_difficulty_mode(mode);
    }

    fn notify(&mut self, record: AnswerRecord) {
        for observer in &mut self.observers {
            observer.on_answer(&record);
        }
    }
}
