use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Category;
use crate::session::observer::SessionLog;
use crate::session::outcome::GameSummary;

// --- Achievement IDs ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AchievementId {
    FirstMatch,
    StarCollector,
    LevelMaster,
    PerfectRound,
    SpeedDemon,
    Explorer,
    Persistent,
}

impl AchievementId {
    pub fn to_key(self) -> &'static str {
        match self {
            AchievementId::FirstMatch => "first-match",
            AchievementId::StarCollector => "star-collector",
            AchievementId::LevelMaster => "level-master",
            AchievementId::PerfectRound => "perfect-round",
            AchievementId::SpeedDemon => "speed-demon",
            AchievementId::Explorer => "explorer",
            AchievementId::Persistent => "persistent",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "first-match" => Some(AchievementId::FirstMatch),
            "star-collector" => Some(AchievementId::StarCollector),
            "level-master" => Some(AchievementId::LevelMaster),
            "perfect-round" => Some(AchievementId::PerfectRound),
            "speed-demon" => Some(AchievementId::SpeedDemon),
            "explorer" => Some(AchievementId::Explorer),
            "persistent" => Some(AchievementId::Persistent),
            _ => None,
        }
    }
}

pub struct AchievementDef {
    pub id: AchievementId,
    pub icon: &'static str,
    /// Threshold on the stat the achievement watches.
    pub requirement: u32,
}

pub const ALL_ACHIEVEMENTS: &[AchievementDef] = &[
    AchievementDef { id: AchievementId::FirstMatch, icon: "🎯", requirement: 1 },
    AchievementDef { id: AchievementId::StarCollector, icon: "⭐", requirement: 10 },
    AchievementDef { id: AchievementId::LevelMaster, icon: "🏆", requirement: 5 },
    AchievementDef { id: AchievementId::PerfectRound, icon: "💎", requirement: 1 },
    AchievementDef { id: AchievementId::SpeedDemon, icon: "⚡", requirement: 5 },
    AchievementDef { id: AchievementId::Explorer, icon: "🗺️", requirement: 3 },
    AchievementDef { id: AchievementId::Persistent, icon: "🎮", requirement: 20 },
];

// --- Progress stats ---

/// Lifetime stats across games; the achievement checks read these.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressStats {
    pub total_score: u64,
    pub games_played: u32,
    pub total_stars: u32,
    pub highest_level: u32,
    pub total_play_secs: f64,
    pub perfect_rounds: u32,
    pub fast_matches: u32,
    pub categories_played: BTreeSet<Category>,
    pub last_played: Option<DateTime<Utc>>,
}

impl Default for ProgressStats {
    fn default() -> Self {
        Self {
            total_score: 0,
            games_played: 0,
            total_stars: 0,
            highest_level: 1,
            total_play_secs: 0.0,
            perfect_rounds: 0,
            fast_matches: 0,
            categories_played: BTreeSet::new(),
            last_played: None,
        }
    }
}

impl ProgressStats {
    /// Fold one finished game into the lifetime stats. Bonus stars are
    /// earned on level completion, so a game that ended at level N banked
    /// N-1 of them.
    pub fn record_game(&mut self, summary: &GameSummary, log: &SessionLog, fast_match_ms: f64) {
        self.total_score += summary.final_score;
        self.games_played += 1;
        self.total_stars += summary.level.saturating_sub(1);
        self.highest_level = self.highest_level.max(summary.level);
        self.total_play_secs += summary.play_time_secs;
        self.perfect_rounds += log.perfect_rounds();
        self.fast_matches += log.fast_matches(fast_match_ms);
        self.categories_played.extend(log.categories_played());
        self.last_played = Some(Utc::now());
    }

    pub fn average_score(&self) -> u64 {
        if self.games_played == 0 {
            return 0;
        }
        self.total_score / self.games_played as u64
    }
}

// --- Unlock state ---

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AchievementState {
    pub unlocked: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// Unlock bookkeeping, keyed by achievement key so the persisted form stays
/// readable and tolerant of future additions.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AchievementBook {
    pub states: HashMap<String, AchievementState>,
}

impl AchievementBook {
    pub fn is_unlocked(&self, id: AchievementId) -> bool {
        self.states.get(id.to_key()).is_some_and(|s| s.unlocked)
    }

    /// Re-evaluate every achievement against the stats, unlocking any whose
    /// requirement is now met. Returns the newly unlocked ones.
    pub fn check(&mut self, stats: &ProgressStats) -> Vec<AchievementId> {
        let mut newly_unlocked = Vec::new();
        for def in ALL_ACHIEVEMENTS {
            if self.is_unlocked(def.id) || !requirement_met(def, stats) {
                continue;
            }
            self.states.insert(
                def.id.to_key().to_string(),
                AchievementState {
                    unlocked: true,
                    unlocked_at: Some(Utc::now()),
                },
            );
            newly_unlocked.push(def.id);
        }
        newly_unlocked
    }
}

fn watched_stat(def: &AchievementDef, stats: &ProgressStats) -> u32 {
    match def.id {
        AchievementId::FirstMatch | AchievementId::Persistent => stats.games_played,
        AchievementId::StarCollector => stats.total_stars,
        AchievementId::LevelMaster => stats.highest_level,
        AchievementId::PerfectRound => stats.perfect_rounds,
        AchievementId::SpeedDemon => stats.fast_matches,
        AchievementId::Explorer => stats.categories_played.len() as u32,
    }
}

fn requirement_met(def: &AchievementDef, stats: &ProgressStats) -> bool {
    watched_stat(def, stats) >= def.requirement
}

pub fn progress_percent(def: &AchievementDef, stats: &ProgressStats) -> f64 {
    (watched_stat(def, stats) as f64 / def.requirement as f64 * 100.0).min(100.0)
}
