use std::collections::HashMap;

use rand::Rng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::catalog::Category;
use crate::session::game::DifficultyMode;

// --- Tuning ---

/// Thresholds for the rolling-window difficulty adjustment. These are
/// tunable constants, not derived values; `Config` embeds them so they can
/// be overridden from the config file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdaptiveTuning {
    /// Minimum recorded answers before any adjustment, and the window size
    /// for the rolling means.
    #[serde(default = "default_adaptation_threshold")]
    pub adaptation_threshold: usize,
    #[serde(default = "default_up_accuracy")]
    pub up_accuracy: f64,
    #[serde(default = "default_up_response_ms")]
    pub up_response_ms: f64,
    #[serde(default = "default_down_accuracy")]
    pub down_accuracy: f64,
    #[serde(default = "default_level_step_up")]
    pub level_step_up: f64,
    #[serde(default = "default_level_step_down")]
    pub level_step_down: f64,
    #[serde(default = "default_level_min")]
    pub level_min: f64,
    #[serde(default = "default_level_max")]
    pub level_max: f64,
}

fn default_adaptation_threshold() -> usize {
    5
}
fn default_up_accuracy() -> f64 {
    0.8
}
fn default_up_response_ms() -> f64 {
    2000.0
}
fn default_down_accuracy() -> f64 {
    0.5
}
fn default_level_step_up() -> f64 {
    0.1
}
fn default_level_step_down() -> f64 {
    0.2
}
fn default_level_min() -> f64 {
    1.0
}
fn default_level_max() -> f64 {
    5.0
}

impl Default for AdaptiveTuning {
    fn default() -> Self {
        Self {
            adaptation_threshold: default_adaptation_threshold(),
            up_accuracy: default_up_accuracy(),
            up_response_ms: default_up_response_ms(),
            down_accuracy: default_down_accuracy(),
            level_step_up: default_level_step_up(),
            level_step_down: default_level_step_down(),
            level_min: default_level_min(),
            level_max: default_level_max(),
        }
    }
}

// --- Profile ---

/// Rolling performance model for one player. Histories grow unbounded
/// within a game but only the last `adaptation_threshold` entries are
/// consulted; the whole profile is reset at every new game.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdaptiveProfile {
    accuracy: Vec<u8>,
    response_times: Vec<f64>,
    preferences: HashMap<Category, u32>,
    difficulty_level: f64,
    #[serde(default)]
    tuning: AdaptiveTuning,
}

impl Default for AdaptiveProfile {
    fn default() -> Self {
        Self::new(AdaptiveTuning::default())
    }
}

impl AdaptiveProfile {
    pub fn new(tuning: AdaptiveTuning) -> Self {
        Self {
            accuracy: Vec::new(),
            response_times: Vec::new(),
            preferences: HashMap::new(),
            difficulty_level: tuning.level_min,
            tuning,
        }
    }

    pub fn difficulty_level(&self) -> f64 {
        self.difficulty_level
    }

    pub fn preference(&self, category: Category) -> u32 {
        self.preferences.get(&category).copied().unwrap_or(0)
    }

    pub fn answers_recorded(&self) -> usize {
        self.accuracy.len()
    }

    /// Record a correct answer. Response times below zero are clamped.
    pub fn record_success(&mut self, response_ms: f64) {
        self.accuracy.push(1);
        self.response_times.push(response_ms.max(0.0));

        if self.should_adapt_up() {
            self.difficulty_level =
                (self.difficulty_level + self.tuning.level_step_up).min(self.tuning.level_max);
        }
    }

    pub fn record_failure(&mut self) {
        self.accuracy.push(0);

        if self.should_adapt_down() {
            self.difficulty_level =
                (self.difficulty_level - self.tuning.level_step_down).max(self.tuning.level_min);
        }
    }

    /// Credit the played category so the weighted draw can favor it.
    pub fn bump_preference(&mut self, category: Category) {
        *self.preferences.entry(category).or_insert(0) += 1;
    }

    /// Pick the category for the next round. The first two levels always
    /// get animals; after that the draw is weighted by preference counters,
    /// falling back to uniform until any counter is non-zero.
    pub fn select_category(&self, rng: &mut SmallRng, level: u32) -> Category {
        let categories = Category::all();

        if level <= 2 {
            return Category::Animals;
        }

        let total: u32 = categories.iter().map(|&c| self.preference(c)).sum();
        if total == 0 {
            return categories[rng.gen_range(0..categories.len())];
        }

        // Weighted walk in fixed category order; normalized weights sum to
        // 1.0, so the draw lives in [0, 1).
        let mut draw = rng.gen_range(0.0..1.0);
        for &category in categories {
            draw -= self.preference(category) as f64 / total as f64;
            if draw <= 0.0 {
                return category;
            }
        }

        // Float rounding guard.
        categories[categories.len() - 1]
    }

    pub fn set_difficulty_mode(&mut self, mode: DifficultyMode) {
        match mode {
            DifficultyMode::Easy => self.difficulty_level = 1.0,
            DifficultyMode::Normal => self.difficulty_level = 2.0,
            // Adaptive is driven by record_success/record_failure alone.
            DifficultyMode::Adaptive => {}
        }
    }

    pub fn reset(&mut self) {
        self.accuracy.clear();
        self.response_times.clear();
        self.preferences.clear();
        self.difficulty_level = self.tuning.level_min;
    }

    fn recent_accuracy(&self) -> f64 {
        let window = self.tuning.adaptation_threshold;
        let recent = &self.accuracy[self.accuracy.len().saturating_sub(window)..];
        if recent.is_empty() {
            return 0.0;
        }
        recent.iter().map(|&v| v as f64).sum::<f64>() / recent.len() as f64
    }

    fn recent_response_ms(&self) -> f64 {
        let window = self.tuning.adaptation_threshold;
        let recent = &self.response_times[self.response_times.len().saturating_sub(window)..];
        if recent.is_empty() {
            return 0.0;
        }
        recent.iter().sum::<f64>() / recent.len() as f64
    }

    fn should_adapt_up(&self) -> bool {
        if self.accuracy.len() < self.tuning.adaptation_threshold {
            return false;
        }
        self.recent_accuracy() > self.tuning.up_accuracy
            && self.recent_response_ms() < self.tuning.up_response_ms
    }

    fn should_adapt_down(&self) -> bool {
        if self.accuracy.len() < self.tuning.adaptation_threshold {
            return false;
        }
        self.recent_accuracy() < self.tuning.down_accuracy
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "expected {b}, got {a}");
    }

    #[test]
    fn test_no_adjustment_below_threshold() {
        let mut profile = AdaptiveProfile::default();
        for _ in 0..4 {
            profile.record_success(500.0);
        }
        assert_close(profile.difficulty_level(), 1.0);
    }

    #[test]
    fn test_five_fast_successes_raise_by_one_step() {
        let mut profile = AdaptiveProfile::default();
        for _ in 0..5 {
            profile.record_success(500.0);
        }
        assert_close(profile.difficulty_level(), 1.1);
    }

    #[test]
    fn test_slow_successes_do_not_raise() {
        let mut profile = AdaptiveProfile::default();
        for _ in 0..10 {
            profile.record_success(2500.0);
        }
        assert_close(profile.difficulty_level(), 1.0);
    }

    #[test]
    fn test_difficulty_capped_at_max() {
        let mut profile = AdaptiveProfile::default();
        for _ in 0..100 {
            profile.record_success(300.0);
        }
        assert_close(profile.difficulty_level(), 5.0);
    }

    #[test]
    fn test_failures_lower_by_step_down_to_floor() {
        let mut profile = AdaptiveProfile::default();
        profile.set_difficulty_mode(DifficultyMode::Normal);
        assert_close(profile.difficulty_level(), 2.0);

        for _ in 0..4 {
            profile.record_failure();
        }
        assert_close(profile.difficulty_level(), 2.0);

        profile.record_failure();
        assert_close(profile.difficulty_level(), 1.8);

        for _ in 0..20 {
            profile.record_failure();
        }
        assert_close(profile.difficulty_level(), 1.0);
    }

    #[test]
    fn test_middling_accuracy_holds_steady() {
        let mut profile = AdaptiveProfile::default();
        profile.set_difficulty_mode(DifficultyMode::Normal);
        // 3/5 recent accuracy: above the down threshold, below the up one.
        for _ in 0..3 {
            profile.record_success(800.0);
        }
        profile.record_failure();
        profile.record_failure();
        for _ in 0..10 {
            profile.record_success(800.0);
            profile.record_failure();
            profile.record_failure();
        }
        // Window mean oscillates around 0.5 without crossing 0.8.
        assert!(profile.difficulty_level() <= 2.0);
        assert!(profile.difficulty_level() >= 1.0);
    }

    #[test]
    fn test_early_levels_always_animals() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut profile = AdaptiveProfile::default();
        profile.bump_preference(Category::Shapes);
        for level in 1..=2 {
            assert_eq!(profile.select_category(&mut rng, level), Category::Animals);
        }
    }

    #[test]
    fn test_zero_counters_draw_uniform() {
        let mut rng = SmallRng::seed_from_u64(42);
        let profile = AdaptiveProfile::default();
        for _ in 0..50 {
            let cat = profile.select_category(&mut rng, 3);
            assert!(Category::all().contains(&cat));
        }
    }

    #[test]
    fn test_single_counter_dominates_draw() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut profile = AdaptiveProfile::default();
        for _ in 0..5 {
            profile.bump_preference(Category::Colors);
        }
        for _ in 0..50 {
            assert_eq!(profile.select_category(&mut rng, 3), Category::Colors);
        }
    }

    #[test]
    fn test_negative_response_time_clamped() {
        let mut profile = AdaptiveProfile::default();
        for _ in 0..5 {
            profile.record_success(-100.0);
        }
        // Clamped times count as instant answers, so the level still rises.
        assert_close(profile.difficulty_level(), 1.1);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut profile = AdaptiveProfile::default();
        for _ in 0..10 {
            profile.record_success(300.0);
            profile.bump_preference(Category::Animals);
        }
        profile.reset();
        assert_close(profile.difficulty_level(), 1.0);
        assert_eq!(profile.answers_recorded(), 0);
        assert_eq!(profile.preference(Category::Animals), 0);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut profile = AdaptiveProfile::default();
        for _ in 0..7 {
            profile.record_success(650.0);
        }
        profile.record_failure();
        profile.bump_preference(Category::Animals);
        profile.bump_preference(Category::Animals);
        profile.bump_preference(Category::Shapes);

        let json = serde_json::to_string(&profile).unwrap();
        let restored: AdaptiveProfile = serde_json::from_str(&json).unwrap();

        assert_close(restored.difficulty_level(), profile.difficulty_level());
        for &cat in Category::all() {
            assert_eq!(restored.preference(cat), profile.preference(cat));
        }
    }
}
