use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::adaptive::AdaptiveTuning;
use crate::session::game::DifficultyMode;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// "easy", "normal" or "adaptive".
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    /// Correct answers faster than this count as fast matches.
    #[serde(default = "default_fast_match_ms")]
    pub fast_match_ms: f64,
    #[serde(default)]
    pub adaptive: AdaptiveTuning,
}

fn default_difficulty() -> String {
    "normal".to_string()
}
fn default_fast_match_ms() -> f64 {
    1000.0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            difficulty: default_difficulty(),
            fast_match_ms: default_fast_match_ms(),
            adaptive: AdaptiveTuning::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("matchling")
            .join("config.toml")
    }

    pub fn difficulty_mode(&self) -> DifficultyMode {
        DifficultyMode::from_key(&self.difficulty).unwrap_or(DifficultyMode::Normal)
    }

    /// Clamp out-of-range values from hand-edited config files back into
    /// usable bounds.
    pub fn validate(&mut self) {
        if DifficultyMode::from_key(&self.difficulty).is_none() {
            self.difficulty = default_difficulty();
        }
        if !self.fast_match_ms.is_finite() || self.fast_match_ms <= 0.0 {
            self.fast_match_ms = default_fast_match_ms();
        }

        let tuning = &mut self.adaptive;
        tuning.adaptation_threshold = tuning.adaptation_threshold.clamp(1, 50);
        tuning.up_accuracy = tuning.up_accuracy.clamp(0.0, 1.0);
        tuning.down_accuracy = tuning.down_accuracy.clamp(0.0, 1.0);
        if tuning.level_min < 1.0 {
            tuning.level_min = 1.0;
        }
        if tuning.level_max < tuning.level_min {
            tuning.level_max = tuning.level_min;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.difficulty, "normal");
        assert_eq!(config.fast_match_ms, 1000.0);
        assert_eq!(config.adaptive.adaptation_threshold, 5);
        assert_eq!(config.adaptive.level_max, 5.0);
    }

    #[test]
    fn test_partial_toml_fills_missing_fields() {
        let toml_str = r#"
difficulty = "easy"

[adaptive]
up_accuracy = 0.9
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.difficulty, "easy");
        assert_eq!(config.adaptive.up_accuracy, 0.9);
        // Untouched fields keep their defaults.
        assert_eq!(config.adaptive.down_accuracy, 0.5);
        assert_eq!(config.fast_match_ms, 1000.0);
    }

    #[test]
    fn test_serde_round_trip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config.difficulty, deserialized.difficulty);
        assert_eq!(config.fast_match_ms, deserialized.fast_match_ms);
        assert_eq!(
            config.adaptive.adaptation_threshold,
            deserialized.adaptive.adaptation_threshold
        );
    }

    #[test]
    fn test_validate_resets_unknown_difficulty() {
        let mut config = Config::default();
        config.difficulty = "nightmare".to_string();
        config.validate();
        assert_eq!(config.difficulty, "normal");
    }

    #[test]
    fn test_validate_clamps_tuning() {
        let mut config = Config::default();
        config.adaptive.adaptation_threshold = 0;
        config.adaptive.up_accuracy = 1.5;
        config.adaptive.level_min = 0.0;
        config.adaptive.level_max = 0.5;
        config.fast_match_ms = -5.0;
        config.validate();
        assert_eq!(config.adaptive.adaptation_threshold, 1);
        assert_eq!(config.adaptive.up_accuracy, 1.0);
        assert_eq!(config.adaptive.level_min, 1.0);
        assert_eq!(config.adaptive.level_max, 1.0);
        assert_eq!(config.fast_match_ms, 1000.0);
    }

    #[test]
    fn test_difficulty_mode_parse() {
        let mut config = Config::default();
        config.difficulty = "adaptive".to_string();
        assert_eq!(config.difficulty_mode(), DifficultyMode::Adaptive);
        config.difficulty = "bogus".to_string();
        assert_eq!(config.difficulty_mode(), DifficultyMode::Normal);
    }
}
