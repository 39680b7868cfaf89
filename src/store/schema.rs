use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::engine::achievements::{AchievementBook, ProgressStats};
use crate::engine::adaptive::AdaptiveProfile;

const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressData {
    pub schema_version: u32,
    pub stats: ProgressStats,
    pub achievements: AchievementBook,
}

impl Default for ProgressData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            stats: ProgressStats::default(),
            achievements: AchievementBook::default(),
        }
    }
}

/// Last adaptive profile of a finished game, kept so a returning player
/// does not start from a cold model.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProfileSnapshotData {
    pub schema_version: u32,
    pub profile: AdaptiveProfile,
}

impl Default for ProfileSnapshotData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            profile: AdaptiveProfile::default(),
        }
    }
}

pub const EXPORT_VERSION: u32 = 1;

/// Everything a family would carry between devices in one bundle.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportData {
    pub matchling_export_version: u32,
    pub exported_at: DateTime<Utc>,
    pub config: Config,
    pub progress: ProgressData,
    pub adaptive_profile: ProfileSnapshotData,
}
