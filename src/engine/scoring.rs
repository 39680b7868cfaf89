/// Points for one correct answer: a flat base plus a bonus for answering
/// inside the first second, scaled by the current level.
pub fn score_for(response_ms: f64, level: u32) -> u64 {
    let base = 100.0;
    let time_bonus = (1000.0 - response_ms.max(0.0)).max(0.0) / 10.0;
    let level_multiplier = 1.0 + level as f64 * 0.1;
    ((base + time_bonus) * level_multiplier).floor() as u64
}

pub fn level_bonus(new_level: u32) -> u64 {
    new_level as u64 * 500
}

/// Whole-percent accuracy, rounded. Zero attempts reads as zero.
pub fn accuracy_percent(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (correct as f64 / total as f64 * 100.0).round() as u32
}
