use rand::Rng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::catalog::{self, Category, Item};
use crate::engine::adaptive::AdaptiveProfile;
use crate::session::game::{DifficultyMode, GameSession};
use crate::session::outcome::GameError;

const EASY_MATCHES: usize = 3;
const NORMAL_MATCHES: usize = 2;

#[derive(Clone, Debug)]
pub struct Candidate {
    pub item: &'static Item,
    pub is_match: bool,
}

/// One screen of "find all matching items". Immutable once generated;
/// replaced when the round completes.
#[derive(Clone, Debug)]
pub struct RoundSpec {
    pub round: u32,
    pub category: Category,
    pub target: &'static Item,
    pub candidates: Vec<Candidate>,
    pub correct_matches: usize,
}

/// Grid size grows with level and is capped per mode: easy stays in
/// [4, 6], normal and adaptive in [6, 9].
pub fn grid_size(mode: DifficultyMode, level: u32) -> usize {
    let (base, cap) = match mode {
        DifficultyMode::Easy => (4, 6),
        DifficultyMode::Normal | DifficultyMode::Adaptive => (6, 9),
    };
    (base + (level / 3) as usize).min(cap)
}

fn select_category(session: &GameSession, profile: &AdaptiveProfile, rng: &mut SmallRng) -> Category {
    let categories = Category::all();
    match session.difficulty {
        DifficultyMode::Adaptive => profile.select_category(rng, session.level),
        // Easy mode introduces categories progressively.
        DifficultyMode::Easy if session.level <= 2 => Category::Animals,
        DifficultyMode::Easy if session.level <= 4 => {
            if rng.gen_bool(0.7) {
                Category::Animals
            } else {
                Category::Colors
            }
        }
        _ => categories[rng.gen_range(0..categories.len())],
    }
}

/// Build the next round: bump the session's round counter, pick a category
/// and target, then lay out match copies plus distractors and shuffle.
pub fn generate_round(
    session: &mut GameSession,
    profile: &AdaptiveProfile,
    rng: &mut SmallRng,
) -> Result<RoundSpec, GameError> {
    session.current_round += 1;

    let category = select_category(session, profile, rng);
    let items = catalog::items_of(category);
    if items.is_empty() {
        return Err(GameError::InvalidCategory(category));
    }

    let size = grid_size(session.difficulty, session.level);
    let correct_matches = match session.difficulty {
        DifficultyMode::Easy => EASY_MATCHES,
        _ => NORMAL_MATCHES,
    };

    let target_idx = rng.gen_range(0..items.len());
    let target = &items[target_idx];

    // Distractors are rejection-sampled against the target, so a
    // single-item category could never fill the remaining slots.
    if items.len() < 2 && size > correct_matches {
        return Err(GameError::EmptyCandidatePool(category));
    }

    let mut candidates = Vec::with_capacity(size.max(correct_matches));
    for _ in 0..correct_matches {
        candidates.push(Candidate {
            item: target,
            is_match: true,
        });
    }
    while candidates.len() < size {
        let idx = rng.gen_range(0..items.len());
        if idx != target_idx {
            candidates.push(Candidate {
                item: &items[idx],
                is_match: false,
            });
        }
    }

    candidates.shuffle(rng);

    Ok(RoundSpec {
        round: session.current_round,
        category,
        target,
        candidates,
        correct_matches,
    })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn make_round(mode: DifficultyMode, level: u32, seed: u64) -> RoundSpec {
        let mut session = GameSession::new(mode);
        session.level = level;
        let profile = AdaptiveProfile::default();
        let mut rng = SmallRng::seed_from_u64(seed);
        generate_round(&mut session, &profile, &mut rng).unwrap()
    }

    #[test]
    fn test_grid_size_bounds() {
        for level in 1..=40 {
            let easy = grid_size(DifficultyMode::Easy, level);
            assert!((4..=6).contains(&easy), "easy level {level}: {easy}");
            for mode in [DifficultyMode::Normal, DifficultyMode::Adaptive] {
                let size = grid_size(mode, level);
                assert!((6..=9).contains(&size), "level {level}: {size}");
            }
        }
    }

    #[test]
    fn test_grid_size_grows_with_level() {
        assert_eq!(grid_size(DifficultyMode::Normal, 1), 6);
        assert_eq!(grid_size(DifficultyMode::Normal, 3), 7);
        assert_eq!(grid_size(DifficultyMode::Normal, 9), 9);
        assert_eq!(grid_size(DifficultyMode::Normal, 30), 9);
        assert_eq!(grid_size(DifficultyMode::Easy, 1), 4);
        assert_eq!(grid_size(DifficultyMode::Easy, 12), 6);
    }

    #[test]
    fn test_match_count_per_mode() {
        for seed in 0..50 {
            let round = make_round(DifficultyMode::Normal, 1, seed);
            let matches = round.candidates.iter().filter(|c| c.is_match).count();
            assert_eq!(matches, 2);
            assert_eq!(round.correct_matches, 2);

            let round = make_round(DifficultyMode::Easy, 1, seed);
            let matches = round.candidates.iter().filter(|c| c.is_match).count();
            assert_eq!(matches, 3);
            assert_eq!(round.correct_matches, 3);
        }
    }

    #[test]
    fn test_candidates_fill_grid() {
        for seed in 0..20 {
            for level in [1, 5, 20] {
                let round = make_round(DifficultyMode::Normal, level, seed);
                assert_eq!(
                    round.candidates.len(),
                    grid_size(DifficultyMode::Normal, level)
                );
            }
        }
    }

    #[test]
    fn test_distractors_never_equal_target() {
        for seed in 0..100 {
            let round = make_round(DifficultyMode::Normal, 7, seed);
            for candidate in round.candidates.iter().filter(|c| !c.is_match) {
                assert!(
                    !std::ptr::eq(candidate.item, round.target),
                    "distractor {} is the target",
                    candidate.item.name
                );
                assert_ne!(candidate.item.name, round.target.name);
            }
        }
    }

    #[test]
    fn test_matches_are_the_target() {
        for seed in 0..20 {
            let round = make_round(DifficultyMode::Adaptive, 3, seed);
            for candidate in round.candidates.iter().filter(|c| c.is_match) {
                assert!(std::ptr::eq(candidate.item, round.target));
            }
        }
    }

    #[test]
    fn test_round_counter_increments() {
        let mut session = GameSession::new(DifficultyMode::Normal);
        let profile = AdaptiveProfile::default();
        let mut rng = SmallRng::seed_from_u64(1);
        let first = generate_round(&mut session, &profile, &mut rng).unwrap();
        let second = generate_round(&mut session, &profile, &mut rng).unwrap();
        assert_eq!(first.round, 1);
        assert_eq!(second.round, 2);
        assert_eq!(session.current_round, 2);
    }

    #[test]
    fn test_easy_mode_starts_with_animals() {
        for seed in 0..30 {
            let round = make_round(DifficultyMode::Easy, 1, seed);
            assert_eq!(round.category, Category::Animals);
        }
    }

    #[test]
    fn test_easy_mode_mid_levels_animals_or_colors() {
        for seed in 0..50 {
            let round = make_round(DifficultyMode::Easy, 3, seed);
            assert!(matches!(
                round.category,
                Category::Animals | Category::Colors
            ));
        }
    }

    #[test]
    fn test_target_belongs_to_category() {
        for seed in 0..20 {
            let round = make_round(DifficultyMode::Normal, 5, seed);
            assert!(
                catalog::items_of(round.category)
                    .iter()
                    .any(|i| std::ptr::eq(i, round.target))
            );
        }
    }
}
