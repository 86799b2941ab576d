//! Live score projection
//!
//! Blends a player's pre-game projection with what they have already scored,
//! leaning on the projection early in the game and on the in-game pace late.
//! This is a heuristic, not a statistical model: the pace extrapolation
//! deliberately over-weights garbage-time regression.

use std::collections::HashMap;

use crate::clock::{GameClockState, GameStatus};
use crate::models::{PlayerStatLine, ScoringRules};

const EARLY_WEIGHT: f64 = 0.2;
const LINEAR_BASE_WEIGHT: f64 = 0.35;
const LINEAR_PROGRESS_WEIGHT: f64 = 0.65;
const LATE_WEIGHT: f64 = 0.45;

/// Estimate a player's final fantasy score from the current game state.
///
/// - no projection: 0
/// - game not started: the pre-game projection, actual stats ignored
/// - game complete: the actual score (0 without stats)
/// - in progress: interpolate from `max(projection, current)` towards the
///   pace-based decay estimate as the game clock runs down
pub fn estimate_live_score(
    rules: &ScoringRules,
    actual: Option<&PlayerStatLine>,
    projected: Option<&PlayerStatLine>,
    clock: &GameClockState,
) -> f64 {
    let Some(projected) = projected else {
        return 0.0;
    };

    let original_projection = rules.score(&projected.stats);
    if clock.status == GameStatus::NotStarted {
        return original_projection;
    }

    let current_score = actual.map(|line| rules.score(&line.stats)).unwrap_or(0.0);
    if clock.status == GameStatus::Complete {
        return current_score;
    }

    let fraction_remaining = clock.fraction_remaining();
    let minutes_remaining = clock.seconds_remaining as f64 / 60.0;
    let minutes_played = (60.0 - minutes_remaining).max(1.0);

    let pace_score = current_score
        + current_score / minutes_played * minutes_remaining * (minutes_remaining / 60.0);

    let early = EARLY_WEIGHT * fraction_remaining * pace_score;
    let linear = (LINEAR_BASE_WEIGHT + LINEAR_PROGRESS_WEIGHT * (1.0 - fraction_remaining)) * pace_score;
    let late = LATE_WEIGHT * fraction_remaining * pace_score;
    let decay_estimate = (early + linear + late).max(current_score);

    let floor = original_projection.max(current_score);
    floor + (1.0 - fraction_remaining) * (decay_estimate - floor)
}

/// Sum of live estimates over a roster's starters.
///
/// A projected line whose game is missing from `clocks` is treated as not
/// started.
pub fn project_roster(
    rules: &ScoringRules,
    starters: &[String],
    actual_by_player: &HashMap<String, PlayerStatLine>,
    projected_by_player: &HashMap<String, PlayerStatLine>,
    clocks: &HashMap<String, GameClockState>,
) -> f64 {
    starters
        .iter()
        .map(|player_id| {
            let projected = projected_by_player.get(player_id);
            let clock = match projected {
                Some(line) => clocks.get(&line.game_id).cloned().unwrap_or_else(|| {
                    tracing::warn!("No game clock for game {}, using pre-game projection", line.game_id);
                    GameClockState::not_started(line.game_id.clone())
                }),
                None => return 0.0,
            };
            estimate_live_score(rules, actual_by_player.get(player_id), projected, &clock)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FULL_GAME_SECONDS;
    use proptest::prelude::*;

    fn rules() -> ScoringRules {
        ScoringRules::new(HashMap::from([("pts".to_string(), 1.0), ("rec".to_string(), 0.5)]))
    }

    fn line(player: &str, game: &str, pts: f64) -> PlayerStatLine {
        PlayerStatLine {
            player_id: player.to_string(),
            game_id: game.to_string(),
            stats: HashMap::from([("pts".to_string(), pts)]),
        }
    }

    #[test]
    fn test_no_projection_scores_zero() {
        let actual = line("p1", "g1", 12.0);
        let clock = GameClockState::in_progress("g1", 1200);
        assert_eq!(estimate_live_score(&rules(), Some(&actual), None, &clock), 0.0);
    }

    #[test]
    fn test_not_started_returns_projection() {
        let projected = line("p1", "g1", 14.5);
        let actual = line("p1", "g1", 30.0);
        let clock = GameClockState::not_started("g1");

        assert_eq!(estimate_live_score(&rules(), Some(&actual), Some(&projected), &clock), 14.5);
        assert_eq!(estimate_live_score(&rules(), None, Some(&projected), &clock), 14.5);
    }

    #[test]
    fn test_complete_returns_actual() {
        let projected = line("p1", "g1", 14.5);
        let actual = line("p1", "g1", 3.0);
        let clock = GameClockState::complete("g1");

        assert_eq!(estimate_live_score(&rules(), Some(&actual), Some(&projected), &clock), 3.0);
        assert_eq!(estimate_live_score(&rules(), None, Some(&projected), &clock), 0.0);
    }

    #[test]
    fn test_halftime_blend() {
        // r = 0.5, current = 10, minutes played = 30, remaining = 30
        // pace = 10 + 10/30 * 30 * 0.5 = 15, decay = 15, floor = 12
        // result = 12 + 0.5 * (15 - 12) = 13.5
        let projected = line("p1", "g1", 12.0);
        let actual = line("p1", "g1", 10.0);
        let clock = GameClockState::in_progress("g1", 1800);

        let estimate = estimate_live_score(&rules(), Some(&actual), Some(&projected), &clock);
        assert!((estimate - 13.5).abs() < 1e-9, "got {}", estimate);
    }

    #[test]
    fn test_never_below_points_on_the_board() {
        let projected = line("p1", "g1", 5.0);
        let actual = line("p1", "g1", 22.0);
        for seconds in [3600, 2700, 1800, 600, 1] {
            let clock = GameClockState::in_progress("g1", seconds);
            let estimate = estimate_live_score(&rules(), Some(&actual), Some(&projected), &clock);
            assert!(estimate >= 22.0 - 1e-9, "{} at {}s", estimate, seconds);
        }
    }

    #[test]
    fn test_clock_edges_are_continuous() {
        let projected = line("p1", "g1", 12.0);

        // Kickoff with nothing scored matches the pre-game branch
        let kickoff = GameClockState::in_progress("g1", FULL_GAME_SECONDS);
        let at_kickoff = estimate_live_score(&rules(), None, Some(&projected), &kickoff);
        let pre_game =
            estimate_live_score(&rules(), None, Some(&projected), &GameClockState::not_started("g1"));
        assert!((at_kickoff - pre_game).abs() < 1e-9);

        // Final whistle matches the completed branch
        let actual = line("p1", "g1", 17.0);
        let final_whistle = GameClockState::in_progress("g1", 0);
        let at_zero = estimate_live_score(&rules(), Some(&actual), Some(&projected), &final_whistle);
        let complete =
            estimate_live_score(&rules(), Some(&actual), Some(&projected), &GameClockState::complete("g1"));
        assert!(at_zero.is_finite());
        assert!((at_zero - complete).abs() < 1e-9);

        let one_second = GameClockState::in_progress("g1", 1);
        let near_zero = estimate_live_score(&rules(), Some(&actual), Some(&projected), &one_second);
        assert!((near_zero - complete).abs() < 0.01);
    }

    #[test]
    fn test_project_roster_sums_starters() {
        let projected = HashMap::from([
            ("a".to_string(), line("a", "g1", 10.0)),
            ("b".to_string(), line("b", "g2", 8.0)),
            ("c".to_string(), line("c", "g3", 6.0)),
        ]);
        let actual = HashMap::from([("b".to_string(), line("b", "g2", 11.0))]);
        let clocks = HashMap::from([
            ("g1".to_string(), GameClockState::not_started("g1")),
            ("g2".to_string(), GameClockState::complete("g2")),
        ]);
        let starters: Vec<String> = ["a", "b", "c", "0"].iter().map(|s| s.to_string()).collect();

        // a: pre-game 10, b: final 11, c: no clock so pre-game 6, "0": empty slot
        let total = project_roster(&rules(), &starters, &actual, &projected, &clocks);
        assert!((total - 27.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_estimate_non_decreasing_in_current_score(
            seconds in 0u32..=3600,
            projection in 0.0f64..50.0,
            low in 0.0f64..60.0,
            bump in 0.0f64..30.0,
        ) {
            let projected = line("p", "g", projection);
            let clock = GameClockState::in_progress("g", seconds);
            let lower = estimate_live_score(&rules(), Some(&line("p", "g", low)), Some(&projected), &clock);
            let higher =
                estimate_live_score(&rules(), Some(&line("p", "g", low + bump)), Some(&projected), &clock);
            prop_assert!(higher + 1e-9 >= lower, "{} < {}", higher, lower);
        }
    }
}
