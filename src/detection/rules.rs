//! Threshold rules behind the detector. Pure so they can be checked without a store.

use crate::activity::MilestoneKind;
use crate::config::DetectionSettings;
use crate::database::{Match, PlayerId};

/// Wins in a row for `player_id`, counted from the front of `recent` (newest
/// first) and stopping at the first match the player did not win.
pub fn consecutive_wins(player_id: PlayerId, recent: &[Match]) -> u32 {
    recent
        .iter()
        .filter(|m| m.involves(player_id))
        .take_while(|m| m.winner_id == player_id)
        .count() as u32
}

pub fn is_streak_milestone(streak: u32, thresholds: &[u32]) -> bool {
    thresholds.contains(&streak)
}

pub fn is_rivalry_milestone(total: u32, step: u32) -> bool {
    step > 0 && total >= step && total % step == 0
}

fn is_count_milestone(count: i64, step: u64) -> bool {
    step > 0 && count > 0 && (count as u64) % step == 0
}

/// Global milestones reached by the current match and tournament counts.
pub fn reached_milestones(
    match_count: i64,
    tournament_count: i64,
    settings: &DetectionSettings,
) -> Vec<(MilestoneKind, i64)> {
    let mut reached = Vec::new();
    if is_count_milestone(match_count, settings.match_milestone_step) {
        reached.push((MilestoneKind::Matches, match_count));
    }
    if is_count_milestone(tournament_count, settings.tournament_milestone_step) {
        reached.push((MilestoneKind::Tournaments, tournament_count));
    }
    reached
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::aggregator::fixtures::game;

    /// Newest first, the way the store returns them.
    fn history(results: &[bool]) -> Vec<Match> {
        let len = results.len() as i64;
        results
            .iter()
            .enumerate()
            .map(|(idx, won)| {
                let id = len - idx as i64;
                game(id, 1, 2, if *won { 1 } else { 2 }, id)
            })
            .collect()
    }

    #[test]
    fn test_consecutive_wins_stops_at_first_loss() {
        assert_eq!(consecutive_wins(1, &history(&[true, true, true, true, true, false, true])), 5);
        assert_eq!(consecutive_wins(1, &history(&[false, true, true])), 0);
        assert_eq!(consecutive_wins(1, &[]), 0);
    }

    #[test]
    fn test_streak_thresholds() {
        let thresholds = DetectionSettings::default().streak_thresholds;
        assert!(is_streak_milestone(5, &thresholds));
        assert!(!is_streak_milestone(4, &thresholds));
        assert!(!is_streak_milestone(6, &thresholds));
        assert!(is_streak_milestone(20, &thresholds));
        assert!(!is_streak_milestone(21, &thresholds));
    }

    #[test]
    fn test_rivalry_every_five_games() {
        assert!(!is_rivalry_milestone(0, 5));
        assert!(!is_rivalry_milestone(4, 5));
        assert!(is_rivalry_milestone(5, 5));
        assert!(!is_rivalry_milestone(6, 5));
        assert!(is_rivalry_milestone(15, 5));
    }

    #[test]
    fn test_match_milestone_only_on_exact_multiple() {
        let settings = DetectionSettings::default();
        assert_eq!(reached_milestones(50, 3, &settings), vec![(MilestoneKind::Matches, 50)]);
        assert!(reached_milestones(49, 3, &settings).is_empty());
        assert!(reached_milestones(51, 3, &settings).is_empty());
        assert!(reached_milestones(0, 0, &settings).is_empty());
    }

    #[test]
    fn test_both_milestones_fire_independently() {
        let settings = DetectionSettings::default();
        assert_eq!(
            reached_milestones(100, 10, &settings),
            vec![(MilestoneKind::Matches, 100), (MilestoneKind::Tournaments, 10)]
        );
    }
}
