use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::database::{Match, Player, PlayerId, TournamentPlacement};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub player: Player,
    pub total_wins: u32,
    pub total_losses: u32,
    pub total_matches: u32,
    pub win_percentage: f64,
    pub tournament_wins: u32,
    pub tournament_participations: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedPlayer {
    pub rank: usize,
    #[serde(flatten)]
    pub stats: PlayerStats,
}

#[derive(Default)]
struct Tally {
    wins: u32,
    matches: u32,
    tournament_wins: u32,
    participations: u32,
}

/// One stats row per player, in the order the players were given.
pub fn compute_player_stats(
    players: &[Player],
    matches: &[Match],
    placements: &[TournamentPlacement],
) -> Vec<PlayerStats> {
    let tallies = tally(matches, placements);

    players
        .iter()
        .map(|player| {
            let tally = tallies.get(&player.id);
            let wins = tally.map_or(0, |t| t.wins);
            let total = tally.map_or(0, |t| t.matches);

            PlayerStats {
                player: player.clone(),
                total_wins: wins,
                total_losses: total - wins,
                total_matches: total,
                win_percentage: win_percentage(wins, total),
                tournament_wins: tally.map_or(0, |t| t.tournament_wins),
                tournament_participations: tally.map_or(0, |t| t.participations),
            }
        })
        .collect()
}

fn tally(matches: &[Match], placements: &[TournamentPlacement]) -> HashMap<PlayerId, Tally> {
    let mut tallies: HashMap<PlayerId, Tally> = HashMap::new();

    for game in matches {
        tallies.entry(game.player1_id).or_default().matches += 1;
        tallies.entry(game.player2_id).or_default().matches += 1;
        if game.involves(game.winner_id) {
            tallies.entry(game.winner_id).or_default().wins += 1;
        }
    }

    for placement in placements {
        let entry = tallies.entry(placement.player_id).or_default();
        entry.participations += 1;
        if placement.placement == 1 {
            entry.tournament_wins += 1;
        }
    }

    tallies
}

pub fn win_percentage(wins: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    f64::from(wins) / f64::from(total) * 100.0
}

/// Leaderboard order: most wins, then best win percentage, then most matches.
/// The sort is stable, so full ties keep their input order.
pub fn rank_players(mut stats: Vec<PlayerStats>) -> Vec<PlayerStats> {
    stats.sort_by(compare_for_ranking);
    stats
}

fn compare_for_ranking(a: &PlayerStats, b: &PlayerStats) -> Ordering {
    b.total_wins
        .cmp(&a.total_wins)
        .then_with(|| b.win_percentage.total_cmp(&a.win_percentage))
        .then_with(|| b.total_matches.cmp(&a.total_matches))
}

pub fn leaderboard(
    players: &[Player],
    matches: &[Match],
    placements: &[TournamentPlacement],
) -> Vec<RankedPlayer> {
    rank_players(compute_player_stats(players, matches, placements))
        .into_iter()
        .enumerate()
        .map(|(idx, stats)| RankedPlayer { rank: idx + 1, stats })
        .collect()
}
