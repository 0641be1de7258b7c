use chrono::{DateTime, NaiveTime, Utc};
use serde::Serialize;

use super::aggregator::{compute_player_stats, rank_players, PlayerStats};
use super::head_to_head::{head_to_head, Classification, HeadToHead};
use crate::database::{
    Match, PlacementWithTournament, Player, TournamentPlacement, TournamentWithPlacements,
};

const TOP_PLAYERS: usize = 3;
const RECENT_RESULTS: usize = 5;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RecentResult {
    Match(Match),
    Tournament(TournamentWithPlacements),
}

impl RecentResult {
    /// Tournaments only carry a date; they sort as if played at midnight UTC.
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            RecentResult::Match(m) => m.played_at,
            RecentResult::Tournament(t) => t.tournament.tournament_date.and_time(NaiveTime::MIN).and_utc(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub player_count: usize,
    pub match_count: usize,
    pub tournament_count: usize,
    pub top_players: Vec<PlayerStats>,
    pub recent_results: Vec<RecentResult>,
}

pub fn dashboard(
    players: &[Player],
    matches: &[Match],
    tournaments: &[TournamentWithPlacements],
    placements: &[TournamentPlacement],
) -> DashboardSummary {
    let mut top_players = rank_players(compute_player_stats(players, matches, placements));
    top_players.truncate(TOP_PLAYERS);

    let mut recent_results: Vec<RecentResult> = matches
        .iter()
        .cloned()
        .map(RecentResult::Match)
        .chain(tournaments.iter().cloned().map(RecentResult::Tournament))
        .collect();
    recent_results.sort_by_key(|r| std::cmp::Reverse(r.occurred_at()));
    recent_results.truncate(RECENT_RESULTS);

    DashboardSummary {
        player_count: players.len(),
        match_count: matches.len(),
        tournament_count: tournaments.len(),
        top_players,
        recent_results,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RivalRecord {
    #[serde(flatten)]
    pub record: HeadToHead,
    pub classification: Classification,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub stats: PlayerStats,
    pub recent_matches: Vec<Match>,
    pub placements: Vec<PlacementWithTournament>,
    pub head_to_head: Vec<RivalRecord>,
}

/// `matches` are the player's own matches, newest first; `others` every other player.
pub fn player_profile(
    player: &Player,
    matches: Vec<Match>,
    placements: Vec<PlacementWithTournament>,
    others: &[Player],
) -> PlayerProfile {
    let raw_placements: Vec<TournamentPlacement> = placements.iter().map(|p| p.placement.clone()).collect();
    let stats = compute_player_stats(std::slice::from_ref(player), &matches, &raw_placements)
        .pop()
        .unwrap_or_else(|| PlayerStats {
            player: player.clone(),
            total_wins: 0,
            total_losses: 0,
            total_matches: 0,
            win_percentage: 0.0,
            tournament_wins: 0,
            tournament_participations: 0,
        });

    let head_to_head = head_to_head(player.id, &matches, others)
        .into_iter()
        .map(|record| RivalRecord {
            classification: record.classification(),
            record,
        })
        .collect();

    PlayerProfile {
        stats,
        recent_matches: matches,
        placements,
        head_to_head,
    }
}
