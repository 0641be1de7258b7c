//! Builders that turn domain events into activity drafts. Every builder is
//! pure: the same inputs always produce the same draft.

use super::types::{
    ActivityColor, ActivityMetadata, ActivityType, MilestoneKind, NewActivity, PlacementSummary,
};
use crate::database::{MatchId, Player, TournamentId};

pub const MATCH_ICON: &str = "⚔️";
pub const TOURNAMENT_ICON: &str = "🏆";
pub const STREAK_ICON: &str = "🔥";
pub const RANK_UP_ICON: &str = "📈";
pub const RANK_DOWN_ICON: &str = "📉";
pub const RIVALRY_ICON: &str = "⚡";
pub const NEW_PLAYER_ICON: &str = "🆕";
pub const MILESTONE_ICON: &str = "🎉";

/// Smallest streak that is worth announcing at all.
pub const MIN_ANNOUNCED_STREAK: u32 = 3;
/// Rivalry updates are only announced every this many head-to-head games.
pub const RIVALRY_STEP: u32 = 5;

pub fn match_result(
    match_id: MatchId,
    winner: &Player,
    loser: &Player,
    image_url: Option<&str>,
    notes: Option<&str>,
) -> NewActivity {
    NewActivity {
        activity_type: ActivityType::MatchResult,
        title: format!("{} wins!", winner.name),
        description: Some(format!("{} vs {}", winner.name, loser.name)),
        icon: MATCH_ICON,
        color: ActivityColor::Blue,
        metadata: ActivityMetadata {
            winner_id: Some(winner.id),
            winner_name: Some(winner.name.clone()),
            loser_id: Some(loser.id),
            loser_name: Some(loser.name.clone()),
            image_url: image_url.map(str::to_string),
            notes: notes.map(str::to_string),
            ..Default::default()
        },
        related_player_id: Some(winner.id),
        related_match_id: Some(match_id),
        related_tournament_id: None,
    }
}

/// `placements` are `(position, player)` pairs in any order; the metadata lists
/// them by ascending position.
pub fn tournament_complete(
    tournament_id: TournamentId,
    tournament_name: &str,
    placements: &[(u32, &Player)],
) -> NewActivity {
    let mut ordered: Vec<&(u32, &Player)> = placements.iter().collect();
    ordered.sort_by_key(|(position, _)| *position);

    let champion = ordered
        .iter()
        .find(|(position, _)| *position == 1)
        .map(|(_, player)| *player);
    let champion_name = champion.map(|p| p.name.as_str()).unwrap_or("A player");

    NewActivity {
        activity_type: ActivityType::TournamentComplete,
        title: format!("{} won {}!", champion_name, tournament_name),
        description: Some(format!("Tournament with {} participants", placements.len())),
        icon: TOURNAMENT_ICON,
        color: ActivityColor::Gold,
        metadata: ActivityMetadata {
            tournament_name: Some(tournament_name.to_string()),
            placements: Some(
                ordered
                    .iter()
                    .map(|(position, player)| PlacementSummary {
                        position: *position,
                        player_name: player.name.clone(),
                    })
                    .collect(),
            ),
            ..Default::default()
        },
        related_player_id: champion.map(|p| p.id),
        related_match_id: None,
        related_tournament_id: Some(tournament_id),
    }
}

/// `None` for streaks too short to announce.
pub fn winning_streak(player: &Player, streak_count: u32) -> Option<NewActivity> {
    if streak_count < MIN_ANNOUNCED_STREAK {
        return None;
    }

    Some(NewActivity {
        activity_type: ActivityType::WinningStreak,
        title: format!("{} is on fire!", player.name),
        description: Some(format!("{} wins in a row", streak_count)),
        icon: STREAK_ICON,
        color: ActivityColor::Orange,
        metadata: ActivityMetadata {
            player_name: Some(player.name.clone()),
            streak_count: Some(streak_count),
            ..Default::default()
        },
        related_player_id: Some(player.id),
        related_match_id: None,
        related_tournament_id: None,
    })
}

pub fn rank_change(player: &Player, old_rank: u32, new_rank: u32) -> NewActivity {
    let moved_up = new_rank < old_rank;

    NewActivity {
        activity_type: ActivityType::RankChange,
        title: format!("{} is now rank #{}!", player.name, new_rank),
        description: Some(if moved_up {
            format!("Up from #{}", old_rank)
        } else {
            format!("Down from #{}", old_rank)
        }),
        icon: if moved_up { RANK_UP_ICON } else { RANK_DOWN_ICON },
        color: if moved_up { ActivityColor::Green } else { ActivityColor::Red },
        metadata: ActivityMetadata {
            player_name: Some(player.name.clone()),
            old_rank: Some(old_rank),
            new_rank: Some(new_rank),
            ..Default::default()
        },
        related_player_id: Some(player.id),
        related_match_id: None,
        related_tournament_id: None,
    }
}

/// `None` unless `total_matches` is a positive multiple of [`RIVALRY_STEP`].
pub fn rivalry_update(
    player1: &Player,
    player2: &Player,
    player1_wins: u32,
    player2_wins: u32,
    total_matches: u32,
) -> Option<NewActivity> {
    if total_matches < RIVALRY_STEP || total_matches % RIVALRY_STEP != 0 {
        return None;
    }

    let title = if player1_wins == player2_wins {
        "Close rivalry!".to_string()
    } else {
        format!("Heated rivalry: {} vs {}", player1.name, player2.name)
    };

    Some(NewActivity {
        activity_type: ActivityType::RivalryUpdate,
        title,
        description: Some(format!("Series score {}-{}", player1_wins, player2_wins)),
        icon: RIVALRY_ICON,
        color: ActivityColor::Orange,
        metadata: ActivityMetadata {
            player1_id: Some(player1.id),
            player1_name: Some(player1.name.clone()),
            player2_id: Some(player2.id),
            player2_name: Some(player2.name.clone()),
            player1_wins: Some(player1_wins),
            player2_wins: Some(player2_wins),
            ..Default::default()
        },
        related_player_id: Some(player1.id),
        related_match_id: None,
        related_tournament_id: None,
    })
}

pub fn new_player(player: &Player) -> NewActivity {
    NewActivity {
        activity_type: ActivityType::NewPlayer,
        title: format!("{} joined!", player.name),
        description: Some("A new challenger has arrived".to_string()),
        icon: NEW_PLAYER_ICON,
        color: ActivityColor::Teal,
        metadata: ActivityMetadata {
            player_name: Some(player.name.clone()),
            ..Default::default()
        },
        related_player_id: Some(player.id),
        related_match_id: None,
        related_tournament_id: None,
    }
}

pub fn milestone(kind: MilestoneKind, count: i64) -> NewActivity {
    let title = match kind {
        MilestoneKind::Matches => format!("{} matches recorded!", count),
        MilestoneKind::Tournaments => format!("{} tournaments played!", count),
        MilestoneKind::Players => format!("{} players registered!", count),
    };

    NewActivity {
        activity_type: ActivityType::Milestone,
        title,
        description: Some("A new milestone".to_string()),
        icon: MILESTONE_ICON,
        color: ActivityColor::Purple,
        metadata: ActivityMetadata {
            milestone_type: Some(kind),
            milestone_count: Some(count),
            ..Default::default()
        },
        related_player_id: None,
        related_match_id: None,
        related_tournament_id: None,
    }
}
