use serde::Serialize;

use crate::database::{Match, Player, PlayerId};

/// Fewer games than this and a record is never classified.
pub const MIN_CLASSIFIED_GAMES: u32 = 5;
/// Loser-to-winner ratio needed for nemesis/dominating.
const CLASSIFICATION_RATIO: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Nemesis,
    Dominating,
    Even,
}

/// The subject's record against one opponent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadToHead {
    pub opponent: Player,
    pub wins: u32,
    pub losses: u32,
    pub total: u32,
}

impl HeadToHead {
    pub fn classification(&self) -> Classification {
        classify(self.wins, self.losses)
    }
}

/// Nemesis when losses are at least twice the wins (no wins at all counts),
/// dominating for the mirror case. Needs [`MIN_CLASSIFIED_GAMES`] games.
pub fn classify(wins: u32, losses: u32) -> Classification {
    if wins + losses < MIN_CLASSIFIED_GAMES {
        return Classification::Even;
    }
    if losses > wins && losses >= CLASSIFICATION_RATIO * wins {
        Classification::Nemesis
    } else if wins > losses && wins >= CLASSIFICATION_RATIO * losses {
        Classification::Dominating
    } else {
        Classification::Even
    }
}

/// Record of `subject` against every other player they have met, most games first.
pub fn head_to_head(subject: PlayerId, matches: &[Match], players: &[Player]) -> Vec<HeadToHead> {
    let mut records: Vec<HeadToHead> = players
        .iter()
        .filter(|opponent| opponent.id != subject)
        .filter_map(|opponent| {
            let (wins, losses) = tally_between(subject, opponent.id, matches);
            let total = wins + losses;
            (total > 0).then(|| HeadToHead {
                opponent: opponent.clone(),
                wins,
                losses,
                total,
            })
        })
        .collect();

    records.sort_by(|a, b| b.total.cmp(&a.total));
    records
}

/// `(wins, losses)` of `subject` in the games played against `opponent`.
pub fn tally_between(subject: PlayerId, opponent: PlayerId, matches: &[Match]) -> (u32, u32) {
    matches
        .iter()
        .filter(|m| m.is_between(subject, opponent))
        .fold((0, 0), |(wins, losses), m| {
            if m.winner_id == subject {
                (wins + 1, losses)
            } else {
                (wins, losses + 1)
            }
        })
}

/// Series between two specific players, seen from `player1`'s side.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rivalry {
    pub player1: Player,
    pub player2: Player,
    pub player1_wins: u32,
    pub player2_wins: u32,
    pub total: u32,
    pub classification: Classification,
}

pub fn head_to_head_between(player1: &Player, player2: &Player, matches: &[Match]) -> Rivalry {
    let (player1_wins, player2_wins) = tally_between(player1.id, player2.id, matches);
    Rivalry {
        player1: player1.clone(),
        player2: player2.clone(),
        player1_wins,
        player2_wins,
        total: player1_wins + player2_wins,
        classification: classify(player1_wins, player2_wins),
    }
}
