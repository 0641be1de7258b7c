use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub type PlayerId = i64;
pub type MatchId = i64;
pub type TournamentId = i64;
pub type ActivityId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: MatchId,
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    pub winner_id: PlayerId,
    pub notes: Option<String>,
    pub image_url: Option<String>,
    pub played_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Match {
    pub fn involves(&self, player_id: PlayerId) -> bool {
        self.player1_id == player_id || self.player2_id == player_id
    }

    /// True when the match was played between exactly these two players, in either seat.
    pub fn is_between(&self, a: PlayerId, b: PlayerId) -> bool {
        (self.player1_id == a && self.player2_id == b) || (self.player1_id == b && self.player2_id == a)
    }

    pub fn loser_id(&self) -> PlayerId {
        if self.winner_id == self.player1_id {
            self.player2_id
        } else {
            self.player1_id
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewMatch {
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    pub winner_id: PlayerId,
    pub notes: Option<String>,
    pub image_url: Option<String>,
    pub played_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub game_type: Option<String>,
    pub image_url: Option<String>,
    pub tournament_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTournament {
    pub name: String,
    pub game_type: Option<String>,
    pub image_url: Option<String>,
    pub tournament_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentPlacement {
    pub id: i64,
    pub tournament_id: TournamentId,
    pub player_id: PlayerId,
    pub placement: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlacement {
    pub position: u32,
    pub player_id: PlayerId,
}

// DTOs for joined queries
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementWithTournament {
    pub placement: TournamentPlacement,
    pub tournament_name: String,
    pub tournament_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentWithPlacements {
    pub tournament: Tournament,
    pub placements: Vec<TournamentPlacement>,
}

impl TournamentWithPlacements {
    pub fn champion_id(&self) -> Option<PlayerId> {
        self.placements
            .iter()
            .find(|p| p.placement == 1)
            .map(|p| p.player_id)
    }
}
