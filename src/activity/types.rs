use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::{ActivityId, MatchId, PlayerId, TournamentId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    MatchResult,
    TournamentComplete,
    RankChange,
    WinningStreak,
    RivalryUpdate,
    NewPlayer,
    Milestone,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::MatchResult => "match_result",
            ActivityType::TournamentComplete => "tournament_complete",
            ActivityType::RankChange => "rank_change",
            ActivityType::WinningStreak => "winning_streak",
            ActivityType::RivalryUpdate => "rivalry_update",
            ActivityType::NewPlayer => "new_player",
            ActivityType::Milestone => "milestone",
        }
    }
}

impl FromStr for ActivityType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "match_result" => ActivityType::MatchResult,
            "tournament_complete" => ActivityType::TournamentComplete,
            "rank_change" => ActivityType::RankChange,
            "winning_streak" => ActivityType::WinningStreak,
            "rivalry_update" => ActivityType::RivalryUpdate,
            "new_player" => ActivityType::NewPlayer,
            "milestone" => ActivityType::Milestone,
            other => bail!("Unknown activity type: {}", other),
        })
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityColor {
    Blue,
    Gold,
    Green,
    Red,
    Orange,
    Teal,
    Purple,
}

impl ActivityColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityColor::Blue => "blue",
            ActivityColor::Gold => "gold",
            ActivityColor::Green => "green",
            ActivityColor::Red => "red",
            ActivityColor::Orange => "orange",
            ActivityColor::Teal => "teal",
            ActivityColor::Purple => "purple",
        }
    }
}

impl FromStr for ActivityColor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "blue" => ActivityColor::Blue,
            "gold" => ActivityColor::Gold,
            "green" => ActivityColor::Green,
            "red" => ActivityColor::Red,
            "orange" => ActivityColor::Orange,
            "teal" => ActivityColor::Teal,
            "purple" => ActivityColor::Purple,
            other => bail!("Unknown activity color: {}", other),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneKind {
    Matches,
    Tournaments,
    Players,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementSummary {
    pub position: u32,
    pub player_name: String,
}

/// Variant-specific details of an activity. Stored as a JSON object; unset
/// fields are left out of the stored document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityMetadata {
    // match_result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_id: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loser_id: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loser_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    // tournament_complete
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tournament_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placements: Option<Vec<PlacementSummary>>,

    // winning_streak, rank_change, new_player
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_rank: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_rank: Option<u32>,

    // rivalry_update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player1_id: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player1_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player2_id: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player2_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player1_wins: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player2_wins: Option<u32>,

    // milestone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone_type: Option<MilestoneKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone_count: Option<i64>,
}

/// An activity ready to be written; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub activity_type: ActivityType,
    pub title: String,
    pub description: Option<String>,
    pub icon: &'static str,
    pub color: ActivityColor,
    pub metadata: ActivityMetadata,
    pub related_player_id: Option<PlayerId>,
    pub related_match_id: Option<MatchId>,
    pub related_tournament_id: Option<TournamentId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: ActivityId,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub title: String,
    pub description: Option<String>,
    pub icon: String,
    pub color: ActivityColor,
    pub metadata: ActivityMetadata,
    pub related_player_id: Option<PlayerId>,
    pub related_match_id: Option<MatchId>,
    pub related_tournament_id: Option<TournamentId>,
    pub created_at: DateTime<Utc>,
}
