use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::activity::Activity;
use crate::database::{Match, NewPlacement, PlayerId};
use crate::detection::DetectionReport;
use crate::stats::Rivalry;

#[derive(Deserialize)]
pub struct CreatePlayerRequest {
    pub name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchRequest {
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    pub winner_id: PlayerId,
    pub notes: Option<String>,
    /// Base64 data URL.
    pub image: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTournamentRequest {
    pub name: String,
    pub game_type: Option<String>,
    pub tournament_date: Option<NaiveDate>,
    pub placements: Vec<NewPlacement>,
    pub image: Option<String>,
}

/// A created record plus what its submission triggered.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse<T> {
    #[serde(flatten)]
    pub record: T,
    pub activity_written: bool,
    pub detection: DetectionReport,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPageResponse {
    pub items: Vec<Activity>,
    pub offset: usize,
    pub limit: usize,
    pub has_more: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadToHeadResponse {
    #[serde(flatten)]
    pub rivalry: Rivalry,
    pub matches: Vec<Match>,
}
