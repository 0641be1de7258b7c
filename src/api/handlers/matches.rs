use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::{error_response, AppState, LimitParams};
use crate::api::models::{CreateMatchRequest, SubmissionResponse};
use crate::services::submission::{ImageSource, MatchSubmission};

const DEFAULT_LIMIT: usize = 20;

pub async fn get_matches(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitParams>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, 1000);
    match state.service.recent_matches(limit) {
        Ok(matches) => Json(matches).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn create_match(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateMatchRequest>,
) -> impl IntoResponse {
    let submission = MatchSubmission {
        player1_id: request.player1_id,
        player2_id: request.player2_id,
        winner_id: request.winner_id,
        notes: request.notes,
        image: request.image.map(ImageSource::DataUrl),
        played_at: None,
    };

    match state.submissions.record_match(submission) {
        Ok(outcome) => (
            StatusCode::CREATED,
            Json(SubmissionResponse {
                record: outcome.game,
                activity_written: outcome.activity_written,
                detection: outcome.detection,
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}
