use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::{error_response, AppState, LimitParams};
use crate::api::models::{CreateTournamentRequest, SubmissionResponse};
use crate::services::submission::{ImageSource, TournamentSubmission};

const DEFAULT_LIMIT: usize = 10;

pub async fn get_tournaments(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitParams>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, 1000);
    match state.service.recent_tournaments(limit) {
        Ok(tournaments) => Json(tournaments).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn create_tournament(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateTournamentRequest>,
) -> impl IntoResponse {
    let submission = TournamentSubmission {
        name: request.name,
        game_type: request.game_type,
        tournament_date: request.tournament_date,
        placements: request.placements,
        image: request.image.map(ImageSource::DataUrl),
    };

    match state.submissions.record_tournament(submission) {
        Ok(outcome) => (
            StatusCode::CREATED,
            Json(SubmissionResponse {
                record: outcome.tournament,
                activity_written: outcome.activity_written,
                detection: outcome.detection,
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}
