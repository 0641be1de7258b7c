use axum::{routing::get, Router};
use std::sync::Arc;

use crate::api::handlers::{
    activities::{get_activities, get_activities_since, get_activity},
    dashboard::get_dashboard,
    matches::{create_match, get_matches},
    players::{create_player, get_head_to_head_comparison, get_player_detail, get_players},
    tournaments::{create_tournament, get_tournaments},
    AppState,
};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/players", get(get_players).post(create_player))
        .route("/api/player/:id", get(get_player_detail))
        .route("/api/compare/:player1_id/:player2_id", get(get_head_to_head_comparison))
        .route("/api/matches", get(get_matches).post(create_match))
        .route("/api/tournaments", get(get_tournaments).post(create_tournament))
        .route("/api/activities", get(get_activities))
        .route("/api/activities/since", get(get_activities_since))
        .route("/api/activity/:id", get(get_activity))
        .route("/api/dashboard", get(get_dashboard))
        .with_state(state)
}
