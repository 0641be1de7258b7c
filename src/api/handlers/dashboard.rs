use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use anyhow::Result;
use std::sync::Arc;

use super::{error_response, AppState};
use crate::database::DataService;
use crate::stats::{dashboard, DashboardSummary};

pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match load_dashboard(&state.service) {
        Ok(summary) => Json(summary).into_response(),
        Err(e) => error_response(e),
    }
}

fn load_dashboard(service: &DataService) -> Result<DashboardSummary> {
    let players = service.list_players()?;
    let matches = service.list_matches()?;
    let tournament_count = usize::try_from(service.count_tournaments()?)?;
    let tournaments = service.recent_tournaments(tournament_count)?;
    let placements = service.list_placements()?;
    Ok(dashboard(&players, &matches, &tournaments, &placements))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use crate::api::handlers::test_support::{app, send};

    #[tokio::test]
    async fn test_empty_dashboard() {
        let (app, _) = app("dashboard_empty");
        let (status, body) = send(&app, Method::GET, "/api/dashboard", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["playerCount"], 0);
        assert!(body["topPlayers"].as_array().unwrap().is_empty());
        assert!(body["recentResults"].as_array().unwrap().is_empty());
    }
}
