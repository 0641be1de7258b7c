use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::{error_response, AppState};
use crate::api::models::{CreatePlayerRequest, HeadToHeadResponse};
use crate::database::{DataService, Player, PlayerId};
use crate::stats::{head_to_head_between, leaderboard, player_profile};

pub async fn get_players(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let service = &state.service;
    let players = match service.list_players() {
        Ok(players) => players,
        Err(e) => return error_response(e),
    };
    let matches = match service.list_matches() {
        Ok(matches) => matches,
        Err(e) => return error_response(e),
    };
    let placements = match service.list_placements() {
        Ok(placements) => placements,
        Err(e) => return error_response(e),
    };

    Json(leaderboard(&players, &matches, &placements)).into_response()
}

pub async fn create_player(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreatePlayerRequest>,
) -> impl IntoResponse {
    match state.submissions.add_player(&request.name) {
        Ok(player) => (StatusCode::CREATED, Json(player)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn get_player_detail(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<PlayerId>,
) -> impl IntoResponse {
    let service = &state.service;
    let player = match find_player(service, player_id) {
        Ok(player) => player,
        Err(response) => return response,
    };

    let matches = match service.matches_for_player(player_id, None) {
        Ok(matches) => matches,
        Err(e) => return error_response(e),
    };
    let placements = match service.placements_for_player(player_id) {
        Ok(placements) => placements,
        Err(e) => return error_response(e),
    };
    let others: Vec<Player> = match service.list_players() {
        Ok(players) => players.into_iter().filter(|p| p.id != player_id).collect(),
        Err(e) => return error_response(e),
    };

    Json(player_profile(&player, matches, placements, &others)).into_response()
}

pub async fn get_head_to_head_comparison(
    State(state): State<Arc<AppState>>,
    Path((player1_id, player2_id)): Path<(PlayerId, PlayerId)>,
) -> impl IntoResponse {
    let service = &state.service;
    let player1 = match find_player(service, player1_id) {
        Ok(player) => player,
        Err(response) => return response,
    };
    let player2 = match find_player(service, player2_id) {
        Ok(player) => player,
        Err(response) => return response,
    };

    let matches = match service.matches_between(player1_id, player2_id) {
        Ok(matches) => matches,
        Err(e) => return error_response(e),
    };

    Json(HeadToHeadResponse {
        rivalry: head_to_head_between(&player1, &player2, &matches),
        matches,
    })
    .into_response()
}

fn find_player(service: &DataService, id: PlayerId) -> Result<Player, axum::response::Response> {
    match service.find_player(id) {
        Ok(Some(player)) => Ok(player),
        Ok(None) => Err((StatusCode::NOT_FOUND, format!("Player {} not found", id)).into_response()),
        Err(e) => Err(error_response(e)),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::api::handlers::test_support::{app, send};
    use crate::database::NewMatch;

    #[tokio::test]
    async fn test_create_and_rank_players() {
        let (app, service) = app("players_rank");
        let (status, body) = send(&app, Method::POST, "/api/players", Some(json!({"name": " Sara "}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["name"], "Sara");

        let reza = service.insert_player("Reza").unwrap();
        let sara_id = body["id"].as_i64().unwrap();
        service
            .insert_match(&NewMatch {
                player1_id: sara_id,
                player2_id: reza.id,
                winner_id: reza.id,
                notes: None,
                image_url: None,
                played_at: chrono::Utc::now(),
            })
            .unwrap();

        let (status, body) = send(&app, Method::GET, "/api/players", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["rank"], 1);
        assert_eq!(body[0]["player"]["name"], "Reza");
        assert_eq!(body[0]["winPercentage"], 100.0);
        assert_eq!(body[1]["totalLosses"], 1);
    }

    #[tokio::test]
    async fn test_blank_name_is_bad_request() {
        let (app, _) = app("players_blank");
        let (status, _) = send(&app, Method::POST, "/api/players", Some(json!({"name": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_player_is_not_found() {
        let (app, service) = app("players_missing");
        let (status, _) = send(&app, Method::GET, "/api/player/42", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let a = service.insert_player("A").unwrap();
        let (status, _) = send(&app, Method::GET, &format!("/api/compare/{}/42", a.id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_profile_and_compare() {
        let (app, service) = app("players_profile");
        let a = service.insert_player("A").unwrap();
        let b = service.insert_player("B").unwrap();
        for _ in 0..2 {
            service
                .insert_match(&NewMatch {
                    player1_id: a.id,
                    player2_id: b.id,
                    winner_id: a.id,
                    notes: None,
                    image_url: None,
                    played_at: chrono::Utc::now(),
                })
                .unwrap();
        }

        let (status, body) = send(&app, Method::GET, &format!("/api/player/{}", a.id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stats"]["totalWins"], 2);
        assert_eq!(body["recentMatches"].as_array().unwrap().len(), 2);
        assert_eq!(body["headToHead"][0]["opponent"]["name"], "B");
        assert_eq!(body["headToHead"][0]["classification"], "even");

        let (status, body) = send(&app, Method::GET, &format!("/api/compare/{}/{}", b.id, a.id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["player1Wins"], 0);
        assert_eq!(body["player2Wins"], 2);
        assert_eq!(body["matches"].as_array().unwrap().len(), 2);
    }
}
