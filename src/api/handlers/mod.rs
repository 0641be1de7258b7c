use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;
use serde::Deserialize;

use crate::config::settings::AppConfig;
use crate::database::DataService;
use crate::errors::{UploadError, ValidationError};
use crate::services::submission::SubmissionService;

pub mod activities;
pub mod dashboard;
pub mod matches;
pub mod players;
pub mod tournaments;

pub struct AppState {
    pub service: DataService,
    pub submissions: SubmissionService,
    pub config: AppConfig,
}

#[derive(Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

/// Maps a failed operation to a status: bad input 400, upload 502, anything else 500.
pub fn error_response(e: anyhow::Error) -> Response {
    if let Some(invalid) = e.downcast_ref::<ValidationError>() {
        return (StatusCode::BAD_REQUEST, invalid.to_string()).into_response();
    }
    if e.downcast_ref::<UploadError>().is_some() {
        error!("Image upload failed: {:#}", e);
        return (StatusCode::BAD_GATEWAY, format!("Upload Error: {:#}", e)).into_response();
    }

    error!("Request failed: {:#}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, format!("Query Error: {:#}", e)).into_response()
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::AppState;
    use crate::api::routes::create_router;
    use crate::config::AppConfig;
    use crate::database::{create_memory_pool, DataService};
    use crate::realtime::RealtimeHub;
    use crate::services::submission::SubmissionService;
    use crate::storage::ImageStore;

    pub fn app(name: &str) -> (Router, DataService) {
        let service = DataService::new(create_memory_pool().unwrap(), RealtimeHub::new());
        let root = std::env::temp_dir().join(format!("match_tracker_api_{}_{}", name, std::process::id()));
        let config = AppConfig::default();
        let state = Arc::new(AppState {
            submissions: SubmissionService::new(
                service.clone(),
                ImageStore::new(root, "http://localhost:3000/images"),
                &config,
            ),
            service: service.clone(),
            config,
        });
        (create_router(state), service)
    }

    pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }
}
