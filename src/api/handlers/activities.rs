use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;

use super::{error_response, AppState};
use crate::api::models::ActivityPageResponse;
use crate::database::ActivityId;
use crate::feed::FeedFilter;

#[derive(Deserialize)]
pub struct ActivityParams {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
    pub filter: Option<String>,
}

#[derive(Deserialize)]
pub struct SinceParams {
    pub after: Option<DateTime<Utc>>,
}

/// One page of the feed, newest first. The filter applies to the rows of
/// the page, so a filtered page can hold fewer than `limit` items.
pub async fn get_activities(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ActivityParams>,
) -> impl IntoResponse {
    let filter = match params.filter.as_deref().map(str::parse::<FeedFilter>).transpose() {
        Ok(filter) => filter.unwrap_or_default(),
        Err(e) => return error_response(e.into()),
    };
    let offset = params.offset.unwrap_or(0);
    let limit = params
        .limit
        .unwrap_or(state.config.feed.page_size)
        .clamp(1, 100);

    let page = match state.service.activity_page(offset, limit) {
        Ok(page) => page,
        Err(e) => return error_response(e),
    };
    let has_more = page.len() == limit;

    Json(ActivityPageResponse {
        items: page
            .into_iter()
            .filter(|a| filter.matches(a.activity_type))
            .collect(),
        offset,
        limit,
        has_more,
    })
    .into_response()
}

/// Activities created after `after`, oldest first.
pub async fn get_activities_since(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SinceParams>,
) -> impl IntoResponse {
    match state.service.activities_after(params.after) {
        Ok(activities) => Json(activities).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn get_activity(
    State(state): State<Arc<AppState>>,
    Path(activity_id): Path<ActivityId>,
) -> impl IntoResponse {
    match state.service.find_activity(activity_id) {
        Ok(Some(activity)) => Json(activity).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, format!("Activity {} not found", activity_id)).into_response(),
        Err(e) => error_response(e),
    }
}
