//! Weekly status API endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{error, json_body, success, ApiResult, RangeQuery};
use crate::errors::AppError;
use crate::models::{CreateStatusRequest, TimeRange, UpdateStatusRequest, WeeklyStatus};
use crate::AppState;

/// Query for the bulk delete endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ClearQuery {
    #[serde(default)]
    pub all: Option<String>,
}

/// Result of clearing every status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearResult {
    pub removed: u64,
}

/// GET /api/statuses?range= - List statuses, newest first.
pub async fn list_statuses(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Vec<WeeklyStatus>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    let range = TimeRange::parse_lenient(query.range.as_deref());
    let today = Utc::now().date_naive();

    match state.lifecycle.list_statuses(range, today).await {
        Ok(statuses) => success(statuses, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/statuses/:id - Get a single status.
pub async fn get_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<WeeklyStatus> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.lifecycle.get_status(&id).await {
        Ok(status) => success(status, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/statuses - Submit a weekly status.
pub async fn create_status(
    State(state): State<AppState>,
    payload: Result<Json<CreateStatusRequest>, JsonRejection>,
) -> ApiResult<WeeklyStatus> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    let request = match json_body(payload) {
        Ok(request) => request,
        Err(e) => return error(e, revision_id),
    };

    match state.lifecycle.create_status(&request).await {
        Ok(status) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(status, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/statuses/:id - Edit the RAG value and activity text.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> ApiResult<WeeklyStatus> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    let request = match json_body(payload) {
        Ok(request) => request,
        Err(e) => return error(e, revision_id),
    };

    match state.lifecycle.update_status(&id, &request).await {
        Ok(status) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(status, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/statuses/:id - Delete a status.
pub async fn delete_status(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.lifecycle.delete_status(&id).await {
        Ok(()) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/statuses?all=true - Delete every status.
pub async fn clear_statuses(
    State(state): State<AppState>,
    Query(query): Query<ClearQuery>,
) -> ApiResult<ClearResult> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if query.all.as_deref() != Some("true") {
        return error(
            AppError::BadRequest(
                "Status ID is required (or use ?all=true to delete all)".to_string(),
            ),
            revision_id,
        );
    }

    match state.lifecycle.clear_statuses().await {
        Ok(removed) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(ClearResult { removed }, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
