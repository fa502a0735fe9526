//! Team member API endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use super::{error, json_body, success, ApiResult};
use crate::models::{MemberRequest, TeamMember};
use crate::AppState;

/// GET /api/team-members - List all members.
pub async fn list_members(State(state): State<AppState>) -> ApiResult<Vec<TeamMember>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.lifecycle.list_members().await {
        Ok(members) => success(members, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/team-members/:id - Get a single member.
pub async fn get_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<TeamMember> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.lifecycle.get_member(&id).await {
        Ok(member) => success(member, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/team-members - Create a new member.
pub async fn create_member(
    State(state): State<AppState>,
    payload: Result<Json<MemberRequest>, JsonRejection>,
) -> ApiResult<TeamMember> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    let request = match json_body(payload) {
        Ok(request) => request,
        Err(e) => return error(e, revision_id),
    };

    match state.lifecycle.create_member(&request).await {
        Ok(member) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(member, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/team-members/:id - Replace a member's name, role and avatar.
pub async fn update_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<MemberRequest>, JsonRejection>,
) -> ApiResult<TeamMember> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    let request = match json_body(payload) {
        Ok(request) => request,
        Err(e) => return error(e, revision_id),
    };

    match state.lifecycle.update_member(&id, &request).await {
        Ok(member) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(member, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/team-members/:id - Delete a member.
pub async fn delete_member(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.lifecycle.delete_member(&id).await {
        Ok(()) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
