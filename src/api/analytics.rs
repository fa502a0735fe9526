//! Dashboard analytics endpoint.

use axum::extract::{Query, State};
use chrono::Utc;

use super::{error, success, ApiResult, RangeQuery};
use crate::models::{AnalyticsSummary, TimeRange};
use crate::AppState;

/// GET /api/analytics?range= - Summary metrics and weekly trend.
pub async fn get_analytics(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<AnalyticsSummary> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    let range = TimeRange::parse_lenient(query.range.as_deref());

    match state.lifecycle.analytics(range, Utc::now()).await {
        Ok(summary) => success(summary, revision_id),
        Err(e) => error(e, revision_id),
    }
}
