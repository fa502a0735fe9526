//! REST API module.
//!
//! Handlers translate HTTP requests into lifecycle calls and wrap the results
//! in the success/error envelope.

mod analytics;
mod members;
mod revision;
mod statuses;

pub use analytics::*;
pub use members::*;
pub use revision::*;
pub use statuses::*;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Success response envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub revision_id: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, revision_id: i64) -> Self {
        Self {
            success: true,
            data,
            revision_id,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, crate::errors::AppErrorWithRevision>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T, revision_id: i64) -> ApiResult<T> {
    Ok(ApiResponse::new(data, revision_id))
}

/// Create an error API response.
pub fn error<T: Serialize>(err: crate::errors::AppError, revision_id: i64) -> ApiResult<T> {
    Err(crate::errors::AppErrorWithRevision {
        error: err,
        revision_id,
    })
}

/// Unwrap a JSON request body. Malformed or mistyped bodies become a
/// `BadRequest` so they are reported inside the error envelope.
pub fn json_body<T>(
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, crate::errors::AppError> {
    payload.map(|Json(body)| body).map_err(Into::into)
}

/// `?range=week|month|quarter|all` query parameter.
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    #[serde(default)]
    pub range: Option<String>,
}
