use ::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Resource wrapper: single todos and collections are served as `{ "data": ... }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Data<T> { pub data: T }

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody { pub message: String }

#[derive(Debug, Error)]
pub enum ApiError {
    /// Unknown or malformed id on a bound route.
    #[error("Not Found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(e) => {
                tracing::error!(error = %e, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let message = match self {
            ApiError::NotFound => "Not Found".to_string(),
            ApiError::Internal(_) => "Server Error".to_string(),
        };
        (status, axum::Json(ErrorBody { message })).into_response()
    }
}
