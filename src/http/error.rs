use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::application::AppError;

/// Errors surfaced by the HTTP layer as JSON `{"error": ...}` bodies.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid request")]
    InvalidBody,

    #[error("points must be an integer")]
    PointsNotInteger,

    #[error(transparent)]
    App(#[from] AppError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InvalidBody | ApiError::PointsNotInteger => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }

            ApiError::App(AppError::NonPositivePoints) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }

            ApiError::App(AppError::Database(err)) => {
                tracing::error!(error = ?err, "request failed against storage");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("server error: {err}"),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
