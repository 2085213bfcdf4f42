use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::pipeline::PipelineError;

/// Errors surfaced at the service boundary
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unknown forecast source {0:?}")]
    UnknownSource(String),

    #[error("upstream fetch failed: {0}")]
    Fetch(String),

    #[error("internal server error: {0}")]
    Internal(String),
}

/// Wire shape for failures: `{ "error": ..., "details": ... }`
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::UnknownSource(_) => StatusCode::BAD_REQUEST,
            ApiError::Fetch(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            ApiError::Fetch(details) => {
                tracing::error!(error = %self, "upstream fetch failed");
                ErrorBody {
                    error: "error fetching forecast data".to_string(),
                    details: Some(details.clone()),
                }
            }
            ApiError::Internal(_) => {
                tracing::error!(error = %self, "internal error");
                ErrorBody {
                    error: "internal server error".to_string(),
                    details: None,
                }
            }
            _ => {
                tracing::debug!(error = %self, "client error");
                ErrorBody {
                    error: self.to_string(),
                    details: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(error: PipelineError) -> Self {
        match error {
            PipelineError::UnknownSource(source) => ApiError::UnknownSource(source.0),
            PipelineError::InvalidCutoff(raw) => {
                ApiError::BadRequest(format!("invalid historical time {raw:?}"))
            }
            PipelineError::Fetch(e) => ApiError::Fetch(e.to_string()),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        ApiError::Internal(error.to_string())
    }
}
