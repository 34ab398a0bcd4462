//! Error handling

use axum::{
    extract::rejection::{JsonRejection, QueryRejection, StringRejection},
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use riskscore_core::{BatchError, EventLogError, ScoreError};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Scoring errors
    #[error("user_not_found")]
    UserNotFound(String),

    #[error("{0}")]
    BatchRejected(String),

    #[error("Model not loaded")]
    ModelUnavailable,

    // Resource errors
    #[error("{0}")]
    NotFound(String),

    // Validation errors
    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    // Generic errors
    #[error("{0}")]
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::UserNotFound(user_id) => {
                tracing::debug!("No baseline for user {}", user_id);
                (StatusCode::NOT_FOUND, "user_not_found".to_string())
            }
            AppError::BatchRejected(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::ModelUnavailable => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<ScoreError> for AppError {
    fn from(err: ScoreError) -> Self {
        match err {
            ScoreError::UserNotFound(user_id) => AppError::UserNotFound(user_id),
        }
    }
}

impl From<BatchError> for AppError {
    fn from(err: BatchError) -> Self {
        match err {
            BatchError::Model(e) => AppError::InternalError(e.to_string()),
            other => AppError::BatchRejected(other.to_string()),
        }
    }
}

impl From<EventLogError> for AppError {
    fn from(err: EventLogError) -> Self {
        match err {
            EventLogError::NotFound(path) => AppError::NotFound(format!("Event log not found: {}", path)),
            other => AppError::InternalError(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

// Extractor rejections: over-limit bodies keep 413, anything else is a bad payload

fn rejected(status: StatusCode, body_text: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(body_text)
    } else {
        AppError::ValidationError(body_text)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        rejected(rejection.status(), rejection.body_text())
    }
}

impl From<StringRejection> for AppError {
    fn from(rejection: StringRejection) -> Self {
        rejected(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        rejected(rejection.status(), rejection.body_text())
    }
}
