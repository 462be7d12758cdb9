//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::model::InferenceError;
use crate::validation::ValidationError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Client errors
    Validation(ValidationError),
    BadRequest(String),
    NotFound,
    MethodNotAllowed,

    // No predictor loaded
    ModelUnavailable,

    // Generic errors
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Endpoint not found".to_string()),
            AppError::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
            }
            AppError::ModelUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Model not loaded. Service unavailable.".to_string(),
            ),
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                return internal_error_response();
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": "error"
        }));

        (status, body).into_response()
    }
}

/// Sanitized 500 body, also used for caught panics
pub fn internal_error_response() -> Response {
    let body = Json(json!({
        "error": "Internal server error",
        "status": "error",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }));

    (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<InferenceError> for AppError {
    fn from(err: InferenceError) -> Self {
        AppError::InternalError(format!("Prediction failed: {}", err))
    }
}
