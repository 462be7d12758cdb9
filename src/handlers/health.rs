//! Health check handler

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    model_loaded: bool,
    environment: String,
    timestamp: String,
    version: &'static str,
}

/// Healthy iff a model is loaded; 503 otherwise
pub async fn check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let model_loaded = state.service.is_model_loaded();
    let (status_code, status) = if model_loaded {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    let body = HealthResponse {
        status,
        model_loaded,
        environment: state.config.environment.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION"),
    };

    (status_code, Json(body))
}
