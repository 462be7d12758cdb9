//! Service summary handler

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::json;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ApiDataResponse {
    pub message: &'static str,
    pub status: &'static str,
    pub model_loaded: bool,
    pub model_loaded_at: Option<String>,
    pub prediction_count: u64,
    pub endpoints: serde_json::Value,
}

/// Summary of the service and its endpoints
pub async fn data(State(state): State<AppState>) -> Json<ApiDataResponse> {
    Json(ApiDataResponse {
        message: "Heart attack risk prediction API",
        status: "success",
        model_loaded: state.service.is_model_loaded(),
        model_loaded_at: state.service.loaded_at().map(|t| t.to_rfc3339()),
        prediction_count: state.service.prediction_count(),
        endpoints: json!({
            "index": "GET /",
            "api_data": "GET /api/data",
            "health": "GET /health",
            "model_info": "GET /model-info",
            "predict": "POST /predict",
        }),
    })
}
