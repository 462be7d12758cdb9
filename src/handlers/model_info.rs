//! Model metadata handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::features::LayoutInfo;
use crate::model::{ArtifactInfo, ModelDescription};
use crate::{AppError, AppResult, AppState};

#[derive(Debug, Serialize)]
pub struct ModelInfoResponse {
    pub status: &'static str,
    pub loaded_at: String,
    pub prediction_count: u64,
    pub environment: String,
    pub debug: bool,
    #[serde(flatten)]
    pub model: ModelDescription,
    #[serde(flatten)]
    pub layout: LayoutInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<ArtifactInfo>,
}

/// Describe the loaded model
pub async fn get(State(state): State<AppState>) -> AppResult<Json<ModelInfoResponse>> {
    let model = state.service.model().ok_or(AppError::ModelUnavailable)?;

    Ok(Json(ModelInfoResponse {
        status: "loaded",
        loaded_at: model.loaded_at.to_rfc3339(),
        prediction_count: state.service.prediction_count(),
        environment: state.config.environment.clone(),
        debug: state.config.debug,
        model: model.predictor.describe(),
        layout: LayoutInfo::current(),
        artifact: model.artifact.clone(),
    }))
}
