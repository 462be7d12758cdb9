//! Prediction handler
//!
//! received -> validated -> encoded -> predicted -> responded

use std::collections::HashMap;

use axum::{
    extract::{FromRequest, Request, State},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use serde_json::Value;

use crate::features::FeatureVector;
use crate::models::{PredictResponse, PredictionResult, RawInput};
use crate::validation;
use crate::{AppError, AppResult, AppState};

/// Predict heart attack risk for one request
pub async fn predict(
    State(state): State<AppState>,
    request: Request,
) -> AppResult<Json<PredictResponse>> {
    // Readiness is checked before the body is even read
    let model = state.service.model().ok_or(AppError::ModelUnavailable)?;

    let raw = read_raw_input(request).await?;
    let input = validation::validate(&raw)?;
    let features = FeatureVector::encode(&input);

    let label = model.predictor.predict(&features)?;
    let total = state.service.record_prediction();
    let probabilities = model.predictor.predict_class_probabilities(&features);

    tracing::debug!(
        "Prediction #{}: features={:?} label={} probabilities={:?}",
        total,
        features.as_slice(),
        label,
        probabilities
    );

    let result = PredictionResult {
        label,
        probabilities,
        input,
        features,
    };

    Ok(Json(result.into_body(chrono::Utc::now().to_rfc3339())))
}

/// Read the request fields from a JSON or form-encoded body.
///
/// Any other content type yields no fields, so validation reports all of
/// them as missing.
async fn read_raw_input(request: Request) -> AppResult<RawInput> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("application/json") {
        let Json(body) = Json::<Value>::from_request(request, &())
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e.body_text())))?;

        return match body {
            Value::Object(fields) => Ok(RawInput::from_json(fields)),
            _ => Err(AppError::BadRequest(
                "Request body must be a JSON object".to_string(),
            )),
        };
    }

    if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(fields) = Form::<HashMap<String, String>>::from_request(request, &())
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid form body: {}", e.body_text())))?;

        return Ok(RawInput::from_form(fields));
    }

    Ok(RawInput::default())
}
