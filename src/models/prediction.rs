//! Prediction response models

use serde::Serialize;

use super::input::NormalizedInput;
use crate::features::vector::{FeatureVector, NamedFeatures};
use crate::model::predictor::ClassProbabilities;

/// Outcome of one successful prediction
#[derive(Debug, Clone)]
pub struct PredictionResult {
    pub label: u8,
    pub probabilities: Option<ClassProbabilities>,
    pub input: NormalizedInput,
    pub features: FeatureVector,
}

impl PredictionResult {
    pub fn risk_label(&self) -> &'static str {
        if self.label == 1 {
            "High risk"
        } else {
            "Low risk"
        }
    }

    pub fn into_body(self, timestamp: String) -> PredictResponse {
        PredictResponse {
            prediction: self.label,
            result: self.risk_label(),
            probability_no_attack: self.probabilities.map(|p| p[0]),
            probability_attack: self.probabilities.map(|p| p[1]),
            status: "success",
            timestamp,
            input_features: self.input,
            features: self.features,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: u8,
    pub result: &'static str,
    pub probability_no_attack: Option<f64>,
    pub probability_attack: Option<f64>,
    pub status: &'static str,
    pub timestamp: String,
    pub input_features: NormalizedInput,
    #[serde(rename = "model_features", serialize_with = "serialize_named")]
    pub features: FeatureVector,
}

fn serialize_named<S: serde::Serializer>(features: &FeatureVector, serializer: S) -> Result<S::Ok, S::Error> {
    NamedFeatures::serialize(&features.named(), serializer)
}
