//! Predictor adapter
//!
//! Wraps a loaded [`Classifier`] and resolves its capabilities once, at
//! construction. Probability estimates are best effort: any failure is
//! logged and reported as absent instead of failing the prediction.

use std::sync::Arc;

use serde::Serialize;

use super::classifier::{Classifier, InferenceError};
use crate::features::FeatureVector;

/// Class probabilities, `[no attack, attack]`
pub type ClassProbabilities = [f64; 2];

#[derive(Clone)]
pub struct Predictor {
    classifier: Arc<dyn Classifier>,
    supports_probabilities: bool,
}

/// Classifier-reported metadata for `/model-info`
#[derive(Debug, Clone, Serialize)]
pub struct ModelDescription {
    pub model_type: &'static str,
    pub supports_probabilities: bool,
    pub has_feature_importances: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_features: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classes: Option<Vec<i64>>,
}

impl Predictor {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        let supports_probabilities = classifier.supports_probabilities();
        Self {
            classifier,
            supports_probabilities,
        }
    }

    pub fn model_type(&self) -> &'static str {
        self.classifier.model_type()
    }

    pub fn supports_probabilities(&self) -> bool {
        self.supports_probabilities
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<u8, InferenceError> {
        match self.classifier.predict(features)? {
            label @ (0 | 1) => Ok(label),
            other => Err(InferenceError::InvalidLabel(other)),
        }
    }

    /// `None` when unsupported or when the classifier fails
    pub fn predict_class_probabilities(&self, features: &FeatureVector) -> Option<ClassProbabilities> {
        if !self.supports_probabilities {
            return None;
        }

        match self.classifier.predict_proba(features) {
            Ok([p0, p1]) if valid_probability(p0) && valid_probability(p1) => Some([p0, p1]),
            Ok(proba) => {
                tracing::warn!("Discarding out-of-range probabilities: {:?}", proba);
                None
            }
            Err(e) => {
                tracing::warn!("Probability estimate failed: {}", e);
                None
            }
        }
    }

    pub fn describe(&self) -> ModelDescription {
        let feature_names = self.classifier.feature_names().map(<[String]>::to_vec);

        ModelDescription {
            model_type: self.classifier.model_type(),
            supports_probabilities: self.supports_probabilities,
            has_feature_importances: self.classifier.feature_importances().is_some(),
            n_features: feature_names.as_ref().map(Vec::len),
            feature_names,
            classes: self.classifier.classes().map(<[i64]>::to_vec),
        }
    }
}

impl std::fmt::Debug for Predictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predictor")
            .field("model_type", &self.classifier.model_type())
            .field("supports_probabilities", &self.supports_probabilities)
            .finish()
    }
}

fn valid_probability(p: f64) -> bool {
    p.is_finite() && (0.0..=1.0).contains(&p)
}

// ============================================================================
// TESTS
// ============================================================================
