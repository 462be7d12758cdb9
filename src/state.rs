//! Service state
//!
//! Built once before the listener starts. The loaded model is immutable
//! afterwards; the prediction counter is the only value mutated per request.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::model::{load_artifact, ArtifactInfo, Classifier, Predictor};

/// A successfully loaded model
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub predictor: Predictor,
    pub loaded_at: DateTime<Utc>,
    pub artifact: Option<ArtifactInfo>,
}

#[derive(Debug)]
pub struct ServiceState {
    model: Option<LoadedModel>,
    prediction_count: AtomicU64,
}

impl ServiceState {
    /// Load the artifact at `config.model_path`.
    ///
    /// A missing or corrupt artifact is logged and leaves the service
    /// without a model; it still starts and reports itself unhealthy.
    pub fn load(config: &Config) -> Self {
        match load_artifact(&config.model_path) {
            Ok((classifier, artifact)) => {
                let state = Self::with_classifier(Arc::from(classifier), Some(artifact));
                tracing::info!("Model ready, predictions enabled");
                state
            }
            Err(e) => {
                tracing::error!("Failed to load model: {}", e);
                tracing::warn!("Starting without a model, predictions are disabled");
                Self::without_model()
            }
        }
    }

    pub fn with_classifier(classifier: Arc<dyn Classifier>, artifact: Option<ArtifactInfo>) -> Self {
        Self {
            model: Some(LoadedModel {
                predictor: Predictor::new(classifier),
                loaded_at: Utc::now(),
                artifact,
            }),
            prediction_count: AtomicU64::new(0),
        }
    }

    pub fn without_model() -> Self {
        Self {
            model: None,
            prediction_count: AtomicU64::new(0),
        }
    }

    pub fn model(&self) -> Option<&LoadedModel> {
        self.model.as_ref()
    }

    pub fn is_model_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.model.as_ref().map(|m| m.loaded_at)
    }

    pub fn prediction_count(&self) -> u64 {
        self.prediction_count.load(Ordering::Relaxed)
    }

    /// Count one successful prediction, returns the new total
    pub fn record_prediction(&self) -> u64 {
        self.prediction_count.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::classifier::{ClassifierMeta, LinearSvc};
    use crate::features::FEATURE_COUNT;
    use std::path::PathBuf;

    fn svc() -> Arc<dyn Classifier> {
        Arc::new(LinearSvc {
            coefficients: [1.0; FEATURE_COUNT],
            intercept: 0.0,
            meta: ClassifierMeta::default(),
        })
    }

    #[test]
    fn test_missing_artifact_leaves_model_absent() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            model_path: dir.path().join("missing.json"),
            ..Config::default()
        };

        let state = ServiceState::load(&config);
        assert!(!state.is_model_loaded());
        assert!(state.loaded_at().is_none());
        assert_eq!(state.prediction_count(), 0);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path: PathBuf = dir.path().join("best_model.json");
        std::fs::write(
            &path,
            r#"{"model_type": "LinearSVC", "coefficients": [1, 0, 0, 0, 0, 0, 0]}"#,
        )
        .unwrap();

        let config = Config { model_path: path, ..Config::default() };
        let state = ServiceState::load(&config);

        let model = state.model().unwrap();
        assert_eq!(model.predictor.model_type(), "LinearSVC");
        assert!(model.artifact.is_some());
        assert!(state.loaded_at().is_some());
    }

    #[test]
    fn test_counter_has_no_lost_updates() {
        let state = Arc::new(ServiceState::with_classifier(svc(), None));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let state = Arc::clone(&state);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        state.record_prediction();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(state.prediction_count(), 8000);
    }
}
