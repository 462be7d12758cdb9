//! Model Module - classifier loading and inference
//!
//! - `artifact`: on-disk format, validation, loading
//! - `classifier`: the `Classifier` trait and its implementations
//! - `predictor`: capability-resolving adapter used by the handlers

pub mod artifact;
pub mod classifier;
pub mod predictor;

// Re-export common types
pub use artifact::{load_artifact, ArtifactInfo, ModelLoadError};
pub use classifier::{Classifier, InferenceError};
pub use predictor::{ModelDescription, Predictor};
