//! Model artifact - JSON serialized classifier loaded at startup
//!
//! ```json
//! {
//!   "model_type": "LogisticRegression",
//!   "coefficients": [0.3, -0.1, 1.2, -0.9, 0.4, -0.6, 0.8],
//!   "intercept": -2.1,
//!   "feature_names": ["PhysicalActivities_Yes", "..."],
//!   "classes": [0, 1]
//! }
//! ```
//!
//! Tree models carry `tree` (single) or `trees` (forest), each a flat list of
//! nodes: `{"feature": 6, "threshold": 0.5, "left": 1, "right": 2, "value": [80, 20]}`.
//! Nodes without `left`/`right` are leaves.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::classifier::{
    Classifier, ClassifierMeta, DecisionTree, DecisionTreeClassifier, LinearSvc, LogisticRegression,
    RandomForestClassifier, TreeNode,
};
use crate::features::{matches_layout, FEATURE_COUNT};

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("model file not readable at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model file is not a valid artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid model artifact: {0}")]
    Invalid(String),
}

fn invalid(msg: impl Into<String>) -> ModelLoadError {
    ModelLoadError::Invalid(msg.into())
}

// ============================================================================
// ARTIFACT FORMAT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ModelKind {
    LogisticRegression,
    #[serde(rename = "LinearSVC")]
    LinearSvc,
    DecisionTreeClassifier,
    RandomForestClassifier,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeSpec {
    pub feature: Option<usize>,
    pub threshold: Option<f64>,
    pub left: Option<usize>,
    pub right: Option<usize>,
    pub value: [f64; 2],
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreeSpec {
    pub nodes: Vec<NodeSpec>,
}

/// On-disk representation
#[derive(Debug, Clone, Deserialize)]
pub struct ModelArtifact {
    pub model_type: ModelKind,
    pub coefficients: Option<Vec<f64>>,
    pub intercept: Option<f64>,
    pub tree: Option<TreeSpec>,
    pub trees: Option<Vec<TreeSpec>>,
    pub feature_names: Option<Vec<String>>,
    pub classes: Option<Vec<i64>>,
    pub feature_importances: Option<Vec<f64>>,
}

impl ModelArtifact {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ModelLoadError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Check the artifact against the feature layout and build the classifier
    pub fn into_classifier(self) -> Result<Box<dyn Classifier>, ModelLoadError> {
        let meta = self.meta()?;

        let classifier: Box<dyn Classifier> = match self.model_type {
            ModelKind::LogisticRegression => {
                let (coefficients, intercept) = linear_params(self.coefficients, self.intercept)?;
                Box::new(LogisticRegression { coefficients, intercept, meta })
            }
            ModelKind::LinearSvc => {
                let (coefficients, intercept) = linear_params(self.coefficients, self.intercept)?;
                Box::new(LinearSvc { coefficients, intercept, meta })
            }
            ModelKind::DecisionTreeClassifier => {
                let spec = self.tree.ok_or_else(|| invalid("DecisionTreeClassifier requires `tree`"))?;
                Box::new(DecisionTreeClassifier { tree: build_tree(spec)?, meta })
            }
            ModelKind::RandomForestClassifier => {
                let specs = self.trees.ok_or_else(|| invalid("RandomForestClassifier requires `trees`"))?;
                if specs.is_empty() {
                    return Err(invalid("RandomForestClassifier has no trees"));
                }
                let trees = specs.into_iter().map(build_tree).collect::<Result<Vec<_>, _>>()?;
                Box::new(RandomForestClassifier { trees, meta })
            }
        };

        Ok(classifier)
    }

    fn meta(&self) -> Result<ClassifierMeta, ModelLoadError> {
        if let Some(names) = &self.feature_names {
            if !matches_layout(names) {
                return Err(invalid(format!(
                    "feature_names {:?} do not match the expected feature layout",
                    names
                )));
            }
        }

        if let Some(classes) = &self.classes {
            if classes.as_slice() != [0, 1] {
                return Err(invalid(format!("classes must be [0, 1], got {:?}", classes)));
            }
        }

        if let Some(importances) = &self.feature_importances {
            if importances.len() != FEATURE_COUNT {
                return Err(invalid(format!(
                    "feature_importances has {} entries, expected {}",
                    importances.len(),
                    FEATURE_COUNT
                )));
            }
        }

        Ok(ClassifierMeta {
            feature_names: self.feature_names.clone(),
            classes: self.classes.clone(),
            feature_importances: self.feature_importances.clone(),
        })
    }
}

fn linear_params(
    coefficients: Option<Vec<f64>>,
    intercept: Option<f64>,
) -> Result<([f64; FEATURE_COUNT], f64), ModelLoadError> {
    let coefficients = coefficients.ok_or_else(|| invalid("linear model requires `coefficients`"))?;
    let count = coefficients.len();
    let coefficients: [f64; FEATURE_COUNT] = coefficients
        .try_into()
        .map_err(|_| invalid(format!("expected {} coefficients, got {}", FEATURE_COUNT, count)))?;

    if coefficients.iter().any(|c| !c.is_finite()) {
        return Err(invalid("coefficients must be finite"));
    }

    let intercept = intercept.unwrap_or(0.0);
    if !intercept.is_finite() {
        return Err(invalid("intercept must be finite"));
    }

    Ok((coefficients, intercept))
}

fn build_tree(spec: TreeSpec) -> Result<DecisionTree, ModelLoadError> {
    if spec.nodes.is_empty() {
        return Err(invalid("tree has no nodes"));
    }

    let len = spec.nodes.len();
    let mut nodes = Vec::with_capacity(len);

    for (i, node) in spec.nodes.into_iter().enumerate() {
        if node.value.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(invalid(format!("node {} has invalid class values", i)));
        }

        let children = match (node.left, node.right) {
            (None, None) => {
                if node.value[0] + node.value[1] <= 0.0 {
                    return Err(invalid(format!("leaf {} has no samples", i)));
                }
                None
            }
            (Some(left), Some(right)) => {
                if left >= len || right >= len || left == i || right == i {
                    return Err(invalid(format!("node {} has out-of-range children", i)));
                }
                Some((left, right))
            }
            _ => return Err(invalid(format!("node {} must have both children or none", i))),
        };

        let (feature, threshold) = match children {
            Some(_) => {
                let feature = node
                    .feature
                    .filter(|f| *f < FEATURE_COUNT)
                    .ok_or_else(|| invalid(format!("node {} splits on an unknown feature", i)))?;
                let threshold = node
                    .threshold
                    .filter(|t| t.is_finite())
                    .ok_or_else(|| invalid(format!("node {} has no threshold", i)))?;
                (feature, threshold)
            }
            None => (0, 0.0),
        };

        nodes.push(TreeNode { feature, threshold, children, value: node.value });
    }

    check_acyclic(&nodes)?;

    Ok(DecisionTree { nodes })
}

/// Every node reachable from the root must be reached exactly once
fn check_acyclic(nodes: &[TreeNode]) -> Result<(), ModelLoadError> {
    let mut visited = vec![false; nodes.len()];
    let mut pending = vec![0usize];

    while let Some(index) = pending.pop() {
        if std::mem::replace(&mut visited[index], true) {
            return Err(invalid(format!("node {} is reached more than once", index)));
        }
        if let Some((left, right)) = nodes[index].children {
            pending.push(right);
            pending.push(left);
        }
    }

    Ok(())
}

// ============================================================================
// LOADING
// ============================================================================

/// Where the artifact came from
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactInfo {
    /// Server-local, kept out of API responses
    #[serde(skip)]
    pub path: String,
    pub size_bytes: u64,
    pub sha256: String,
}

/// Read, checksum and deserialize the artifact at `path`
pub fn load_artifact(path: &Path) -> Result<(Box<dyn Classifier>, ArtifactInfo), ModelLoadError> {
    tracing::info!("Loading model artifact from: {}", path.display());

    let bytes = std::fs::read(path).map_err(|source| ModelLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let info = ArtifactInfo {
        path: path.display().to_string(),
        size_bytes: bytes.len() as u64,
        sha256: format!("{:x}", Sha256::digest(&bytes)),
    };

    let classifier = ModelArtifact::from_slice(&bytes)?.into_classifier()?;

    tracing::info!(
        "Model artifact loaded: {} ({} bytes, sha256 {})",
        classifier.model_type(),
        info.size_bytes,
        info.sha256
    );

    Ok((classifier, info))
}

// ============================================================================
// TESTS
// ============================================================================
