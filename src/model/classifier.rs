//! Classifiers - the opaque predictor behind the adapter
//!
//! Every classifier exposes `predict`. Probability estimates are an
//! optional capability advertised through `supports_probabilities`.

use thiserror::Error;

use crate::features::{FeatureVector, FEATURE_COUNT};

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("classifier does not support probability estimates")]
    Unsupported,

    #[error("classifier produced a non-finite score")]
    NonFinite,

    #[error("tree node {0} is out of range")]
    BadNode(usize),

    #[error("classifier returned label {0}, expected 0 or 1")]
    InvalidLabel(u8),
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Trait for binary classifiers over the 7-feature layout
pub trait Classifier: Send + Sync {
    /// Short type name reported by `/model-info`
    fn model_type(&self) -> &'static str;

    /// Predicted class, 0 or 1
    fn predict(&self, features: &FeatureVector) -> Result<u8, InferenceError>;

    fn supports_probabilities(&self) -> bool {
        false
    }

    /// `[p0, p1]`
    fn predict_proba(&self, _features: &FeatureVector) -> Result<[f64; 2], InferenceError> {
        Err(InferenceError::Unsupported)
    }

    /// Feature names the model was trained with, if recorded
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    fn classes(&self) -> Option<&[i64]> {
        None
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        None
    }
}

/// Metadata shared by all artifact types
#[derive(Debug, Clone, Default)]
pub struct ClassifierMeta {
    pub feature_names: Option<Vec<String>>,
    pub classes: Option<Vec<i64>>,
    pub feature_importances: Option<Vec<f64>>,
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn dot(weights: &[f64; FEATURE_COUNT], features: &FeatureVector) -> f64 {
    weights
        .iter()
        .zip(features.to_f64().iter())
        .map(|(w, x)| w * x)
        .sum()
}

// ============================================================================
// LINEAR MODELS
// ============================================================================

/// Logistic regression: p1 = sigmoid(w.x + b)
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    pub coefficients: [f64; FEATURE_COUNT],
    pub intercept: f64,
    pub meta: ClassifierMeta,
}

impl LogisticRegression {
    fn positive_probability(&self, features: &FeatureVector) -> Result<f64, InferenceError> {
        let p1 = sigmoid(dot(&self.coefficients, features) + self.intercept);
        if p1.is_finite() {
            Ok(p1)
        } else {
            Err(InferenceError::NonFinite)
        }
    }
}

impl Classifier for LogisticRegression {
    fn model_type(&self) -> &'static str {
        "LogisticRegression"
    }

    fn predict(&self, features: &FeatureVector) -> Result<u8, InferenceError> {
        Ok(u8::from(self.positive_probability(features)? > 0.5))
    }

    fn supports_probabilities(&self) -> bool {
        true
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<[f64; 2], InferenceError> {
        let p1 = self.positive_probability(features)?;
        Ok([1.0 - p1, p1])
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.meta.feature_names.as_deref()
    }

    fn classes(&self) -> Option<&[i64]> {
        self.meta.classes.as_deref()
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        self.meta.feature_importances.as_deref()
    }
}

/// Linear SVM: sign of the decision function, no probabilities
#[derive(Debug, Clone)]
pub struct LinearSvc {
    pub coefficients: [f64; FEATURE_COUNT],
    pub intercept: f64,
    pub meta: ClassifierMeta,
}

impl Classifier for LinearSvc {
    fn model_type(&self) -> &'static str {
        "LinearSVC"
    }

    fn predict(&self, features: &FeatureVector) -> Result<u8, InferenceError> {
        let decision = dot(&self.coefficients, features) + self.intercept;
        if !decision.is_finite() {
            return Err(InferenceError::NonFinite);
        }
        Ok(u8::from(decision > 0.0))
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.meta.feature_names.as_deref()
    }

    fn classes(&self) -> Option<&[i64]> {
        self.meta.classes.as_deref()
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        self.meta.feature_importances.as_deref()
    }
}

// ============================================================================
// TREE MODELS
// ============================================================================

/// Flat tree node. Leaves have no children.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub feature: usize,
    pub threshold: f64,
    pub children: Option<(usize, usize)>,
    /// Class weights at this node, `[class 0, class 1]`
    pub value: [f64; 2],
}

/// Single decision tree, sklearn semantics (`x <= threshold` goes left)
#[derive(Debug, Clone)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Normalized class distribution at the reached leaf
    pub fn leaf_distribution(&self, features: &FeatureVector) -> Result<[f64; 2], InferenceError> {
        let x = features.to_f64();
        let mut index = 0;

        // A well-formed tree reaches a leaf in at most `nodes.len()` steps
        for _ in 0..=self.nodes.len() {
            let node = self.nodes.get(index).ok_or(InferenceError::BadNode(index))?;

            match node.children {
                Some((left, right)) => {
                    let value = x.get(node.feature).ok_or(InferenceError::BadNode(index))?;
                    index = if *value <= node.threshold { left } else { right };
                }
                None => {
                    let total = node.value[0] + node.value[1];
                    if !total.is_finite() || total <= 0.0 {
                        return Err(InferenceError::NonFinite);
                    }
                    return Ok([node.value[0] / total, node.value[1] / total]);
                }
            }
        }

        Err(InferenceError::BadNode(index))
    }
}

fn argmax(proba: [f64; 2]) -> u8 {
    // ties resolve to class 0, like numpy argmax
    u8::from(proba[1] > proba[0])
}

/// Decision tree classifier
#[derive(Debug, Clone)]
pub struct DecisionTreeClassifier {
    pub tree: DecisionTree,
    pub meta: ClassifierMeta,
}

impl Classifier for DecisionTreeClassifier {
    fn model_type(&self) -> &'static str {
        "DecisionTreeClassifier"
    }

    fn predict(&self, features: &FeatureVector) -> Result<u8, InferenceError> {
        Ok(argmax(self.tree.leaf_distribution(features)?))
    }

    fn supports_probabilities(&self) -> bool {
        true
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<[f64; 2], InferenceError> {
        self.tree.leaf_distribution(features)
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.meta.feature_names.as_deref()
    }

    fn classes(&self) -> Option<&[i64]> {
        self.meta.classes.as_deref()
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        self.meta.feature_importances.as_deref()
    }
}

/// Random forest: mean of per-tree leaf distributions
#[derive(Debug, Clone)]
pub struct RandomForestClassifier {
    pub trees: Vec<DecisionTree>,
    pub meta: ClassifierMeta,
}

impl Classifier for RandomForestClassifier {
    fn model_type(&self) -> &'static str {
        "RandomForestClassifier"
    }

    fn predict(&self, features: &FeatureVector) -> Result<u8, InferenceError> {
        Ok(argmax(self.predict_proba(features)?))
    }

    fn supports_probabilities(&self) -> bool {
        true
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<[f64; 2], InferenceError> {
        let mut sum = [0.0f64; 2];
        for tree in &self.trees {
            let dist = tree.leaf_distribution(features)?;
            sum[0] += dist[0];
            sum[1] += dist[1];
        }

        let n = self.trees.len() as f64;
        Ok([sum[0] / n, sum[1] / n])
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.meta.feature_names.as_deref()
    }

    fn classes(&self) -> Option<&[i64]> {
        self.meta.classes.as_deref()
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        self.meta.feature_importances.as_deref()
    }
}

// ============================================================================
// TESTS
// ============================================================================
