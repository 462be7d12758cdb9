//! Feature Vector - one-hot encoding of a validated request
//!
//! Pure and infallible: the input has already been range-checked by
//! `validation::validate`, so every condition below is well defined.

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::layout::{FEATURE_COUNT, FEATURE_LAYOUT};
use crate::models::NormalizedInput;

/// Fixed-order binary feature vector consumed by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureVector {
    values: [u8; FEATURE_COUNT],
}

impl FeatureVector {
    /// Encode a validated request into layout order
    pub fn encode(input: &NormalizedInput) -> Self {
        let flag = |condition: bool| u8::from(condition);

        Self {
            values: [
                flag(input.physical_activities == 1),
                flag(input.alcohol_drinkers == 1),
                flag(input.age_category == 2),
                flag(input.age_category == 0),
                flag(input.smoker_status == 1),
                flag(input.smoker_status == 0),
                flag(input.had_diabetes == 1),
            ],
        }
    }

    /// Create from raw values. Anything non-zero becomes 1.
    #[cfg(test)]
    pub fn from_values(values: [u8; FEATURE_COUNT]) -> Self {
        Self {
            values: values.map(|v| u8::from(v != 0)),
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.values
    }

    /// Values widened for the classifier math
    pub fn to_f64(&self) -> [f64; FEATURE_COUNT] {
        self.values.map(f64::from)
    }

    /// Serializable `{feature_name: value}` view, in layout order
    pub fn named(&self) -> NamedFeatures<'_> {
        NamedFeatures(self)
    }
}

/// Ordered name -> value mapping (`model_features` in responses)
#[derive(Debug, Clone, Copy)]
pub struct NamedFeatures<'a>(&'a FeatureVector);

impl Serialize for NamedFeatures<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FEATURE_COUNT))?;
        for (name, value) in FEATURE_LAYOUT.iter().zip(self.0.values.iter()) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

// ============================================================================
// TESTS
// ============================================================================
