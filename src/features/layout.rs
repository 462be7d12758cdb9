//! Feature Layout - Centralized Feature Definition
//!
//! **This file controls the request and model schemas**
//!
//! - `FORM_FIELDS`: the 6 fields every `/predict` request must carry
//! - `FEATURE_LAYOUT`: the 7 one-hot features the classifier was trained on,
//!   in the exact order of the feature vector
//!
//! Changing either list changes the layout hash. Model artifacts that
//! declare `feature_names` are rejected at load time when they disagree.

use crc32fast::Hasher;
use serde::Serialize;

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FORM FIELDS (request contract)
// ============================================================================

/// Number of required request fields
pub const FIELD_COUNT: usize = 6;

/// Request fields in declared order (also the validation order)
pub const FORM_FIELDS: [&str; FIELD_COUNT] = [
    "PhysicalActivities",
    "AlcoholDrinkers",
    "ageCategoryGrouped",
    "SmokerStatusGrouped",
    "HadDiabetesGrouped",
    "HadHeartAttack", // required for compatibility, not a model feature
];

// ============================================================================
// FEATURE LAYOUT (model contract)
// ============================================================================

/// Total number of model features
pub const FEATURE_COUNT: usize = 7;

/// Feature names in exact order they appear in the vector
pub const FEATURE_LAYOUT: [&str; FEATURE_COUNT] = [
    "PhysicalActivities_Yes",           // 0: PhysicalActivities == 1
    "AlcoholDrinkers_Yes",              // 1: AlcoholDrinkers == 1
    "ageCategoryGrouped_OlderAdult",    // 2: ageCategoryGrouped == 2
    "ageCategoryGrouped_Young",         // 3: ageCategoryGrouped == 0
    "SmokerStatusGrouped_FormerSmoker", // 4: SmokerStatusGrouped == 1
    "SmokerStatusGrouped_NeverSmoked",  // 5: SmokerStatusGrouped == 0
    "HadDiabetesGrouped_Yes",           // 6: HadDiabetesGrouped == 1
];

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over version, form fields and feature names
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);

    for name in FORM_FIELDS.iter().chain(FEATURE_LAYOUT.iter()) {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct LayoutInfo {
    pub layout_version: u8,
    pub layout_hash: u32,
    pub form_fields: Vec<&'static str>,
    pub model_features: Vec<&'static str>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            layout_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            form_fields: FORM_FIELDS.to_vec(),
            model_features: FEATURE_LAYOUT.to_vec(),
        }
    }
}

/// Check that a model's declared feature names match the layout exactly
pub fn matches_layout<S: AsRef<str>>(names: &[S]) -> bool {
    names.len() == FEATURE_COUNT
        && names.iter().zip(FEATURE_LAYOUT.iter()).all(|(a, b)| a.as_ref() == *b)
}

// ============================================================================
// TESTS
// ============================================================================
