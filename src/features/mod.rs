//! Features Module - request schema and model input encoding

pub mod layout;
pub mod vector;

// Re-export common types
pub use layout::{
    layout_hash, matches_layout, LayoutInfo, FEATURE_COUNT, FEATURE_LAYOUT, FIELD_COUNT,
    FORM_FIELDS,
};
pub use vector::FeatureVector;
