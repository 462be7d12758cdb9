//! Prediction request models

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

/// Unvalidated request fields, as submitted by the client
#[derive(Debug, Clone, Default)]
pub struct RawInput {
    fields: Map<String, Value>,
}

impl RawInput {
    /// Fields from a JSON object body
    pub fn from_json(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Fields from a form-encoded body (every value is a string)
    pub fn from_form(form: HashMap<String, String>) -> Self {
        let fields = form
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Absent, `null` and `""` all count as missing
    pub fn is_missing(&self, field: &str) -> bool {
        match self.fields.get(field) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        }
    }
}

#[cfg(test)]
impl<const N: usize> From<[(&str, &str); N]> for RawInput {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self::from_form(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// Validated request: every field present and inside its allowed set
///
/// Serializes with the wire field names, echoed back as `input_features`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NormalizedInput {
    #[serde(rename = "PhysicalActivities")]
    pub physical_activities: u8,
    #[serde(rename = "AlcoholDrinkers")]
    pub alcohol_drinkers: u8,
    #[serde(rename = "ageCategoryGrouped")]
    pub age_category: u8,
    #[serde(rename = "SmokerStatusGrouped")]
    pub smoker_status: u8,
    #[serde(rename = "HadDiabetesGrouped")]
    pub had_diabetes: u8,
    #[serde(rename = "HadHeartAttack")]
    pub had_heart_attack: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_detection() {
        let raw = RawInput::from_json(
            json!({
                "PhysicalActivities": "1",
                "AlcoholDrinkers": "",
                "ageCategoryGrouped": null,
                "SmokerStatusGrouped": 0,
            })
            .as_object()
            .cloned()
            .unwrap(),
        );

        assert!(!raw.is_missing("PhysicalActivities"));
        assert!(raw.is_missing("AlcoholDrinkers"));
        assert!(raw.is_missing("ageCategoryGrouped"));
        assert!(!raw.is_missing("SmokerStatusGrouped"));
        assert!(raw.is_missing("HadDiabetesGrouped"));
    }

    #[test]
    fn test_form_values_are_strings() {
        let raw = RawInput::from([("PhysicalActivities", "1")]);
        assert_eq!(raw.get("PhysicalActivities"), Some(&json!("1")));
    }

    #[test]
    fn test_normalized_input_wire_names() {
        let input = NormalizedInput {
            physical_activities: 1,
            alcohol_drinkers: 0,
            age_category: 2,
            smoker_status: 1,
            had_diabetes: 0,
            had_heart_attack: 1,
        };

        let value = serde_json::to_value(input).unwrap();
        assert_eq!(
            value,
            json!({
                "PhysicalActivities": 1,
                "AlcoholDrinkers": 0,
                "ageCategoryGrouped": 2,
                "SmokerStatusGrouped": 1,
                "HadDiabetesGrouped": 0,
                "HadHeartAttack": 1,
            })
        );
    }
}
