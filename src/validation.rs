//! Request validation
//!
//! Turns a [`RawInput`] into a [`NormalizedInput`] or a [`ValidationError`].
//!
//! Missing fields are reported all at once. Invalid values stop at the
//! first offending field, in declared order.

use serde_json::Value;
use thiserror::Error;

use crate::features::{FIELD_COUNT, FORM_FIELDS};
use crate::models::{NormalizedInput, RawInput};

const BINARY: &[i64] = &[0, 1];
const TERNARY: &[i64] = &[0, 1, 2];

/// Allowed values per field, same order as `FORM_FIELDS`
const ALLOWED: [&[i64]; FIELD_COUNT] = [BINARY, BINARY, TERNARY, TERNARY, TERNARY, BINARY];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid value for {field}. Must be one of: {}", format_allowed(.allowed))]
    InvalidValue {
        field: &'static str,
        allowed: &'static [i64],
    },
}

fn format_allowed(allowed: &[i64]) -> String {
    allowed
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validate and normalize a prediction request
pub fn validate(raw: &RawInput) -> Result<NormalizedInput, ValidationError> {
    let missing: Vec<&'static str> = FORM_FIELDS
        .iter()
        .copied()
        .filter(|field| raw.is_missing(field))
        .collect();

    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    let mut values = [0u8; FIELD_COUNT];
    for (i, (&field, &allowed)) in FORM_FIELDS.iter().zip(ALLOWED.iter()).enumerate() {
        let invalid = || ValidationError::InvalidValue { field, allowed };

        let value = raw.get(field).and_then(coerce).ok_or_else(invalid)?;
        if !allowed.contains(&value) {
            return Err(invalid());
        }
        values[i] = u8::try_from(value).map_err(|_| invalid())?;
    }

    let [physical_activities, alcohol_drinkers, age_category, smoker_status, had_diabetes, had_heart_attack] =
        values;

    Ok(NormalizedInput {
        physical_activities,
        alcohol_drinkers,
        age_category,
        smoker_status,
        had_diabetes,
        had_heart_attack,
    })
}

/// Numeric coercion: float-looking strings and numbers, truncated toward zero
fn coerce(value: &Value) -> Option<i64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };

    if !number.is_finite() {
        return None;
    }

    Some(number.trunc() as i64)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn valid_pairs() -> [(&'static str, &'static str); 6] {
        [
            ("PhysicalActivities", "1"),
            ("AlcoholDrinkers", "0"),
            ("ageCategoryGrouped", "1"),
            ("SmokerStatusGrouped", "0"),
            ("HadDiabetesGrouped", "0"),
            ("HadHeartAttack", "0"),
        ]
    }

    fn with_value(field: &str, value: &str) -> RawInput {
        let mut form: HashMap<String, String> = valid_pairs()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        form.insert(field.to_string(), value.to_string());
        RawInput::from_form(form)
    }

    fn json_input(value: Value) -> RawInput {
        RawInput::from_json(value.as_object().cloned().unwrap())
    }

    #[test]
    fn test_valid_input() {
        let normalized = validate(&RawInput::from(valid_pairs())).unwrap();
        assert_eq!(
            normalized,
            NormalizedInput {
                physical_activities: 1,
                alcohol_drinkers: 0,
                age_category: 1,
                smoker_status: 0,
                had_diabetes: 0,
                had_heart_attack: 0,
            }
        );
    }

    #[test]
    fn test_all_missing_fields_reported() {
        let raw = RawInput::from([("PhysicalActivities", "1"), ("AlcoholDrinkers", "0")]);
        let err = validate(&raw).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields(vec![
                "ageCategoryGrouped",
                "SmokerStatusGrouped",
                "HadDiabetesGrouped",
                "HadHeartAttack",
            ])
        );
    }

    #[test]
    fn test_missing_two_fields_message() {
        let raw = RawInput::from([
            ("PhysicalActivities", "1"),
            ("ageCategoryGrouped", "1"),
            ("SmokerStatusGrouped", "0"),
            ("HadHeartAttack", "0"),
        ]);
        let err = validate(&raw).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required fields: AlcoholDrinkers, HadDiabetesGrouped"
        );
    }

    #[test]
    fn test_empty_string_counts_as_missing() {
        let err = validate(&with_value("HadHeartAttack", "")).unwrap_err();
        assert_eq!(err, ValidationError::MissingFields(vec!["HadHeartAttack"]));
    }

    #[test]
    fn test_missing_wins_over_invalid() {
        let raw = RawInput::from([
            ("PhysicalActivities", "7"),
            ("AlcoholDrinkers", "0"),
            ("ageCategoryGrouped", "1"),
            ("SmokerStatusGrouped", "0"),
            ("HadDiabetesGrouped", "0"),
        ]);
        let err = validate(&raw).unwrap_err();
        assert_eq!(err, ValidationError::MissingFields(vec!["HadHeartAttack"]));
    }

    #[test]
    fn test_out_of_range_value() {
        let err = validate(&with_value("ageCategoryGrouped", "5")).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidValue {
                field: "ageCategoryGrouped",
                allowed: TERNARY,
            }
        );
        assert_eq!(
            err.to_string(),
            "Invalid value for ageCategoryGrouped. Must be one of: 0, 1, 2"
        );
    }

    #[test]
    fn test_each_field_rejects_out_of_range() {
        for (field, bad) in [
            ("PhysicalActivities", "2"),
            ("AlcoholDrinkers", "-1"),
            ("ageCategoryGrouped", "3"),
            ("SmokerStatusGrouped", "3"),
            ("HadDiabetesGrouped", "10"),
            ("HadHeartAttack", "2"),
        ] {
            match validate(&with_value(field, bad)) {
                Err(ValidationError::InvalidValue { field: reported, .. }) => {
                    assert_eq!(reported, field)
                }
                other => panic!("expected invalid value for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_first_invalid_field_short_circuits() {
        let raw = RawInput::from([
            ("PhysicalActivities", "1"),
            ("AlcoholDrinkers", "9"),
            ("ageCategoryGrouped", "9"),
            ("SmokerStatusGrouped", "0"),
            ("HadDiabetesGrouped", "9"),
            ("HadHeartAttack", "0"),
        ]);
        let err = validate(&raw).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidValue {
                field: "AlcoholDrinkers",
                allowed: BINARY,
            }
        );
    }

    #[test]
    fn test_non_numeric_is_invalid() {
        for bad in ["yes", " ", "1a", "nan", "inf"] {
            let err = validate(&with_value("SmokerStatusGrouped", bad)).unwrap_err();
            assert!(
                matches!(err, ValidationError::InvalidValue { field: "SmokerStatusGrouped", .. }),
                "{bad:?} should be invalid"
            );
        }
    }

    #[test]
    fn test_float_strings_truncate() {
        let normalized = validate(&with_value("ageCategoryGrouped", "2.9")).unwrap();
        assert_eq!(normalized.age_category, 2);

        let normalized = validate(&with_value("HadDiabetesGrouped", " 1.0 ")).unwrap();
        assert_eq!(normalized.had_diabetes, 1);

        // truncation toward zero keeps small negatives in range
        let normalized = validate(&with_value("PhysicalActivities", "-0.5")).unwrap();
        assert_eq!(normalized.physical_activities, 0);
    }

    #[test]
    fn test_json_numbers_and_booleans() {
        let raw = json_input(json!({
            "PhysicalActivities": true,
            "AlcoholDrinkers": 0,
            "ageCategoryGrouped": 2.0,
            "SmokerStatusGrouped": "1",
            "HadDiabetesGrouped": 1,
            "HadHeartAttack": false,
            "UnknownField": "ignored",
        }));

        let normalized = validate(&raw).unwrap();
        assert_eq!(normalized.physical_activities, 1);
        assert_eq!(normalized.age_category, 2);
        assert_eq!(normalized.smoker_status, 1);
        assert_eq!(normalized.had_heart_attack, 0);
    }

    #[test]
    fn test_json_null_is_missing_and_array_is_invalid() {
        let mut body = json!({
            "PhysicalActivities": 1,
            "AlcoholDrinkers": 0,
            "ageCategoryGrouped": 1,
            "SmokerStatusGrouped": 0,
            "HadDiabetesGrouped": 0,
            "HadHeartAttack": null,
        });
        let err = validate(&json_input(body.clone())).unwrap_err();
        assert_eq!(err, ValidationError::MissingFields(vec!["HadHeartAttack"]));

        body["HadHeartAttack"] = json!([0]);
        let err = validate(&json_input(body)).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { field: "HadHeartAttack", .. }));
    }
}
