//! Soil request validator
//! Turns untrusted request data into a `SoilInput` or a `ValidationError`

use crate::errors::ValidationError;
use crate::types::SoilInput;
use crate::validation::types::{FIELD_RANGES, TEXTURE_SUM_EPSILON, TEXTURE_SUM_MAX, TEXTURE_SUM_MIN};
use serde_json::{Map, Value};

/// Validate a raw JSON request body
///
/// Numbers and numeric strings are accepted for the numeric fields, since
/// SMS and form adapters forward values as text.
pub fn validate_request(body: &Value) -> Result<SoilInput, ValidationError> {
    let object = body.as_object().ok_or(ValidationError::NotAnObject)?;

    let mut values = [0.0f64; 10];
    for (slot, range) in values.iter_mut().zip(FIELD_RANGES.iter()) {
        *slot = numeric_field(object, range.field)?;
    }

    let crop_type = match object.get("crop_type") {
        None | Some(Value::Null) => {
            return Err(ValidationError::MissingField("crop_type".to_string()))
        }
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(ValidationError::InvalidCropType),
    };

    let [phosphorus, potassium, nitrogen, organic_carbon, cation_exchange, sand_percent, clay_percent, silt_percent, rainfall, elevation] =
        values;

    let input = SoilInput {
        phosphorus,
        potassium,
        nitrogen,
        organic_carbon,
        cation_exchange,
        sand_percent,
        clay_percent,
        silt_percent,
        rainfall,
        elevation,
        crop_type,
    };

    validate_input(&input)?;
    Ok(input)
}

/// Validate an already-typed input
pub fn validate_input(input: &SoilInput) -> Result<(), ValidationError> {
    if input.crop_type.trim().is_empty() {
        return Err(ValidationError::InvalidCropType);
    }

    let values = [
        input.phosphorus,
        input.potassium,
        input.nitrogen,
        input.organic_carbon,
        input.cation_exchange,
        input.sand_percent,
        input.clay_percent,
        input.silt_percent,
        input.rainfall,
        input.elevation,
    ];

    for (value, range) in values.iter().zip(FIELD_RANGES.iter()) {
        if !value.is_finite() {
            return Err(ValidationError::NonFinite(range.field.to_string()));
        }
        if !range.contains(*value) {
            return Err(ValidationError::OutOfRange {
                field: range.field.to_string(),
                value: *value,
                min: range.min,
                max: range.max,
            });
        }
    }

    let sum = input.texture_sum();
    if !(TEXTURE_SUM_MIN - TEXTURE_SUM_EPSILON..=TEXTURE_SUM_MAX + TEXTURE_SUM_EPSILON).contains(&sum) {
        return Err(ValidationError::TextureSum { sum });
    }

    Ok(())
}

fn numeric_field(object: &Map<String, Value>, field: &str) -> Result<f64, ValidationError> {
    match object.get(field) {
        None | Some(Value::Null) => Err(ValidationError::MissingField(field.to_string())),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| ValidationError::NonNumeric {
            field: field.to_string(),
            value: n.to_string(),
        }),
        Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| ValidationError::NonNumeric {
            field: field.to_string(),
            value: format!("\"{}\"", s),
        }),
        Some(other) => Err(ValidationError::NonNumeric {
            field: field.to_string(),
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_body() -> Value {
        json!({
            "phosphorus": 15,
            "potassium": 120,
            "nitrogen": 0.25,
            "organic_carbon": 2.0,
            "cation_exchange": 15,
            "sand_percent": 40,
            "clay_percent": 30,
            "silt_percent": 30,
            "rainfall": 1200,
            "elevation": 1500,
            "crop_type": "maize"
        })
    }

    #[test]
    fn test_valid_request() {
        let input = validate_request(&valid_body()).unwrap();
        assert_eq!(input.phosphorus, 15.0);
        assert_eq!(input.crop_type, "maize");
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let mut body = valid_body();
        body["nitrogen"] = json!(" 0.12 ");
        let input = validate_request(&body).unwrap();
        assert_eq!(input.nitrogen, 0.12);
    }

    #[test]
    fn test_missing_field() {
        let mut body = valid_body();
        body.as_object_mut().unwrap().remove("rainfall");
        assert_eq!(
            validate_request(&body),
            Err(ValidationError::MissingField("rainfall".to_string()))
        );
    }

    #[test]
    fn test_null_field_is_missing() {
        let mut body = valid_body();
        body["elevation"] = Value::Null;
        assert!(matches!(
            validate_request(&body),
            Err(ValidationError::MissingField(f)) if f == "elevation"
        ));
    }

    #[test]
    fn test_non_numeric_field() {
        let mut body = valid_body();
        body["potassium"] = json!("lots");
        assert!(matches!(
            validate_request(&body),
            Err(ValidationError::NonNumeric { field, .. }) if field == "potassium"
        ));

        body["potassium"] = json!(true);
        assert!(matches!(
            validate_request(&body),
            Err(ValidationError::NonNumeric { .. })
        ));
    }

    #[test]
    fn test_nan_string_rejected() {
        let mut body = valid_body();
        body["phosphorus"] = json!("NaN");
        assert_eq!(
            validate_request(&body),
            Err(ValidationError::NonFinite("phosphorus".to_string()))
        );
    }

    #[test]
    fn test_out_of_range() {
        let mut body = valid_body();
        body["phosphorus"] = json!(201);
        assert!(matches!(
            validate_request(&body),
            Err(ValidationError::OutOfRange { field, max, .. }) if field == "phosphorus" && max == 200.0
        ));
    }

    #[test]
    fn test_texture_sum_below_tolerance() {
        let mut body = valid_body();
        body["silt_percent"] = json!(20);
        assert_eq!(
            validate_request(&body),
            Err(ValidationError::TextureSum { sum: 90.0 })
        );
    }

    #[test]
    fn test_texture_sum_tolerance_edges() {
        let mut body = valid_body();
        body["silt_percent"] = json!(25);
        assert!(validate_request(&body).is_ok());

        body["silt_percent"] = json!(35);
        assert!(validate_request(&body).is_ok());

        body["silt_percent"] = json!(35.5);
        assert!(matches!(
            validate_request(&body),
            Err(ValidationError::TextureSum { .. })
        ));
    }

    #[test]
    fn test_texture_sum_float_error_at_edges() {
        // 0.1 + 65.1 + 29.8 sums to 94.99999999999999
        let mut body = valid_body();
        body["sand_percent"] = json!(0.1);
        body["clay_percent"] = json!(65.1);
        body["silt_percent"] = json!(29.8);
        assert!(validate_request(&body).is_ok());

        body["sand_percent"] = json!(10.1);
        body["clay_percent"] = json!(65.1);
        body["silt_percent"] = json!(29.8);
        assert!(validate_request(&body).is_ok());

        body["silt_percent"] = json!(29.9);
        assert!(matches!(
            validate_request(&body),
            Err(ValidationError::TextureSum { .. })
        ));
    }

    #[test]
    fn test_crop_type_checks() {
        let mut body = valid_body();
        body["crop_type"] = json!("   ");
        assert_eq!(validate_request(&body), Err(ValidationError::InvalidCropType));

        body["crop_type"] = json!(42);
        assert_eq!(validate_request(&body), Err(ValidationError::InvalidCropType));

        body.as_object_mut().unwrap().remove("crop_type");
        assert_eq!(
            validate_request(&body),
            Err(ValidationError::MissingField("crop_type".to_string()))
        );
    }

    #[test]
    fn test_not_an_object() {
        assert_eq!(validate_request(&json!([1, 2, 3])), Err(ValidationError::NotAnObject));
    }

    #[test]
    fn test_unknown_crop_is_valid() {
        let mut body = valid_body();
        body["crop_type"] = json!("sorghum");
        assert!(validate_request(&body).is_ok());
    }
}
