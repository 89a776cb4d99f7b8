//! Local decode-with-validation of completion output.
//!
//! The JSON a backend returns is checked against the schema of the target
//! type first, collecting every violation with its instance path, and only
//! then deserialized. Values that violate the schema are never coerced.

use super::error::DecodeError;
use crate::schema::StructuredOutput;
use serde_json::Value;

/// Collect all validation errors from jsonschema validation.
///
/// Returns a vector of formatted error strings with instance paths, empty
/// when `instance` is valid.
///
/// # Errors
///
/// Returns `DecodeError::SchemaCompilation` if `schema` itself is invalid.
///
/// # Examples
///
/// ```
/// use medsky::extraction::decode::collect_validation_errors;
/// use serde_json::json;
///
/// let schema = json!({
///     "type": "object",
///     "properties": { "시간": { "type": "integer", "minimum": 0 } },
///     "required": ["시간"]
/// });
///
/// let errors = collect_validation_errors(&schema, &json!({ "시간": "74" })).unwrap();
/// assert_eq!(errors.len(), 1);
/// ```
pub fn collect_validation_errors(schema: &Value, instance: &Value) -> Result<Vec<String>, DecodeError> {
    let validator = jsonschema::Validator::new(schema)
        .map_err(|e| DecodeError::SchemaCompilation(e.to_string()))?;
    Ok(validator
        .iter_errors(instance)
        .map(|error| format!("At path '{}': {}", error.instance_path, error))
        .collect())
}

/// Validates `value` against the schema of `T`, then deserializes it.
///
/// # Errors
///
/// `DecodeError::Schema` lists every violation; `DecodeError::Deserialize`
/// covers the rare value that passes the schema but not serde.
pub fn decode<T: StructuredOutput>(value: Value) -> Result<T, DecodeError> {
    decode_with_schema(&T::response_schema(), T::SCHEMA_NAME, value)
}

/// Like [`decode`], with an explicit schema.
///
/// # Errors
///
/// See [`decode`].
pub fn decode_with_schema<T: serde::de::DeserializeOwned>(
    schema: &Value,
    schema_name: &str,
    value: Value,
) -> Result<T, DecodeError> {
    let errors = collect_validation_errors(schema, &value)?;
    if !errors.is_empty() {
        return Err(DecodeError::Schema {
            schema: schema_name.to_string(),
            errors,
        });
    }
    Ok(serde_json::from_value(value)?)
}
