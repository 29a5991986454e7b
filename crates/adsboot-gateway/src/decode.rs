//! Response decoder
//!
//! Validates a raw backend payload against a [`SchemaContract`] before
//! handing it to serde, so a reply is either fully conformant or rejected.
//! Numeric bounds are not checked here; see `within_bounds` on the result
//! types.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::DecodeError;
use crate::schema::{self, SchemaContract, Shape};
use crate::types::{AdCopyVariant, AudienceSegment, CreativeAnalysis};

pub fn decode_audience(payload: &str) -> Result<Vec<AudienceSegment>, DecodeError> {
    decode_with(&schema::AUDIENCE, payload)
}

pub fn decode_copy(payload: &str) -> Result<Vec<AdCopyVariant>, DecodeError> {
    decode_with(&schema::COPY, payload)
}

pub fn decode_creative(payload: &str) -> Result<CreativeAnalysis, DecodeError> {
    decode_with(&schema::CREATIVE, payload)
}

/// Check `payload` against `contract`, then deserialize it as `T`
pub fn decode_with<T: DeserializeOwned>(
    contract: &SchemaContract,
    payload: &str,
) -> Result<T, DecodeError> {
    let value = parse(payload)?;
    check_shape(contract, &value)?;
    serde_json::from_value(value).map_err(|e| DecodeError::Malformed(e.to_string()))
}

fn parse(payload: &str) -> Result<Value, DecodeError> {
    let trimmed = payload.trim();
    if trimmed.is_empty() {
        return Err(DecodeError::Malformed("empty payload".to_string()));
    }
    serde_json::from_str(trimmed).map_err(|e| DecodeError::Malformed(e.to_string()))
}

fn check_shape(contract: &SchemaContract, value: &Value) -> Result<(), DecodeError> {
    match contract.shape {
        Shape::Array { items } => {
            let rows = value.as_array().ok_or_else(|| {
                DecodeError::Malformed(format!("expected an array, got {}", json_kind(value)))
            })?;
            if rows.len() != items {
                return Err(DecodeError::Malformed(format!(
                    "expected {} items, got {}",
                    items,
                    rows.len()
                )));
            }
            for (index, row) in rows.iter().enumerate() {
                check_fields(contract, row, Some(index))?;
            }
            Ok(())
        }
        Shape::Object => check_fields(contract, value, None),
        Shape::FreeText => Ok(()),
    }
}

fn check_fields(
    contract: &SchemaContract,
    value: &Value,
    index: Option<usize>,
) -> Result<(), DecodeError> {
    let object = value.as_object().ok_or_else(|| {
        let at = index.map(|i| format!(" at item {}", i)).unwrap_or_default();
        DecodeError::Malformed(format!("expected an object{}, got {}", at, json_kind(value)))
    })?;

    for field in contract.fields {
        match object.get(field.name) {
            None | Some(Value::Null) if field.required => {
                return Err(DecodeError::MissingField {
                    field: field.name,
                    index,
                });
            }
            None | Some(Value::Null) => {}
            Some(present) if !field.ty.accepts(present) => {
                return Err(DecodeError::InvalidField {
                    field: field.name,
                    expected: field.ty,
                    index,
                });
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
