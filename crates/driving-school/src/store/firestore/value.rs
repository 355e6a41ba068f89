//! Conversion between plain JSON and the Firestore REST typed-value encoding.

use serde_json::{json, Map, Number, Value};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValueError {
    #[error("expected a typed value object, found `{0}`")]
    NotTyped(String),
    #[error("unsupported value type `{0}`")]
    Unsupported(String),
    #[error("invalid integer value `{0}`")]
    BadInteger(String),
}

/// Wraps a plain JSON value in its typed representation.
pub fn encode(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(flag) => json!({ "booleanValue": flag }),
        Value::Number(number) => match number.as_i64() {
            Some(integer) => json!({ "integerValue": integer.to_string() }),
            None => json!({ "doubleValue": number }),
        },
        Value::String(text) => json!({ "stringValue": text }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

pub fn encode_fields(map: &Map<String, Value>) -> Value {
    Value::Object(
        map.iter()
            .map(|(key, value)| (key.clone(), encode(value)))
            .collect(),
    )
}

/// Unwraps a typed value into plain JSON. Timestamps and references are kept
/// as their string form.
pub fn decode(value: &Value) -> Result<Value, ValueError> {
    let Some((kind, inner)) = value.as_object().and_then(|map| map.iter().next()) else {
        return Err(ValueError::NotTyped(value.to_string()));
    };

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" | "doubleValue" => Ok(inner.clone()),
        "stringValue" | "timestampValue" | "referenceValue" => Ok(inner.clone()),
        "integerValue" => decode_integer(inner),
        "arrayValue" => {
            let values = inner
                .get("values")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(decode).collect::<Result<Vec<_>, _>>())
                .transpose()?
                .unwrap_or_default();
            Ok(Value::Array(values))
        }
        "mapValue" => match inner.get("fields") {
            Some(fields) => decode_fields(fields),
            None => Ok(Value::Object(Map::new())),
        },
        other => Err(ValueError::Unsupported(other.to_string())),
    }
}

pub fn decode_fields(fields: &Value) -> Result<Value, ValueError> {
    let Some(map) = fields.as_object() else {
        return Err(ValueError::NotTyped(fields.to_string()));
    };
    let mut plain = Map::with_capacity(map.len());
    for (key, value) in map {
        plain.insert(key.clone(), decode(value)?);
    }
    Ok(Value::Object(plain))
}

// Integers travel as decimal strings.
fn decode_integer(inner: &Value) -> Result<Value, ValueError> {
    match inner {
        Value::Number(number) => Ok(Value::Number(number.clone())),
        Value::String(text) => text
            .parse::<i64>()
            .map(|parsed| Value::Number(Number::from(parsed)))
            .map_err(|_| ValueError::BadInteger(text.clone())),
        other => Err(ValueError::BadInteger(other.to_string())),
    }
}
