//! Field extraction from model-produced JSON.

use serde_json::Value;
use voca_core::{Result, VocaError};

/// Parse a model reply as a JSON object.
pub fn json_object(raw: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(raw.trim())
        .map_err(|e| VocaError::MalformedOutput(format!("reply is not JSON: {e}")))?;
    if !value.is_object() {
        return Err(VocaError::MalformedOutput("reply is not a JSON object".into()));
    }
    Ok(value)
}

/// A required string field.
pub fn text_field(obj: &Value, field: &str) -> Result<String> {
    match &obj[field] {
        Value::String(s) => Ok(s.clone()),
        Value::Null => Err(VocaError::MalformedOutput(format!("missing field '{field}'"))),
        other => Err(VocaError::MalformedOutput(format!(
            "field '{field}' is not a string: {other}"
        ))),
    }
}

/// An optional string field; JSON null and absence both read as `None`.
pub fn optional_text_field(obj: &Value, field: &str) -> Result<Option<String>> {
    match &obj[field] {
        Value::Null => Ok(None),
        _ => text_field(obj, field).map(Some),
    }
}

/// A required integer. Accepts JSON integers, floats (rounded), and numeric
/// strings, since the templates show numbers quoted.
pub fn int_value(value: &Value, field: &str) -> Result<i32> {
    let parsed = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.round() as i64))
        }
        Value::Null => {
            return Err(VocaError::MalformedOutput(format!("missing field '{field}'")));
        }
        _ => None,
    };
    parsed
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| VocaError::MalformedOutput(format!("field '{field}' is not an integer: {value}")))
}

pub fn int_field(obj: &Value, field: &str) -> Result<i32> {
    int_value(&obj[field], field)
}
