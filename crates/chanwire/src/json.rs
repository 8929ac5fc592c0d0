//! JSON views of dynamic values.
//!
//! Integers and booleans map to JSON numbers and booleans, `str` to JSON
//! strings, sequences and tuples to arrays. Byte strings are hex strings.

use bytes::Bytes;
use chanwire_codec::{Shape, Value};
use serde_json::Value as Json;

/// Build a [`Value`] of `shape` from JSON, reporting the JSON path on failure.
pub fn value_from_json(shape: &Shape, json: &Json) -> Result<Value, String> {
    convert(shape, json, &mut String::from("$"))
}

fn convert(shape: &Shape, json: &Json, path: &mut String) -> Result<Value, String> {
    let mismatch = |path: &str| format!("{path}: expected {shape}, got {}", describe(json));

    let value = match shape {
        Shape::U8 => Value::U8(unsigned(json).ok_or_else(|| mismatch(path))?),
        Shape::U16 => Value::U16(unsigned(json).ok_or_else(|| mismatch(path))?),
        Shape::U32 => Value::U32(unsigned(json).ok_or_else(|| mismatch(path))?),
        Shape::U64 => Value::U64(json.as_u64().ok_or_else(|| mismatch(path))?),
        Shape::I8 => Value::I8(signed(json).ok_or_else(|| mismatch(path))?),
        Shape::I16 => Value::I16(signed(json).ok_or_else(|| mismatch(path))?),
        Shape::I32 => Value::I32(signed(json).ok_or_else(|| mismatch(path))?),
        Shape::I64 => Value::I64(json.as_i64().ok_or_else(|| mismatch(path))?),
        Shape::Bool => Value::Bool(json.as_bool().ok_or_else(|| mismatch(path))?),
        Shape::Str => Value::Str(json.as_str().ok_or_else(|| mismatch(path))?.to_owned()),
        Shape::Bytes => {
            let text = json.as_str().ok_or_else(|| mismatch(path))?;
            let raw = hex::decode(text).map_err(|err| format!("{path}: invalid hex: {err}"))?;
            Value::Bytes(Bytes::from(raw))
        }
        Shape::Seq(element) => {
            let items = json.as_array().ok_or_else(|| mismatch(path))?;
            Value::Seq(convert_each(items.iter().map(|item| (&**element, item)), path)?)
        }
        Shape::Tuple(fields) => {
            let items = json.as_array().ok_or_else(|| mismatch(path))?;
            if items.len() != fields.len() {
                return Err(format!(
                    "{path}: expected {} tuple fields, got {}",
                    fields.len(),
                    items.len()
                ));
            }
            Value::Tuple(convert_each(fields.iter().zip(items), path)?)
        }
    };
    Ok(value)
}

fn convert_each<'a>(
    pairs: impl Iterator<Item = (&'a Shape, &'a Json)>,
    path: &mut String,
) -> Result<Vec<Value>, String> {
    let base = path.len();
    let mut out = Vec::new();
    for (index, (shape, json)) in pairs.enumerate() {
        path.push_str(&format!("[{index}]"));
        out.push(convert(shape, json, path)?);
        path.truncate(base);
    }
    Ok(out)
}

fn unsigned<T: TryFrom<u64>>(json: &Json) -> Option<T> {
    json.as_u64().and_then(|v| T::try_from(v).ok())
}

fn signed<T: TryFrom<i64>>(json: &Json) -> Option<T> {
    json.as_i64().and_then(|v| T::try_from(v).ok())
}

fn describe(json: &Json) -> String {
    match json {
        Json::Null => "null".into(),
        Json::Bool(_) => "a boolean".into(),
        Json::Number(n) => format!("number {n}"),
        Json::String(_) => "a string".into(),
        Json::Array(items) => format!("an array of {}", items.len()),
        Json::Object(_) => "an object".into(),
    }
}

/// Render a decoded value as JSON.
pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::U8(v) => Json::from(*v),
        Value::U16(v) => Json::from(*v),
        Value::U32(v) => Json::from(*v),
        Value::U64(v) => Json::from(*v),
        Value::I8(v) => Json::from(*v),
        Value::I16(v) => Json::from(*v),
        Value::I32(v) => Json::from(*v),
        Value::I64(v) => Json::from(*v),
        Value::Bool(v) => Json::from(*v),
        Value::Bytes(v) => Json::from(hex::encode(v)),
        Value::Str(v) => Json::from(v.as_str()),
        Value::Seq(items) | Value::Tuple(items) => {
            Json::Array(items.iter().map(value_to_json).collect())
        }
    }
}
