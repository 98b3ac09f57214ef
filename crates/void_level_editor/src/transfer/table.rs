//! Accessors for raw keyed records.
//!
//! Raw records come from asset tables (Lua tables on the host side), so
//! numbers may arrive as floats where integers are meant, vectors as
//! `{x, y, z}` tables and lists as index-keyed tables.

use glam::Vec3;
use serde_json::{Map, Value};
use void_core::Guid;

use super::{TransferDataError, TransferResult};

pub(crate) type Table = Map<String, Value>;

fn invalid(key: &str, expected: &'static str) -> TransferDataError {
    TransferDataError::InvalidField {
        key: key.to_string(),
        expected,
    }
}

pub(crate) fn as_table<'a>(value: &'a Value, key: &str) -> TransferResult<&'a Table> {
    value
        .as_object()
        .ok_or_else(|| TransferDataError::NotATable(key.to_string()))
}

/// Present and non-null.
pub(crate) fn field<'a>(table: &'a Table, key: &str) -> Option<&'a Value> {
    table.get(key).filter(|v| !v.is_null())
}

pub(crate) fn f32(value: &Value, key: &str) -> TransferResult<f32> {
    value
        .as_f64()
        .map(|v| v as f32)
        .ok_or_else(|| invalid(key, "a number"))
}

pub(crate) fn u32(value: &Value, key: &str) -> TransferResult<u32> {
    let n = value.as_f64().ok_or_else(|| invalid(key, "an unsigned integer"))?;
    if n < 0.0 || n.fract() != 0.0 || n > u32::MAX as f64 {
        return Err(invalid(key, "an unsigned integer"));
    }
    Ok(n as u32)
}

pub(crate) fn i64(value: &Value, key: &str) -> TransferResult<i64> {
    match value.as_i64() {
        Some(n) => Ok(n),
        None => match value.as_f64() {
            Some(n) if n.fract() == 0.0 => Ok(n as i64),
            _ => Err(invalid(key, "an integer")),
        },
    }
}

pub(crate) fn boolean(value: &Value, key: &str) -> TransferResult<bool> {
    value.as_bool().ok_or_else(|| invalid(key, "a boolean"))
}

pub(crate) fn string(value: &Value, key: &str) -> TransferResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(key, "a string"))
}

pub(crate) fn guid(value: &Value, key: &str) -> TransferResult<Guid> {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    Guid::parse(&text).map_err(|source| TransferDataError::InvalidGuid {
        key: key.to_string(),
        source,
    })
}

pub(crate) fn optional_guid(table: &Table, key: &str) -> TransferResult<Option<Guid>> {
    field(table, key).map(|v| guid(v, key)).transpose()
}

pub(crate) fn optional_string(table: &Table, key: &str) -> TransferResult<Option<String>> {
    field(table, key).map(|v| string(v, key)).transpose()
}

/// `{x, y, z}` or `[x, y, z]`.
pub(crate) fn vec3(value: &Value, key: &str) -> TransferResult<Vec3> {
    match value {
        Value::Object(t) => {
            let axis = |name: &str| {
                field(t, name)
                    .ok_or_else(|| invalid(key, "a vector with x, y and z"))
                    .and_then(|v| f32(v, key))
            };
            Ok(Vec3::new(axis("x")?, axis("y")?, axis("z")?))
        }
        Value::Array(items) if items.len() == 3 => Ok(Vec3::new(
            f32(&items[0], key)?,
            f32(&items[1], key)?,
            f32(&items[2], key)?,
        )),
        _ => Err(invalid(key, "a vector with x, y and z")),
    }
}

pub(crate) fn vec3_to_value(v: Vec3) -> Value {
    let mut out = Map::new();
    out.insert("x".into(), Value::from(v.x));
    out.insert("y".into(), Value::from(v.y));
    out.insert("z".into(), Value::from(v.z));
    Value::Object(out)
}

/// Elements of an array, or of an index-keyed table in index order.
pub(crate) fn list<'a>(value: &'a Value, key: &str) -> TransferResult<Vec<&'a Value>> {
    match value {
        Value::Array(items) => Ok(items.iter().collect()),
        Value::Object(t) => {
            let mut indexed = Vec::with_capacity(t.len());
            for (index, item) in t {
                let index: u64 = index
                    .parse()
                    .map_err(|_| invalid(key, "a list or an index-keyed table"))?;
                indexed.push((index, item));
            }
            indexed.sort_by_key(|(index, _)| *index);
            Ok(indexed.into_iter().map(|(_, item)| item).collect())
        }
        _ => Err(invalid(key, "a list or an index-keyed table")),
    }
}
