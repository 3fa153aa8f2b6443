// shared id types
use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the field that carries a record's identifier.
pub const ID_FIELD: &str = "id";

/// Identifier of a record inside its collection.
///
/// Integers and strings are both accepted and share one key space: a string holding the
/// decimal form of an integer is that integer, so `"1"` and `1` are the same id while
/// `"01"` stays text. `1.0` reads as `1`. Integers past `i64::MAX` are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl RecordId {
    //integral floats count as integers; other floats, bools, null and compound values are not ids
    pub fn from_value(value: &Value) -> Option<RecordId> {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return Some(RecordId::Int(i));
                }
                if let Some(u) = n.as_u64() {
                    return Some(RecordId::Text(u.to_string()));
                }
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                    .map(|f| RecordId::Int(f as i64))
            }
            Value::String(s) => Some(RecordId::text(s.clone())),
            _ => None,
        }
    }

    /// Canonical id for a string: the integer it spells, or the text itself.
    pub fn text(s: String) -> RecordId {
        match s.parse::<i64>() {
            Ok(i) if i.to_string() == s => RecordId::Int(i),
            _ => RecordId::Text(s),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            RecordId::Int(i) => Value::from(*i),
            RecordId::Text(s) => Value::from(s.as_str()),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(i) => write!(f, "{}", i),
            RecordId::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Int(id)
    }
}

impl From<i32> for RecordId {
    fn from(id: i32) -> Self {
        RecordId::Int(id.into())
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId::text(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        RecordId::text(id)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        RecordId::from_value(&value)
            .ok_or_else(|| de::Error::custom(format!("not a record id: {}", value)))
    }
}

impl From<RecordId> for Value {
    fn from(id: RecordId) -> Self {
        id.to_value()
    }
}
