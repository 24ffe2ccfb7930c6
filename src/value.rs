//! Value Model
//!
//! Tagged configuration values and their type discriminator. A node that holds
//! children has kind [`ValueKind::List`] and no value; every other kind carries
//! exactly one owned [`Value`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type discriminator for configuration nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    List,
    Boolean,
    Integer,
    Unsigned,
    String,
    Data,
}

impl ValueKind {
    /// Whether this kind carries a scalar payload
    pub fn is_scalar(self) -> bool {
        !matches!(self, ValueKind::List)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::List => "list",
            ValueKind::Boolean => "boolean",
            ValueKind::Integer => "integer",
            ValueKind::Unsigned => "unsigned",
            ValueKind::String => "string",
            ValueKind::Data => "data",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scalar configuration value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Unsigned(u64),
    String(String),
    Data(Vec<u8>),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Integer(_) => ValueKind::Integer,
            Value::Unsigned(_) => ValueKind::Unsigned,
            Value::String(_) => ValueKind::String,
            Value::Data(_) => ValueKind::Data,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Unsigned(u) => write!(f, "{}", u),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Data(d) => write!(f, "<{}>", hex::encode(d)),
        }
    }
}

/// Rust types that map onto exactly one scalar [`ValueKind`]
///
/// Drives the generic typed accessors (`Store::get`, `Store::set`, `Store::get_or`).
pub trait ScalarValue: Sized {
    const KIND: ValueKind;

    fn into_value(self) -> Value;

    /// Extract the payload when the value has this type's kind
    fn from_value(value: Value) -> Option<Self>;
}

impl ScalarValue for bool {
    const KIND: ValueKind = ValueKind::Boolean;

    fn into_value(self) -> Value {
        Value::Boolean(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Boolean(b) => Some(b),
            _ => None,
        }
    }
}

impl ScalarValue for i64 {
    const KIND: ValueKind = ValueKind::Integer;

    fn into_value(self) -> Value {
        Value::Integer(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Integer(i) => Some(i),
            _ => None,
        }
    }
}

impl ScalarValue for u64 {
    const KIND: ValueKind = ValueKind::Unsigned;

    fn into_value(self) -> Value {
        Value::Unsigned(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Unsigned(u) => Some(u),
            _ => None,
        }
    }
}

impl ScalarValue for String {
    const KIND: ValueKind = ValueKind::String;

    fn into_value(self) -> Value {
        Value::String(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl ScalarValue for Vec<u8> {
    const KIND: ValueKind = ValueKind::Data;

    fn into_value(self) -> Value {
        Value::Data(self)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Data(d) => Some(d),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::Unsigned(u)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(d: Vec<u8>) -> Self {
        Value::Data(d)
    }
}

impl From<&[u8]> for Value {
    fn from(d: &[u8]) -> Self {
        Value::Data(d.to_vec())
    }
}
