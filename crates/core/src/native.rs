//! Host-side dynamic value.
//!
//! [`Native`] is what callers get back when they read a query result without
//! naming a target type. It follows the inverse conversion table:
//!
//! | Value kind | Native |
//! |------------|--------|
//! | `Invalid` | error carrying the diagnostic |
//! | `Null` | `Native::Null` |
//! | `Bool` | `Native::Bool` |
//! | `Number`, integral and in `i64` range | `Native::Int` |
//! | `Number`, otherwise | `Native::Float` |
//! | `String` | `Native::String` |
//! | `Array` | `Native::Array`, order preserved |
//! | `Object` | `Native::Object`, every key preserved |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ConversionError, Result};
use crate::value::Value;

/// Dynamically typed native value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Native {
    /// Absent value
    Null,
    /// Boolean
    Bool(bool),
    /// Integral number
    Int(i64),
    /// Non-integral number
    Float(f64),
    /// Text
    String(String),
    /// Ordered sequence
    Array(Vec<Native>),
    /// String-keyed mapping
    Object(BTreeMap<String, Native>),
}

impl Native {
    /// Get as i64 if this is an Int
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Native::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64 if this is a Float
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Native::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as &str if this is a String
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Native::String(s) => Some(s),
            _ => None,
        }
    }

    /// Check if this is Null
    pub fn is_null(&self) -> bool {
        matches!(self, Native::Null)
    }
}

impl Value {
    /// Convert to the host's dynamic representation.
    ///
    /// Reads through the value without creating or releasing handles.
    pub fn to_native(&self) -> Result<Native> {
        match self {
            Value::Invalid(msg) => Err(ConversionError::invalid(msg.as_deref())),
            Value::Null => Ok(Native::Null),
            Value::Bool(b) => Ok(Native::Bool(*b)),
            Value::Number(n) => Ok(match n.as_i64() {
                Some(i) => Native::Int(i),
                None => Native::Float(n.as_f64()),
            }),
            Value::String(s) => Ok(Native::String(s.to_string())),
            Value::Array(items) => items
                .iter()
                .map(Value::to_native)
                .collect::<Result<Vec<_>>>()
                .map(Native::Array),
            Value::Object(map) => map
                .iter()
                .map(|(k, v)| v.to_native().map(|n| (k.to_string(), n)))
                .collect::<Result<BTreeMap<_, _>>>()
                .map(Native::Object),
        }
    }
}

impl From<&Native> for Value {
    fn from(native: &Native) -> Self {
        match native {
            Native::Null => Value::Null,
            Native::Bool(b) => Value::Bool(*b),
            Native::Int(i) => Value::int(*i),
            Native::Float(f) => Value::float(*f),
            Native::String(s) => Value::string(s),
            Native::Array(items) => items.iter().map(Value::from).collect(),
            Native::Object(map) => {
                let mut obj = Value::object();
                for (k, v) in map {
                    obj.object_insert(k, Value::from(v));
                }
                obj
            }
        }
    }
}

impl From<Native> for Value {
    fn from(native: Native) -> Self {
        Value::from(&native)
    }
}

// ============================================================================
// From implementations for ergonomic construction
// ============================================================================

impl From<bool> for Native {
    fn from(b: bool) -> Self {
        Native::Bool(b)
    }
}

impl From<i64> for Native {
    fn from(i: i64) -> Self {
        Native::Int(i)
    }
}

impl From<i32> for Native {
    fn from(i: i32) -> Self {
        Native::Int(i as i64)
    }
}

impl From<f64> for Native {
    fn from(f: f64) -> Self {
        Native::Float(f)
    }
}

impl From<&str> for Native {
    fn from(s: &str) -> Self {
        Native::String(s.to_string())
    }
}

impl From<String> for Native {
    fn from(s: String) -> Self {
        Native::String(s)
    }
}

impl From<Vec<Native>> for Native {
    fn from(items: Vec<Native>) -> Self {
        Native::Array(items)
    }
}

impl From<BTreeMap<String, Native>> for Native {
    fn from(map: BTreeMap<String, Native>) -> Self {
        Native::Object(map)
    }
}

impl<T: Into<Native>> From<Option<T>> for Native {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Native::Null,
        }
    }
}
