//! Textual JSON form of [`Value`].
//!
//! This module provides:
//! - `Value::parse`: text → Value, never panicking; failures become `Invalid`
//! - `Value::dump`: Value → canonical compact text, read-only over the value
//! - `Serialize`/`Deserialize` for `Value`, so Values embed in any serde format
//!
//! # Canonical Form
//!
//! | Input | Dumped as |
//! |-------|-----------|
//! | `1.0` | `1` |
//! | `-0.0` | `-0.0` (sign kept; still integral, so it reads back as `0`) |
//! | NaN | `null` |
//! | ±Infinity | `±1.7976931348623157e308` |
//! | object | keys in sorted order |
//! | `Invalid` (anywhere) | `<invalid>` |
//!
//! # Nesting Limit
//!
//! Parsing rejects documents nested deeper than [`MAX_NESTING_DEPTH`] levels.

use std::fmt;
use std::rc::Rc;

use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{self, SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::number::Number;
use crate::value::{Map, Value};

/// Maximum nesting depth of arrays and objects (100 levels)
///
/// Bounds recursion in parsing and native conversion.
pub const MAX_NESTING_DEPTH: usize = 100;

/// Text produced when dumping a value that contains `Invalid`.
pub const INVALID_TEXT: &str = "<invalid>";

impl Value {
    /// Parse a single JSON document.
    ///
    /// Malformed input, trailing content, and documents nested deeper than
    /// [`MAX_NESTING_DEPTH`] produce `Invalid` carrying the parser diagnostic.
    /// Nothing is shared until parsing succeeds.
    pub fn parse(text: &str) -> Value {
        Value::parse_with_depth(text, MAX_NESTING_DEPTH)
    }

    /// Parse with an explicit nesting limit.
    pub fn parse_with_depth(text: &str, max_depth: usize) -> Value {
        let mut de = serde_json::Deserializer::from_str(text);
        let parsed = DepthSeed::new(max_depth)
            .deserialize(&mut de)
            .and_then(|v| de.end().map(|_| v));
        match parsed {
            Ok(v) => v,
            Err(e) => {
                trace!(error = %e, "JSON parse failed");
                Value::invalid_with_msg(format!("{} (while parsing '{}')", e, abbreviate(text)))
            }
        }
    }

    /// Dump as compact canonical JSON.
    ///
    /// Borrows the value: no handle is created or released, so repeated
    /// calls give identical output and leave reference counts untouched.
    pub fn dump(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| INVALID_TEXT.to_string())
    }

    /// Dump as indented JSON.
    pub fn dump_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| INVALID_TEXT.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dump())
    }
}

fn abbreviate(text: &str) -> String {
    const LIMIT: usize = 40;
    match text.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

// =============================================================================
// Serialize
// =============================================================================

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_negative_zero() {
            return serializer.serialize_f64(-0.0);
        }
        if let Some(i) = self.as_i64() {
            return serializer.serialize_i64(i);
        }
        let f = self.as_f64();
        if f.is_nan() {
            serializer.serialize_unit()
        } else if f.is_infinite() {
            serializer.serialize_f64(if f > 0.0 { f64::MAX } else { f64::MIN })
        } else {
            serializer.serialize_f64(f)
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.iter() {
                    out.serialize_entry(&**k, v)?;
                }
                out.end()
            }
            Value::Invalid(msg) => Err(ser::Error::custom(match msg {
                Some(m) => format!("cannot serialize invalid value: {}", m),
                None => "cannot serialize invalid value".to_string(),
            })),
        }
    }
}

// =============================================================================
// Deserialize
// =============================================================================

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        DepthSeed::new(MAX_NESTING_DEPTH).deserialize(deserializer)
    }
}

/// Deserialization seed tracking how many more container levels are allowed.
#[derive(Clone, Copy)]
struct DepthSeed {
    remaining: usize,
}

impl DepthSeed {
    fn new(max_depth: usize) -> Self {
        DepthSeed {
            remaining: max_depth,
        }
    }

    fn descend<E: de::Error>(self) -> Result<DepthSeed, E> {
        match self.remaining.checked_sub(1) {
            Some(remaining) => Ok(DepthSeed { remaining }),
            None => Err(E::custom("exceeds maximum nesting depth")),
        }
    }
}

impl<'de> DeserializeSeed<'de> for DepthSeed {
    type Value = Value;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for DepthSeed {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E>(self, b: bool) -> Result<Value, E> {
        Ok(Value::Bool(b))
    }

    fn visit_i64<E>(self, i: i64) -> Result<Value, E> {
        Ok(Value::int(i))
    }

    fn visit_u64<E>(self, u: u64) -> Result<Value, E> {
        Ok(Value::Number(Number::from_u64(u)))
    }

    fn visit_f64<E>(self, f: f64) -> Result<Value, E> {
        Ok(Value::float(f))
    }

    fn visit_str<E>(self, s: &str) -> Result<Value, E> {
        Ok(Value::string(s))
    }

    fn visit_string<E>(self, s: String) -> Result<Value, E> {
        Ok(Value::from(s))
    }

    fn visit_unit<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        self.deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let child = self.descend()?;
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element_seed(child)? {
            items.push(item);
        }
        Ok(Value::from(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        let child = self.descend()?;
        let mut map = Map::new();
        // Duplicate keys: last write wins
        while let Some(key) = access.next_key::<String>()? {
            let value = access.next_value_seed(child)?;
            map.insert(Rc::from(key), value);
        }
        Ok(Value::from(map))
    }
}
