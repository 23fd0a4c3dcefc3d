//! Value types for jqbridge
//!
//! This module defines:
//! - Value: the tagged JSON-family value exchanged with the query engine
//! - Kind: the discriminant of a Value, named the way jq names it
//! - StorageProbe: a weak observer of a Value's shared storage
//!
//! ## Ownership Model
//!
//! Strings, arrays and objects live behind `Rc`, so handing a Value to the
//! engine or keeping it as "last produced output" never deep-copies it.
//!
//! | jq primitive | Rust rendition |
//! |--------------|----------------|
//! | `jv_copy`    | `Value::clone` (one more strong reference) |
//! | `jv_free`    | `drop(value)` (one fewer strong reference) |
//! | refcount     | [`Value::ref_count`] |
//!
//! Because releasing a handle consumes it, releasing twice or reading after
//! release does not compile.
//!
//! ### Mutation
//!
//! Builders (`array_push`, `object_insert`, ...) go through `Rc::make_mut`:
//! when the storage is shared, the mutating handle gets its own copy first.
//! Other handles never observe the change.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::number::Number;

/// Object storage: string keys, ordered for deterministic output.
pub type Map = BTreeMap<Rc<str>, Value>;

/// JSON-family value exchanged with the query engine.
///
/// `Invalid` is jq's error sentinel: it is what a failed parse returns and
/// what the engine yields at the end of a stream (`None`) or on an
/// evaluation error (`Some(message)`).
#[derive(Clone)]
pub enum Value {
    /// JSON null
    Null,
    /// JSON boolean
    Bool(bool),
    /// JSON number (exact integer or double)
    Number(Number),
    /// UTF-8 string
    String(Rc<str>),
    /// Ordered sequence of values
    Array(Rc<Vec<Value>>),
    /// String-keyed mapping
    Object(Rc<Map>),
    /// Error sentinel with optional diagnostic
    Invalid(Option<Rc<str>>),
}

/// Discriminant of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    /// `Value::Invalid`
    Invalid,
    /// `Value::Null`
    Null,
    /// `Value::Bool`
    Boolean,
    /// `Value::Number`
    Number,
    /// `Value::String`
    String,
    /// `Value::Array`
    Array,
    /// `Value::Object`
    Object,
}

impl Kind {
    /// jq's name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Invalid => "invalid",
            Kind::Null => "null",
            Kind::Boolean => "boolean",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Object => "object",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Create an empty array.
    pub fn array() -> Self {
        Value::Array(Rc::new(Vec::new()))
    }

    /// Create an empty array with room for `capacity` elements.
    pub fn array_with_capacity(capacity: usize) -> Self {
        Value::Array(Rc::new(Vec::with_capacity(capacity)))
    }

    /// Create an empty object.
    pub fn object() -> Self {
        Value::Object(Rc::new(Map::new()))
    }

    /// Create a string value.
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Rc::from(s.as_ref()))
    }

    /// Create an integral number.
    pub fn int(i: i64) -> Self {
        Value::Number(Number::from_i64(i))
    }

    /// Create a floating-point number.
    pub fn float(f: f64) -> Self {
        Value::Number(Number::from_f64(f))
    }

    /// Create an `Invalid` value without a message (jq's end-of-stream).
    pub fn invalid() -> Self {
        Value::Invalid(None)
    }

    /// Create an `Invalid` value carrying a diagnostic.
    pub fn invalid_with_msg(msg: impl AsRef<str>) -> Self {
        Value::Invalid(Some(Rc::from(msg.as_ref())))
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// Get the kind of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Boolean,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
            Value::Invalid(_) => Kind::Invalid,
        }
    }

    /// Everything except `Invalid` is valid.
    pub fn is_valid(&self) -> bool {
        !matches!(self, Value::Invalid(_))
    }

    /// The diagnostic carried by an `Invalid` value, if any.
    pub fn invalid_message(&self) -> Option<&str> {
        match self {
            Value::Invalid(Some(msg)) => Some(msg),
            _ => None,
        }
    }

    /// jq truthiness: only `null` and `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Bool(false))
    }

    /// Get as bool if this is a Bool value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the number if this is a Number value
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as &str if this is a String value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as a slice if this is an Array value
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Get the map if this is an Object value
    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    // ========================================================================
    // Array access
    // ========================================================================

    /// Number of elements, or `None` if this is not an array.
    pub fn array_len(&self) -> Option<usize> {
        self.as_array().map(<[Value]>::len)
    }

    /// Element at `index`, or `None` if out of range or not an array.
    pub fn array_get(&self, index: usize) -> Option<&Value> {
        self.as_array().and_then(|a| a.get(index))
    }

    /// Iterate over array elements. Empty for non-arrays.
    pub fn array_iter(&self) -> std::slice::Iter<'_, Value> {
        self.as_array().unwrap_or(&[]).iter()
    }

    // ========================================================================
    // Object access
    // ========================================================================

    /// Number of entries, or `None` if this is not an object.
    pub fn object_len(&self) -> Option<usize> {
        self.as_object().map(Map::len)
    }

    /// Value stored under `key`.
    pub fn object_get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|o| o.get(key))
    }

    /// Iterate over object keys in order. Empty for non-objects.
    pub fn object_keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.as_object()
            .into_iter()
            .flat_map(|o| o.keys().map(|k| &**k))
    }

    /// Iterate over object entries in key order. Empty for non-objects.
    pub fn object_iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.as_object()
            .into_iter()
            .flat_map(|o| o.iter().map(|(k, v)| (&**k, v)))
    }

    // ========================================================================
    // Builders (copy-on-write)
    // ========================================================================

    /// Append to an array. Returns `false` (and drops `item`) if this is not an array.
    pub fn array_push(&mut self, item: Value) -> bool {
        match self {
            Value::Array(a) => {
                Rc::make_mut(a).push(item);
                true
            }
            _ => false,
        }
    }

    /// Set the element at `index`, padding with `null` like `jv_array_set`.
    pub fn array_set(&mut self, index: usize, item: Value) -> bool {
        match self {
            Value::Array(a) => {
                let items = Rc::make_mut(a);
                if index >= items.len() {
                    items.resize(index + 1, Value::Null);
                }
                items[index] = item;
                true
            }
            _ => false,
        }
    }

    /// Insert into an object; an existing key is overwritten (last write wins).
    pub fn object_insert(&mut self, key: impl AsRef<str>, item: Value) -> bool {
        match self {
            Value::Object(o) => {
                Rc::make_mut(o).insert(Rc::from(key.as_ref()), item);
                true
            }
            _ => false,
        }
    }

    // ========================================================================
    // Reference counting
    // ========================================================================

    /// Number of live handles sharing this value's storage.
    ///
    /// Inline scalars (`null`, booleans, numbers, `Invalid`) have no shared
    /// storage and return `None`.
    pub fn ref_count(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(Rc::strong_count(s)),
            Value::Array(a) => Some(Rc::strong_count(a)),
            Value::Object(o) => Some(Rc::strong_count(o)),
            _ => None,
        }
    }

    /// Weak observer of this value's storage.
    ///
    /// The probe does not keep the storage alive, so its count reaches zero
    /// once the last handle is dropped.
    pub fn downgrade(&self) -> Option<StorageProbe> {
        match self {
            Value::String(s) => Some(StorageProbe::String(Rc::downgrade(s))),
            Value::Array(a) => Some(StorageProbe::Array(Rc::downgrade(a))),
            Value::Object(o) => Some(StorageProbe::Object(Rc::downgrade(o))),
            _ => None,
        }
    }

    /// Whether two handles share the same storage block.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => Rc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Weak reference to the shared storage of a [`Value`].
#[derive(Debug, Clone)]
pub enum StorageProbe {
    /// String storage
    String(Weak<str>),
    /// Array storage
    Array(Weak<Vec<Value>>),
    /// Object storage
    Object(Weak<Map>),
}

impl StorageProbe {
    /// Current number of strong handles; zero once the storage is freed.
    pub fn strong_count(&self) -> usize {
        match self {
            StorageProbe::String(w) => w.strong_count(),
            StorageProbe::Array(w) => w.strong_count(),
            StorageProbe::Object(w) => w.strong_count(),
        }
    }

    /// Whether the storage has been freed.
    pub fn is_freed(&self) -> bool {
        self.strong_count() == 0
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b) || a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b) || a == b,
            (Value::Invalid(a), Value::Invalid(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Number(n) => write!(f, "Number({:?})", n),
            Value::String(s) => write!(f, "String({:?})", s),
            Value::Array(a) => f.debug_list().entries(a.iter()).finish(),
            Value::Object(o) => f.debug_map().entries(o.iter()).finish(),
            Value::Invalid(None) => f.write_str("Invalid"),
            Value::Invalid(Some(msg)) => write!(f, "Invalid({:?})", msg),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

// ============================================================================
// From implementations for ergonomic construction
// ============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(items))
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Object(Rc::new(map))
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::Array(Rc::new(iter.into_iter().collect()))
    }
}
