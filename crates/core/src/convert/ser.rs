//! Native → Value: a `serde::Serializer` producing [`Value`].
//!
//! Each `serialize_*` method is one row of the conversion table. Nothing is
//! coerced silently: map keys that are not strings fail the conversion, and
//! nesting deeper than the configured limit fails instead of recursing
//! without bound.

use std::rc::Rc;

use serde::ser::{
    Impossible, Serialize, SerializeMap, SerializeSeq, SerializeStruct, SerializeStructVariant,
    SerializeTuple, SerializeTupleStruct, SerializeTupleVariant, Serializer,
};
use tracing::warn;

use crate::error::{ConversionError, Result};
use crate::number::Number;
use crate::value::{Map, Value};

/// Serializer that builds a [`Value`] from any `Serialize` type.
#[derive(Debug, Clone, Copy)]
pub struct ValueSerializer {
    remaining: usize,
    max: usize,
}

impl ValueSerializer {
    /// Create a serializer allowing `max_depth` levels of arrays and objects.
    pub fn new(max_depth: usize) -> Self {
        ValueSerializer {
            remaining: max_depth,
            max: max_depth,
        }
    }

    /// Serializer for the children of a container one level down.
    fn nested(self) -> Result<ValueSerializer> {
        match self.remaining.checked_sub(1) {
            Some(remaining) => Ok(ValueSerializer {
                remaining,
                max: self.max,
            }),
            None => Err(ConversionError::TooDeep { max: self.max }),
        }
    }

    fn wide_int(i: i128) -> Value {
        match i64::try_from(i) {
            Ok(i) => Value::int(i),
            Err(_) => match u64::try_from(i) {
                Ok(u) => Value::Number(Number::from_u64(u)),
                Err(_) => {
                    warn!(value = %i, "128-bit integer narrowed to f64");
                    Value::float(i as f64)
                }
            },
        }
    }
}

impl Serializer for ValueSerializer {
    type Ok = Value;
    type Error = ConversionError;

    type SerializeSeq = SerializeArray;
    type SerializeTuple = SerializeArray;
    type SerializeTupleStruct = SerializeArray;
    type SerializeTupleVariant = SerializeArrayVariant;
    type SerializeMap = SerializeObject;
    type SerializeStruct = SerializeObject;
    type SerializeStructVariant = SerializeObjectVariant;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::int(v as i64))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::int(v as i64))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::int(v as i64))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::int(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value> {
        Ok(Self::wide_int(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::int(v as i64))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::int(v as i64))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::int(v as i64))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::Number(Number::from_u64(v)))
    }

    fn serialize_u128(self, v: u128) -> Result<Value> {
        match u64::try_from(v) {
            Ok(u) => Ok(Value::Number(Number::from_u64(u))),
            Err(_) => {
                warn!(value = %v, "128-bit integer narrowed to f64");
                Ok(Value::float(v as f64))
            }
        }
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::float(v as f64))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::float(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        let mut buf = [0u8; 4];
        Ok(Value::string(v.encode_utf8(&mut buf)))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::string(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        self.nested()?;
        Ok(v.iter().map(|b| Value::int(*b as i64)).collect())
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Value> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::string(variant))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value> {
        let payload = value.serialize(self.nested()?)?;
        let mut obj = Value::object();
        obj.object_insert(variant, payload);
        Ok(obj)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeArray> {
        Ok(SerializeArray {
            items: Vec::with_capacity(len.unwrap_or(0)),
            child: self.nested()?,
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeArray> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeArray> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeArrayVariant> {
        // The wrapping object is one level, the payload array another
        let child = self.nested()?.nested()?;
        Ok(SerializeArrayVariant {
            variant,
            items: Vec::with_capacity(len),
            child,
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeObject> {
        Ok(SerializeObject {
            map: Map::new(),
            pending_key: None,
            child: self.nested()?,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<SerializeObject> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeObjectVariant> {
        let child = self.nested()?.nested()?;
        Ok(SerializeObjectVariant {
            variant,
            map: Map::new(),
            child,
        })
    }
}

// =============================================================================
// Compound builders
// =============================================================================

/// Builds an `Array` from a sequence, tuple, or tuple struct.
pub struct SerializeArray {
    items: Vec<Value>,
    child: ValueSerializer,
}

impl SerializeSeq for SerializeArray {
    type Ok = Value;
    type Error = ConversionError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.items.push(value.serialize(self.child)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::from(self.items))
    }
}

impl SerializeTuple for SerializeArray {
    type Ok = Value;
    type Error = ConversionError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        SerializeSeq::end(self)
    }
}

impl SerializeTupleStruct for SerializeArray {
    type Ok = Value;
    type Error = ConversionError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        SerializeSeq::end(self)
    }
}

/// Builds `{"Variant": [...]}` for tuple variants.
pub struct SerializeArrayVariant {
    variant: &'static str,
    items: Vec<Value>,
    child: ValueSerializer,
}

impl SerializeTupleVariant for SerializeArrayVariant {
    type Ok = Value;
    type Error = ConversionError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.items.push(value.serialize(self.child)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        let mut obj = Value::object();
        obj.object_insert(self.variant, Value::from(self.items));
        Ok(obj)
    }
}

/// Builds an `Object` from a map or struct.
pub struct SerializeObject {
    map: Map,
    pending_key: Option<Rc<str>>,
    child: ValueSerializer,
}

impl SerializeMap for SerializeObject {
    type Ok = Value;
    type Error = ConversionError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<()> {
        self.pending_key = Some(key.serialize(KeySerializer)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        let key = self.pending_key.take().ok_or_else(|| {
            ConversionError::Custom("map value serialized before its key".to_string())
        })?;
        let value = value.serialize(self.child)?;
        // Last write wins
        self.map.insert(key, value);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::from(self.map))
    }
}

impl SerializeStruct for SerializeObject {
    type Ok = Value;
    type Error = ConversionError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        let value = value.serialize(self.child)?;
        self.map.insert(Rc::from(key), value);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::from(self.map))
    }
}

/// Builds `{"Variant": {...}}` for struct variants.
pub struct SerializeObjectVariant {
    variant: &'static str,
    map: Map,
    child: ValueSerializer,
}

impl SerializeStructVariant for SerializeObjectVariant {
    type Ok = Value;
    type Error = ConversionError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        let value = value.serialize(self.child)?;
        self.map.insert(Rc::from(key), value);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        let mut obj = Value::object();
        obj.object_insert(self.variant, Value::from(self.map));
        Ok(obj)
    }
}

// =============================================================================
// Map keys
// =============================================================================

/// Accepts only string-like keys; everything else is a `NonStringKey` error.
struct KeySerializer;

fn non_string_key(kind: &str) -> ConversionError {
    ConversionError::NonStringKey {
        kind: kind.to_string(),
    }
}

impl Serializer for KeySerializer {
    type Ok = Rc<str>;
    type Error = ConversionError;

    type SerializeSeq = Impossible<Rc<str>, ConversionError>;
    type SerializeTuple = Impossible<Rc<str>, ConversionError>;
    type SerializeTupleStruct = Impossible<Rc<str>, ConversionError>;
    type SerializeTupleVariant = Impossible<Rc<str>, ConversionError>;
    type SerializeMap = Impossible<Rc<str>, ConversionError>;
    type SerializeStruct = Impossible<Rc<str>, ConversionError>;
    type SerializeStructVariant = Impossible<Rc<str>, ConversionError>;

    fn serialize_str(self, v: &str) -> Result<Rc<str>> {
        Ok(Rc::from(v))
    }

    fn serialize_char(self, v: char) -> Result<Rc<str>> {
        let mut buf = [0u8; 4];
        Ok(Rc::from(&*v.encode_utf8(&mut buf)))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Rc<str>> {
        value.serialize(self)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Rc<str>> {
        Ok(Rc::from(variant))
    }

    fn serialize_bool(self, _v: bool) -> Result<Rc<str>> {
        Err(non_string_key("bool"))
    }

    fn serialize_i8(self, _v: i8) -> Result<Rc<str>> {
        Err(non_string_key("i8"))
    }

    fn serialize_i16(self, _v: i16) -> Result<Rc<str>> {
        Err(non_string_key("i16"))
    }

    fn serialize_i32(self, _v: i32) -> Result<Rc<str>> {
        Err(non_string_key("i32"))
    }

    fn serialize_i64(self, _v: i64) -> Result<Rc<str>> {
        Err(non_string_key("i64"))
    }

    fn serialize_u8(self, _v: u8) -> Result<Rc<str>> {
        Err(non_string_key("u8"))
    }

    fn serialize_u16(self, _v: u16) -> Result<Rc<str>> {
        Err(non_string_key("u16"))
    }

    fn serialize_u32(self, _v: u32) -> Result<Rc<str>> {
        Err(non_string_key("u32"))
    }

    fn serialize_u64(self, _v: u64) -> Result<Rc<str>> {
        Err(non_string_key("u64"))
    }

    fn serialize_f32(self, _v: f32) -> Result<Rc<str>> {
        Err(non_string_key("f32"))
    }

    fn serialize_f64(self, _v: f64) -> Result<Rc<str>> {
        Err(non_string_key("f64"))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Rc<str>> {
        Err(non_string_key("bytes"))
    }

    fn serialize_none(self) -> Result<Rc<str>> {
        Err(non_string_key("none"))
    }

    fn serialize_some<T: ?Sized + Serialize>(self, _value: &T) -> Result<Rc<str>> {
        Err(non_string_key("option"))
    }

    fn serialize_unit(self) -> Result<Rc<str>> {
        Err(non_string_key("unit"))
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Rc<str>> {
        Err(non_string_key(name))
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Rc<str>> {
        Err(non_string_key(name))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(non_string_key("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(non_string_key("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(non_string_key(name))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(non_string_key(name))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(non_string_key("map"))
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(non_string_key(name))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(non_string_key(name))
    }
}
