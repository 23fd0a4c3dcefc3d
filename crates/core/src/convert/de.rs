//! Value → native: a `serde::Deserializer` reading a borrowed [`Value`].
//!
//! Integral numbers are offered to the visitor as `i64`, everything else as
//! `f64`, so integer targets accept `1.0` and reject `1.5`. `Invalid` values
//! are an error carrying the diagnostic.

use serde::de::value::{BorrowedStrDeserializer, MapDeserializer, SeqDeserializer};
use serde::de::{
    DeserializeSeed, Deserializer, EnumAccess, IntoDeserializer, Unexpected, VariantAccess,
    Visitor,
};
use serde::forward_to_deserialize_any;

use crate::error::{ConversionError, Result};
use crate::value::Value;

impl<'de> IntoDeserializer<'de, ConversionError> for &'de Value {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

impl<'de> Deserializer<'de> for &'de Value {
    type Error = ConversionError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => visitor.visit_i64(i),
                None => visitor.visit_f64(n.as_f64()),
            },
            Value::String(s) => visitor.visit_borrowed_str(s),
            Value::Array(items) => {
                let mut seq = SeqDeserializer::<_, ConversionError>::new(items.iter());
                let out = visitor.visit_seq(&mut seq)?;
                seq.end()?;
                Ok(out)
            }
            Value::Object(map) => {
                let entries = map.iter().map(|(k, v)| (&**k, v));
                let mut access = MapDeserializer::<_, ConversionError>::new(entries);
                let out = visitor.visit_map(&mut access)?;
                access.end()?;
                Ok(out)
            }
            Value::Invalid(msg) => Err(ConversionError::invalid(msg.as_deref())),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self {
            Value::Null => visitor.visit_none(),
            Value::Invalid(msg) => Err(ConversionError::invalid(msg.as_deref())),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        match self {
            Value::String(variant) => visitor.visit_enum(VariantRef {
                variant,
                payload: None,
            }),
            Value::Object(map) if map.len() == 1 => {
                let (variant, payload) = map
                    .iter()
                    .next()
                    .ok_or_else(|| ConversionError::Custom("empty enum object".to_string()))?;
                visitor.visit_enum(VariantRef {
                    variant,
                    payload: Some(payload),
                })
            }
            Value::Invalid(msg) => Err(ConversionError::invalid(msg.as_deref())),
            other => Err(ConversionError::WrongKind {
                expected: "string or single-key object".to_string(),
                actual: other.kind(),
            }),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }
}

/// Externally tagged enum: `"Variant"` or `{"Variant": payload}`.
struct VariantRef<'de> {
    variant: &'de str,
    payload: Option<&'de Value>,
}

impl<'de> EnumAccess<'de> for VariantRef<'de> {
    type Error = ConversionError;
    type Variant = Self;

    fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self)> {
        let tag = BorrowedStrDeserializer::<ConversionError>::new(self.variant);
        let name = seed.deserialize(tag)?;
        Ok((name, self))
    }
}

impl<'de> VariantAccess<'de> for VariantRef<'de> {
    type Error = ConversionError;

    fn unit_variant(self) -> Result<()> {
        match self.payload {
            None | Some(Value::Null) => Ok(()),
            Some(other) => Err(serde::de::Error::invalid_type(
                Unexpected::Other(other.kind().name()),
                &"unit variant",
            )),
        }
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value> {
        match self.payload {
            Some(payload) => seed.deserialize(payload),
            None => Err(serde::de::Error::invalid_type(
                Unexpected::UnitVariant,
                &"newtype variant",
            )),
        }
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        match self.payload {
            Some(payload @ Value::Array(_)) => payload.deserialize_any(visitor),
            _ => Err(serde::de::Error::invalid_type(
                Unexpected::UnitVariant,
                &"tuple variant",
            )),
        }
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        match self.payload {
            Some(payload @ Value::Object(_)) => payload.deserialize_any(visitor),
            _ => Err(serde::de::Error::invalid_type(
                Unexpected::UnitVariant,
                &"struct variant",
            )),
        }
    }
}
