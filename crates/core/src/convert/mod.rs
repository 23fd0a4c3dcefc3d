//! Dynamic conversion between native Rust values and [`Value`].
//!
//! The serde data model is the closed set of runtime shapes a native value
//! can take, so both directions are serde adapters:
//!
//! | native shape | Value |
//! |--------------|-------|
//! | `None`, `()`, unit struct | `Null` |
//! | `bool` | `Bool` |
//! | any integer width | `Number`, integral |
//! | `f32`, `f64` | `Number` |
//! | `char`, `str`, `String` | `String` |
//! | slices, arrays, `Vec`, tuples, tuple structs, bytes | `Array`, order preserved |
//! | maps, structs | `Object` (keys must be strings) |
//! | `&T`, `Box<T>`, `Rc<T>`, `Arc<T>`, `Some(T)` | converted through the indirection |
//! | enum variants | `"Variant"` or `{"Variant": payload}` |
//!
//! Shapes with no mapping are compile errors (the type must implement
//! `Serialize`) or, for map keys, a [`ConversionError::NonStringKey`].
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use jqbridge_core::{from_value, to_value};
//!
//! let mut input = BTreeMap::new();
//! input.insert("x", 1);
//! let value = to_value(&input).unwrap();
//! assert_eq!(value.dump(), r#"{"x":1}"#);
//!
//! let back: BTreeMap<String, i32> = from_value(&value).unwrap();
//! assert_eq!(back["x"], 1);
//! ```

mod de;
mod ser;

pub use ser::ValueSerializer;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::json::MAX_NESTING_DEPTH;
use crate::value::Value;

/// Convert any serializable native value into a [`Value`].
///
/// Nesting is limited to [`MAX_NESTING_DEPTH`] levels.
pub fn to_value<T: Serialize + ?Sized>(native: &T) -> Result<Value> {
    to_value_with_depth(native, MAX_NESTING_DEPTH)
}

/// Convert with an explicit nesting limit.
///
/// Exceeding the limit fails with [`ConversionError::TooDeep`](crate::ConversionError::TooDeep),
/// which is also how self-referential `Serialize` impls terminate.
pub fn to_value_with_depth<T: Serialize + ?Sized>(native: &T, max_depth: usize) -> Result<Value> {
    native.serialize(ValueSerializer::new(max_depth))
}

/// Convert a [`Value`] into any deserializable native type.
pub fn from_value<T: DeserializeOwned>(value: &Value) -> Result<T> {
    T::deserialize(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConversionError;
    use crate::native::Native;
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Serializer};
    use std::collections::{BTreeMap, HashMap};
    use std::rc::Rc;
    use std::sync::Arc;

    fn round_trip<T: Serialize + ?Sized>(native: &T) -> Native {
        to_value(native).unwrap().to_native().unwrap()
    }

    // ========================================================================
    // Scalars
    // ========================================================================

    #[test]
    fn test_none_is_null() {
        assert_eq!(round_trip(&None::<i32>), Native::Null);
        assert_eq!(round_trip(&()), Native::Null);
    }

    #[test]
    fn test_bools() {
        assert_eq!(round_trip(&true), Native::Bool(true));
        assert_eq!(round_trip(&false), Native::Bool(false));
    }

    #[test]
    fn test_every_integer_width() {
        assert_eq!(round_trip(&1i8), Native::Int(1));
        assert_eq!(round_trip(&1i16), Native::Int(1));
        assert_eq!(round_trip(&1i32), Native::Int(1));
        assert_eq!(round_trip(&1i64), Native::Int(1));
        assert_eq!(round_trip(&1isize), Native::Int(1));
        assert_eq!(round_trip(&1u8), Native::Int(1));
        assert_eq!(round_trip(&1u16), Native::Int(1));
        assert_eq!(round_trip(&1u32), Native::Int(1));
        assert_eq!(round_trip(&1u64), Native::Int(1));
        assert_eq!(round_trip(&1usize), Native::Int(1));
        assert_eq!(round_trip(&1i128), Native::Int(1));
        assert_eq!(round_trip(&1u128), Native::Int(1));
    }

    #[test]
    fn test_integer_extremes() {
        assert_eq!(round_trip(&i64::MIN), Native::Int(i64::MIN));
        assert_eq!(round_trip(&i64::MAX), Native::Int(i64::MAX));
        assert_eq!(round_trip(&u64::MAX), Native::Float(u64::MAX as f64));
    }

    #[test]
    fn test_floats() {
        assert_eq!(round_trip(&1.1f64), Native::Float(1.1));
        match round_trip(&1.2f32) {
            Native::Float(f) => assert!((f - 1.2).abs() < 0.001),
            other => panic!("Expected Float, got {:?}", other),
        }
    }

    #[test]
    fn test_integral_float_comes_back_as_int() {
        assert_eq!(round_trip(&2.0f64), Native::Int(2));
    }

    #[test]
    fn test_strings_and_chars() {
        assert_eq!(round_trip("foobar"), Native::from("foobar"));
        assert_eq!(round_trip(&String::from("foobar")), Native::from("foobar"));
        assert_eq!(round_trip(&'é'), Native::from("é"));
    }

    // ========================================================================
    // Sequences
    // ========================================================================

    #[test]
    fn test_fixed_and_variable_sequences() {
        let expected = Native::Array(vec![Native::Int(1), Native::Int(2), Native::Int(3)]);
        assert_eq!(round_trip(&[1, 2, 3]), expected);
        assert_eq!(round_trip(&vec![1u8, 2, 3]), expected);
        assert_eq!(round_trip(&[1i64, 2, 3][..]), expected);
    }

    #[test]
    fn test_heterogeneous_tuple() {
        assert_eq!(
            round_trip(&(1, "two", 3.5, None::<bool>)),
            Native::Array(vec![
                Native::Int(1),
                Native::from("two"),
                Native::Float(3.5),
                Native::Null,
            ])
        );
    }

    #[test]
    fn test_nested_sequences_keep_order() {
        let nested = vec![vec![1], vec![2, 3], vec![]];
        assert_eq!(to_value(&nested).unwrap().dump(), "[[1],[2,3],[]]");
    }

    // ========================================================================
    // Mappings
    // ========================================================================

    #[test]
    fn test_string_keyed_map() {
        let mut map = HashMap::new();
        map.insert("x".to_string(), Native::Int(1));
        map.insert("y".to_string(), Native::from("two"));
        let back = round_trip(&map);
        let expected: BTreeMap<String, Native> = map.into_iter().collect();
        assert_eq!(back, Native::Object(expected));
    }

    #[test]
    fn test_non_string_key_fails() {
        let mut map = BTreeMap::new();
        map.insert(1, "one");
        let err = to_value(&map).unwrap_err();
        assert_eq!(
            err,
            ConversionError::NonStringKey {
                kind: "i32".to_string()
            }
        );
    }

    #[test]
    fn test_char_key_is_string() {
        let mut map = BTreeMap::new();
        map.insert('k', 1);
        assert_eq!(to_value(&map).unwrap().dump(), r#"{"k":1}"#);
    }

    #[test]
    fn test_struct_becomes_object() {
        #[derive(Serialize)]
        struct Point {
            x: i32,
            y: i32,
            label: Option<String>,
        }
        let v = to_value(&Point {
            x: 1,
            y: -2,
            label: None,
        })
        .unwrap();
        assert_eq!(v.dump(), r#"{"label":null,"x":1,"y":-2}"#);
    }

    // ========================================================================
    // Indirection
    // ========================================================================

    #[test]
    fn test_references_are_dereferenced() {
        let n = 1;
        assert_eq!(round_trip(&&n), Native::Int(1));
        assert_eq!(round_trip(&Box::new(n)), Native::Int(1));
        assert_eq!(round_trip(&Some(&n)), Native::Int(1));
        assert_eq!(round_trip(&None::<&i32>), Native::Null);
    }

    #[test]
    fn test_shared_pointers_convert_through_deref() {
        let shared: Rc<str> = Rc::from("shared");
        assert_eq!(round_trip(&*shared), Native::from("shared"));
        let arc = Arc::new(vec![1, 2]);
        assert_eq!(
            round_trip(arc.as_slice()),
            Native::Array(vec![Native::Int(1), Native::Int(2)])
        );
    }

    // ========================================================================
    // Enums
    // ========================================================================

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    enum Shape {
        Empty,
        Circle(f64),
        Rect { w: i32, h: i32 },
        Pair(i32, i32),
    }

    #[test]
    fn test_enum_tagging() {
        assert_eq!(to_value(&Shape::Empty).unwrap().dump(), r#""Empty""#);
        assert_eq!(to_value(&Shape::Circle(0.5)).unwrap().dump(), r#"{"Circle":0.5}"#);
        assert_eq!(
            to_value(&Shape::Rect { w: 2, h: 3 }).unwrap().dump(),
            r#"{"Rect":{"h":3,"w":2}}"#
        );
        assert_eq!(to_value(&Shape::Pair(1, 2)).unwrap().dump(), r#"{"Pair":[1,2]}"#);
    }

    #[test]
    fn test_enum_from_value() {
        for shape in [
            Shape::Empty,
            Shape::Circle(0.5),
            Shape::Rect { w: 2, h: 3 },
            Shape::Pair(1, 2),
        ] {
            let value = to_value(&shape).unwrap();
            let back: Shape = from_value(&value).unwrap();
            assert_eq!(back, shape);
        }
    }

    // ========================================================================
    // Depth guard
    // ========================================================================

    /// A Serialize impl that never bottoms out, standing in for a cyclic graph.
    struct Endless;

    impl Serialize for Endless {
        fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
            let mut seq = serializer.serialize_seq(Some(1))?;
            seq.serialize_element(&Endless)?;
            seq.end()
        }
    }

    #[test]
    fn test_endless_structure_fails_instead_of_diverging() {
        let err = to_value(&Endless).unwrap_err();
        assert_eq!(
            err,
            ConversionError::TooDeep {
                max: MAX_NESTING_DEPTH
            }
        );
    }

    #[test]
    fn test_custom_depth_limit() {
        let nested = vec![vec![vec![1]]];
        assert!(to_value_with_depth(&nested, 3).is_ok());
        assert_eq!(
            to_value_with_depth(&nested, 2).unwrap_err(),
            ConversionError::TooDeep { max: 2 }
        );
    }

    // ========================================================================
    // Reference counts of freshly built values
    // ========================================================================

    #[test]
    fn test_intermediates_do_not_leak_references() {
        let value = to_value(&vec![vec![1, 2], vec![3]]).unwrap();
        assert_eq!(value.ref_count(), Some(1));
        for child in value.array_iter() {
            assert_eq!(child.ref_count(), Some(1));
        }
    }

    // ========================================================================
    // from_value
    // ========================================================================

    #[test]
    fn test_from_value_typed() {
        let v = Value::parse(r#"{"x": 1, "y": [1.5, 2]}"#);

        #[derive(Debug, Deserialize, PartialEq)]
        struct Doc {
            x: u8,
            y: Vec<f64>,
        }

        let doc: Doc = from_value(&v).unwrap();
        assert_eq!(
            doc,
            Doc {
                x: 1,
                y: vec![1.5, 2.0]
            }
        );
    }

    #[test]
    fn test_from_value_integer_target_rejects_fraction() {
        let v = Value::float(1.5);
        assert!(from_value::<i64>(&v).is_err());
        assert_eq!(from_value::<i64>(&Value::float(2.0)).unwrap(), 2);
    }

    #[test]
    fn test_from_value_option() {
        assert_eq!(from_value::<Option<i32>>(&Value::Null).unwrap(), None);
        assert_eq!(from_value::<Option<i32>>(&Value::int(4)).unwrap(), Some(4));
    }

    #[test]
    fn test_from_value_invalid_is_error() {
        let err = from_value::<Native>(&Value::invalid_with_msg("bad")).unwrap_err();
        assert!(matches!(err, ConversionError::Invalid { message: Some(ref m) } if m == "bad"));
    }

    #[test]
    fn test_from_value_native_matches_to_native() {
        let v = Value::parse(r#"{"a": [1, 2.5, "s", null, true]}"#);
        assert_eq!(from_value::<Native>(&v).unwrap(), v.to_native().unwrap());
    }

    #[test]
    fn test_value_converts_through_itself() {
        let v = Value::parse(r#"[1, {"k": "v"}]"#);
        assert_eq!(to_value(&v).unwrap(), v);
    }

    #[test]
    fn test_serde_json_value_converts() {
        let json = serde_json::json!({"a": [1, 2], "b": null});
        assert_eq!(to_value(&json).unwrap().dump(), r#"{"a":[1,2],"b":null}"#);
    }
}
