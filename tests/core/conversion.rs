//! Converter edge cases through the public API.

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::common::*;
use jqbridge::{to_value_with_depth, ConversionError, Kind};

#[test]
fn sample_mapping_round_trips() {
    let map = sample_mapping();
    let value = to_value(&map).unwrap();
    assert_eq!(value.kind(), Kind::Object);
    let back: BTreeMap<String, Native> = from_value(&value).unwrap();
    assert_eq!(back, map);
}

#[test]
fn hash_map_converts_with_sorted_dump() {
    let mut map = HashMap::new();
    map.insert("b", 2);
    map.insert("a", 1);
    assert_eq!(to_value(&map).unwrap().dump(), r#"{"a":1,"b":2}"#);
}

#[test]
fn non_string_keys_fail() {
    let map = BTreeMap::from([(true, 1)]);
    assert!(matches!(
        to_value(&map),
        Err(ConversionError::NonStringKey { .. })
    ));
}

#[test]
fn indirection_is_transparent() {
    let boxed: Box<Option<Rc<Vec<i32>>>> = Box::new(Some(Rc::new(vec![1, 2])));
    assert_eq!(to_value(&boxed).unwrap().dump(), "[1,2]");

    let none: Box<Option<Rc<Vec<i32>>>> = Box::new(None);
    assert_eq!(to_value(&none).unwrap(), Value::Null);
}

#[test]
fn depth_limit_reports_too_deep() {
    let nested = vec![vec![vec![0u8]]];
    assert!(to_value_with_depth(&nested, 3).is_ok());
    assert_eq!(
        to_value_with_depth(&nested, 2).unwrap_err(),
        ConversionError::TooDeep { max: 2 }
    );
}

#[test]
fn invalid_value_is_conversion_error() {
    let value = Value::parse("{oops");
    match value.to_native().unwrap_err() {
        ConversionError::Invalid { message } => {
            assert!(message.unwrap().contains("while parsing"));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn u64_beyond_i64_becomes_float() {
    let value = to_value(&u64::MAX).unwrap();
    assert_eq!(value.to_native().unwrap(), Native::Float(u64::MAX as f64));
}
