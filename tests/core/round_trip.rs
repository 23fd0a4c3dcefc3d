//! Round-trip properties: native -> Value -> native and text -> Value -> text.

use crate::common::*;
use proptest::prelude::*;

proptest! {
    #[test]
    fn native_survives_value_round_trip(native in arb_native()) {
        let value = to_value(&native).unwrap();
        prop_assert_eq!(value.to_native().unwrap(), native.clone());

        let back: Native = from_value(&value).unwrap();
        prop_assert_eq!(back, native);
    }

    #[test]
    fn dump_is_canonical(value in arb_value()) {
        let text = value.dump();
        let reparsed = Value::parse(&text);
        prop_assert!(reparsed.is_valid(), "dump produced unparseable text: {}", text);
        prop_assert_eq!(&reparsed, &value);
        prop_assert_eq!(reparsed.dump(), text);
    }

    #[test]
    fn pretty_dump_parses_to_same_value(value in arb_value()) {
        prop_assert_eq!(Value::parse(&value.dump_pretty()), value);
    }

    #[test]
    fn integers_keep_exact_width(i in any::<i64>()) {
        let value = to_value(&i).unwrap();
        prop_assert_eq!(value.to_native().unwrap(), Native::Int(i));
        prop_assert_eq!(Value::parse(&value.dump()).to_native().unwrap(), Native::Int(i));
    }

    #[test]
    fn integral_floats_come_back_as_ints(i in -1_000_000i64..1_000_000) {
        let value = to_value(&(i as f64)).unwrap();
        prop_assert_eq!(value.to_native().unwrap(), Native::Int(i));
    }

    #[test]
    fn serde_json_agrees_on_text(native in arb_native()) {
        let ours = to_value(&native).unwrap().dump();
        let theirs: serde_json::Value = serde_json::from_str(&ours).unwrap();
        prop_assert_eq!(Value::parse(&theirs.to_string()), Value::parse(&ours));
    }
}

#[test]
fn whitespace_is_not_preserved() {
    let value = Value::parse("[ 1 ,\n  {\"b\" : 2, \"a\": 1} ]");
    assert_eq!(value.dump(), r#"[1,{"a":1,"b":2}]"#);
}

#[test]
fn duplicate_keys_last_write_wins() {
    let value = Value::parse(r#"{"k": 1, "k": 2}"#);
    assert_eq!(value.object_get("k"), Some(&Value::int(2)));
    assert_eq!(value.object_len(), Some(1));
}
