//! Reference-count conservation across copy, dump and drop.

use crate::common::*;
use proptest::prelude::*;

proptest! {
    #[test]
    fn copies_then_releases_restore_count(value in arb_value(), copies in 0usize..16) {
        let before = value.ref_count();
        let handles: Vec<Value> = (0..copies).map(|_| value.clone()).collect();
        if let Some(before) = before {
            prop_assert_eq!(value.ref_count(), Some(before + copies));
        }
        drop(handles);
        prop_assert_eq!(value.ref_count(), before);
    }

    #[test]
    fn dump_never_changes_count(value in arb_value(), times in 1usize..8) {
        let before = value.ref_count();
        let first = value.dump();
        for _ in 0..times {
            prop_assert_eq!(value.dump(), first.clone());
        }
        prop_assert_eq!(value.ref_count(), before);
    }

    #[test]
    fn freshly_converted_containers_are_unshared(native in arb_native()) {
        let value = to_value(&native).unwrap();
        if let Some(count) = value.ref_count() {
            prop_assert_eq!(count, 1);
        }
    }
}

#[test]
fn storage_freed_after_last_release() {
    let value = Value::parse(r#"{"foo":1}"#);
    let copy = value.clone();
    let probe = value.downgrade().unwrap();
    assert_eq!(probe.strong_count(), 2);

    drop(value);
    assert_eq!(probe.strong_count(), 1);
    assert!(!probe.is_freed());

    drop(copy);
    assert_eq!(probe.strong_count(), 0);
    assert!(probe.is_freed());
}

#[test]
fn copy_on_write_isolates_handles() {
    let original = Value::parse("[1, 2]");
    let mut copy = original.clone();
    assert!(copy.ptr_eq(&original));

    copy.array_push(Value::int(3));
    assert!(!copy.ptr_eq(&original));
    assert_eq!(original.dump(), "[1,2]");
    assert_eq!(copy.dump(), "[1,2,3]");
    assert_eq!(original.ref_count(), Some(1));
}

#[test]
fn scalars_have_no_shared_storage() {
    assert_eq!(Value::int(1).ref_count(), None);
    assert_eq!(Value::Null.ref_count(), None);
    assert!(Value::Bool(true).downgrade().is_none());
}
