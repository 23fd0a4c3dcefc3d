//! Programs over realistic documents, end to end through a session.

use crate::common::*;

const ORDERS: &str = r#"{
  "customer": "acme",
  "orders": [
    {"id": 1, "items": [{"sku": "a", "qty": 2, "price": 1.5}], "status": "open"},
    {"id": 2, "items": [{"sku": "b", "qty": 1, "price": 10}, {"sku": "c", "qty": 3, "price": 0.25}], "status": "shipped"},
    {"id": 3, "items": [], "status": "open"}
  ]
}"#;

#[test]
fn select_and_project() {
    init_tracing();
    let out = run_json(r#".orders[] | select(.status == "open") | .id"#, ORDERS).unwrap();
    assert_eq!(out, vec!["1", "3"]);
}

#[test]
fn build_objects() {
    let out = run_json(
        ".orders[] | {id, lines: (.items | length)}",
        ORDERS,
    )
    .unwrap();
    assert_eq!(
        out,
        vec![
            r#"{"id":1,"lines":1}"#,
            r#"{"id":2,"lines":2}"#,
            r#"{"id":3,"lines":0}"#
        ]
    );
}

#[test]
fn arithmetic_over_items() {
    let out = run_json(
        "[.orders[].items[] | .qty * .price] | add",
        ORDERS,
    )
    .unwrap();
    assert_eq!(out, vec!["13.75"]);
}

#[test]
fn alternative_defaults_missing_fields() {
    let out = run_json(r#".orders[] | .note // "none""#, ORDERS).unwrap();
    assert_eq!(out, vec![r#""none""#; 3]);
}

#[test]
fn keys_and_types() {
    let out = run_json("keys, (.orders | type)", ORDERS).unwrap();
    assert_eq!(out, vec![r#"["customer","orders"]"#, r#""array""#]);
}

#[test]
fn recursive_descent_finds_all_skus() {
    let out = run_json(r#"[.. | .sku? // empty]"#, ORDERS).unwrap();
    assert_eq!(out, vec![r#"["a","b","c"]"#]);
}

#[test]
fn native_struct_in_native_out() {
    #[derive(serde::Serialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    let points = vec![Point { x: 1, y: 2 }, Point { x: -3, y: 4 }];
    let out = run_native(".[] | .x + .y", &points).unwrap();
    assert_eq!(out, vec![Native::Int(3), Native::Int(1)]);
}

#[test]
fn limit_bounds_infinite_stream() {
    let out = run_json("[limit(5; range(1; 1e9))]", "null").unwrap();
    assert_eq!(out, vec!["[1,2,3,4,5]"]);
}

#[test]
fn evaluation_error_reports_kind() {
    let err = run_json(".customer[]", ORDERS).unwrap_err();
    assert_eq!(
        err,
        Error::Evaluation {
            message: r#"Cannot iterate over string ("acme")"#.into()
        }
    );
}
