//! Shared test utilities for all integration test suites.
//!
//! Import via `mod common;` from any test's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

use std::collections::BTreeMap;
use std::sync::Once;

pub use jqbridge::{
    from_value, to_value, BridgeConfig, Error, Native, Session, SessionState, Value,
};
use proptest::prelude::*;

// ============================================================================
// Initialization
// ============================================================================

static INIT_TRACING: Once = Once::new();

/// Install a test subscriber once per process; honours `RUST_LOG`.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Session helpers
// ============================================================================

/// Run `program` over JSON `input` and collect every output as text.
pub fn run_json(program: &str, input: &str) -> Result<Vec<String>, Error> {
    let mut session = Session::new(program)?;
    session.accept_json(input)?;
    let mut out = Vec::new();
    while session.step()? {
        out.push(session.last_value_as_text()?);
    }
    session.close()?;
    Ok(out)
}

/// Run `program` over a native input and collect every output as native.
pub fn run_native<T: serde::Serialize + ?Sized>(
    program: &str,
    input: &T,
) -> Result<Vec<Native>, Error> {
    let mut session = Session::new(program)?;
    session.accept_input(input)?;
    let mut out = Vec::new();
    while session.step()? {
        out.push(session.last_value()?);
    }
    Ok(out)
}

// ============================================================================
// Strategies
// ============================================================================

/// Finite floats with a fractional part; integral floats come back as ints.
pub fn fractional_f64() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("finite, non-integral", |f| f.is_finite() && f.fract() != 0.0)
}

/// Arbitrary native values, nested up to a few levels.
pub fn arb_native() -> impl Strategy<Value = Native> {
    let leaf = prop_oneof![
        Just(Native::Null),
        any::<bool>().prop_map(Native::Bool),
        any::<i64>().prop_map(Native::Int),
        fractional_f64().prop_map(Native::Float),
        "[a-zA-Z0-9 _\\-\u{e9}\u{4e2d}]{0,12}".prop_map(Native::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Native::Array),
            prop::collection::btree_map("[a-z]{0,6}", inner, 0..6).prop_map(Native::Object),
        ]
    })
}

/// Arbitrary values built through the converter.
pub fn arb_value() -> impl Strategy<Value = Value> {
    arb_native().prop_map(Value::from)
}

/// A small map fixture: `{"x": 1, "y": "two"}`.
pub fn sample_mapping() -> BTreeMap<String, Native> {
    let mut map = BTreeMap::new();
    map.insert("x".to_string(), Native::Int(1));
    map.insert("y".to_string(), Native::String("two".into()));
    map
}
