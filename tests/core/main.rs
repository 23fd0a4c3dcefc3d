//! Core Layer Tests
//!
//! Tests for the jqbridge-core crate which provides:
//! - Value - reference-counted, copy-on-write JSON value
//! - JSON text parsing and dumping
//! - The native converter in both directions

#[path = "../common/mod.rs"]
mod common;

mod conversion;
mod refcount;
mod round_trip;
