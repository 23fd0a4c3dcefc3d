//! Core types for jqbridge
//!
//! This crate defines the value model shared by the query engine and the
//! session layer:
//! - Value: reference-counted, copy-on-write JSON-family value
//! - Number: exact integer or double, with the integral rule
//! - Kind: value discriminant with jq's kind names
//! - Native: the host's dynamically typed value
//! - Conversion: serde adapters between native types and Value
//! - ConversionError: everything that can go wrong converting

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod convert;
pub mod error;
pub mod json;
pub mod native;
pub mod number;
pub mod value;

pub use convert::{from_value, to_value, to_value_with_depth, ValueSerializer};
pub use error::{ConversionError, Result};
pub use json::{INVALID_TEXT, MAX_NESTING_DEPTH};
pub use native::Native;
pub use number::Number;
pub use value::{Kind, Map, StorageProbe, Value};
