//! jqbridge - run jq programs over native Rust values
//!
//! jqbridge converts native values into a reference-counted JSON value
//! model, drives a compiled jq program over them one output at a time, and
//! converts the outputs back.
//!
//! # Quick Start
//!
//! ```
//! use jqbridge::Session;
//!
//! let mut session = Session::new(".[] | .name")?;
//! session.accept_json(r#"[{"name": "a"}, {"name": "b"}]"#)?;
//!
//! let mut names = Vec::new();
//! while session.step()? {
//!     names.push(session.last_value_as::<String>()?);
//! }
//! assert_eq!(names, ["a", "b"]);
//! # Ok::<(), jqbridge::Error>(())
//! ```
//!
//! # Architecture
//!
//! All operations go through a [`Session`], which owns one engine handle.
//! The value model and converter (`jqbridge-core`) and the engine
//! (`jqbridge-engine`) are re-exported through the executor API.

// Re-export the public API from jqbridge-executor
pub use jqbridge_executor::*;
