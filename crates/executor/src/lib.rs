//! # jqbridge Executor
//!
//! The public API for running jq programs over native Rust values.
//!
//! This is the only crate users need to import. It provides:
//! - [`Session`] - one compiled program driven over successive inputs
//! - [`Value`] / [`Native`] - the engine's value model and the host's
//! - [`BridgeConfig`] - depth limits, output formatting and output caps
//! - [`Error`] - compile, conversion, state, evaluation and config errors
//!
//! ## Quick Start
//!
//! ```
//! use jqbridge_executor::{Native, Session};
//!
//! let mut session = Session::new(".[]")?;
//! session.accept_input(&vec![1, 2, 3])?;
//!
//! let mut seen = Vec::new();
//! while session.step()? {
//!     seen.push(session.last_value()?);
//! }
//! assert_eq!(seen, vec![Native::Int(1), Native::Int(2), Native::Int(3)]);
//! # Ok::<(), jqbridge_executor::Error>(())
//! ```
//!
//! ## Exhaustion and failure
//!
//! `step` returns `Ok(false)` when the program has no more outputs for the
//! current input and `Err(Error::Evaluation)` when the engine fails. The two
//! are never conflated.

#![warn(missing_docs)]

mod config;
mod convert;
mod error;
mod lifecycle;
mod session;

#[cfg(test)]
mod tests;

pub use config::{BridgeConfig, CONFIG_FILE_NAME, DEPTH_CEILING};
pub use error::{Error, Result};
pub use lifecycle::EngineGuard;
pub use session::{Outputs, Session, SessionState};

pub use jqbridge_core::{
    from_value, to_value, to_value_with_depth, ConversionError, Kind, Map, Native, Number,
    StorageProbe, Value, MAX_NESTING_DEPTH,
};
pub use jqbridge_engine::{Args, CompileError, Engine, Interpreter};
