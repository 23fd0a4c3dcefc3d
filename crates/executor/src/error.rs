//! Error types for query sessions.
//!
//! Every failure a session can report is an [`Error`]:
//! - **Compile**: program text rejected when the session is built
//! - **Conversion**: input or output has no mapping across the bridge
//! - **State**: an operation called in the wrong session state
//! - **Evaluation**: the engine failed mid-stream
//! - **Config**: configuration could not be loaded or is out of range

use serde::{Deserialize, Serialize};

/// Query session errors.
///
/// # Categories
///
/// | Category | Variants | Description |
/// |----------|----------|-------------|
/// | Program | `Compile` | Program text did not compile |
/// | Data | `Conversion` | Value has no mapping to or from the engine's model |
/// | Protocol | `State` | Operation invalid in the current session state |
/// | Runtime | `Evaluation` | Engine reported an error instead of exhaustion |
/// | Setup | `Config`, `Io` | Configuration problems |
///
/// # Example
///
/// ```
/// use jqbridge_executor::{Error, Session};
///
/// match Session::new(".[") {
///     Err(Error::Compile { message, .. }) => assert!(!message.is_empty()),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    /// Program text failed to compile
    #[error("compile error: {message}{}", .position.map(|p| format!(" at offset {}", p)).unwrap_or_default())]
    Compile {
        message: String,
        position: Option<usize>,
    },

    /// Value could not be converted
    #[error("conversion error: {reason}")]
    Conversion { reason: String },

    /// Operation invoked in the wrong session state
    #[error("invalid state: cannot {operation} while {state}")]
    State { operation: String, state: String },

    /// Engine reported a failure during evaluation
    #[error("evaluation error: {message}")]
    Evaluation { message: String },

    /// Invalid configuration
    #[error("invalid config: {reason}")]
    Config { reason: String },

    /// I/O error while reading configuration
    #[error("I/O error: {reason}")]
    Io { reason: String },
}

impl Error {
    /// Whether this error ended the current input cycle
    pub fn is_evaluation(&self) -> bool {
        matches!(self, Error::Evaluation { .. })
    }

    pub(crate) fn state(operation: &str, state: impl std::fmt::Display) -> Self {
        Error::State {
            operation: operation.to_string(),
            state: state.to_string(),
        }
    }
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, Error>;
