//! Error types for compiling and evaluating query programs.

use thiserror::Error;

/// Program text failed to compile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}{}", .position.map(|p| format!(" at offset {}", p)).unwrap_or_default())]
pub struct CompileError {
    /// Diagnostic message
    pub message: String,
    /// Byte offset in the program text, when known
    pub position: Option<usize>,
}

impl CompileError {
    /// Create a compile error at a byte offset
    pub fn at(position: usize, message: impl Into<String>) -> Self {
        CompileError {
            message: message.into(),
            position: Some(position),
        }
    }

    /// Create a compile error with no position
    pub fn new(message: impl Into<String>) -> Self {
        CompileError {
            message: message.into(),
            position: None,
        }
    }
}

/// Evaluation failed mid-stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct EvalError(pub String);

impl EvalError {
    /// Create an evaluation error
    pub fn new(message: impl Into<String>) -> Self {
        EvalError(message.into())
    }

    /// The diagnostic message
    pub fn message(&self) -> &str {
        &self.0
    }
}
