//! Error types for value conversion
//!
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use thiserror::Error;

use crate::value::Kind;

/// Result type alias for conversion operations
pub type Result<T> = std::result::Result<T, ConversionError>;

/// A native value has no mapping to the value model, or a value has no
/// mapping back to the requested native type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// Converting an `Invalid` value (parse failure or engine failure)
    #[error("invalid value: {}", message.as_deref().unwrap_or("no diagnostic"))]
    Invalid {
        /// Diagnostic carried by the value, if any
        message: Option<String>,
    },

    /// A mapping key that is not a string
    #[error("map key must be a string, got {kind}")]
    NonStringKey {
        /// Shape of the offending key
        kind: String,
    },

    /// Native structure nested beyond the configured depth
    #[error("nesting depth exceeds maximum of {max} levels")]
    TooDeep {
        /// Configured maximum depth
        max: usize,
    },

    /// Value kind does not match the requested native type
    #[error("wrong kind: expected {expected}, got {actual}")]
    WrongKind {
        /// What the target type wanted
        expected: String,
        /// What the value was
        actual: Kind,
    },

    /// Error raised by a `Serialize`/`Deserialize` implementation
    #[error("{0}")]
    Custom(String),
}

impl ConversionError {
    /// Create an `Invalid` error from an optional diagnostic
    pub fn invalid(message: Option<&str>) -> Self {
        ConversionError::Invalid {
            message: message.map(str::to_string),
        }
    }
}

impl serde::ser::Error for ConversionError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        ConversionError::Custom(msg.to_string())
    }
}

impl serde::de::Error for ConversionError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        ConversionError::Custom(msg.to_string())
    }
}
