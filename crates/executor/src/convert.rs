//! Error conversion from the core and engine error types.
//!
//! This module maps every lower-layer error into the session's [`Error`].

use jqbridge_core::ConversionError;
use jqbridge_engine::{CompileError, EvalError};

use crate::Error;

impl From<CompileError> for Error {
    fn from(err: CompileError) -> Self {
        Error::Compile {
            message: err.message,
            position: err.position,
        }
    }
}

impl From<ConversionError> for Error {
    fn from(err: ConversionError) -> Self {
        Error::Conversion {
            reason: err.to_string(),
        }
    }
}

impl From<EvalError> for Error {
    fn from(err: EvalError) -> Self {
        Error::Evaluation { message: err.0 }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config {
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            reason: err.to_string(),
        }
    }
}
