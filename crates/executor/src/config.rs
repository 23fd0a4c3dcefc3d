//! Session configuration via `jqbridge.toml`
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration. Values are validated when loaded.

use std::path::Path;

use jqbridge_core::MAX_NESTING_DEPTH;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Conventional config file name.
pub const CONFIG_FILE_NAME: &str = "jqbridge.toml";

/// Upper bound accepted for `max_depth`.
///
/// Conversion, dumping and dropping all recurse once per nesting level, so
/// this must stay well inside a default 2 MiB thread stack.
pub const DEPTH_CEILING: usize = 512;

/// Session configuration loaded from `jqbridge.toml`.
///
/// # Example
///
/// ```toml
/// max_depth = 100
/// pretty = false
/// # max_outputs = 1000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Nesting limit for native conversion and JSON parsing.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Indent text produced by `last_value_as_text`.
    #[serde(default)]
    pub pretty: bool,
    /// Per-input cap on outputs; exceeding it fails the cycle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_outputs: Option<usize>,
}

fn default_max_depth() -> usize {
    MAX_NESTING_DEPTH
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            pretty: false,
            max_outputs: None,
        }
    }
}

impl BridgeConfig {
    /// Check field ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `max_depth` is zero or above
    /// [`DEPTH_CEILING`], or if `max_outputs` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 || self.max_depth > DEPTH_CEILING {
            return Err(Error::Config {
                reason: format!(
                    "max_depth must be between 1 and {}, got {}",
                    DEPTH_CEILING, self.max_depth
                ),
            });
        }
        if self.max_outputs == Some(0) {
            return Err(Error::Config {
                reason: "max_outputs must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# jqbridge session configuration
#
# Maximum nesting depth for native conversion and JSON parsing (default: 100)
max_depth = 100

# Indent text output (default: false)
pretty = false

# Cap on outputs per input; exceeding it is an evaluation error.
# max_outputs = 1000
"#
    }

    /// Parse and validate config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: BridgeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate config from a file path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and
    /// [`Error::Config`] if it cannot be parsed or fails validation.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Io {
            reason: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::Config { reason } => Error::Config {
                reason: format!("{}: {}", path.display(), reason),
            },
            other => other,
        })
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| Error::Config {
            reason: format!("Failed to serialize config: {}", e),
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
