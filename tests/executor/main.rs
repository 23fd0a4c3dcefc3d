//! Executor Layer Tests
//!
//! Tests for the jqbridge-executor crate which provides:
//! - Session - compiled program driven over successive inputs
//! - BridgeConfig - depth, formatting and output caps
//! - Error - compile, conversion, state and evaluation failures

#[path = "../common/mod.rs"]
mod common;

mod config_files;
mod programs;
mod session_properties;
