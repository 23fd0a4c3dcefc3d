//! Query engine for jqbridge
//!
//! The session layer drives an engine through four primitives:
//! - compile: turn program text into a reusable program
//! - start: bind one input value and begin a fresh output stream
//! - next: pull one output
//! - teardown: release everything the engine holds
//!
//! [`Interpreter`] is the built-in engine, a lazy tree-walking evaluator for
//! a subset of jq.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod error;
pub mod eval;
pub mod interpreter;
pub mod lexer;
pub mod parser;

use std::collections::BTreeMap;

use jqbridge_core::Value;

pub use error::{CompileError, EvalError};
pub use interpreter::Interpreter;

/// Named program arguments, bound as `$name`.
pub type Args = BTreeMap<String, Value>;

/// A compiled-program evaluation handle.
///
/// `next` follows jq's protocol: a valid value is an output,
/// `Value::Invalid(None)` means the stream is exhausted and
/// `Value::Invalid(Some(msg))` means evaluation failed.
///
/// Handles are single-threaded and not reentrant.
pub trait Engine {
    /// Compile `program`, binding `args` as `$name` variables.
    fn compile(&mut self, program: &str, args: &Args) -> Result<(), CompileError>;

    /// Begin evaluating the compiled program against `input`, discarding any
    /// stream in flight.
    fn start(&mut self, input: Value);

    /// Pull the next output.
    fn next(&mut self) -> Value;

    /// Release the compiled program and any in-flight stream.
    fn teardown(&mut self);
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn compile(&mut self, program: &str, args: &Args) -> Result<(), CompileError> {
        (**self).compile(program, args)
    }

    fn start(&mut self, input: Value) {
        (**self).start(input)
    }

    fn next(&mut self) -> Value {
        (**self).next()
    }

    fn teardown(&mut self) {
        (**self).teardown()
    }
}
