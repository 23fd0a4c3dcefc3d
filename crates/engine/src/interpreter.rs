//! Built-in reference interpreter for a jq subset.

use std::rc::Rc;

use jqbridge_core::Value;
use tracing::debug;

use crate::ast::Filter;
use crate::error::CompileError;
use crate::eval::{self, Outputs};
use crate::parser;
use crate::{Args, Engine};

enum Cursor {
    Idle,
    Streaming(Outputs),
    Done,
}

/// Tree-walking interpreter; evaluates lazily, one output per `next`.
///
/// # Example
///
/// ```
/// use jqbridge_core::Value;
/// use jqbridge_engine::{Args, Engine, Interpreter};
///
/// let mut jq = Interpreter::new();
/// jq.compile(".[] | . * 2", &Args::new()).unwrap();
/// jq.start(Value::parse("[1, 2]"));
/// assert_eq!(jq.next(), Value::int(2));
/// assert_eq!(jq.next(), Value::int(4));
/// assert!(!jq.next().is_valid());
/// ```
pub struct Interpreter {
    program: Option<Rc<Filter>>,
    cursor: Cursor,
}

impl Interpreter {
    /// Create an interpreter with no program loaded
    pub fn new() -> Self {
        Interpreter {
            program: None,
            cursor: Cursor::Idle,
        }
    }

    /// Whether a program is loaded
    pub fn is_compiled(&self) -> bool {
        self.program.is_some()
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for Interpreter {
    fn compile(&mut self, program: &str, args: &Args) -> Result<(), CompileError> {
        let filter = parser::parse(program, args)?;
        debug!(target: "jqbridge::engine", program, args = args.len(), "Compiled program");
        self.program = Some(filter);
        self.cursor = Cursor::Idle;
        Ok(())
    }

    fn start(&mut self, input: Value) {
        self.cursor = match &self.program {
            Some(program) => Cursor::Streaming(eval::run(program, input)),
            None => Cursor::Idle,
        };
    }

    fn next(&mut self) -> Value {
        let stream = match &mut self.cursor {
            Cursor::Streaming(stream) => stream,
            Cursor::Done => return Value::invalid(),
            Cursor::Idle => return Value::invalid_with_msg("next called before start"),
        };
        match stream.next() {
            Some(Ok(value)) => value,
            Some(Err(e)) => {
                self.cursor = Cursor::Done;
                Value::invalid_with_msg(e.message())
            }
            None => {
                self.cursor = Cursor::Done;
                Value::invalid()
            }
        }
    }

    fn teardown(&mut self) {
        self.cursor = Cursor::Idle;
        self.program = None;
    }
}
