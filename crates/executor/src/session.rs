//! Query session: one compiled program driven over successive inputs.
//!
//! A [`Session`] owns one engine handle and at most one in-flight output
//! stream. Each input starts a new cycle that is pulled with
//! [`step`](Session::step) until it is drained or fails.
//!
//! # States
//!
//! | State | Entered by | `step` |
//! |-------|-----------|--------|
//! | `Compiled` | construction, rejected input | state error |
//! | `Running` | `accept_*` | pulls the next output |
//! | `Drained` | engine exhausted | `Ok(false)`, repeatedly |
//! | `Failed` | engine error | state error |
//!
//! `accept_*` is legal in every state and abandons the previous cycle.
//!
//! # Usage
//!
//! ```
//! use jqbridge_executor::Session;
//!
//! let mut session = Session::new(".[]")?;
//! session.accept_json("[[1], [2]]")?;
//!
//! let mut texts = Vec::new();
//! while session.step()? {
//!     texts.push(session.last_value_as_text()?);
//! }
//! assert_eq!(texts, ["[1]", "[2]"]);
//! session.close()?;
//! # Ok::<(), jqbridge_executor::Error>(())
//! ```

use std::fmt;

use jqbridge_core::{from_value, to_value_with_depth, ConversionError, Native, Value};
use jqbridge_engine::{Args, Engine, Interpreter};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::config::BridgeConfig;
use crate::lifecycle::EngineGuard;
use crate::{Error, Result};

/// Where the session is in its input cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Program compiled, no input accepted
    Compiled,
    /// Input accepted, outputs may remain
    Running,
    /// The engine signalled exhaustion for the current input
    Drained,
    /// The engine failed for the current input
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Compiled => "compiled",
            SessionState::Running => "running",
            SessionState::Drained => "drained",
            SessionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One compiled program bound to one engine handle.
///
/// Sessions hold reference-counted values and are not `Send`; use one
/// session per thread.
pub struct Session<E: Engine = Interpreter> {
    program: String,
    config: BridgeConfig,
    guard: EngineGuard<E>,
    state: SessionState,
    last: Option<Value>,
    produced: usize,
}

impl Session<Interpreter> {
    /// Compile `program` with the built-in interpreter.
    pub fn new(program: &str) -> Result<Self> {
        Self::open(Interpreter::new(), program, &Args::new(), BridgeConfig::default())
    }

    /// Compile `program` with `$name` arguments bound from `args`.
    pub fn with_args(program: &str, args: &Args) -> Result<Self> {
        Self::open(Interpreter::new(), program, args, BridgeConfig::default())
    }

    /// Compile `program` under an explicit configuration.
    pub fn with_config(program: &str, config: BridgeConfig) -> Result<Self> {
        Self::open(Interpreter::new(), program, &Args::new(), config)
    }
}

impl<E: Engine> Session<E> {
    /// Compile `program` on a caller-supplied engine.
    pub fn with_engine(engine: E, program: &str, args: &Args) -> Result<Self> {
        Self::open(engine, program, args, BridgeConfig::default())
    }

    /// Compile `program` on `engine` with `args` under `config`.
    ///
    /// The engine is torn down if validation or compilation fails.
    pub fn open(engine: E, program: &str, args: &Args, config: BridgeConfig) -> Result<Self> {
        let validated = config.validate();
        let mut session = Self {
            program: program.to_string(),
            config,
            guard: EngineGuard::new(engine),
            state: SessionState::Compiled,
            last: None,
            produced: 0,
        };
        validated?;
        session.engine()?.compile(program, args)?;
        debug!(target: "jqbridge::session", program, "Session compiled");
        Ok(session)
    }

    /// The program text this session was compiled from
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Current cycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Active configuration
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Outputs produced so far in the current cycle
    pub fn produced(&self) -> usize {
        self.produced
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Convert a native value and start a new cycle on it.
    ///
    /// On conversion failure the previous cycle is still abandoned and the
    /// session returns to `Compiled`.
    pub fn accept_input<T: Serialize + ?Sized>(&mut self, input: &T) -> Result<()> {
        match to_value_with_depth(input, self.config.max_depth) {
            Ok(value) => self.accept_value(value),
            Err(e) => {
                self.reset();
                warn!(target: "jqbridge::session", error = %e, "Input conversion failed");
                Err(e.into())
            }
        }
    }

    /// Parse JSON text and start a new cycle on it.
    pub fn accept_json(&mut self, text: &str) -> Result<()> {
        self.accept_value(Value::parse_with_depth(text, self.config.max_depth))
    }

    /// Start a new cycle on an existing value.
    ///
    /// An `Invalid` value is rejected with a conversion error.
    pub fn accept_value(&mut self, input: Value) -> Result<()> {
        self.reset();
        if let Value::Invalid(msg) = &input {
            let err = ConversionError::invalid(msg.as_deref());
            warn!(target: "jqbridge::session", error = %err, "Rejected invalid input");
            return Err(err.into());
        }
        let engine = self.engine()?;
        engine.start(input);
        self.state = SessionState::Running;
        debug!(target: "jqbridge::session", program = %self.program, "Cycle started");
        Ok(())
    }

    // =========================================================================
    // Iteration
    // =========================================================================

    /// Pull the next output.
    ///
    /// Returns `Ok(true)` when an output is available through the `last_*`
    /// readers and `Ok(false)` once the cycle is exhausted. An engine
    /// failure is `Err(Error::Evaluation)` and ends the cycle; stepping a
    /// failed cycle, or before any input, is `Err(Error::State)`.
    pub fn step(&mut self) -> Result<bool> {
        match self.state {
            SessionState::Running => {}
            SessionState::Drained => return Ok(false),
            SessionState::Compiled | SessionState::Failed => {
                return Err(Error::state("step", self.state))
            }
        }

        let value = self.engine()?.next();
        match value {
            Value::Invalid(None) => {
                self.state = SessionState::Drained;
                self.last = None;
                debug!(target: "jqbridge::session", produced = self.produced, "Cycle drained");
                Ok(false)
            }
            Value::Invalid(Some(msg)) => Err(self.fail(msg.to_string())),
            value => {
                if let Some(max) = self.config.max_outputs {
                    if self.produced >= max {
                        return Err(self.fail(format!("output limit of {} exceeded", max)));
                    }
                }
                self.produced += 1;
                trace!(target: "jqbridge::session", index = self.produced, kind = %value.kind(), "Output");
                self.last = Some(value);
                Ok(true)
            }
        }
    }

    /// Iterate the remaining outputs of the current cycle.
    ///
    /// The iterator ends after exhaustion or after yielding one error.
    pub fn outputs(&mut self) -> Outputs<'_, E> {
        Outputs {
            session: self,
            done: false,
        }
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// The most recent output as a borrowed value.
    pub fn last_raw(&self) -> Result<&Value> {
        self.last
            .as_ref()
            .ok_or_else(|| Error::state("read an output", self.state))
    }

    /// The most recent output as a native value.
    pub fn last_value(&self) -> Result<Native> {
        Ok(self.last_raw()?.to_native()?)
    }

    /// The most recent output deserialized into `T`.
    pub fn last_value_as<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(from_value(self.last_raw()?)?)
    }

    /// The most recent output as JSON text, indented when configured.
    pub fn last_value_as_text(&self) -> Result<String> {
        let value = self.last_raw()?;
        Ok(if self.config.pretty {
            value.dump_pretty()
        } else {
            value.dump()
        })
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Tear the engine down. Dropping an unclosed session does the same.
    pub fn close(mut self) -> Result<()> {
        self.last = None;
        self.guard.release();
        Ok(())
    }

    fn engine(&mut self) -> Result<&mut E> {
        let state = self.state;
        self.guard
            .get_mut()
            .ok_or_else(|| Error::state("use the engine", format!("{} after teardown", state)))
    }

    fn reset(&mut self) {
        self.state = SessionState::Compiled;
        self.last = None;
        self.produced = 0;
    }

    fn fail(&mut self, message: String) -> Error {
        self.state = SessionState::Failed;
        self.last = None;
        warn!(target: "jqbridge::session", produced = self.produced, %message, "Evaluation failed");
        Error::Evaluation { message }
    }
}

impl<E: Engine> fmt::Debug for Session<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("program", &self.program)
            .field("state", &self.state)
            .field("produced", &self.produced)
            .finish()
    }
}

/// Iterator over the outputs of a session's current cycle.
pub struct Outputs<'a, E: Engine> {
    session: &'a mut Session<E>,
    done: bool,
}

impl<'a, E: Engine> Iterator for Outputs<'a, E> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.session.step() {
            Ok(true) => self.session.last.clone().map(Ok),
            Ok(false) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
