//! Lifecycle tests: the engine handle is torn down exactly once.

use std::cell::Cell;
use std::rc::Rc;

use crate::{Args, BridgeConfig, CompileError, Engine, Error, Session, Value};

#[derive(Default)]
struct Calls {
    compiled: Cell<usize>,
    started: Cell<usize>,
    torn_down: Cell<usize>,
}

/// Scripted engine replaying a fixed list of `next` results.
struct Scripted {
    calls: Rc<Calls>,
    script: Vec<Value>,
    reject: bool,
}

impl Scripted {
    fn new(calls: &Rc<Calls>, script: Vec<Value>) -> Self {
        Self {
            calls: Rc::clone(calls),
            script,
            reject: false,
        }
    }

    fn rejecting(calls: &Rc<Calls>) -> Self {
        Self {
            reject: true,
            ..Self::new(calls, Vec::new())
        }
    }
}

impl Engine for Scripted {
    fn compile(&mut self, _program: &str, _args: &Args) -> Result<(), CompileError> {
        self.calls.compiled.set(self.calls.compiled.get() + 1);
        if self.reject {
            return Err(CompileError::at(0, "rejected"));
        }
        Ok(())
    }

    fn start(&mut self, _input: Value) {
        self.calls.started.set(self.calls.started.get() + 1);
    }

    fn next(&mut self) -> Value {
        if self.script.is_empty() {
            Value::invalid()
        } else {
            self.script.remove(0)
        }
    }

    fn teardown(&mut self) {
        self.calls.torn_down.set(self.calls.torn_down.get() + 1);
    }
}

#[test]
fn test_close_tears_down_once() {
    let calls = Rc::new(Calls::default());
    let session = Session::with_engine(Scripted::new(&calls, vec![]), ".", &Args::new()).unwrap();
    assert_eq!(calls.compiled.get(), 1);
    session.close().unwrap();
    assert_eq!(calls.torn_down.get(), 1);
}

#[test]
fn test_drop_tears_down_once() {
    let calls = Rc::new(Calls::default());
    {
        let mut session =
            Session::with_engine(Scripted::new(&calls, vec![Value::int(1)]), ".", &Args::new())
                .unwrap();
        session.accept_json("null").unwrap();
        assert!(session.step().unwrap());
    }
    assert_eq!(calls.started.get(), 1);
    assert_eq!(calls.torn_down.get(), 1);
}

#[test]
fn test_compile_failure_tears_down() {
    let calls = Rc::new(Calls::default());
    let err = Session::with_engine(Scripted::rejecting(&calls), "x", &Args::new()).unwrap_err();
    assert_eq!(
        err,
        Error::Compile {
            message: "rejected".into(),
            position: Some(0),
        }
    );
    assert_eq!(calls.torn_down.get(), 1);
}

#[test]
fn test_open_compiles_exactly_once() {
    let calls = Rc::new(Calls::default());
    let config = BridgeConfig {
        pretty: true,
        ..BridgeConfig::default()
    };
    let session = Session::open(Scripted::new(&calls, vec![]), ".", &Args::new(), config).unwrap();
    assert_eq!(calls.compiled.get(), 1);
    assert!(session.config().pretty);
    drop(session);
    assert_eq!(calls.torn_down.get(), 1);
}

#[test]
fn test_invalid_config_tears_down_without_compiling() {
    let calls = Rc::new(Calls::default());
    let config = BridgeConfig {
        max_depth: 0,
        ..BridgeConfig::default()
    };
    let err = Session::open(Scripted::new(&calls, vec![]), ".", &Args::new(), config).unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
    assert_eq!(calls.compiled.get(), 0);
    assert_eq!(calls.torn_down.get(), 1);
}

#[test]
fn test_engine_failure_protocol() {
    let calls = Rc::new(Calls::default());
    let script = vec![Value::int(1), Value::invalid_with_msg("engine says no")];
    let mut session =
        Session::with_engine(Scripted::new(&calls, script), ".", &Args::new()).unwrap();
    session.accept_json("null").unwrap();

    assert!(session.step().unwrap());
    assert_eq!(
        session.step().unwrap_err(),
        Error::Evaluation {
            message: "engine says no".into()
        }
    );
}

#[test]
fn test_rejected_input_never_reaches_engine() {
    let calls = Rc::new(Calls::default());
    let mut session =
        Session::with_engine(Scripted::new(&calls, vec![]), ".", &Args::new()).unwrap();
    assert!(session.accept_json("not json").is_err());
    assert_eq!(calls.started.get(), 0);
}

#[test]
fn test_boxed_engine() {
    let calls = Rc::new(Calls::default());
    let engine: Box<dyn Engine> = Box::new(Scripted::new(&calls, vec![Value::int(4)]));
    let mut session = Session::with_engine(engine, ".", &Args::new()).unwrap();
    session.accept_input(&()).unwrap();
    assert!(session.step().unwrap());
    assert_eq!(session.last_raw().unwrap(), &Value::int(4));
    drop(session);
    assert_eq!(calls.torn_down.get(), 1);
}
