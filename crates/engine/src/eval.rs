//! Lazy evaluation of a [`Filter`] tree.
//!
//! Every filter maps one input to a boxed iterator of results. Streams are
//! built from iterator adapters, so unbounded generators such as
//! `repeat(.)` only do work when the caller pulls the next output.

use std::cmp::Ordering;
use std::iter;
use std::rc::Rc;

use jqbridge_core::{Number, Value};

use crate::ast::{BinOp, Builtin, Filter};
use crate::error::EvalError;

/// A lazily evaluated stream of filter outputs.
pub type Outputs = Box<dyn Iterator<Item = Result<Value, EvalError>>>;

/// Evaluate `filter` against `input`.
pub fn run(filter: &Rc<Filter>, input: Value) -> Outputs {
    match &**filter {
        Filter::Identity => once(input),
        Filter::RecurseAll => recurse_by(input, descend_all()),
        Filter::Index(target, key) => {
            let key = Rc::clone(key);
            let outer = input.clone();
            flat_map_ok(run(target, input), move |container| {
                let keys = run(&key, outer.clone());
                Box::new(keys.map(move |k| k.and_then(|k| index(&container, &k))))
            })
        }
        Filter::Iterate(target) => flat_map_ok(run(target, input), iterate),
        Filter::Optional(inner) => Box::new(run(inner, input).map_while(|r| r.ok()).map(Ok)),
        Filter::Pipe(lhs, rhs) => {
            let rhs = Rc::clone(rhs);
            flat_map_ok(run(lhs, input), move |v| run(&rhs, v))
        }
        Filter::Comma(lhs, rhs) => {
            let rhs = Rc::clone(rhs);
            let again = input.clone();
            Box::new(run(lhs, input).chain(defer(move || run(&rhs, again))))
        }
        Filter::Literal(v) => once(v.clone()),
        Filter::ArrayCons(None) => once(Value::array()),
        Filter::ArrayCons(Some(inner)) => {
            let inner = Rc::clone(inner);
            defer(move || match run(&inner, input).collect::<Result<Vec<_>, _>>() {
                Ok(items) => once(Value::from(items)),
                Err(e) => fail(e),
            })
        }
        Filter::ObjectCons(entries) => {
            let entries = entries.clone();
            defer(move || match construct_objects(&entries, &input) {
                Ok(objects) => Box::new(objects.into_iter().map(Ok)),
                Err(e) => fail(e),
            })
        }
        Filter::Neg(inner) => Box::new(run(inner, input).map(|r| r.and_then(|v| negate(&v)))),
        Filter::Binary(op, lhs, rhs) => {
            let (op, lhs) = (*op, Rc::clone(lhs));
            let again = input.clone();
            flat_map_ok(run(rhs, input), move |r| {
                Box::new(
                    run(&lhs, again.clone()).map(move |l| l.and_then(|l| binop(op, &l, &r))),
                )
            })
        }
        Filter::And(lhs, rhs) => {
            let rhs = Rc::clone(rhs);
            let again = input.clone();
            flat_map_ok(run(lhs, input), move |l| {
                if !l.is_truthy() {
                    return once(Value::Bool(false));
                }
                Box::new(run(&rhs, again.clone()).map(|r| r.map(|r| Value::Bool(r.is_truthy()))))
            })
        }
        Filter::Or(lhs, rhs) => {
            let rhs = Rc::clone(rhs);
            let again = input.clone();
            flat_map_ok(run(lhs, input), move |l| {
                if l.is_truthy() {
                    return once(Value::Bool(true));
                }
                Box::new(run(&rhs, again.clone()).map(|r| r.map(|r| Value::Bool(r.is_truthy()))))
            })
        }
        Filter::Alternative(lhs, rhs) => {
            let rhs = Rc::clone(rhs);
            let mut found = run(lhs, input.clone())
                .filter_map(Result::ok)
                .filter(Value::is_truthy)
                .peekable();
            defer(move || {
                if found.peek().is_some() {
                    Box::new(found.map(Ok))
                } else {
                    run(&rhs, input)
                }
            })
        }
        Filter::If(cond, then, otherwise) => {
            let (then, otherwise) = (Rc::clone(then), Rc::clone(otherwise));
            let again = input.clone();
            flat_map_ok(run(cond, input), move |c| {
                let branch = if c.is_truthy() { &then } else { &otherwise };
                run(branch, again.clone())
            })
        }
        Filter::Call(builtin, args) => call(*builtin, args, input),
    }
}

fn call(builtin: Builtin, args: &[Rc<Filter>], input: Value) -> Outputs {
    match (builtin, args) {
        (Builtin::Empty, _) => Box::new(iter::empty()),
        (Builtin::Error, []) => fail(raise(&input)),
        (Builtin::Error, [msg]) => flat_map_ok(run(msg, input), |m| fail(raise(&m))),
        (Builtin::Not, _) => once(Value::Bool(!input.is_truthy())),
        (Builtin::Length, _) => result(length(&input)),
        (Builtin::Keys, _) => result(keys(&input)),
        (Builtin::Type, _) => once(Value::string(input.kind().name())),
        (Builtin::Select, [cond]) => {
            let keep = input.clone();
            flat_map_ok(run(cond, input), move |c| {
                if c.is_truthy() {
                    once(keep.clone())
                } else {
                    Box::new(iter::empty())
                }
            })
        }
        (Builtin::Range, [upto]) => flat_map_ok(run(upto, input), |n| {
            range(Value::int(0), n)
        }),
        (Builtin::Range, [from, upto]) => {
            let upto = Rc::clone(upto);
            let again = input.clone();
            flat_map_ok(run(from, input), move |start| {
                flat_map_ok(run(&upto, again.clone()), move |end| {
                    range(start.clone(), end)
                })
            })
        }
        (Builtin::Recurse, []) => recurse_by(input, descend_all()),
        (Builtin::Recurse | Builtin::Repeat, [step]) => recurse_by(input, Rc::clone(step)),
        (Builtin::Limit, [count, inner]) => {
            let inner = Rc::clone(inner);
            let again = input.clone();
            flat_map_ok(run(count, input), move |n| match n.as_number() {
                Some(n) if n.as_f64() > 0.0 => {
                    let n = n.as_f64().ceil() as usize;
                    Box::new(run(&inner, again.clone()).take(n))
                }
                Some(_) => Box::new(iter::empty()),
                None => fail(EvalError::new(format!(
                    "Invalid limit {} ({})",
                    n.kind(),
                    abbrev(&n)
                ))),
            })
        }
        (Builtin::First, [inner]) => Box::new(run(inner, input).take(1)),
        (Builtin::ToString, _) => match input {
            Value::String(_) => once(input),
            other => once(Value::string(other.dump())),
        },
        (Builtin::ToJson, _) => once(Value::string(input.dump())),
        (Builtin::AddAll, _) => result(add_all(&input)),
        (Builtin::Has, [key]) => {
            let container = input.clone();
            flat_map_ok(run(key, input), move |k| result(has(&container, &k)))
        }
        (other, args) => fail(EvalError::new(format!(
            "{:?}/{} is not defined",
            other,
            args.len()
        ))),
    }
}

fn once(v: Value) -> Outputs {
    Box::new(iter::once(Ok(v)))
}

fn fail(e: EvalError) -> Outputs {
    Box::new(iter::once(Err(e)))
}

fn result(r: Result<Value, EvalError>) -> Outputs {
    Box::new(iter::once(r))
}

/// Build the stream on first pull.
fn defer<F>(f: F) -> Outputs
where
    F: FnOnce() -> Outputs + 'static,
{
    Box::new(iter::once_with(f).flatten())
}

fn flat_map_ok<F>(outer: Outputs, f: F) -> Outputs
where
    F: Fn(Value) -> Outputs + 'static,
{
    Box::new(outer.flat_map(move |item| match item {
        Ok(v) => f(v),
        Err(e) => fail(e),
    }))
}

/// `.[]?`, the step used by `..` and `recurse`.
fn descend_all() -> Rc<Filter> {
    let each = Rc::new(Filter::Iterate(Rc::new(Filter::Identity)));
    Rc::new(Filter::Optional(each))
}

/// `def r: ., (step | r); r`
fn recurse_by(input: Value, step: Rc<Filter>) -> Outputs {
    Box::new(Recurse {
        step,
        expand: None,
        pending: vec![once(input)],
    })
}

/// Depth-first walk over `step`, driven by an explicit stack of child
/// streams so each pull costs constant native stack.
struct Recurse {
    step: Rc<Filter>,
    /// Last emitted value; its children are opened on the next pull.
    expand: Option<Value>,
    pending: Vec<Outputs>,
}

impl Iterator for Recurse {
    type Item = Result<Value, EvalError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(parent) = self.expand.take() {
            while matches!(self.pending.last(), Some(top) if top.size_hint().1 == Some(0)) {
                self.pending.pop();
            }
            self.pending.push(run(&self.step, parent));
        }
        loop {
            let top = self.pending.last_mut()?;
            match top.next() {
                Some(Ok(v)) => {
                    self.expand = Some(v.clone());
                    return Some(Ok(v));
                }
                Some(Err(e)) => return Some(Err(e)),
                None => {
                    self.pending.pop();
                }
            }
        }
    }
}

fn range(start: Value, end: Value) -> Outputs {
    let (Some(start), Some(end)) = (start.as_number(), end.as_number()) else {
        return fail(EvalError::new("Range bounds must be numeric"));
    };
    let steps = iter::successors(Some(start), |n| Some(n.add(Number::from_i64(1))));
    Box::new(
        steps
            .take_while(move |n| *n < end)
            .map(|n| Ok(Value::Number(n))),
    )
}

/// Error payload for `error` / `error(msg)`.
fn raise(msg: &Value) -> EvalError {
    match msg.as_str() {
        Some(s) => EvalError::new(s),
        None => EvalError::new(format!("{} (not a string)", msg.dump())),
    }
}

/// Abbreviated dump used inside diagnostics.
fn abbrev(v: &Value) -> String {
    let text = v.dump();
    if text.chars().count() > 14 {
        let head: String = text.chars().take(11).collect();
        format!("{}...", head)
    } else {
        text
    }
}

fn describe(v: &Value) -> String {
    format!("{} ({})", v.kind(), abbrev(v))
}

fn index(container: &Value, key: &Value) -> Result<Value, EvalError> {
    match (container, key) {
        (Value::Null, Value::String(_) | Value::Number(_) | Value::Null) => Ok(Value::Null),
        (Value::Object(map), Value::String(k)) => {
            Ok(map.get(&**k).cloned().unwrap_or(Value::Null))
        }
        (Value::Array(items), Value::Number(n)) => {
            let len = items.len() as f64;
            let mut idx = n.as_f64().floor();
            if idx < 0.0 {
                idx += len;
            }
            if idx < 0.0 || idx >= len {
                return Ok(Value::Null);
            }
            Ok(items[idx as usize].clone())
        }
        (_, Value::String(k)) => Err(EvalError::new(format!(
            "Cannot index {} with \"{}\"",
            container.kind(),
            k
        ))),
        _ => Err(EvalError::new(format!(
            "Cannot index {} with {}",
            container.kind(),
            key.kind()
        ))),
    }
}

fn iterate(container: Value) -> Outputs {
    match container {
        Value::Array(items) => Box::new((0..items.len()).map(move |i| Ok(items[i].clone()))),
        Value::Object(map) => {
            let values: Vec<Value> = map.values().cloned().collect();
            Box::new(values.into_iter().map(Ok))
        }
        Value::Null => fail(EvalError::new("Cannot iterate over null")),
        other => fail(EvalError::new(format!(
            "Cannot iterate over {}",
            describe(&other)
        ))),
    }
}

fn construct_objects(
    entries: &[(Rc<Filter>, Rc<Filter>)],
    input: &Value,
) -> Result<Vec<Value>, EvalError> {
    let mut partial = vec![Value::object()];
    for (key, value) in entries {
        let keys = run(key, input.clone()).collect::<Result<Vec<_>, _>>()?;
        let values = run(value, input.clone()).collect::<Result<Vec<_>, _>>()?;
        let mut next = Vec::with_capacity(partial.len() * keys.len() * values.len());
        for obj in &partial {
            for k in &keys {
                let Some(k) = k.as_str() else {
                    return Err(EvalError::new(format!(
                        "Cannot use {} as object key",
                        describe(k)
                    )));
                };
                for v in &values {
                    let mut built = obj.clone();
                    built.object_insert(k, v.clone());
                    next.push(built);
                }
            }
        }
        partial = next;
    }
    Ok(partial)
}

fn negate(v: &Value) -> Result<Value, EvalError> {
    match v {
        Value::Number(n) => Ok(Value::Number(Number::from_i64(0).sub(*n))),
        other => Err(EvalError::new(format!(
            "{} cannot be negated",
            describe(other)
        ))),
    }
}

fn length(v: &Value) -> Result<Value, EvalError> {
    match v {
        Value::Null => Ok(Value::int(0)),
        Value::Number(n) => Ok(Value::Number(abs(*n))),
        Value::String(s) => Ok(Value::from(s.chars().count() as i64)),
        Value::Array(items) => Ok(Value::from(items.len() as i64)),
        Value::Object(map) => Ok(Value::from(map.len() as i64)),
        other => Err(EvalError::new(format!(
            "{} has no length",
            describe(other)
        ))),
    }
}

fn abs(n: Number) -> Number {
    if n < Number::from_i64(0) {
        Number::from_i64(0).sub(n)
    } else {
        n
    }
}

fn keys(v: &Value) -> Result<Value, EvalError> {
    match v {
        Value::Object(map) => Ok(map.keys().map(|k| Value::string(&**k)).collect()),
        Value::Array(items) => Ok((0..items.len() as i64).map(Value::from).collect()),
        other => Err(EvalError::new(format!("{} has no keys", describe(other)))),
    }
}

fn has(container: &Value, key: &Value) -> Result<Value, EvalError> {
    match (container, key) {
        (Value::Object(map), Value::String(k)) => Ok(Value::Bool(map.contains_key(&**k))),
        (Value::Array(items), Value::Number(n)) => {
            let idx = n.as_f64();
            Ok(Value::Bool(idx >= 0.0 && idx < items.len() as f64))
        }
        _ => Err(EvalError::new(format!(
            "Cannot check whether {} has a {} key",
            container.kind(),
            key.kind()
        ))),
    }
}

fn add_all(v: &Value) -> Result<Value, EvalError> {
    let items: Vec<Value> = match v {
        Value::Null => return Ok(Value::Null),
        Value::Array(items) => items.iter().cloned().collect(),
        Value::Object(map) => map.values().cloned().collect(),
        other => {
            return Err(EvalError::new(format!(
                "Cannot iterate over {}",
                describe(other)
            )))
        }
    };
    items
        .iter()
        .try_fold(Value::Null, |acc, item| binop(BinOp::Add, &acc, item))
}

fn binop(op: BinOp, l: &Value, r: &Value) -> Result<Value, EvalError> {
    match op {
        BinOp::Add => add(l, r),
        BinOp::Sub => subtract(l, r),
        BinOp::Mul => multiply(l, r),
        BinOp::Div => divide(l, r),
        BinOp::Rem => remainder(l, r),
        BinOp::Eq => Ok(Value::Bool(compare(l, r) == Ordering::Equal)),
        BinOp::Ne => Ok(Value::Bool(compare(l, r) != Ordering::Equal)),
        BinOp::Lt => Ok(Value::Bool(compare(l, r) == Ordering::Less)),
        BinOp::Le => Ok(Value::Bool(compare(l, r) != Ordering::Greater)),
        BinOp::Gt => Ok(Value::Bool(compare(l, r) == Ordering::Greater)),
        BinOp::Ge => Ok(Value::Bool(compare(l, r) != Ordering::Less)),
    }
}

fn operand_error(l: &Value, r: &Value, verb: &str) -> EvalError {
    EvalError::new(format!(
        "{} and {} cannot be {}",
        describe(l),
        describe(r),
        verb
    ))
}

fn add(l: &Value, r: &Value) -> Result<Value, EvalError> {
    match (l, r) {
        (Value::Null, other) | (other, Value::Null) => Ok(other.clone()),
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a.add(*b))),
        (Value::String(a), Value::String(b)) => Ok(Value::string(format!("{}{}", a, b))),
        (Value::Array(a), Value::Array(b)) => {
            Ok(a.iter().chain(b.iter()).cloned().collect())
        }
        (Value::Object(_), Value::Object(b)) => {
            let mut merged = l.clone();
            for (k, v) in b.iter() {
                merged.object_insert(&**k, v.clone());
            }
            Ok(merged)
        }
        _ => Err(operand_error(l, r, "added")),
    }
}

fn subtract(l: &Value, r: &Value) -> Result<Value, EvalError> {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a.sub(*b))),
        (Value::Array(a), Value::Array(b)) => Ok(a
            .iter()
            .filter(|item| !b.iter().any(|x| compare(item, x) == Ordering::Equal))
            .cloned()
            .collect()),
        _ => Err(operand_error(l, r, "subtracted")),
    }
}

/// Largest string `"s" * n` may build.
const MAX_REPEAT_BYTES: usize = 1 << 28;

fn multiply(l: &Value, r: &Value) -> Result<Value, EvalError> {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a.mul(*b))),
        (Value::String(s), Value::Number(n)) | (Value::Number(n), Value::String(s)) => {
            let times = n.as_f64();
            if times <= 0.0 {
                return Ok(Value::Null);
            }
            let count = times.ceil() as usize;
            match count.checked_mul(s.len()) {
                Some(len) if len <= MAX_REPEAT_BYTES => Ok(Value::string(s.repeat(count))),
                _ => Err(EvalError::new("Repeat string result too long")),
            }
        }
        (Value::Object(_), Value::Object(_)) => Ok(deep_merge(l, r)),
        _ => Err(operand_error(l, r, "multiplied")),
    }
}

fn deep_merge(l: &Value, r: &Value) -> Value {
    let (Value::Object(_), Value::Object(right)) = (l, r) else {
        return r.clone();
    };
    let mut merged = l.clone();
    for (k, rv) in right.iter() {
        let combined = match merged.object_get(k) {
            Some(lv @ Value::Object(_)) if matches!(rv, Value::Object(_)) => deep_merge(lv, rv),
            _ => rv.clone(),
        };
        merged.object_insert(&**k, combined);
    }
    merged
}

fn divide(l: &Value, r: &Value) -> Result<Value, EvalError> {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => {
            if b.as_f64() == 0.0 {
                return Err(EvalError::new(format!(
                    "{} and {} cannot be divided because the divisor is zero",
                    describe(l),
                    describe(r)
                )));
            }
            Ok(Value::Number(a.div(*b)))
        }
        (Value::String(a), Value::String(sep)) => {
            if a.is_empty() {
                return Ok(Value::array());
            }
            Ok(a.split(&**sep).map(Value::string).collect())
        }
        _ => Err(operand_error(l, r, "divided")),
    }
}

fn remainder(l: &Value, r: &Value) -> Result<Value, EvalError> {
    let (Value::Number(a), Value::Number(b)) = (l, r) else {
        return Err(operand_error(l, r, "divided"));
    };
    let (a, b) = (a.as_f64() as i64, b.as_f64() as i64);
    if b == 0 {
        return Err(EvalError::new(format!(
            "{} and {} cannot be divided because the divisor is zero",
            describe(l),
            describe(r)
        )));
    }
    Ok(Value::int(a.checked_rem(b).unwrap_or(0)))
}

fn rank(v: &Value) -> u8 {
    match v {
        Value::Invalid(_) => 0,
        Value::Null => 1,
        Value::Bool(false) => 2,
        Value::Bool(true) => 3,
        Value::Number(_) => 4,
        Value::String(_) => 5,
        Value::Array(_) => 6,
        Value::Object(_) => 7,
    }
}

/// jq's total order: null < false < true < numbers < strings < arrays < objects.
pub(crate) fn compare(l: &Value, r: &Value) -> Ordering {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Array(a), Value::Array(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                match compare(x, y) {
                    Ordering::Equal => continue,
                    other => return other,
                }
            }
            a.len().cmp(&b.len())
        }
        (Value::Object(a), Value::Object(b)) => {
            let key_order = a.keys().cmp(b.keys());
            if key_order != Ordering::Equal {
                return key_order;
            }
            for (x, y) in a.values().zip(b.values()) {
                match compare(x, y) {
                    Ordering::Equal => continue,
                    other => return other,
                }
            }
            Ordering::Equal
        }
        _ => rank(l).cmp(&rank(r)),
    }
}
