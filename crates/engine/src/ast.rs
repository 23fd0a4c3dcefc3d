//! Compiled filter tree.
//!
//! Children are shared through `Rc` so a program compiled once can be
//! evaluated against many inputs without cloning the tree.

use std::rc::Rc;

use jqbridge_core::Value;

/// Binary arithmetic and comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

/// Built-in functions, resolved by name and arity at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// `empty`
    Empty,
    /// `error` / `error(f)`
    Error,
    /// `not`
    Not,
    /// `length`
    Length,
    /// `keys`
    Keys,
    /// `type`
    Type,
    /// `select(f)`
    Select,
    /// `range(n)` / `range(a; b)`
    Range,
    /// `recurse` / `recurse(f)`
    Recurse,
    /// `repeat(f)`
    Repeat,
    /// `limit(n; f)`
    Limit,
    /// `first(f)`
    First,
    /// `tostring`
    ToString,
    /// `tojson`
    ToJson,
    /// `add`
    AddAll,
    /// `has(k)`
    Has,
}

impl Builtin {
    /// Resolve `name/arity`
    pub fn lookup(name: &str, arity: usize) -> Option<Builtin> {
        let builtin = match (name, arity) {
            ("empty", 0) => Builtin::Empty,
            ("error", 0 | 1) => Builtin::Error,
            ("not", 0) => Builtin::Not,
            ("length", 0) => Builtin::Length,
            ("keys", 0) => Builtin::Keys,
            ("type", 0) => Builtin::Type,
            ("select", 1) => Builtin::Select,
            ("range", 1 | 2) => Builtin::Range,
            ("recurse", 0 | 1) => Builtin::Recurse,
            ("repeat", 1) => Builtin::Repeat,
            ("limit", 2) => Builtin::Limit,
            ("first", 1) => Builtin::First,
            ("tostring", 0) => Builtin::ToString,
            ("tojson", 0) => Builtin::ToJson,
            ("add", 0) => Builtin::AddAll,
            ("has", 1) => Builtin::Has,
            _ => return None,
        };
        Some(builtin)
    }
}

/// A node of the compiled program.
#[derive(Debug, Clone)]
pub enum Filter {
    /// `.`
    Identity,
    /// `..`
    RecurseAll,
    /// `target[key]`; the key is evaluated against the outer input
    Index(Rc<Filter>, Rc<Filter>),
    /// `target[]`
    Iterate(Rc<Filter>),
    /// `f?`
    Optional(Rc<Filter>),
    /// `f | g`
    Pipe(Rc<Filter>, Rc<Filter>),
    /// `f, g`
    Comma(Rc<Filter>, Rc<Filter>),
    /// A constant, including bound `$variables`
    Literal(Value),
    /// `[f]`, or `[]` when empty
    ArrayCons(Option<Rc<Filter>>),
    /// `{k: v, ...}`
    ObjectCons(Vec<(Rc<Filter>, Rc<Filter>)>),
    /// `-f`
    Neg(Rc<Filter>),
    /// `f op g`
    Binary(BinOp, Rc<Filter>, Rc<Filter>),
    /// `f and g`
    And(Rc<Filter>, Rc<Filter>),
    /// `f or g`
    Or(Rc<Filter>, Rc<Filter>),
    /// `f // g`
    Alternative(Rc<Filter>, Rc<Filter>),
    /// `if c then t else e end`
    If(Rc<Filter>, Rc<Filter>, Rc<Filter>),
    /// Builtin call with filter arguments
    Call(Builtin, Vec<Rc<Filter>>),
}
