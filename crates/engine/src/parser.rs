//! Recursive-descent parser producing a [`Filter`] tree.
//!
//! Precedence, loosest first: `|`, `,`, `//`, `or`, `and`, comparisons,
//! `+ -`, `* / %`, unary minus, postfix suffixes.

use std::rc::Rc;

use jqbridge_core::Value;

use crate::ast::{BinOp, Builtin, Filter};
use crate::error::CompileError;
use crate::lexer::{tokenize, Tok, Token};
use crate::Args;

const KEYWORDS: &[&str] = &[
    "and", "or", "if", "then", "elif", "else", "end", "true", "false", "null",
];

/// Compile program text into a filter tree, binding `$name` from `args`.
pub fn parse(src: &str, args: &Args) -> Result<Rc<Filter>, CompileError> {
    let tokens = tokenize(src)?;
    let mut parser = Parser {
        tokens,
        cursor: 0,
        args,
    };
    let filter = parser.pipe()?;
    parser.expect_eof()?;
    Ok(filter)
}

struct Parser<'a> {
    tokens: Vec<Token>,
    cursor: usize,
    args: &'a Args,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> &Tok {
        &self.tokens[self.cursor.min(self.tokens.len() - 1)].kind
    }

    fn peek_at(&self, offset: usize) -> &Tok {
        let idx = (self.cursor + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn pos(&self) -> usize {
        self.tokens[self.cursor.min(self.tokens.len() - 1)].pos
    }

    fn advance(&mut self) -> Tok {
        let tok = self.peek().clone();
        if self.cursor < self.tokens.len() - 1 {
            self.cursor += 1;
        }
        tok
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if self.peek() == tok {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, word: &str) -> bool {
        if matches!(self.peek(), Tok::Ident(name) if name == word) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: Tok) -> Result<(), CompileError> {
        if self.eat(&tok) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn expect_keyword(&mut self, word: &str) -> Result<(), CompileError> {
        if self.eat_keyword(word) {
            Ok(())
        } else {
            Err(CompileError::at(
                self.pos(),
                format!("expected '{}', found {}", word, describe(self.peek())),
            ))
        }
    }

    fn expect_eof(&self) -> Result<(), CompileError> {
        match self.peek() {
            Tok::Eof => Ok(()),
            _ => Err(self.unexpected()),
        }
    }

    fn unexpected(&self) -> CompileError {
        CompileError::at(
            self.pos(),
            format!("syntax error, unexpected {}", describe(self.peek())),
        )
    }

    // pipe := comma ('|' pipe)?
    fn pipe(&mut self) -> Result<Rc<Filter>, CompileError> {
        let lhs = self.comma()?;
        if self.eat(&Tok::Pipe) {
            let rhs = self.pipe()?;
            return Ok(Rc::new(Filter::Pipe(lhs, rhs)));
        }
        Ok(lhs)
    }

    fn comma(&mut self) -> Result<Rc<Filter>, CompileError> {
        let mut lhs = self.alternative()?;
        while self.eat(&Tok::Comma) {
            let rhs = self.alternative()?;
            lhs = Rc::new(Filter::Comma(lhs, rhs));
        }
        Ok(lhs)
    }

    fn alternative(&mut self) -> Result<Rc<Filter>, CompileError> {
        let lhs = self.or()?;
        if self.eat(&Tok::Alt) {
            let rhs = self.alternative()?;
            return Ok(Rc::new(Filter::Alternative(lhs, rhs)));
        }
        Ok(lhs)
    }

    fn or(&mut self) -> Result<Rc<Filter>, CompileError> {
        let mut lhs = self.and()?;
        while self.eat_keyword("or") {
            let rhs = self.and()?;
            lhs = Rc::new(Filter::Or(lhs, rhs));
        }
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Rc<Filter>, CompileError> {
        let mut lhs = self.comparison()?;
        while self.eat_keyword("and") {
            let rhs = self.comparison()?;
            lhs = Rc::new(Filter::And(lhs, rhs));
        }
        Ok(lhs)
    }

    // Comparisons do not chain.
    fn comparison(&mut self) -> Result<Rc<Filter>, CompileError> {
        let lhs = self.additive()?;
        let op = match self.peek() {
            Tok::Eq => BinOp::Eq,
            Tok::Ne => BinOp::Ne,
            Tok::Lt => BinOp::Lt,
            Tok::Le => BinOp::Le,
            Tok::Gt => BinOp::Gt,
            Tok::Ge => BinOp::Ge,
            _ => return Ok(lhs),
        };
        self.advance();
        let rhs = self.additive()?;
        if matches!(
            self.peek(),
            Tok::Eq | Tok::Ne | Tok::Lt | Tok::Le | Tok::Gt | Tok::Ge
        ) {
            return Err(self.unexpected());
        }
        Ok(Rc::new(Filter::Binary(op, lhs, rhs)))
    }

    fn additive(&mut self) -> Result<Rc<Filter>, CompileError> {
        let mut lhs = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Tok::Plus => BinOp::Add,
                Tok::Minus => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.multiplicative()?;
            lhs = Rc::new(Filter::Binary(op, lhs, rhs));
        }
    }

    fn multiplicative(&mut self) -> Result<Rc<Filter>, CompileError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Tok::Star => BinOp::Mul,
                Tok::Slash => BinOp::Div,
                Tok::Percent => BinOp::Rem,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.unary()?;
            lhs = Rc::new(Filter::Binary(op, lhs, rhs));
        }
    }

    fn unary(&mut self) -> Result<Rc<Filter>, CompileError> {
        if self.eat(&Tok::Minus) {
            let inner = self.unary()?;
            return Ok(Rc::new(Filter::Neg(inner)));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> Result<Rc<Filter>, CompileError> {
        let mut term = self.primary()?;
        loop {
            term = match self.peek().clone() {
                Tok::Field(name) => {
                    self.advance();
                    Rc::new(Filter::Index(term, literal_str(&name)))
                }
                Tok::Dot if matches!(self.peek_at(1), Tok::Str(_)) => {
                    self.advance();
                    let Tok::Str(name) = self.advance() else {
                        return Err(self.unexpected());
                    };
                    Rc::new(Filter::Index(term, literal_str(&name)))
                }
                Tok::Dot if matches!(self.peek_at(1), Tok::LBracket) => {
                    self.advance();
                    self.bracket_suffix(term)?
                }
                Tok::LBracket => self.bracket_suffix(term)?,
                Tok::Question => {
                    self.advance();
                    Rc::new(Filter::Optional(term))
                }
                _ => return Ok(term),
            };
        }
    }

    // '[' ']' or '[' pipe ']'
    fn bracket_suffix(&mut self, target: Rc<Filter>) -> Result<Rc<Filter>, CompileError> {
        self.expect(Tok::LBracket)?;
        if self.eat(&Tok::RBracket) {
            return Ok(Rc::new(Filter::Iterate(target)));
        }
        let key = self.pipe()?;
        self.expect(Tok::RBracket)?;
        Ok(Rc::new(Filter::Index(target, key)))
    }

    fn primary(&mut self) -> Result<Rc<Filter>, CompileError> {
        let pos = self.pos();
        match self.advance() {
            Tok::Dot => match self.peek().clone() {
                Tok::Str(name) => {
                    self.advance();
                    Ok(Rc::new(Filter::Index(
                        Rc::new(Filter::Identity),
                        literal_str(&name),
                    )))
                }
                _ => Ok(Rc::new(Filter::Identity)),
            },
            Tok::DotDot => Ok(Rc::new(Filter::RecurseAll)),
            Tok::Field(name) => Ok(Rc::new(Filter::Index(
                Rc::new(Filter::Identity),
                literal_str(&name),
            ))),
            Tok::Str(s) => Ok(literal_str(&s)),
            Tok::Int(i) => Ok(Rc::new(Filter::Literal(Value::int(i)))),
            Tok::Float(f) => Ok(Rc::new(Filter::Literal(Value::float(f)))),
            Tok::Var(name) => self.variable(pos, &name),
            Tok::LParen => {
                let inner = self.pipe()?;
                self.expect(Tok::RParen)?;
                Ok(inner)
            }
            Tok::LBracket => {
                if self.eat(&Tok::RBracket) {
                    return Ok(Rc::new(Filter::ArrayCons(None)));
                }
                let inner = self.pipe()?;
                self.expect(Tok::RBracket)?;
                Ok(Rc::new(Filter::ArrayCons(Some(inner))))
            }
            Tok::LBrace => self.object(),
            Tok::Ident(word) => self.word(pos, &word),
            other => Err(CompileError::at(
                pos,
                format!("syntax error, unexpected {}", describe(&other)),
            )),
        }
    }

    fn variable(&self, pos: usize, name: &str) -> Result<Rc<Filter>, CompileError> {
        match self.args.get(name) {
            Some(value) => Ok(Rc::new(Filter::Literal(value.clone()))),
            None => Err(CompileError::at(pos, format!("${} is not defined", name))),
        }
    }

    fn word(&mut self, pos: usize, word: &str) -> Result<Rc<Filter>, CompileError> {
        match word {
            "null" => return Ok(Rc::new(Filter::Literal(Value::Null))),
            "true" => return Ok(Rc::new(Filter::Literal(Value::Bool(true)))),
            "false" => return Ok(Rc::new(Filter::Literal(Value::Bool(false)))),
            "if" => return self.conditional(),
            w if KEYWORDS.contains(&w) => {
                return Err(CompileError::at(
                    pos,
                    format!("syntax error, unexpected keyword '{}'", w),
                ))
            }
            _ => {}
        }

        let mut args = Vec::new();
        if self.eat(&Tok::LParen) {
            loop {
                args.push(self.pipe()?);
                if self.eat(&Tok::Semicolon) {
                    continue;
                }
                self.expect(Tok::RParen)?;
                break;
            }
        }

        // map(f) is [.[] | f]
        if word == "map" && args.len() == 1 {
            let each = Rc::new(Filter::Iterate(Rc::new(Filter::Identity)));
            let body = Rc::new(Filter::Pipe(each, args.remove(0)));
            return Ok(Rc::new(Filter::ArrayCons(Some(body))));
        }

        match Builtin::lookup(word, args.len()) {
            Some(builtin) => Ok(Rc::new(Filter::Call(builtin, args))),
            None => Err(CompileError::at(
                pos,
                format!("{}/{} is not defined", word, args.len()),
            )),
        }
    }

    fn conditional(&mut self) -> Result<Rc<Filter>, CompileError> {
        let cond = self.pipe()?;
        self.expect_keyword("then")?;
        let then = self.pipe()?;
        let otherwise = if self.eat_keyword("elif") {
            self.conditional()?
        } else if self.eat_keyword("else") {
            let e = self.pipe()?;
            self.expect_keyword("end")?;
            e
        } else {
            self.expect_keyword("end")?;
            Rc::new(Filter::Identity)
        };
        Ok(Rc::new(Filter::If(cond, then, otherwise)))
    }

    fn object(&mut self) -> Result<Rc<Filter>, CompileError> {
        let mut entries = Vec::new();
        if self.eat(&Tok::RBrace) {
            return Ok(Rc::new(Filter::ObjectCons(entries)));
        }
        loop {
            let pos = self.pos();
            let entry = match self.advance() {
                Tok::Ident(name) => {
                    let key = literal_str(&name);
                    let value = if self.eat(&Tok::Colon) {
                        self.object_value()?
                    } else {
                        Rc::new(Filter::Index(Rc::new(Filter::Identity), key.clone()))
                    };
                    (key, value)
                }
                Tok::Str(name) => {
                    let key = literal_str(&name);
                    let value = if self.eat(&Tok::Colon) {
                        self.object_value()?
                    } else {
                        Rc::new(Filter::Index(Rc::new(Filter::Identity), key.clone()))
                    };
                    (key, value)
                }
                Tok::Var(name) => {
                    let value = self.variable(pos, &name)?;
                    let key = literal_str(&name);
                    if self.eat(&Tok::Colon) {
                        (value, self.object_value()?)
                    } else {
                        (key, value)
                    }
                }
                Tok::LParen => {
                    let key = self.pipe()?;
                    self.expect(Tok::RParen)?;
                    self.expect(Tok::Colon)?;
                    (key, self.object_value()?)
                }
                other => {
                    return Err(CompileError::at(
                        pos,
                        format!("syntax error, unexpected {} in object", describe(&other)),
                    ))
                }
            };
            entries.push(entry);

            if self.eat(&Tok::Comma) {
                continue;
            }
            self.expect(Tok::RBrace)?;
            return Ok(Rc::new(Filter::ObjectCons(entries)));
        }
    }

    // Object values bind tighter than ',' so entries stay separate.
    fn object_value(&mut self) -> Result<Rc<Filter>, CompileError> {
        let value = self.alternative()?;
        if self.eat(&Tok::Pipe) {
            let rest = self.object_value()?;
            return Ok(Rc::new(Filter::Pipe(value, rest)));
        }
        Ok(value)
    }
}

fn literal_str(s: &str) -> Rc<Filter> {
    Rc::new(Filter::Literal(Value::string(s)))
}

fn describe(tok: &Tok) -> String {
    match tok {
        Tok::Eof => "end of program".to_string(),
        Tok::Ident(name) => format!("'{}'", name),
        Tok::Field(name) => format!("'.{}'", name),
        Tok::Var(name) => format!("'${}'", name),
        Tok::Str(s) => format!("string \"{}\"", s),
        Tok::Int(i) => format!("number {}", i),
        Tok::Float(f) => format!("number {}", f),
        other => format!("{:?}", other),
    }
}
