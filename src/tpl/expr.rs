//! The expression language used inside `{{ }}`, `{% if %}` and `{% for %}`.
//!
//! Expressions are parsed once, at code generation time, lowered by
//! [`compile`] into postfix [`Op`]s and evaluated by [`eval`] against a
//! [`Context`]. They can only read the context: variable lookup, attribute
//! and index access, literals, comparison, `+`/`-` and the logical operators.

use crate::tpl::program::{FIXME, Op};
use crate::tpl::render_context::Context;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Var(String),
    Member(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    Not(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
}

/// `var of iterable` / `key, value of iterable`
#[derive(Debug, Clone, PartialEq)]
pub struct LoopHeader {
    pub vars: Vec<String>,
    pub iterable: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprError {
    pub message: String,
    /// Byte offset inside the expression text.
    pub offset: usize,
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (column {})", self.message, self.offset + 1)
    }
}

const RESERVED: &[&str] = &["and", "or", "not", "true", "false", "null", "undefined"];

/// Symbols, longest first so that `===` wins over `==`.
const SYMBOLS: &[&str] = &[
    "===", "!==", "==", "!=", "<=", ">=", "&&", "||", "<", ">", "!", "+", "-", ".", ",", "[",
    "]", "(", ")",
];

pub fn parse_expr(src: &str) -> Result<Expr, ExprError> {
    let mut p = ExprParser::new(src)?;
    let expr = p.parse_or()?;
    p.expect_end()?;
    Ok(expr)
}

pub fn parse_loop_header(src: &str) -> Result<LoopHeader, ExprError> {
    let mut p = ExprParser::new(src)?;
    let wrapped = p.eat_sym("(");
    let _ = p.eat_kw("let") || p.eat_kw("const") || p.eat_kw("var");
    let mut vars = vec![p.ident()?];
    if p.eat_sym(",") {
        vars.push(p.ident()?);
    }
    if !(p.eat_kw("of") || p.eat_kw("in")) {
        return Err(p.error("expected `of` or `in`"));
    }
    let iterable = p.parse_or()?;
    if wrapped {
        p.expect_sym(")")?;
    }
    p.expect_end()?;
    Ok(LoopHeader { vars, iterable })
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    Sym(&'static str),
}

struct ExprParser {
    toks: Vec<(Tok, usize)>,
    pos: usize,
    end: usize,
}

impl ExprParser {
    fn new(src: &str) -> Result<Self, ExprError> {
        Ok(Self {
            toks: lex(src)?,
            pos: 0,
            end: src.len(),
        })
    }

    fn peek(&self) -> Option<&Tok> {
        self.toks.get(self.pos).map(|(t, _)| t)
    }

    fn offset(&self) -> usize {
        self.toks.get(self.pos).map_or(self.end, |(_, o)| *o)
    }

    fn error(&self, message: impl Into<String>) -> ExprError {
        ExprError {
            message: message.into(),
            offset: self.offset(),
        }
    }

    fn eat_sym(&mut self, sym: &str) -> bool {
        if matches!(self.peek(), Some(Tok::Sym(s)) if *s == sym) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn eat_kw(&mut self, kw: &str) -> bool {
        if matches!(self.peek(), Some(Tok::Ident(s)) if s == kw) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn expect_sym(&mut self, sym: &str) -> Result<(), ExprError> {
        if self.eat_sym(sym) {
            Ok(())
        } else {
            Err(self.error(format!("expected `{}`", sym)))
        }
    }

    fn expect_end(&self) -> Result<(), ExprError> {
        match self.peek() {
            None => Ok(()),
            Some(_) => Err(self.error("unexpected trailing input")),
        }
    }

    fn ident(&mut self) -> Result<String, ExprError> {
        match self.peek() {
            Some(Tok::Ident(name)) if !RESERVED.contains(&name.as_str()) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.error("expected identifier")),
        }
    }

    fn parse_or(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_and()?;
        while self.eat_kw("or") || self.eat_sym("||") {
            let rhs = self.parse_and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_not()?;
        while self.eat_kw("and") || self.eat_sym("&&") {
            let rhs = self.parse_not()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_not(&mut self) -> Result<Expr, ExprError> {
        if self.eat_kw("not") || self.eat_sym("!") {
            return Ok(Expr::Not(Box::new(self.parse_not()?)));
        }
        self.parse_cmp()
    }

    fn parse_cmp(&mut self) -> Result<Expr, ExprError> {
        let lhs = self.parse_sum()?;
        let op = match self.peek() {
            Some(Tok::Sym("==" | "===")) => BinOp::Eq,
            Some(Tok::Sym("!=" | "!==")) => BinOp::Ne,
            Some(Tok::Sym("<")) => BinOp::Lt,
            Some(Tok::Sym("<=")) => BinOp::Le,
            Some(Tok::Sym(">")) => BinOp::Gt,
            Some(Tok::Sym(">=")) => BinOp::Ge,
            _ => return Ok(lhs),
        };
        self.pos += 1;
        let rhs = self.parse_sum()?;
        Ok(Expr::Binary(op, Box::new(lhs), Box::new(rhs)))
    }

    fn parse_sum(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_postfix()?;
        loop {
            let op = if self.eat_sym("+") {
                BinOp::Add
            } else if self.eat_sym("-") {
                BinOp::Sub
            } else {
                return Ok(lhs);
            };
            let rhs = self.parse_postfix()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_postfix(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat_sym(".") {
                let name = match self.peek() {
                    Some(Tok::Ident(name)) => name.clone(),
                    _ => return Err(self.error("expected attribute name after `.`")),
                };
                self.pos += 1;
                expr = Expr::Member(Box::new(expr), Box::new(Expr::Literal(Value::Str(name))));
            } else if self.eat_sym("[") {
                let index = self.parse_or()?;
                self.expect_sym("]")?;
                expr = Expr::Member(Box::new(expr), Box::new(index));
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        let Some(tok) = self.peek().cloned() else {
            return Err(self.error("unexpected end of expression"));
        };
        let expr = match tok {
            Tok::Str(s) => Expr::Literal(Value::Str(s)),
            Tok::Int(n) => Expr::Literal(Value::I64(n)),
            Tok::Float(n) => Expr::Literal(Value::F64(n)),
            Tok::Ident(name) => match name.as_str() {
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                "null" | "undefined" => Expr::Literal(Value::Null),
                kw if RESERVED.contains(&kw) => {
                    return Err(self.error(format!("unexpected keyword `{}`", kw)));
                }
                _ => Expr::Var(name),
            },
            Tok::Sym("(") => {
                self.pos += 1;
                let inner = self.parse_or()?;
                self.expect_sym(")")?;
                return Ok(inner);
            }
            Tok::Sym("-") => {
                self.pos += 1;
                return Ok(Expr::Neg(Box::new(self.parse_primary()?)));
            }
            Tok::Sym(s) => return Err(self.error(format!("unexpected `{}`", s))),
        };
        self.pos += 1;
        Ok(expr)
    }
}

fn lex(src: &str) -> Result<Vec<(Tok, usize)>, ExprError> {
    let mut toks = Vec::new();
    let mut chars = src.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '"' || c == '\'' {
            chars.next();
            let mut s = String::new();
            loop {
                match chars.next() {
                    Some((_, ch)) if ch == c => break,
                    Some((_, '\\')) => match chars.next() {
                        Some((_, 'n')) => s.push('\n'),
                        Some((_, 't')) => s.push('\t'),
                        Some((_, 'r')) => s.push('\r'),
                        Some((_, other)) => s.push(other),
                        None => break,
                    },
                    Some((_, ch)) => s.push(ch),
                    None => {
                        return Err(ExprError {
                            message: "unterminated string literal".to_string(),
                            offset: start,
                        });
                    }
                }
            }
            toks.push((Tok::Str(s), start));
        } else if c.is_ascii_digit() {
            let mut end = start;
            let mut is_float = false;
            while let Some(&(i, ch)) = chars.peek() {
                if ch.is_ascii_digit() {
                    chars.next();
                    end = i + 1;
                } else if ch == '.'
                    && !is_float
                    && src[i + 1..].starts_with(|d: char| d.is_ascii_digit())
                {
                    is_float = true;
                    chars.next();
                    end = i + 1;
                } else {
                    break;
                }
            }
            let text = &src[start..end];
            let tok = if is_float {
                text.parse().map(Tok::Float).ok()
            } else {
                text.parse()
                    .map(Tok::Int)
                    .or_else(|_| text.parse().map(Tok::Float))
                    .ok()
            };
            // overflowing literals would not survive the JSON artifact
            let tok = tok
                .filter(|t| !matches!(t, Tok::Float(n) if !n.is_finite()))
                .ok_or_else(|| ExprError {
                    message: format!("invalid number `{}`", text),
                    offset: start,
                })?;
            toks.push((tok, start));
        } else if c.is_alphabetic() || c == '_' || c == '$' {
            let mut end = start;
            while let Some(&(i, ch)) = chars.peek() {
                if ch.is_alphanumeric() || ch == '_' || ch == '$' {
                    chars.next();
                    end = i + ch.len_utf8();
                } else {
                    break;
                }
            }
            toks.push((Tok::Ident(src[start..end].to_string()), start));
        } else {
            let rest = &src[start..];
            let Some(sym) = SYMBOLS.iter().find(|s| rest.starts_with(**s)) else {
                return Err(ExprError {
                    message: format!("unexpected character `{}`", c),
                    offset: start,
                });
            };
            for _ in 0..sym.len() {
                chars.next();
            }
            toks.push((Tok::Sym(*sym), start));
        }
    }
    Ok(toks)
}

static NULL: Value = Value::Null;

/// Lowers `expr` into a postfix op sequence.
pub(crate) fn compile(expr: &Expr) -> Vec<Op> {
    let mut code = Vec::new();
    lower(expr, &mut code);
    code
}

fn lower(expr: &Expr, code: &mut Vec<Op>) {
    match expr {
        Expr::Literal(v) => code.push(Op::Push(v.clone())),
        Expr::Var(name) => code.push(Op::Load(name.clone())),
        Expr::Member(base, key) => {
            lower(base, code);
            lower(key, code);
            code.push(Op::Member);
        }
        Expr::Neg(inner) => {
            lower(inner, code);
            code.push(Op::Neg);
        }
        Expr::Not(inner) => {
            lower(inner, code);
            code.push(Op::Not);
        }
        Expr::Binary(op, lhs, rhs) => {
            lower(lhs, code);
            lower(rhs, code);
            code.push(Op::Binary(*op));
        }
        Expr::And(lhs, rhs) | Expr::Or(lhs, rhs) => {
            lower(lhs, code);
            let j = code.len();
            code.push(match expr {
                Expr::And(..) => Op::JumpIfFalsy(FIXME),
                _ => Op::JumpIfTruthy(FIXME),
            });
            lower(rhs, code);
            let n = code.len();
            if let Op::JumpIfFalsy(t) | Op::JumpIfTruthy(t) = &mut code[j] {
                *t = n;
            }
        }
    }
}

/// Evaluates compiled expression code. Unknown variables and missing members
/// are `null`.
pub(crate) fn eval<'c>(code: &'c [Op], ctx: &'c Context<'_>) -> Result<Cow<'c, Value>, String> {
    let mut stack: Vec<Cow<'c, Value>> = Vec::new();
    let mut pc = 0;

    while let Some(op) = code.get(pc) {
        match op {
            Op::Push(v) => stack.push(Cow::Borrowed(v)),
            Op::Load(name) => stack.push(Cow::Borrowed(ctx.lookup(name).unwrap_or(&NULL))),
            Op::Member => {
                let key = pop(&mut stack)?;
                let value = match pop(&mut stack)? {
                    Cow::Borrowed(base) => member(base, &key),
                    Cow::Owned(base) => Cow::Owned(member(&base, &key).into_owned()),
                };
                stack.push(value);
            }
            Op::Neg => {
                let value = negate(&*pop(&mut stack)?)?;
                stack.push(Cow::Owned(value));
            }
            Op::Not => {
                let value = !pop(&mut stack)?.is_truthy();
                stack.push(Cow::Owned(Value::Bool(value)));
            }
            Op::Binary(op) => {
                let r = pop(&mut stack)?;
                let l = pop(&mut stack)?;
                stack.push(Cow::Owned(binary(*op, &l, &r)?));
            }
            Op::JumpIfFalsy(j) | Op::JumpIfTruthy(j) => {
                let truthy = stack.last().ok_or_else(underflow)?.is_truthy();
                if truthy == matches!(op, Op::JumpIfTruthy(_)) {
                    pc = *j;
                    continue;
                }
                stack.pop();
            }
        }
        pc += 1;
    }

    let value = pop(&mut stack)?;
    if !stack.is_empty() {
        return Err("malformed expression code".to_string());
    }
    Ok(value)
}

fn pop<'c>(stack: &mut Vec<Cow<'c, Value>>) -> Result<Cow<'c, Value>, String> {
    stack.pop().ok_or_else(underflow)
}

fn underflow() -> String {
    "expression stack underflow".to_string()
}

fn negate(value: &Value) -> Result<Value, String> {
    match value {
        Value::I64(n) => Ok(n.checked_neg().map_or(Value::F64(-(*n as f64)), Value::I64)),
        Value::F64(n) => Ok(Value::F64(-n)),
        other => Err(format!("cannot negate {}", other.type_name())),
    }
}

fn member<'v>(base: &'v Value, key: &Value) -> Cow<'v, Value> {
    let length = || base.len().map_or(Value::Null, Value::from);
    match (base, key) {
        (Value::Map(m), key) => {
            let k = key.to_string();
            match m.get(&k) {
                Some(v) => Cow::Borrowed(v),
                None if k == "length" => Cow::Owned(length()),
                None => Cow::Borrowed(&NULL),
            }
        }
        (Value::List(items), key) => match index(key) {
            Some(i) => Cow::Borrowed(items.get(i).unwrap_or(&NULL)),
            None if matches!(key, Value::Str(k) if k == "length") => Cow::Owned(length()),
            None => Cow::Borrowed(&NULL),
        },
        (Value::Str(s), key) => match index(key) {
            Some(i) => Cow::Owned(
                s.chars()
                    .nth(i)
                    .map_or(Value::Null, |c| Value::Str(c.to_string())),
            ),
            None if matches!(key, Value::Str(k) if k == "length") => Cow::Owned(length()),
            None => Cow::Borrowed(&NULL),
        },
        _ => Cow::Borrowed(&NULL),
    }
}

fn index(key: &Value) -> Option<usize> {
    match key {
        Value::I64(n) => usize::try_from(*n).ok(),
        Value::F64(n) if n.fract() == 0.0 && *n >= 0.0 => Some(*n as usize),
        _ => None,
    }
}

fn binary(op: BinOp, l: &Value, r: &Value) -> Result<Value, String> {
    Ok(match op {
        BinOp::Eq => Value::Bool(equals(l, r)),
        BinOp::Ne => Value::Bool(!equals(l, r)),
        BinOp::Lt => Value::Bool(compare(l, r) == Some(Ordering::Less)),
        BinOp::Le => Value::Bool(matches!(compare(l, r), Some(Ordering::Less | Ordering::Equal))),
        BinOp::Gt => Value::Bool(compare(l, r) == Some(Ordering::Greater)),
        BinOp::Ge => Value::Bool(matches!(
            compare(l, r),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinOp::Add => match (l, r) {
            (Value::I64(a), Value::I64(b)) => a
                .checked_add(*b)
                .map_or(Value::F64(*a as f64 + *b as f64), Value::I64),
            _ => match (l.as_f64(), r.as_f64()) {
                (Some(a), Some(b)) => Value::F64(a + b),
                _ => Value::Str(format!("{}{}", l, r)),
            },
        },
        BinOp::Sub => match (l, r) {
            (Value::I64(a), Value::I64(b)) => a
                .checked_sub(*b)
                .map_or(Value::F64(*a as f64 - *b as f64), Value::I64),
            _ => match (l.as_f64(), r.as_f64()) {
                (Some(a), Some(b)) => Value::F64(a - b),
                _ => {
                    return Err(format!(
                        "cannot subtract {} from {}",
                        r.type_name(),
                        l.type_name()
                    ));
                }
            },
        },
    })
}

fn equals(l: &Value, r: &Value) -> bool {
    match (l.as_f64(), r.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => l == r,
    }
}

fn compare(l: &Value, r: &Value) -> Option<Ordering> {
    match (l, r) {
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => l.as_f64()?.partial_cmp(&r.as_f64()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> Value {
        [
            ("a", Value::I64(10)),
            ("b", Value::from("hello")),
            ("c", Value::Bool(true)),
            ("items", Value::from(vec!["Evan", "John", "Jane"])),
            ("user", [("name", "tom")].into_iter().collect()),
        ]
        .into_iter()
        .collect()
    }

    fn eval_str(src: &str) -> Value {
        let root = root();
        let ctx = Context::new(&root);
        let code = compile(&parse_expr(src).unwrap());
        eval(&code, &ctx).unwrap().into_owned()
    }

    #[test]
    fn test_literals_and_lookup() {
        assert_eq!(eval_str("a"), Value::I64(10));
        assert_eq!(eval_str("'it'"), Value::from("it"));
        assert_eq!(eval_str("\"x\\\"y\""), Value::from("x\"y"));
        assert_eq!(eval_str("1.5"), Value::F64(1.5));
        assert_eq!(eval_str("-3"), Value::I64(-3));
        assert_eq!(eval_str("missing"), Value::Null);
        assert_eq!(eval_str("null"), Value::Null);
    }

    #[test]
    fn test_member_access() {
        assert_eq!(eval_str("user.name"), Value::from("tom"));
        assert_eq!(eval_str("user['name']"), Value::from("tom"));
        assert_eq!(eval_str("items[2]"), Value::from("Jane"));
        assert_eq!(eval_str("items[7]"), Value::Null);
        assert_eq!(eval_str("items.length"), Value::I64(3));
        assert_eq!(eval_str("b.length"), Value::I64(5));
        assert_eq!(eval_str("b[1]"), Value::from("e"));
        assert_eq!(eval_str("missing.deep.path"), Value::Null);
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval_str("a == 10"), Value::Bool(true));
        assert_eq!(eval_str("a === 10.0"), Value::Bool(true));
        assert_eq!(eval_str("a != 5"), Value::Bool(true));
        assert_eq!(eval_str("b == 'hello'"), Value::Bool(true));
        assert_eq!(eval_str("a >= 18"), Value::Bool(false));
        assert_eq!(eval_str("'abc' < 'abd'"), Value::Bool(true));
        assert_eq!(eval_str("a < 'x'"), Value::Bool(false));
        assert_eq!(eval_str("missing == null"), Value::Bool(true));
    }

    #[test]
    fn test_logical_operators() {
        assert_eq!(eval_str("a == 10 and c"), Value::Bool(true));
        assert_eq!(eval_str("a == 1 or b == 'hello'"), Value::Bool(true));
        assert_eq!(eval_str("not c"), Value::Bool(false));
        assert_eq!(eval_str("!(a == 10) || false"), Value::Bool(false));
        assert_eq!(eval_str("missing || 'default'"), Value::from("default"));
        assert_eq!(eval_str("c && b"), Value::from("hello"));
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval_str("a + 1"), Value::I64(11));
        assert_eq!(eval_str("a - 0.5"), Value::F64(9.5));
        assert_eq!(eval_str("'#' + a"), Value::from("#10"));
        assert_eq!(eval_str("b + ' ' + user.name"), Value::from("hello tom"));
    }

    #[test]
    fn test_subtract_non_numbers() {
        let root = root();
        let ctx = Context::new(&root);
        let code = compile(&parse_expr("b - 1").unwrap());
        let err = eval(&code, &ctx).unwrap_err();
        assert!(err.contains("subtract"), "{}", err);
    }

    #[test]
    fn test_parse_errors() {
        let err = parse_expr("a ==").unwrap_err();
        assert_eq!(err.offset, 4);
        let err = parse_expr("a b").unwrap_err();
        assert_eq!(err.offset, 2);
        let err = parse_expr("'open").unwrap_err();
        assert_eq!(err.message, "unterminated string literal");
        assert!(parse_expr("a # b").is_err());
        assert!(parse_expr("").is_err());
        assert!(parse_expr("(a").is_err());
    }

    #[test]
    fn test_loop_headers() {
        let h = parse_loop_header("it of items").unwrap();
        assert_eq!(h.vars, vec!["it"]);
        assert_eq!(h.iterable, Expr::Var("items".into()));

        let h = parse_loop_header("(let it of items)").unwrap();
        assert_eq!(h.vars, vec!["it"]);

        let h = parse_loop_header("k, v in user").unwrap();
        assert_eq!(h.vars, vec!["k", "v"]);

        let h = parse_loop_header("x of (items)").unwrap();
        assert_eq!(h.iterable, Expr::Var("items".into()));

        assert!(parse_loop_header("items").is_err());
        assert!(parse_loop_header("a, b, c of items").is_err());
        assert!(parse_loop_header("(let it of items").is_err());
    }

    #[test]
    fn test_compile_short_circuit() {
        let code = compile(&parse_expr("a or b").unwrap());
        assert_eq!(
            code,
            vec![
                Op::Load("a".to_string()),
                Op::JumpIfTruthy(3),
                Op::Load("b".to_string()),
            ]
        );
        // the right operand is never evaluated
        assert_eq!(eval_str("c or missing - 1"), Value::Bool(true));
        assert_eq!(eval_str("not c and missing - 1"), Value::Bool(false));
    }

    #[test]
    fn test_long_chain_is_flat() {
        let src = vec!["a"; 200].join(" + ");
        let code = compile(&parse_expr(&src).unwrap());
        assert_eq!(code.len(), 200 + 199);
        assert_eq!(eval_str(&src), Value::I64(2000));

        let src = vec!["c"; 150].join(" and ");
        assert_eq!(eval_str(&src), Value::Bool(true));
    }

    #[test]
    fn test_number_out_of_range() {
        let digits = "9".repeat(400);
        let err = parse_expr(&digits).unwrap_err();
        assert_eq!(err.offset, 0);
        assert!(err.message.starts_with("invalid number"), "{}", err.message);
        assert_eq!(eval_str(&"9".repeat(25)), Value::F64(1e25));
    }
}
