//! The compiled artifact: a flat instruction list executed by the renderer.
//!
//! Expressions are lowered to postfix [`Op`] sequences, so the artifact stays
//! shallow however large an expression is.

use crate::tpl::expr::BinOp;
use crate::value::Value;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder jump target, patched once the target is known.
pub(crate) const FIXME: usize = usize::MAX;

/// One step of an expression, evaluated on a value stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Op {
    /// Push a literal
    Push(Value),

    /// Push a variable, `null` when unbound
    Load(String),

    /// Pop key and base, push the member
    Member,

    Neg,

    Not,

    /// Pop two operands, push the result
    Binary(BinOp),

    /// Short-circuit `and`: keep a falsy top and jump, otherwise pop it
    JumpIfFalsy(usize),

    /// Short-circuit `or`: keep a truthy top and jump, otherwise pop it
    JumpIfTruthy(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instr {
    /// Emit literal text
    Text(String),

    /// Evaluate the expression and emit its string form
    Emit(Vec<Op>),

    /// Jump to the instruction if the expression is falsy
    JumpIfFalse(Vec<Op>, usize),

    /// Jump to an instruction
    Jump(usize),

    /// Evaluate the iterable and start a loop binding `vars`
    LoopStart { vars: Vec<String>, iterable: Vec<Op> },

    /// Bind the next loop item, or end the loop and jump to the instruction
    Iterate(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub name: String,
    /// Template files this program was built from, the template itself first
    /// followed by its ancestors.
    pub sources: Vec<String>,
    pub compiled_at: DateTime<Utc>,
    pub instrs: Vec<Instr>,
}
