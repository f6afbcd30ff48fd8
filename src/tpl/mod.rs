pub mod ast;
pub(crate) mod cache;
pub mod codegen;
pub mod engine;
pub mod expr;
pub mod lexer;
pub mod parser;
pub mod program;
mod render;
mod render_context;

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Byte range of a token inside the template source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}
