//! Syntax module for the Kacket language
//!
//! Reading happens in two layers: the [`lexer`] turns a pull stream of
//! characters into [`token`]s, and the [`parser`] turns tokens into canonical
//! [`Expr`](crate::ast::Expr) trees, desugaring surface forms as it goes (the
//! built-in rules live in [`forms`]).

use serde::{Deserialize, Serialize};

pub mod forms;
pub mod lexer;
pub mod parser;
pub mod token;

pub use lexer::{tokenize, Lexer};
pub use parser::{parse_str, parse_str_with, Parser};
pub use token::{Number, SpannedToken, Token};

/// A region of source text.
///
/// `start` and `end` are byte offsets; `line` and `column` are 1-based and
/// describe `start`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    /// A zero-width span at the very beginning of a stream.
    pub fn origin() -> Self {
        Self {
            start: 0,
            end: 0,
            line: 1,
            column: 1,
        }
    }

    /// Extends this span so it ends where `other` ends.
    pub fn to(self, other: Span) -> Span {
        Span {
            end: other.end.max(self.end),
            ..self
        }
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::origin()
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
