use serde::{Deserialize, Serialize};
use std::fmt;

use crate::syntax::Number;

/// A leaf of the expression tree.
///
/// # Examples
///
/// ```rust
/// use kacket::ast::Atom;
/// let a = Atom::Symbol("null?".to_string());
/// assert_eq!(a.type_name(), "Symbol");
/// assert_eq!(Atom::Boolean(true).to_string(), "#t");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Atom {
    Symbol(String),
    Number(Number),
    String(String),
    Boolean(bool),
    /// Never produced by the parser, which reads `#\c` as the symbol `c`.
    /// Kept for trees built by hand.
    Character(char),
}

impl Atom {
    pub fn type_name(&self) -> &'static str {
        match self {
            Atom::Symbol(_) => "Symbol",
            Atom::Number(_) => "Number",
            Atom::String(_) => "String",
            Atom::Boolean(_) => "Boolean",
            Atom::Character(_) => "Character",
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Atom::Symbol(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Symbol(s) => write!(f, "{}", s),
            Atom::Number(n) => write!(f, "{}", n),
            Atom::String(s) => write!(f, "\"{}\"", s),
            Atom::Boolean(true) => write!(f, "#t"),
            Atom::Boolean(false) => write!(f, "#f"),
            Atom::Character(c) => write!(f, "#\\{}", c),
        }
    }
}
