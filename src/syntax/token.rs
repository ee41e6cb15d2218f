//! Token types produced by the lexer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Span;

/// A numeric literal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Number {
    Integer(i64),
    Real(f64),
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(n) => write!(f, "{}", n),
            // Whole reals keep a decimal point so they never read back as integers.
            Number::Real(r) if r.is_finite() && r.fract() == 0.0 => write!(f, "{:.1}", r),
            Number::Real(r) => write!(f, "{}", r),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Token {
    LParen,
    RParen,
    LBracket,
    RBracket,
    Quote,
    Dot,
    Symbol(String),
    Number(Number),
    String(String),
    Boolean(bool),
    Character(char),
    Eof,
}

impl Token {
    pub fn is_open(&self) -> bool {
        matches!(self, Token::LParen | Token::LBracket)
    }

    pub fn is_close(&self) -> bool {
        matches!(self, Token::RParen | Token::RBracket)
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Token::Symbol(s) => Some(s),
            _ => None,
        }
    }
}

/// Describes the token the way error messages quote it.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LParen => write!(f, "`(`"),
            Token::RParen => write!(f, "`)`"),
            Token::LBracket => write!(f, "`[`"),
            Token::RBracket => write!(f, "`]`"),
            Token::Quote => write!(f, "`'`"),
            Token::Dot => write!(f, "`.`"),
            Token::Symbol(s) => write!(f, "symbol `{}`", s),
            Token::Number(n) => write!(f, "number `{}`", n),
            Token::String(s) => write!(f, "string \"{}\"", s),
            Token::Boolean(true) => write!(f, "boolean `#t`"),
            Token::Boolean(false) => write!(f, "boolean `#f`"),
            Token::Character(c) => write!(f, "character `#\\{}`", c),
            Token::Eof => write!(f, "{}", crate::diagnostics::END_OF_INPUT),
        }
    }
}

/// A token together with where it was read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_reals_keep_their_decimal_point() {
        assert_eq!(Number::Real(2.0).to_string(), "2.0");
        assert_eq!(Number::Real(-0.5).to_string(), "-0.5");
        assert_eq!(Number::Integer(114514).to_string(), "114514");
    }

    #[test]
    fn tokens_describe_themselves_for_errors() {
        assert_eq!(Token::Symbol("car".into()).to_string(), "symbol `car`");
        assert_eq!(Token::Character('a').to_string(), "character `#\\a`");
        assert_eq!(Token::Eof.to_string(), "end of input");
    }
}
