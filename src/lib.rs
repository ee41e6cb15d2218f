//! Kacket: a reader for a small Scheme-family language.
//!
//! Source text is tokenized, parsed and desugared in one pass into a small
//! core tree ([`ast::Expr`]): `define`, `lambda`, `if`, `let`, `letrec`,
//! `begin`, `quote` and application. Keyword-headed forms outside the core
//! grammar are parsed by [`extensions`] registered per parser.
//!
//! ```rust
//! use kacket::syntax::Parser;
//!
//! let mut parser = Parser::from_source("(define (f n) n) (let* ([a 1]) a)");
//! assert_eq!(parser.parse_expr().unwrap().to_string(), "(define f (lambda (n) n))");
//! assert_eq!(parser.parse_expr().unwrap().to_string(), "(let ([a 1]) a)");
//! assert!(parser.next_expr().unwrap().is_none());
//! ```

pub use crate::diagnostics::{ErrorContext, ErrorType, KacketError, Result};
pub use crate::syntax::Span;

pub mod ast;
pub mod cli;
pub mod diagnostics;
pub mod extensions;
pub mod syntax;
