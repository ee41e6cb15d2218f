//! Syntax extensions: keyword-headed forms parsed outside the core grammar.
//!
//! When the parser opens a list whose first symbol is not a built-in special
//! form but is registered in an [`ExtensionRegistry`], it hands the rest of
//! the list to that keyword's [`SyntaxExtension`]. The handler reads from the
//! same token stream through a [`FormReader`], calling back into the core
//! parser for ordinary sub-expressions, and returns one [`Expr`] (usually an
//! [`Expr::Extension`] wrapping its own [`ExtensionNode`]).
//!
//! # Handler contract
//!
//! The handler is called with the open delimiter and the keyword already
//! consumed. It must consume everything up to and including the form's
//! closing delimiter, and nothing after it. The parser checks the nesting
//! depth when the handler returns and fails the parse if the contract was
//! broken.

use std::any::Any;
use std::fmt;

use serde_json::json;

use crate::ast::{Body, Expr};
use crate::diagnostics::Result;
use crate::syntax::{SpannedToken, Token};
use crate::{KacketError, Span};

pub mod builtin;
pub mod cases;
pub mod datatype;
pub mod registry;

pub use cases::{CaseClause, Cases};
pub use datatype::{DefineDatatype, Field, Variant};
pub use registry::ExtensionRegistry;
pub use builtin::register_std_extensions;

/// A tree node contributed by a syntax extension.
pub trait ExtensionNode: fmt::Debug + fmt::Display + Send + Sync {
    /// The keyword that produced this node, e.g. `"cases"`.
    fn kind(&self) -> &'static str;

    fn clone_box(&self) -> Box<dyn ExtensionNode>;

    fn as_any(&self) -> &dyn Any;

    /// Structured form used by JSON dumps.
    fn to_json(&self) -> serde_json::Value {
        json!({ "kind": self.kind(), "text": self.to_string() })
    }
}

/// Parses the remainder of a keyword-headed form.
pub trait SyntaxExtension: Send + Sync {
    fn parse(&self, keyword: &str, reader: &mut dyn FormReader) -> Result<Expr>;
}

impl<F> SyntaxExtension for F
where
    F: Fn(&str, &mut dyn FormReader) -> Result<Expr> + Send + Sync,
{
    fn parse(&self, keyword: &str, reader: &mut dyn FormReader) -> Result<Expr> {
        self(keyword, reader)
    }
}

/// The parsing context handed to extension handlers, bound to the parser's
/// token stream.
pub trait FormReader {
    /// Consumes and returns the next raw token.
    fn next_token(&mut self) -> Result<SpannedToken>;

    /// Returns the next raw token without consuming it.
    fn peek_token(&mut self) -> Result<&SpannedToken>;

    /// Parses one expression with the core grammar (desugaring included).
    fn parse_expr(&mut self) -> Result<Expr>;

    /// Parses one quoted-data datum: no desugaring, brackets read as lists.
    fn parse_datum(&mut self) -> Result<Expr>;

    /// True when the next token closes the current list. Running out of
    /// input here is an error: the list is unterminated.
    fn at_close(&mut self) -> Result<bool> {
        let next = self.peek_token()?;
        match next.token {
            Token::RParen | Token::RBracket => Ok(true),
            Token::Eof => Err(KacketError::unexpected(
                "`)` or `]`",
                &next.token,
                next.span,
            )),
            _ => Ok(false),
        }
    }

    fn expect_symbol(&mut self, what: &str) -> Result<String> {
        let next = self.next_token()?;
        match next.token {
            Token::Symbol(name) => Ok(name),
            other => Err(KacketError::unexpected(what, other, next.span)),
        }
    }

    fn expect_open(&mut self, what: &str) -> Result<Span> {
        let next = self.next_token()?;
        if next.token.is_open() {
            Ok(next.span)
        } else {
            Err(KacketError::unexpected(what, next.token, next.span))
        }
    }

    fn expect_close(&mut self) -> Result<Span> {
        let next = self.next_token()?;
        if next.token.is_close() {
            Ok(next.span)
        } else {
            Err(KacketError::unexpected("`)` or `]`", next.token, next.span))
        }
    }

    /// Reads a parenthesized list of symbols such as `(a b c)`.
    fn symbol_list(&mut self, what: &str) -> Result<Vec<String>> {
        self.expect_open(&format!("`(` opening {}", what))?;
        let mut names = Vec::new();
        while !self.at_close()? {
            names.push(self.expect_symbol(what)?);
        }
        self.expect_close()?;
        Ok(names)
    }

    /// Reads one or more expressions up to and including the close delimiter.
    fn body(&mut self, form: &str) -> Result<Body> {
        let mut forms = Vec::new();
        while !self.at_close()? {
            forms.push(self.parse_expr()?);
        }
        let close = self.next_token()?;
        Body::new(forms).ok_or_else(|| {
            KacketError::unexpected(format!("a body expression in `{}`", form), close.token, close.span)
        })
    }

    /// A parse error at the next token.
    fn error(&mut self, expected: &str) -> KacketError {
        match self.peek_token() {
            Ok(next) => KacketError::unexpected(expected, &next.token, next.span),
            Err(e) => e,
        }
    }
}
