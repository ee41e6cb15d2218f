//! Kacket Parser - recursive descent over the lexer's token stream
//!
//! Each call to [`Parser::parse_expr`] consumes exactly one top-level form and
//! returns its canonical [`Expr`]. Dispatch for a form:
//!
//! 1. `'` reads one datum and wraps it in [`Expr::Quote`].
//! 2. A literal or symbol token becomes an atom. A character literal `#\c`
//!    becomes the bare symbol `c`.
//! 3. An open delimiter starts a list. If its first token is a built-in
//!    special form keyword the matching rule in [`forms`](super::forms)
//!    desugars it; otherwise, if the keyword is registered in the
//!    [`ExtensionRegistry`], the extension parses the rest of the form;
//!    otherwise the list is an application.
//!
//! There is no recovery: any error aborts the current call, and the caller
//! should discard the parser.

use std::str::Chars;

use tracing::debug;

use crate::ast::Expr;
use crate::diagnostics::{Result, TOP_LEVEL_FORM};
use crate::extensions::{ExtensionRegistry, FormReader, SyntaxExtension};
use crate::syntax::forms::is_special_form;
use crate::syntax::lexer::Lexer;
use crate::syntax::token::{SpannedToken, Token};
use crate::KacketError;

pub struct Parser<I: Iterator<Item = char>> {
    lexer: Lexer<I>,
    registry: ExtensionRegistry,
    /// Open delimiters consumed and not yet closed.
    depth: usize,
    /// Extension handlers currently running, innermost last.
    fences: Vec<Fence>,
    halted: bool,
}

/// The form an extension handler was given. Once the handler consumes the
/// form's close delimiter the depth drops below `depth`, and every further
/// read from the stream fails until the handler returns.
struct Fence {
    keyword: String,
    depth: usize,
}

impl<'a> Parser<Chars<'a>> {
    /// A parser over an in-memory string with no extensions.
    pub fn from_source(source: &'a str) -> Self {
        Parser::new(Lexer::from_source(source))
    }

    pub fn from_source_with_registry(source: &'a str, registry: ExtensionRegistry) -> Self {
        Parser::with_registry(Lexer::from_source(source), registry)
    }
}

impl<I: Iterator<Item = char>> Parser<I> {
    pub fn new(lexer: Lexer<I>) -> Self {
        Self::with_registry(lexer, ExtensionRegistry::new())
    }

    pub fn with_registry(lexer: Lexer<I>, registry: ExtensionRegistry) -> Self {
        Self {
            lexer,
            registry,
            depth: 0,
            fences: Vec::new(),
            halted: false,
        }
    }

    /// Adds a syntax extension to this parser session.
    pub fn register_extension(
        &mut self,
        keyword: impl Into<String>,
        extension: impl SyntaxExtension + 'static,
    ) {
        self.registry.register(keyword, extension);
    }

    /// Parses the next top-level form.
    ///
    /// When the input is exhausted this fails with a parse error for which
    /// [`KacketError::is_end_of_input`] is true. Use [`Parser::next_expr`] to
    /// get `None` instead.
    pub fn parse_expr(&mut self) -> Result<Expr> {
        let next = self.lexer.peek_token()?;
        match next.token {
            Token::Eof => Err(KacketError::end_of_input(next.span)),
            Token::RParen | Token::RBracket => Err(KacketError::unexpected(
                TOP_LEVEL_FORM,
                &next.token,
                next.span,
            )),
            _ => self.read_expr(),
        }
    }

    /// Parses the next top-level form, or returns `None` at end of input.
    pub fn next_expr(&mut self) -> Result<Option<Expr>> {
        if self.lexer.peek_token()?.token == Token::Eof {
            return Ok(None);
        }
        self.parse_expr().map(Some)
    }

    // ------------------------------------------------------------------------
    // Token cursor
    // ------------------------------------------------------------------------

    pub(crate) fn next_token(&mut self) -> Result<SpannedToken> {
        if let Some(fence) = self.fences.last() {
            if self.depth < fence.depth {
                let next = self.lexer.peek_token()?;
                return Err(KacketError::unexpected(
                    format!("extension `{}` to stop after its own form", fence.keyword),
                    format!("a read of {}", next.token),
                    next.span,
                ));
            }
        }

        let next = self.lexer.next_token()?;
        if next.token.is_open() {
            self.depth += 1;
        } else if next.token.is_close() {
            self.depth = match self.depth.checked_sub(1) {
                Some(depth) => depth,
                None => {
                    return Err(KacketError::unexpected(
                        "an open delimiter before this one",
                        &next.token,
                        next.span,
                    ))
                }
            };
        }
        Ok(next)
    }

    pub(crate) fn peek_token(&mut self) -> Result<&SpannedToken> {
        self.lexer.peek_token()
    }

    /// True when the next token closes the current list; fails if the list
    /// is never closed.
    pub(crate) fn list_continues(&mut self) -> Result<bool> {
        FormReader::at_close(self).map(|closed| !closed)
    }

    /// Reads one operand of a special form, failing with `what` if the form
    /// ends first.
    pub(crate) fn read_operand(&mut self, what: &str) -> Result<Expr> {
        if !self.list_continues()? {
            return Err(FormReader::error(self, what));
        }
        self.read_expr()
    }

    /// Consumes the close delimiter of a form that takes no more operands.
    pub(crate) fn finish(&mut self, form: &str) -> Result<()> {
        if self.list_continues()? {
            return Err(FormReader::error(self, &format!("`)` closing `{}`", form)));
        }
        self.next_token()?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------------

    pub(crate) fn read_expr(&mut self) -> Result<Expr> {
        let next = self.next_token()?;
        match next.token {
            Token::Quote => Ok(Expr::quote(self.read_datum()?)),
            Token::Symbol(name) => Ok(Expr::symbol(name)),
            Token::Character(c) => Ok(Expr::symbol(c.to_string())),
            Token::Number(n) => Ok(Expr::number(n)),
            Token::String(s) => Ok(Expr::string(s)),
            Token::Boolean(b) => Ok(Expr::boolean(b)),
            Token::LParen | Token::LBracket => self.read_list(),
            Token::Dot => Err(KacketError::unexpected("an expression", &next.token, next.span)
                .with_help("dotted pairs are not part of the core syntax")),
            Token::RParen | Token::RBracket | Token::Eof => {
                Err(KacketError::unexpected("an expression", &next.token, next.span))
            }
        }
    }

    /// Reads quoted data: atoms, nested quotes and lists, with no desugaring.
    pub(crate) fn read_datum(&mut self) -> Result<Expr> {
        let next = self.next_token()?;
        match next.token {
            Token::Quote => Ok(Expr::quote(self.read_datum()?)),
            Token::Symbol(name) => Ok(Expr::symbol(name)),
            Token::Character(c) => Ok(Expr::symbol(c.to_string())),
            Token::Number(n) => Ok(Expr::number(n)),
            Token::String(s) => Ok(Expr::string(s)),
            Token::Boolean(b) => Ok(Expr::boolean(b)),
            Token::LParen | Token::LBracket => {
                let mut items = Vec::new();
                while self.list_continues()? {
                    items.push(self.read_datum()?);
                }
                self.next_token()?;
                Ok(Expr::List(items))
            }
            Token::Dot | Token::RParen | Token::RBracket | Token::Eof => Err(
                KacketError::unexpected("a datum after `'`", &next.token, next.span),
            ),
        }
    }

    /// Reads the rest of a list whose open delimiter was just consumed.
    fn read_list(&mut self) -> Result<Expr> {
        if !self.list_continues()? {
            self.next_token()?;
            return Ok(Expr::List(Vec::new()));
        }

        let keyword = self.peek_token()?.token.as_symbol().map(str::to_string);
        if let Some(keyword) = keyword {
            if is_special_form(&keyword) {
                self.next_token()?;
                return self.read_special_form(&keyword);
            }
            if self.registry.contains(&keyword) {
                self.next_token()?;
                return self.read_extension(&keyword);
            }
        }

        self.read_application()
    }

    fn read_extension(&mut self, keyword: &str) -> Result<Expr> {
        let Some(extension) = self.registry.lookup(keyword).cloned() else {
            return Err(FormReader::error(self, "a registered syntax extension"));
        };
        let form_depth = self.depth;
        debug!(keyword, depth = form_depth, "dispatching to syntax extension");

        self.fences.push(Fence {
            keyword: keyword.to_string(),
            depth: form_depth,
        });
        let result = extension.parse(keyword, self);
        self.fences.pop();
        let expr = result?;

        if self.depth + 1 != form_depth {
            let position = self.lexer.cursor_span();
            return Err(KacketError::unexpected(
                format!("extension `{}` to consume exactly its own form", keyword),
                format!("it stopped at nesting depth {} of {}", self.depth, form_depth),
                position,
            ));
        }
        Ok(expr)
    }

    fn read_application(&mut self) -> Result<Expr> {
        let head_span = self.peek_token()?.span;
        let head = self.read_expr()?;
        if head.is_literal() {
            return Err(KacketError::unexpected(
                "a symbol or form in operator position",
                format!("the literal `{}`", head),
                head_span,
            )
            .with_help("quote the list if it is data: '(...)"));
        }

        let mut items = vec![head];
        while self.list_continues()? {
            items.push(self.read_expr()?);
        }
        self.next_token()?;
        Ok(Expr::List(items))
    }
}

impl<I: Iterator<Item = char>> FormReader for Parser<I> {
    fn next_token(&mut self) -> Result<SpannedToken> {
        Parser::next_token(self)
    }

    fn peek_token(&mut self) -> Result<&SpannedToken> {
        Parser::peek_token(self)
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        self.read_expr()
    }

    fn parse_datum(&mut self) -> Result<Expr> {
        self.read_datum()
    }
}

/// Yields top-level forms in source order and stops after the first error.
impl<I: Iterator<Item = char>> Iterator for Parser<I> {
    type Item = Result<Expr>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.halted {
            return None;
        }
        match self.next_expr() {
            Ok(Some(expr)) => Some(Ok(expr)),
            Ok(None) => None,
            Err(e) => {
                self.halted = true;
                Some(Err(e))
            }
        }
    }
}

/// Parses every top-level form in `source` with no extensions.
pub fn parse_str(source: &str) -> Result<Vec<Expr>> {
    Parser::from_source(source).collect()
}

/// Parses every top-level form in `source` with the given extensions.
pub fn parse_str_with(source: &str, registry: ExtensionRegistry) -> Result<Vec<Expr>> {
    Parser::from_source_with_registry(source, registry).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorType;

    fn parse_one(source: &str) -> String {
        Parser::from_source(source).parse_expr().unwrap().to_string()
    }

    #[test]
    fn atoms() {
        assert_eq!(parse_one("42"), "42");
        assert_eq!(parse_one("\"hi\""), "\"hi\"");
        assert_eq!(parse_one("#t"), "#t");
        assert_eq!(parse_one("fib-iter"), "fib-iter");
    }

    #[test]
    fn character_literal_reads_as_symbol() {
        assert_eq!(parse_one("#\\a"), "a");
        assert_eq!(
            Parser::from_source("#\\a").parse_expr().unwrap(),
            Parser::from_source("a").parse_expr().unwrap()
        );
    }

    #[test]
    fn brackets_group_like_parens() {
        assert_eq!(parse_one("[f [g x] (h y)]"), "(f (g x) (h y))");
        assert_eq!(parse_one("(f x]"), "(f x)");
    }

    #[test]
    fn empty_list() {
        assert_eq!(parse_one("()"), "()");
    }

    #[test]
    fn quoted_data_is_not_desugared() {
        assert_eq!(parse_one("'(define (f x) x)"), "'(define (f x) x)");
        assert_eq!(parse_one("'[a [b]]"), "'(a (b))");
        assert_eq!(parse_one("''x"), "''x");
    }

    #[test]
    fn literal_operator_is_rejected() {
        let err = Parser::from_source("('(a b c) 114 514)").parse_expr().unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Parse);
        assert!(err.message().contains("operator position"));
        assert!(Parser::from_source("(1 2)").parse_expr().is_err());
    }

    #[test]
    fn literal_operator_names_the_head() {
        let err = Parser::from_source("(\"f\" x)").parse_expr().unwrap_err();
        assert_eq!(
            err.message(),
            "expected a symbol or form in operator position, found the literal `\"f\"`"
        );
        let err = Parser::from_source("('(a b) c)").parse_expr().unwrap_err();
        assert!(err.message().ends_with("found the literal `'(a b)`"));
        assert_eq!(err.span().map(|s| s.column), Some(2));
        assert_eq!(parse_one("((f) x)"), "((f) x)");
    }

    #[test]
    fn unterminated_list_fails() {
        let err = Parser::from_source("(+ 1").parse_expr().unwrap_err();
        assert_eq!(err.message(), "expected `)` or `]`, found end of input");
        assert!(!err.is_end_of_input());
    }

    #[test]
    fn stray_close_fails() {
        let err = Parser::from_source(")").parse_expr().unwrap_err();
        assert_eq!(err.message(), "expected a top-level form, found `)`");
    }

    #[test]
    fn dot_is_rejected() {
        assert!(Parser::from_source("(a . b)").parse_expr().is_err());
    }

    #[test]
    fn end_of_input_after_last_form() {
        let mut parser = Parser::from_source("(define x 10) x");
        assert_eq!(parser.parse_expr().unwrap().to_string(), "(define x 10)");
        assert_eq!(parser.parse_expr().unwrap().to_string(), "x");
        let err = parser.parse_expr().unwrap_err();
        assert!(err.is_end_of_input());
        assert!(parser.next_expr().unwrap().is_none());
    }

    #[test]
    fn lexer_errors_surface_through_the_parser() {
        let err = Parser::from_source("(f \"abc").parse_expr().unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Lex);
    }

    #[test]
    fn iterator_stops_after_error() {
        let results: Vec<_> = Parser::from_source("a (b c").collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }
}
