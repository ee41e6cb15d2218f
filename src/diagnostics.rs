//! Unified, `miette`-based diagnostics for the Kacket reader.
//!
//! Only two things can go wrong while reading source text: the lexer meets a
//! character it cannot start a token with (or a literal that never ends), or
//! the parser meets a token it did not expect. Both are represented by
//! [`KacketError`], and both abort the current read outright. There is no
//! recovery and no warning channel.
//!
//! # Error Construction Macros
//!
//! - **Use `err_msg!` for message-only errors.**
//!   - `err_msg!(Parse, "expected {}, found {}", "symbol", "number")`
//! - **Use `err_ctx!` when a span is known.**
//!   - `err_ctx!(Lex, "unterminated string", span)`
//!   - `err_ctx!(Parse, msg, span, help)`
//!
//! The lexer only ever sees a pull stream of characters, so errors are built
//! without source text. Drivers that hold the full text attach it afterwards
//! with [`KacketError::with_source`] so `miette` can render a snippet.

use std::fmt;
use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use thiserror::Error;

use crate::Span;

pub type SourceArc = Arc<NamedSource<String>>;

/// Text used as the `found` half of a parse error when the stream is exhausted.
pub const END_OF_INPUT: &str = "end of input";

/// What the parser expects when it starts reading a top-level form.
pub const TOP_LEVEL_FORM: &str = "a top-level form";

/// Type-safe classification of a [`KacketError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Unterminated literal or unrecognized character.
    Lex,
    /// Unexpected token or malformed form.
    Parse,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Lex => "Lex",
            ErrorType::Parse => "Parse",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where an error happened and how to help.
#[derive(Debug, Default, Clone)]
pub struct ErrorContext {
    /// The source text, once a driver has attached it.
    pub source: Option<SourceArc>,
    /// The offending span (if any).
    pub span: Option<Span>,
    /// An optional help message.
    pub help: Option<String>,
    /// Set when the input ran out before a top-level form started.
    pub end_of_input: bool,
}

impl ErrorContext {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_span(span: Span) -> Self {
        Self {
            span: Some(span),
            ..Self::default()
        }
    }

    pub fn with_span_and_help(span: Span, help: impl Into<String>) -> Self {
        Self {
            span: Some(span),
            help: Some(help.into()),
            ..Self::default()
        }
    }
}

/// The error type for every lexing and parsing failure.
#[derive(Debug, Clone, Error)]
pub enum KacketError {
    #[error("Lex error: {message}")]
    Lex { message: String, ctx: ErrorContext },
    #[error("Parse error: {message}")]
    Parse { message: String, ctx: ErrorContext },
}

pub type Result<T> = std::result::Result<T, KacketError>;

impl KacketError {
    fn ctx(&self) -> &ErrorContext {
        match self {
            KacketError::Lex { ctx, .. } | KacketError::Parse { ctx, .. } => ctx,
        }
    }

    fn ctx_mut(&mut self) -> &mut ErrorContext {
        match self {
            KacketError::Lex { ctx, .. } | KacketError::Parse { ctx, .. } => ctx,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            KacketError::Lex { message, .. } | KacketError::Parse { message, .. } => message,
        }
    }

    pub fn error_type(&self) -> ErrorType {
        match self {
            KacketError::Lex { .. } => ErrorType::Lex,
            KacketError::Parse { .. } => ErrorType::Parse,
        }
    }

    pub fn span(&self) -> Option<Span> {
        self.ctx().span
    }

    /// Builds the canonical "expected X, found Y" parse error.
    pub fn unexpected(expected: impl fmt::Display, found: impl fmt::Display, span: Span) -> Self {
        KacketError::Parse {
            message: format!("expected {}, found {}", expected, found),
            ctx: ErrorContext::with_span(span),
        }
    }

    /// The parse error for a stream that ran out before a top-level form
    /// started.
    pub fn end_of_input(span: Span) -> Self {
        let mut error = Self::unexpected(TOP_LEVEL_FORM, END_OF_INPUT, span);
        error.ctx_mut().end_of_input = true;
        error
    }

    /// True for the error built by [`KacketError::end_of_input`]. Running
    /// out in the middle of a form is an ordinary parse error.
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, KacketError::Parse { .. }) && self.ctx().end_of_input
    }

    /// Attaches the full source text so the error renders with a snippet.
    pub fn with_source(mut self, name: impl AsRef<str>, text: impl Into<String>) -> Self {
        self.ctx_mut().source = Some(Arc::new(NamedSource::new(name, text.into())));
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.ctx_mut().help = Some(help.into());
        self
    }
}

impl Diagnostic for KacketError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self {
            KacketError::Lex { .. } => "kacket::lex",
            KacketError::Parse { .. } => "kacket::parse",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.ctx()
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.ctx()
            .source
            .as_ref()
            .map(|s| s.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        // Without source text a label would point into nothing.
        let text_len = self.ctx().source.as_ref()?.inner().len();
        let span = self.ctx().span?;
        // End-of-input errors sit just past the text and must stay in bounds.
        let start = span.start.min(text_len);
        let end = span.end.max(span.start + 1).min(text_len);
        let label = LabeledSpan::new(
            Some(self.message().to_string()),
            start,
            end.saturating_sub(start),
        );
        Some(Box::new(std::iter::once(label)))
    }
}

/// Constructs a `KacketError` variant with a formatted message and no context.
#[macro_export]
macro_rules! err_msg {
    ($variant:ident, $msg:expr, $($arg:expr),+ $(,)?) => {
        $crate::KacketError::$variant {
            message: format!($msg, $($arg),+),
            ctx: $crate::ErrorContext::none(),
        }
    };
    ($variant:ident, $msg:expr) => {
        $crate::KacketError::$variant {
            message: format!("{}", $msg),
            ctx: $crate::ErrorContext::none(),
        }
    };
}

/// Constructs a `KacketError` variant with a message, a span and optional help.
#[macro_export]
macro_rules! err_ctx {
    ($variant:ident, $msg:expr, $span:expr, $help:expr) => {
        $crate::KacketError::$variant {
            message: $msg.to_string(),
            ctx: $crate::ErrorContext::with_span_and_help($span, format!("{}", $help)),
        }
    };
    ($variant:ident, $msg:expr, $span:expr) => {
        $crate::KacketError::$variant {
            message: $msg.to_string(),
            ctx: $crate::ErrorContext::with_span($span),
        }
    };
}
