//! Kacket lexer: a pull-based tokenizer over any character source.
//!
//! The lexer knows nothing about grammar. It skips whitespace and `;` line
//! comments, hands out one token per call, and keeps a single token of
//! lookahead for the parser. Once it fails it stays failed: every later
//! request replays the same error.

use std::iter::Peekable;
use std::str::Chars;

use crate::diagnostics::Result;
use crate::syntax::token::{Number, SpannedToken, Token};
use crate::{err_ctx, KacketError, Span};

/// Characters that end an atom run.
fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '[' | ']' | '\'' | '"' | ';')
}

/// Characters that can never start a token.
fn is_unrecognized(c: char) -> bool {
    c.is_control() || matches!(c, '`' | ',' | '{' | '}' | '|')
}

/// Classifies a maximal atom run as a numeric literal or a symbol.
///
/// A run is numeric only if it holds at least one digit and nothing but
/// digits, signs, `.` and exponent markers, so `+`, `...` or `nan` stay
/// symbols. A numeric run must be held exactly: an integer past `i64` or a
/// real that overflows to infinity is an error.
fn classify_atom(text: String) -> std::result::Result<Token, String> {
    let numeric_shape = text.chars().any(|c| c.is_ascii_digit())
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if !numeric_shape {
        return Ok(Token::Symbol(text));
    }
    if let Ok(n) = text.parse::<i64>() {
        return Ok(Token::Number(Number::Integer(n)));
    }
    let digits = text.strip_prefix(['+', '-']).unwrap_or(&text);
    if digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("integer literal `{}` does not fit in 64 bits", text));
    }
    match text.parse::<f64>() {
        Ok(r) if r.is_finite() => Ok(Token::Number(Number::Real(r))),
        Ok(_) => Err(format!("numeric literal `{}` is out of range", text)),
        Err(_) => Ok(Token::Symbol(text)),
    }
}

pub struct Lexer<I: Iterator<Item = char>> {
    chars: Peekable<I>,
    offset: usize,
    line: usize,
    column: usize,
    lookahead: Option<SpannedToken>,
    failure: Option<KacketError>,
}

impl<'a> Lexer<Chars<'a>> {
    /// Creates a lexer over an in-memory string.
    pub fn from_source(source: &'a str) -> Self {
        Lexer::new(source.chars())
    }
}

impl<I: Iterator<Item = char>> Lexer<I> {
    pub fn new(chars: I) -> Self {
        Self {
            chars: chars.peekable(),
            offset: 0,
            line: 1,
            column: 1,
            lookahead: None,
            failure: None,
        }
    }

    /// Returns the next token, or `Token::Eof` forever once the source is
    /// exhausted.
    pub fn next_token(&mut self) -> Result<SpannedToken> {
        if let Some(token) = self.lookahead.take() {
            return Ok(token);
        }
        self.lex()
    }

    /// Returns the next token without consuming it.
    pub fn peek_token(&mut self) -> Result<&SpannedToken> {
        let token = match self.lookahead.take() {
            Some(token) => token,
            None => self.lex()?,
        };
        Ok(self.lookahead.insert(token))
    }

    /// The position the next character would be read from.
    pub fn cursor_span(&self) -> Span {
        Span {
            start: self.offset,
            end: self.offset,
            line: self.line,
            column: self.column,
        }
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_trivia(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() {
                self.advance();
            } else if c == ';' {
                while let Some(c) = self.advance() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn at_delimiter_or_end(&mut self) -> bool {
        self.chars.peek().map_or(true, |&c| is_delimiter(c))
    }

    fn fail(&mut self, error: KacketError) -> Result<SpannedToken> {
        self.failure = Some(error.clone());
        Err(error)
    }

    fn lex(&mut self) -> Result<SpannedToken> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        self.skip_trivia();

        let start = self.cursor_span();
        let Some(c) = self.advance() else {
            return Ok(SpannedToken {
                token: Token::Eof,
                span: start,
            });
        };

        let token = match c {
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            '\'' => Token::Quote,
            '"' => match self.lex_string(start) {
                Ok(token) => token,
                Err(e) => return self.fail(e),
            },
            '#' => match self.lex_hash(start) {
                Ok(token) => token,
                Err(e) => return self.fail(e),
            },
            '.' if self.at_delimiter_or_end() => Token::Dot,
            c if is_unrecognized(c) => {
                let error = err_ctx!(
                    Lex,
                    format!("unrecognized character {:?} at {}", c, start),
                    start.to(self.cursor_span())
                );
                return self.fail(error);
            }
            c => match self.lex_atom(c, start) {
                Ok(token) => token,
                Err(e) => return self.fail(e),
            },
        };

        Ok(SpannedToken {
            token,
            span: start.to(self.cursor_span()),
        })
    }

    fn lex_string(&mut self, start: Span) -> Result<Token> {
        let mut text = String::new();
        loop {
            match self.advance() {
                Some('"') => return Ok(Token::String(text)),
                Some(c) => text.push(c),
                None => {
                    return Err(err_ctx!(
                        Lex,
                        format!("unterminated string starting at {}", start),
                        start.to(self.cursor_span()),
                        "close the string with `\"`"
                    ))
                }
            }
        }
    }

    fn lex_hash(&mut self, start: Span) -> Result<Token> {
        match self.advance() {
            Some(b @ ('t' | 'f')) => {
                if self.at_delimiter_or_end() {
                    Ok(Token::Boolean(b == 't'))
                } else {
                    let mut text = format!("#{}", b);
                    while !self.at_delimiter_or_end() {
                        if let Some(c) = self.advance() {
                            text.push(c);
                        }
                    }
                    Err(err_ctx!(
                        Lex,
                        format!("invalid boolean literal `{}` at {}", text, start),
                        start.to(self.cursor_span()),
                        "booleans are written `#t` or `#f`"
                    ))
                }
            }
            Some('\\') => match self.advance() {
                Some(c) => Ok(Token::Character(c)),
                None => Err(err_ctx!(
                    Lex,
                    format!("unterminated character literal at {}", start),
                    start.to(self.cursor_span())
                )),
            },
            Some(c) => Err(err_ctx!(
                Lex,
                format!("unrecognized character {:?} after `#` at {}", c, start),
                start.to(self.cursor_span()),
                "`#` starts `#t`, `#f` or a character literal `#\\c`"
            )),
            None => Err(err_ctx!(
                Lex,
                format!("unrecognized character '#' at {}", start),
                start.to(self.cursor_span())
            )),
        }
    }

    fn lex_atom(&mut self, first: char, start: Span) -> Result<Token> {
        let mut text = String::from(first);
        while let Some(&c) = self.chars.peek() {
            if is_delimiter(c) {
                break;
            }
            text.push(c);
            self.advance();
        }
        classify_atom(text).map_err(|message| {
            err_ctx!(
                Lex,
                format!("{} at {}", message, start),
                start.to(self.cursor_span())
            )
        })
    }
}

/// Yields tokens up to (not including) `Eof`, stopping after the first error.
impl<I: Iterator<Item = char>> Iterator for Lexer<I> {
    type Item = Result<SpannedToken>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failure.is_some() {
            return None;
        }
        match self.next_token() {
            Ok(SpannedToken {
                token: Token::Eof, ..
            }) => None,
            other => Some(other),
        }
    }
}

/// Tokenizes a whole string.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>> {
    Lexer::from_source(source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorType;

    fn tokens(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    fn sym(s: &str) -> Token {
        Token::Symbol(s.to_string())
    }

    #[test]
    fn tokenize_application() {
        assert_eq!(
            tokens("(+ 1 (fib n))"),
            vec![
                Token::LParen,
                sym("+"),
                Token::Number(Number::Integer(1)),
                Token::LParen,
                sym("fib"),
                sym("n"),
                Token::RParen,
                Token::RParen,
            ]
        );
    }

    #[test]
    fn tokenize_literals() {
        assert_eq!(
            tokens(r#"#t #f #\a "hello world" 1.5 -7"#),
            vec![
                Token::Boolean(true),
                Token::Boolean(false),
                Token::Character('a'),
                Token::String("hello world".into()),
                Token::Number(Number::Real(1.5)),
                Token::Number(Number::Integer(-7)),
            ]
        );
    }

    #[test]
    fn punctuation_stays_in_symbols() {
        assert_eq!(
            tokens("null? set! <= zero?-exp expval->num + - ... nan"),
            vec![
                sym("null?"),
                sym("set!"),
                sym("<="),
                sym("zero?-exp"),
                sym("expval->num"),
                sym("+"),
                sym("-"),
                sym("..."),
                sym("nan"),
            ]
        );
    }

    #[test]
    fn brackets_quotes_and_dots() {
        assert_eq!(
            tokens("['a . b]"),
            vec![
                Token::LBracket,
                Token::Quote,
                sym("a"),
                Token::Dot,
                sym("b"),
                Token::RBracket,
            ]
        );
    }

    #[test]
    fn comments_and_whitespace_are_skipped() {
        assert_eq!(
            tokens("; leading\n  (a ; trailing\n b)\n"),
            vec![Token::LParen, sym("a"), sym("b"), Token::RParen]
        );
    }

    #[test]
    fn eof_repeats() {
        let mut lexer = Lexer::from_source("x");
        assert_eq!(lexer.next_token().unwrap().token, sym("x"));
        assert_eq!(lexer.next_token().unwrap().token, Token::Eof);
        assert_eq!(lexer.next_token().unwrap().token, Token::Eof);
    }

    #[test]
    fn peek_does_not_consume() {
        let mut lexer = Lexer::from_source("(a)");
        assert_eq!(lexer.peek_token().unwrap().token, Token::LParen);
        assert_eq!(lexer.next_token().unwrap().token, Token::LParen);
        assert_eq!(lexer.next_token().unwrap().token, sym("a"));
    }

    #[test]
    fn spans_track_lines_and_columns() {
        let toks = tokenize("(a\n  bc)").unwrap();
        let bc = &toks[2];
        assert_eq!(bc.token, sym("bc"));
        assert_eq!((bc.span.line, bc.span.column), (2, 3));
        assert_eq!((bc.span.start, bc.span.end), (5, 7));
    }

    #[test]
    fn unterminated_string_fails() {
        let err = tokenize("(display \"oops").unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Lex);
        assert!(err.message().contains("unterminated string"));
        assert_eq!(err.span().map(|s| s.start), Some(9));
    }

    #[test]
    fn unrecognized_characters_fail() {
        assert!(tokenize("`x").is_err());
        assert!(tokenize("#q").is_err());
        assert!(tokenize("#true").is_err());
    }

    #[test]
    fn oversized_integer_fails() {
        let err = tokenize("(f 99999999999999999999)").unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Lex);
        assert!(err.message().contains("`99999999999999999999` does not fit in 64 bits"));
        assert_eq!(err.span().map(|s| (s.start, s.end)), Some((3, 23)));
        assert_eq!(
            tokens("-9223372036854775808"),
            vec![Token::Number(Number::Integer(i64::MIN))]
        );
    }

    #[test]
    fn infinite_real_fails() {
        let err = tokenize("1e400").unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Lex);
        assert!(err.message().contains("`1e400` is out of range"));
        assert_eq!(tokens("1e300"), vec![Token::Number(Number::Real(1e300))]);
    }

    #[test]
    fn malformed_numeric_runs_stay_symbols() {
        assert_eq!(tokens("1-2 1e"), vec![sym("1-2"), sym("1e")]);
    }

    #[test]
    fn lexing_stops_after_an_error() {
        let mut lexer = Lexer::from_source("{ a b");
        assert!(lexer.next_token().is_err());
        assert!(lexer.next_token().is_err());
        assert!(lexer.next().is_none());
    }
}
