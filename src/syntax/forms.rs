//! Built-in special forms and their desugaring into the core tree.
//!
//! Every rule here runs with the open delimiter and the keyword already
//! consumed, and consumes the form's close delimiter itself.
//!
//! | Surface                                | Core                                                  |
//! |----------------------------------------|-------------------------------------------------------|
//! | `(define (f a...) body...)`            | `(define f (lambda (a...) body...))`                  |
//! | `(if c t)`                             | `(if c t '())`                                        |
//! | `(let loop ([n v]...) body...)`        | `(letrec ([loop (lambda (n...) body...)]) (loop v...))` |
//! | `(let* ([n1 v1][n2 v2]) body...)`      | `(let ([n1 v1]) (let ([n2 v2]) body...))`             |
//! | `(cond [t1 r1][t2 r2][else r3])`       | `(if t1 r1 (if t2 r2 r3))`                            |
//! | `(cond)`                               | `'()`                                                 |

use tracing::trace;

use crate::ast::builder::{chain_ifs, nest_lets};
use crate::ast::{Binding, Body, Expr};
use crate::diagnostics::Result;
use crate::extensions::FormReader;
use crate::syntax::parser::Parser;
use crate::syntax::token::Token;

/// Keywords handled by the core grammar, matched case-sensitively.
pub const SPECIAL_FORMS: &[&str] = &[
    "begin", "cond", "define", "if", "lambda", "let", "let*", "letrec",
];

pub fn is_special_form(keyword: &str) -> bool {
    SPECIAL_FORMS.contains(&keyword)
}

impl<I: Iterator<Item = char>> Parser<I> {
    pub(crate) fn read_special_form(&mut self, keyword: &str) -> Result<Expr> {
        match keyword {
            "define" => self.read_define(),
            "lambda" => self.read_lambda(),
            "if" => self.read_if(),
            "let" => self.read_let(),
            "let*" => self.read_let_star(),
            "letrec" => self.read_letrec(),
            "cond" => self.read_cond(),
            "begin" => self.read_begin(),
            other => Err(FormReader::error(self, &format!("a special form, not `{}`", other))),
        }
    }

    fn read_define(&mut self) -> Result<Expr> {
        let next = &self.peek_token()?.token;
        let plain = matches!(next, Token::Symbol(_));
        let shorthand = next.is_open();

        if plain {
            let name = FormReader::expect_symbol(self, "a name")?;
            let value = self.read_operand("a value in `define`")?;
            self.finish("define")?;
            Ok(Expr::define(name, value))
        } else if shorthand {
            self.next_token()?;
            let name = FormReader::expect_symbol(self, "a procedure name")?;
            let params = self.read_params()?;
            let body = FormReader::body(self, "define")?;
            trace!(name = %name, params = params.len(), "desugared procedure define");
            Ok(Expr::define(name, Expr::lambda(params, body)))
        } else {
            Err(FormReader::error(self, "a name or `(name param...)` after `define`"))
        }
    }

    /// Reads parameter names up to and including the close delimiter.
    fn read_params(&mut self) -> Result<Vec<String>> {
        let mut params = Vec::new();
        while self.list_continues()? {
            params.push(FormReader::expect_symbol(self, "a parameter name")?);
        }
        self.next_token()?;
        Ok(params)
    }

    fn read_lambda(&mut self) -> Result<Expr> {
        FormReader::expect_open(self, "a parameter list")?;
        let params = self.read_params()?;
        let body = FormReader::body(self, "lambda")?;
        Ok(Expr::lambda(params, body))
    }

    fn read_if(&mut self) -> Result<Expr> {
        let condition = self.read_operand("a condition in `if`")?;
        let then_branch = self.read_operand("a consequent in `if`")?;
        let else_branch = if self.list_continues()? {
            self.read_expr()?
        } else {
            trace!("desugared one-armed if");
            Expr::empty_list()
        };
        self.finish("if")?;
        Ok(Expr::if_else(condition, then_branch, else_branch))
    }

    /// Reads `([name value]...)`; either bracket kind may wrap each pair.
    fn read_bindings(&mut self) -> Result<Vec<Binding>> {
        FormReader::expect_open(self, "a binding list")?;
        let mut bindings = Vec::new();
        while self.list_continues()? {
            FormReader::expect_open(self, "a `[name value]` binding")?;
            let name = FormReader::expect_symbol(self, "a binding name")?;
            let value = self.read_operand("a binding value")?;
            if self.list_continues()? {
                return Err(FormReader::error(self, "`]` closing the binding"));
            }
            self.next_token()?;
            bindings.push(Binding::new(name, value));
        }
        self.next_token()?;
        Ok(bindings)
    }

    fn read_let(&mut self) -> Result<Expr> {
        let loop_name = self.peek_token()?.token.as_symbol().map(str::to_string);
        match loop_name {
            Some(name) => {
                self.next_token()?;
                self.read_named_let(name)
            }
            None => {
                let bindings = self.read_bindings()?;
                let body = FormReader::body(self, "let")?;
                Ok(Expr::Let { bindings, body })
            }
        }
    }

    /// `(let loop ([n v]...) body...)` binds `loop` recursively to a lambda
    /// over the binding names and calls it with the initial values.
    fn read_named_let(&mut self, name: String) -> Result<Expr> {
        let bindings = self.read_bindings()?;
        let body = FormReader::body(self, "let")?;
        trace!(name = %name, bindings = bindings.len(), "desugared named let");

        let (params, args): (Vec<String>, Vec<Expr>) =
            bindings.into_iter().map(|b| (b.name, b.value)).unzip();
        let mut call = Vec::with_capacity(args.len() + 1);
        call.push(Expr::symbol(name.clone()));
        call.extend(args);

        Ok(Expr::LetRec {
            bindings: vec![Binding::new(name, Expr::lambda(params, body))],
            body: Body::single(Expr::List(call)),
        })
    }

    fn read_let_star(&mut self) -> Result<Expr> {
        let bindings = self.read_bindings()?;
        let body = FormReader::body(self, "let*")?;
        trace!(bindings = bindings.len(), "desugared let*");
        Ok(nest_lets(bindings, body))
    }

    fn read_letrec(&mut self) -> Result<Expr> {
        let bindings = self.read_bindings()?;
        let body = FormReader::body(self, "letrec")?;
        Ok(Expr::LetRec { bindings, body })
    }

    /// Clauses fold right to left into nested `if`s. A final `else` clause
    /// supplies the innermost else branch; without one it is `'()`.
    fn read_cond(&mut self) -> Result<Expr> {
        let mut clauses = Vec::new();
        let mut tail = None;
        while self.list_continues()? {
            if tail.is_some() {
                return Err(FormReader::error(self, "`)` after the `else` clause"));
            }
            FormReader::expect_open(self, "a `[test result]` clause")?;
            let is_else = matches!(&self.peek_token()?.token, Token::Symbol(s) if s == "else");
            if is_else {
                self.next_token()?;
                tail = Some(self.read_operand("a result in the `else` clause")?);
            } else {
                let test = self.read_operand("a test in a `cond` clause")?;
                let result = self.read_operand("a result in a `cond` clause")?;
                clauses.push((test, result));
            }
            if self.list_continues()? {
                return Err(FormReader::error(self, "`]` closing the `cond` clause"));
            }
            self.next_token()?;
        }
        self.next_token()?;

        trace!(clauses = clauses.len(), has_else = tail.is_some(), "desugared cond");
        Ok(chain_ifs(clauses, tail.unwrap_or_else(Expr::empty_list)))
    }

    fn read_begin(&mut self) -> Result<Expr> {
        let forms = FormReader::body(self, "begin")?;
        Ok(Expr::Begin(forms.into_forms()))
    }
}
