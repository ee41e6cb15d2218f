//! `cases`: pattern dispatch over the variants of a `define-datatype`.
//!
//! ```text
//! (cases expression exp
//!   (const-exp (num) (num-val num))
//!   (diff-exp (exp1 exp2) (- (value-of exp1) (value-of exp2)))
//!   (else (report-error exp)))
//! ```
//!
//! The scrutinee and every clause body are ordinary expressions read by the
//! core parser. A clause body may hold several forms. `else` is optional and
//! must come last.

use std::any::Any;
use std::fmt;

use serde::Serialize;
use serde_json::json;
use tracing::trace;

use crate::ast::{write_joined, Body, Expr};
use crate::diagnostics::Result;
use crate::extensions::{ExtensionNode, FormReader};
use crate::syntax::Token;

pub const KEYWORD: &str = "cases";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cases {
    pub type_name: String,
    pub scrutinee: Expr,
    pub clauses: Vec<CaseClause>,
    pub default: Option<Body>,
}

/// `(tag (param...) body...)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseClause {
    pub tag: String,
    pub params: Vec<String>,
    pub body: Body,
}

impl fmt::Display for CaseClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} (", self.tag)?;
        write_joined(f, &self.params, " ")?;
        write!(f, ") {}]", self.body)
    }
}

impl fmt::Display for Cases {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {}", KEYWORD, self.type_name, self.scrutinee)?;
        if !self.clauses.is_empty() || self.default.is_some() {
            f.write_str(" ")?;
        }
        write_joined(f, &self.clauses, "")?;
        if let Some(default) = &self.default {
            write!(f, "[else {}]", default)?;
        }
        f.write_str(")")
    }
}

impl ExtensionNode for Cases {
    fn kind(&self) -> &'static str {
        KEYWORD
    }

    fn clone_box(&self) -> Box<dyn ExtensionNode> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn to_json(&self) -> serde_json::Value {
        json!({ "kind": KEYWORD, "node": self })
    }
}

/// Handler for `(cases type scrutinee clause...)`.
pub fn parse_cases(_keyword: &str, reader: &mut dyn FormReader) -> Result<Expr> {
    let type_name = reader.expect_symbol("a datatype name")?;
    if reader.at_close()? {
        return Err(reader.error("an expression to dispatch on"));
    }
    let scrutinee = reader.parse_expr()?;

    let mut clauses = Vec::new();
    let mut default = None;
    while !reader.at_close()? {
        if default.is_some() {
            return Err(reader.error("`)` after the `else` clause"));
        }
        reader.expect_open("`(` opening a cases clause")?;
        let is_else = matches!(&reader.peek_token()?.token, Token::Symbol(s) if s == "else");
        if is_else {
            reader.next_token()?;
            default = Some(reader.body("else clause")?);
        } else {
            let tag = reader.expect_symbol("a variant tag")?;
            let params = reader.symbol_list("a clause parameter")?;
            let body = reader.body("cases clause")?;
            clauses.push(CaseClause { tag, params, body });
        }
    }
    reader.expect_close()?;

    trace!(datatype = %type_name, clauses = clauses.len(), "parsed cases");
    Ok(Expr::extension(Cases {
        type_name,
        scrutinee,
        clauses,
        default,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::ExtensionRegistry;
    use crate::syntax::Parser;

    fn parse(source: &str) -> Result<Expr> {
        let mut registry = ExtensionRegistry::new();
        registry.register(KEYWORD, parse_cases);
        Parser::from_source_with_registry(source, registry).parse_expr()
    }

    #[test]
    fn clauses_and_else() {
        let expr = parse(
            r#"(cases expression exp
                 (const-exp (num) (num-val num))
                 (diff-exp (exp1 exp2) (let ((v1 (f exp1))) (- v1 1)))
                 (else "error ~s"))"#,
        )
        .unwrap();
        assert_eq!(
            expr.to_string(),
            r#"(cases expression exp [const-exp (num) (num-val num)][diff-exp (exp1 exp2) (let ([v1 (f exp1)]) (- v1 1))][else "error ~s"])"#
        );
        let node = expr.as_extension::<Cases>().unwrap();
        assert_eq!(node.clauses.len(), 2);
        assert_eq!(node.clauses[1].params, vec!["exp1", "exp2"]);
        assert!(node.default.is_some());
    }

    #[test]
    fn scrutinee_is_desugared() {
        let expr = parse("(cases t (let* ([a 1]) a) (v () 0))").unwrap();
        assert_eq!(expr.to_string(), "(cases t (let ([a 1]) a) [v () 0])");
    }

    #[test]
    fn multi_form_clause_bodies() {
        let expr = parse("(cases t x (v (a) (display a) a))").unwrap();
        assert_eq!(expr.to_string(), "(cases t x [v (a) (display a)a])");
    }

    #[test]
    fn else_must_be_last() {
        assert!(parse("(cases t x (else 1) (v () 2))").is_err());
    }

    #[test]
    fn malformed_clauses_fail() {
        assert!(parse("(cases t)").is_err());
        assert!(parse("(cases t x (v a 1))").is_err());
        assert!(parse("(cases t x (v (a)))").is_err());
    }
}
