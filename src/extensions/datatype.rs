//! `define-datatype`: variant-type declarations.
//!
//! ```text
//! (define-datatype expression expression?
//!   (const-exp (num number?))
//!   (diff-exp (exp1 expression?) (exp2 expression?)))
//! ```
//!
//! prints as
//!
//! ```text
//! (define-datatype expression expression? [const-exp(num number?)][diff-exp(exp1 expression?)(exp2 expression?)])
//! ```
//!
//! Only the shape is checked; whether the predicates exist is the
//! evaluator's business.

use std::any::Any;
use std::fmt;

use serde::Serialize;
use serde_json::json;
use tracing::trace;

use crate::ast::{write_joined, Expr};
use crate::diagnostics::Result;
use crate::extensions::{ExtensionNode, FormReader};

pub const KEYWORD: &str = "define-datatype";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefineDatatype {
    pub name: String,
    pub predicate: String,
    pub variants: Vec<Variant>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variant {
    pub tag: String,
    pub fields: Vec<Field>,
}

/// A `(field-name predicate)` pair. The predicate is an ordinary expression,
/// so `(list-of symbol?)` is accepted as well as a bare name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub predicate: Expr,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {})", self.name, self.predicate)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}", self.tag)?;
        write_joined(f, &self.fields, "")?;
        f.write_str("]")
    }
}

impl fmt::Display for DefineDatatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {}", KEYWORD, self.name, self.predicate)?;
        if !self.variants.is_empty() {
            f.write_str(" ")?;
            write_joined(f, &self.variants, "")?;
        }
        f.write_str(")")
    }
}

impl ExtensionNode for DefineDatatype {
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

/// Handler for `(define-datatype name predicate variant...)`.
pub fn parse_define_datatype(_keyword: &str, reader: &mut dyn FormReader) -> Result<Expr> {
    let name = reader.expect_symbol("a datatype name")?;
    let predicate = reader.expect_symbol("a datatype predicate name")?;

    let mut variants = Vec::new();
    while !reader.at_close()? {
        variants.push(parse_variant(reader)?);
    }
    reader.expect_close()?;

    trace!(datatype = %name, variants = variants.len(), "parsed define-datatype");
    Ok(Expr::extension(DefineDatatype {
        name,
        predicate,
        variants,
    }))
}

fn parse_variant(reader: &mut dyn FormReader) -> Result<Variant> {
    reader.expect_open("`(` opening a variant")?;
    let tag = reader.expect_symbol("a variant tag")?;
    let mut fields = Vec::new();
    while !reader.at_close()? {
        reader.expect_open("`(` opening a `(field predicate)` pair")?;
        let name = reader.expect_symbol("a field name")?;
        if reader.at_close()? {
            return Err(reader.error("a field predicate"));
        }
        let predicate = reader.parse_expr()?;
        if !reader.at_close()? {
            return Err(reader.error("`)` closing the field pair"));
        }
        reader.expect_close()?;
        fields.push(Field { name, predicate });
    }
    reader.expect_close()?;
    Ok(Variant { tag, fields })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::ExtensionRegistry;
    use crate::syntax::Parser;

    fn parse(source: &str) -> Result<Expr> {
        let mut registry = ExtensionRegistry::new();
        registry.register(KEYWORD, parse_define_datatype);
        Parser::from_source_with_registry(source, registry).parse_expr()
    }

    #[test]
    fn variants_print_fields_without_spaces() {
        let expr = parse(
            "(define-datatype shape shape?
               (circle (r number?))
               (rect (w number?) (h number?)))",
        )
        .unwrap();
        assert_eq!(
            expr.to_string(),
            "(define-datatype shape shape? [circle(r number?)][rect(w number?)(h number?)])"
        );
        let node = expr.as_extension::<DefineDatatype>().unwrap();
        assert_eq!(node.variants.len(), 2);
        assert_eq!(node.variants[1].fields[1].name, "h");
    }

    #[test]
    fn fieldless_variants_and_compound_predicates() {
        let expr = parse("(define-datatype env env? (empty-env) (extend-env (vars (list-of symbol?)) (saved env?)))")
            .unwrap();
        assert_eq!(
            expr.to_string(),
            "(define-datatype env env? [empty-env][extend-env(vars (list-of symbol?))(saved env?)])"
        );
    }

    #[test]
    fn no_variants() {
        let expr = parse("(define-datatype void void?)").unwrap();
        assert_eq!(expr.to_string(), "(define-datatype void void?)");
    }

    #[test]
    fn malformed_fields_fail() {
        assert!(parse("(define-datatype t t? (v (x)))").is_err());
        assert!(parse("(define-datatype t t? (v (x p? extra)))").is_err());
        assert!(parse("(define-datatype t t? (v x))").is_err());
        assert!(parse("(define-datatype 3 t?)").is_err());
    }
}
