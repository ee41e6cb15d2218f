//! AST module for the Kacket language
//!
//! [`Expr`] is the canonical, already-desugared tree the parser produces. Its
//! `Display` impl is the canonical printer: it writes the core shape of every
//! form, never the surface sugar it was read from, and it is what tests use
//! to decide whether two trees are equivalent.
//!
//! # Printing conventions
//!
//! - List and application elements are separated by one space.
//! - `let`-family bindings print as `[name value]` with nothing between
//!   consecutive bindings: `(let ([a 1][b 2]) body)`.
//! - Forms in a `begin` or in a multi-form body are concatenated without
//!   spaces: `(begin (f)(g))`.
//! - Quoted data keeps its `'` marks; nested quotes stack: `'(a 'b c)`.

// ============================================================================
// IMPORTS
// ============================================================================

use std::fmt;

use serde::{Serialize, Serializer};

use crate::extensions::ExtensionNode;

pub mod builder;
pub mod value;

pub use value::Atom;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// The core expression tree.
///
/// The closed set of core forms is fixed; syntax extensions contribute their
/// own node types through [`Expr::Extension`].
///
/// # Examples
///
/// ```rust
/// use kacket::ast::Expr;
/// let e = Expr::if_else(Expr::symbol("c"), Expr::integer(1), Expr::empty_list());
/// assert_eq!(e.to_string(), "(if c 1 '())");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Atom(Atom),
    Quote(Box<Expr>),
    List(Vec<Expr>),
    Define {
        name: String,
        value: Box<Expr>,
    },
    Lambda {
        params: Vec<String>,
        body: Body,
    },
    If {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    Let {
        bindings: Vec<Binding>,
        body: Body,
    },
    LetRec {
        bindings: Vec<Binding>,
        body: Body,
    },
    Begin(Vec<Expr>),
    /// A node contributed by a syntax extension; it prints itself.
    Extension(#[serde(serialize_with = "serialize_extension")] Box<dyn ExtensionNode>),
}

/// One `[name value]` entry of a `let`-family binding list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Binding {
    pub name: String,
    pub value: Expr,
}

/// The body of a `lambda` or `let`-family form: one or more expressions,
/// evaluated in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Body(Vec<Expr>);

impl Body {
    /// Builds a body from its forms. Returns `None` for an empty list: a body
    /// is always present.
    pub fn new(forms: Vec<Expr>) -> Option<Self> {
        if forms.is_empty() {
            None
        } else {
            Some(Body(forms))
        }
    }

    pub fn single(expr: Expr) -> Self {
        Body(vec![expr])
    }

    pub fn forms(&self) -> &[Expr] {
        &self.0
    }

    pub fn into_forms(self) -> Vec<Expr> {
        self.0
    }
}

impl Expr {
    /// Returns the type name of this node (for diagnostics and debugging).
    pub fn type_name(&self) -> &'static str {
        match self {
            Expr::Atom(atom) => atom.type_name(),
            Expr::Quote(_) => "Quote",
            Expr::List(_) => "List",
            Expr::Define { .. } => "Define",
            Expr::Lambda { .. } => "Lambda",
            Expr::If { .. } => "If",
            Expr::Let { .. } => "Let",
            Expr::LetRec { .. } => "LetRec",
            Expr::Begin(_) => "Begin",
            Expr::Extension(node) => node.kind(),
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Expr::Atom(atom) => atom.as_symbol(),
            _ => None,
        }
    }

    /// True for atoms other than symbols, and for quoted data.
    pub fn is_literal(&self) -> bool {
        match self {
            Expr::Atom(Atom::Symbol(_)) => false,
            Expr::Atom(_) | Expr::Quote(_) => true,
            _ => false,
        }
    }

    /// Downcasts an extension node to its concrete type.
    pub fn as_extension<T: 'static>(&self) -> Option<&T> {
        match self {
            Expr::Extension(node) => node.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }
}

// ============================================================================
// CANONICAL PRINTER
// ============================================================================

/// Writes `items` separated by `sep`.
pub(crate) fn write_joined<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    sep: &str,
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}]", self.name, self.value)
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_joined(f, &self.0, "")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Atom(atom) => write!(f, "{}", atom),
            Expr::Quote(inner) => write!(f, "'{}", inner),
            Expr::List(items) => {
                f.write_str("(")?;
                write_joined(f, items, " ")?;
                f.write_str(")")
            }
            Expr::Define { name, value } => write!(f, "(define {} {})", name, value),
            Expr::Lambda { params, body } => {
                f.write_str("(lambda (")?;
                write_joined(f, params, " ")?;
                write!(f, ") {})", body)
            }
            Expr::If {
                condition,
                then_branch,
                else_branch,
            } => write!(f, "(if {} {} {})", condition, then_branch, else_branch),
            Expr::Let { bindings, body } => write_let(f, "let", bindings, body),
            Expr::LetRec { bindings, body } => write_let(f, "letrec", bindings, body),
            Expr::Begin(forms) => {
                f.write_str("(begin ")?;
                write_joined(f, forms, "")?;
                f.write_str(")")
            }
            Expr::Extension(node) => write!(f, "{}", node),
        }
    }
}

fn write_let(
    f: &mut fmt::Formatter<'_>,
    keyword: &str,
    bindings: &[Binding],
    body: &Body,
) -> fmt::Result {
    write!(f, "({} (", keyword)?;
    write_joined(f, bindings, "")?;
    write!(f, ") {})", body)
}

// ============================================================================
// EXTENSION NODE PLUMBING
// ============================================================================

impl Clone for Box<dyn ExtensionNode> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Extension nodes are equal when they are the same kind and print the same.
impl PartialEq for dyn ExtensionNode {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.to_string() == other.to_string()
    }
}

fn serialize_extension<S: Serializer>(
    node: &Box<dyn ExtensionNode>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    node.to_json().serialize(serializer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Expr {
        Expr::symbol(s)
    }

    #[test]
    fn bindings_print_without_separators() {
        let expr = Expr::Let {
            bindings: vec![
                Binding {
                    name: "a".into(),
                    value: Expr::integer(1),
                },
                Binding {
                    name: "b".into(),
                    value: Expr::quote(sym("sym")),
                },
            ],
            body: Body::single(sym("a")),
        };
        assert_eq!(expr.to_string(), "(let ([a 1][b 'sym]) a)");
    }

    #[test]
    fn begin_and_bodies_concatenate_forms() {
        let begin = Expr::Begin(vec![Expr::List(vec![sym("bar")]), Expr::List(vec![sym("foo")])]);
        assert_eq!(begin.to_string(), "(begin (bar)(foo))");

        let body = Body::new(vec![
            Expr::List(vec![sym("f"), sym("x")]),
            Expr::List(vec![sym("g"), sym("x")]),
        ])
        .unwrap();
        let lambda = Expr::Lambda {
            params: vec!["x".into()],
            body,
        };
        assert_eq!(lambda.to_string(), "(lambda (x) (f x)(g x))");
    }

    #[test]
    fn nested_quotes_stack() {
        let datum = Expr::quote(Expr::List(vec![
            sym("a"),
            Expr::quote(sym("b")),
            sym("c"),
        ]));
        assert_eq!(datum.to_string(), "'(a 'b c)");
        assert_eq!(Expr::quote(Expr::quote(sym("x"))).to_string(), "''x");
        assert_eq!(Expr::empty_list().to_string(), "'()");
    }

    #[test]
    fn empty_bodies_are_rejected() {
        assert!(Body::new(vec![]).is_none());
    }

    #[test]
    fn literals_are_classified() {
        assert!(Expr::integer(3).is_literal());
        assert!(Expr::empty_list().is_literal());
        assert!(!sym("f").is_literal());
        assert!(!Expr::List(vec![]).is_literal());
    }

    #[test]
    fn trees_serialize_to_json() {
        let expr = Expr::Define {
            name: "x".into(),
            value: Box::new(Expr::integer(10)),
        };
        let json = serde_json::to_value(&expr).unwrap();
        assert_eq!(json["Define"]["name"], "x");
    }
}
