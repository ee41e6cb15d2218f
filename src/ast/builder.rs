//! Constructors for the tree shapes the desugaring rules and extensions
//! build over and over.

use crate::ast::{Atom, Binding, Body, Expr};
use crate::extensions::ExtensionNode;
use crate::syntax::Number;

impl Expr {
    pub fn symbol(name: impl Into<String>) -> Self {
        Expr::Atom(Atom::Symbol(name.into()))
    }

    pub fn integer(n: i64) -> Self {
        Expr::Atom(Atom::Number(Number::Integer(n)))
    }

    pub fn number(n: Number) -> Self {
        Expr::Atom(Atom::Number(n))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Expr::Atom(Atom::String(s.into()))
    }

    pub fn boolean(b: bool) -> Self {
        Expr::Atom(Atom::Boolean(b))
    }

    pub fn quote(inner: Expr) -> Self {
        Expr::Quote(Box::new(inner))
    }

    /// The `'()` literal: the value of an `if` without an else branch and of
    /// a `cond` no clause matched.
    pub fn empty_list() -> Self {
        Expr::quote(Expr::List(Vec::new()))
    }

    pub fn define(name: impl Into<String>, value: Expr) -> Self {
        Expr::Define {
            name: name.into(),
            value: Box::new(value),
        }
    }

    pub fn lambda(params: Vec<String>, body: Body) -> Self {
        Expr::Lambda { params, body }
    }

    pub fn if_else(condition: Expr, then_branch: Expr, else_branch: Expr) -> Self {
        Expr::If {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        }
    }

    pub fn extension(node: impl ExtensionNode + 'static) -> Self {
        Expr::Extension(Box::new(node))
    }
}

impl Binding {
    pub fn new(name: impl Into<String>, value: Expr) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl From<Expr> for Body {
    fn from(expr: Expr) -> Self {
        Body::single(expr)
    }
}

/// Nests `bindings` right to left into single-binding `let`s around `body`,
/// the core shape of `let*`. No bindings yields `(let () body)`.
pub fn nest_lets(bindings: Vec<Binding>, body: Body) -> Expr {
    let mut bindings = bindings.into_iter().rev();
    let Some(innermost) = bindings.next() else {
        return Expr::Let {
            bindings: Vec::new(),
            body,
        };
    };
    let seed = Expr::Let {
        bindings: vec![innermost],
        body,
    };
    bindings.fold(seed, |inner, binding| Expr::Let {
        bindings: vec![binding],
        body: Body::single(inner),
    })
}

/// Folds `cond` clauses right to left into an `if` chain ending in `tail`.
pub fn chain_ifs(clauses: Vec<(Expr, Expr)>, tail: Expr) -> Expr {
    clauses
        .into_iter()
        .rev()
        .fold(tail, |else_branch, (test, result)| {
            Expr::if_else(test, result, else_branch)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nest_lets_is_right_nested() {
        let expr = nest_lets(
            vec![
                Binding::new("a", Expr::integer(1)),
                Binding::new("b", Expr::symbol("a")),
            ],
            Body::single(Expr::symbol("b")),
        );
        assert_eq!(expr.to_string(), "(let ([a 1]) (let ([b a]) b))");
    }

    #[test]
    fn nest_lets_without_bindings() {
        let expr = nest_lets(vec![], Body::single(Expr::integer(114514)));
        assert_eq!(expr.to_string(), "(let () 114514)");
    }

    #[test]
    fn chain_ifs_ends_in_tail() {
        let expr = chain_ifs(
            vec![
                (Expr::symbol("p"), Expr::integer(1)),
                (Expr::symbol("q"), Expr::integer(2)),
            ],
            Expr::empty_list(),
        );
        assert_eq!(expr.to_string(), "(if p 1 (if q 2 '()))");
        assert_eq!(chain_ifs(vec![], Expr::empty_list()).to_string(), "'()");
    }
}
