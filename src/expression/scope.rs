use std::sync::Arc;

use crate::expression::ast::Expr;

/// Persistent, parent-linked binding environment used by `let` and `var`.
///
/// Pushing a frame allocates a new node pointing at the current one; nothing is ever
/// mutated, so a scope can be cloned and shared freely across threads.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    frame: Option<Arc<Frame>>,
}

#[derive(Debug)]
struct Frame {
    bindings: Vec<(String, Arc<Expr>)>,
    parent: Scope,
}

impl Scope {
    /// The empty root scope.
    pub fn root() -> Self {
        Self::default()
    }

    /// A child scope holding `bindings`, whose parent is `self`.
    pub fn concat(&self, bindings: Vec<(String, Arc<Expr>)>) -> Self {
        Self {
            frame: Some(Arc::new(Frame {
                bindings,
                parent: self.clone(),
            })),
        }
    }

    /// The innermost binding of `name`.
    pub fn get(&self, name: &str) -> Option<&Arc<Expr>> {
        self.resolve(name).map(|(expr, _)| expr)
    }

    /// `true` if `name` is bound in this scope or any ancestor.
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The innermost binding of `name` together with the scope enclosing the frame that
    /// declared it, which is the scope the bound expression must be evaluated in.
    pub(crate) fn resolve(&self, name: &str) -> Option<(&Arc<Expr>, &Scope)> {
        let mut cur = self;
        while let Some(frame) = &cur.frame {
            if let Some((_, expr)) = frame.bindings.iter().rev().find(|(n, _)| n == name) {
                return Some((expr, &frame.parent));
            }
            cur = &frame.parent;
        }
        None
    }
}

#[cfg(test)]
#[path = "../../tests/unit/expression/scope.rs"]
mod tests;
