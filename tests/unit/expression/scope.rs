use super::*;
use crate::expression::types::Type;
use crate::expression::value::Value;

fn lit(n: f64) -> Arc<Expr> {
    Arc::new(Expr::Literal {
        ty: Type::Number,
        value: Value::Number(n),
    })
}

fn number_of(expr: &Expr) -> Option<f64> {
    match expr {
        Expr::Literal { value, .. } => value.as_f64(),
        _ => None,
    }
}

#[test]
fn root_scope_is_empty() {
    let root = Scope::root();
    assert!(!root.has("a"));
    assert!(root.get("a").is_none());
}

#[test]
fn lookup_walks_outward_and_shadows_innermost_first() {
    let outer = Scope::root().concat(vec![("a".into(), lit(1.0)), ("b".into(), lit(2.0))]);
    let inner = outer.concat(vec![("a".into(), lit(10.0))]);

    assert_eq!(inner.get("a").and_then(|e| number_of(e)), Some(10.0));
    assert_eq!(inner.get("b").and_then(|e| number_of(e)), Some(2.0));
    assert_eq!(outer.get("a").and_then(|e| number_of(e)), Some(1.0));
    assert!(!inner.has("c"));
}

#[test]
fn resolve_returns_the_declaring_frames_parent() {
    let outer = Scope::root().concat(vec![("a".into(), lit(1.0))]);
    let inner = outer.concat(vec![("b".into(), lit(2.0))]);

    let (_, enclosing) = inner.resolve("a").unwrap();
    assert!(!enclosing.has("a"));

    let (_, enclosing) = inner.resolve("b").unwrap();
    assert!(enclosing.has("a"));
    assert!(!enclosing.has("b"));
}
