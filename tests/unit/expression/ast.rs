use super::*;

fn num(n: f64) -> Expr {
    Expr::Literal {
        ty: Type::Number,
        value: Value::Number(n),
    }
}

#[test]
fn var_and_let_report_the_bound_type() {
    let bound = Arc::new(Expr::Literal {
        ty: Type::String,
        value: Value::String("x".into()),
    });
    let var = Expr::Var {
        name: "a".into(),
        bound: Arc::clone(&bound),
    };
    assert_eq!(var.ty(), &Type::String);
    assert!(var.children().is_empty());

    let let_expr = Expr::Let {
        bindings: vec![("a".into(), bound)],
        body: Box::new(var),
    };
    assert_eq!(let_expr.ty(), &Type::String);
    assert_eq!(let_expr.children().len(), 2);
}

#[test]
fn children_are_listed_in_argument_order() {
    let case = Expr::Case {
        ty: Type::Number,
        branches: vec![(
            Expr::Literal {
                ty: Type::Boolean,
                value: Value::Bool(true),
            },
            num(1.0),
        )],
        otherwise: Box::new(num(2.0)),
    };
    let kids = case.children();
    assert_eq!(kids.len(), 3);
    assert_eq!(kids[1], &num(1.0));
    assert_eq!(kids[2], &num(2.0));

    let step = Expr::Step {
        ty: Type::Number,
        input: Box::new(num(0.0)),
        labels: vec![f64::NEG_INFINITY, 1.0],
        outputs: vec![num(10.0), num(20.0)],
    };
    assert_eq!(step.children(), vec![&num(0.0), &num(10.0), &num(20.0)]);
}

#[test]
fn compound_op_is_only_set_for_compound_nodes() {
    let zoom = Expr::Compound {
        op: CompoundOp::Zoom,
        ty: Type::Number,
        args: Vec::new(),
    };
    assert_eq!(zoom.compound_op(), Some(CompoundOp::Zoom));
    assert!(!zoom.is_literal());
    assert_eq!(num(1.0).compound_op(), None);
    assert!(num(1.0).is_literal());
}

#[test]
fn match_keys_accept_integers_and_strings_only() {
    assert_eq!(MatchKey::from_value(&Value::Number(3.0)), Some(MatchKey::Int(3)));
    assert_eq!(MatchKey::from_value(&Value::Number(3.5)), None);
    assert_eq!(
        MatchKey::from_value(&Value::String("a".into())),
        Some(MatchKey::Str("a".into()))
    );
    assert_eq!(MatchKey::from_value(&Value::Bool(true)), None);
    assert_eq!(MatchKey::from_value(&Value::Number(1e300)), None);
}
