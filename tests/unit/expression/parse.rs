use super::*;
use serde_json::json;

fn parse(json: Json) -> ParseResult {
    parse_expression(&json, None)
}

fn parse_as(json: Json, expected: Type) -> ParseResult {
    parse_expression(&json, Some(expected))
}

fn errors(result: ParseResult) -> Vec<(String, String)> {
    match result {
        Ok(expr) => panic!("expected parse errors, got {expr:?}"),
        Err(errs) => errs.into_iter().map(|e| (e.key, e.message)).collect(),
    }
}

fn literal_value(expr: &Expr) -> &Value {
    match expr {
        Expr::Literal { value, .. } => value,
        other => panic!("expected a folded literal, got {other:?}"),
    }
}

#[test]
fn bare_scalars_become_literals() {
    let expr = parse(json!(3)).unwrap();
    assert_eq!(expr.ty(), &Type::Number);
    assert_eq!(literal_value(&expr), &Value::Number(3.0));

    let expr = parse(json!("red")).unwrap();
    assert_eq!(expr.ty(), &Type::String);

    let expr = parse(json!(null)).unwrap();
    assert_eq!(expr.ty(), &Type::Null);
}

#[test]
fn structural_errors_carry_messages_and_keys() {
    assert_eq!(
        errors(parse(json!({"a": 1}))),
        vec![(
            String::new(),
            r#"Bare objects invalid. Use ["literal", {...}] instead."#.to_owned()
        )]
    );
    assert_eq!(
        errors(parse(json!([]))),
        vec![(
            String::new(),
            r#"Expected an array with at least one element. If you wanted a literal array, use ["literal", []]."#
                .to_owned()
        )]
    );
    let errs = errors(parse(json!([1, 2])));
    assert_eq!(errs[0].0, "[0]");
    assert!(errs[0].1.starts_with("Expression name must be a string, but found number"));

    let errs = errors(parse(json!(["nope", 1])));
    assert_eq!(errs[0].0, "[0]");
    assert!(errs[0].1.starts_with(r#"Unknown expression "nope"."#));
}

#[test]
fn constant_subtrees_fold_to_literals() {
    let expr = parse(json!(["+", 1, ["*", 2, 3]])).unwrap();
    assert_eq!(literal_value(&expr), &Value::Number(7.0));

    let expr = parse(json!(["concat", "a", "b"])).unwrap();
    assert_eq!(literal_value(&expr), &Value::String("ab".into()));
}

#[test]
fn feature_and_zoom_dependent_nodes_do_not_fold() {
    let expr = parse(json!(["+", ["get", "x"], 1])).unwrap();
    assert!(!expr.is_literal());
    let expr = parse(json!(["*", ["zoom"], 2])).unwrap();
    assert!(!expr.is_literal());
}

#[test]
fn folding_failure_is_reported_as_parse_error() {
    let errs = errors(parse(json!(["rgb", 300, 0, 0])));
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].0, "");
    assert!(errs[0].1.contains("'r', 'g', and 'b' must be between 0 and 255"));
}

#[test]
fn error_operator_is_never_folded() {
    let expr = parse(json!(["error", "boom"])).unwrap();
    assert_eq!(expr.ty(), &Type::Error);
    assert!(!expr.is_literal());
}

#[test]
fn wrong_argument_type_reports_child_key() {
    let errs = errors(parse(json!(["+", 1, "two"])));
    assert_eq!(
        errs,
        vec![(
            "[2]".to_owned(),
            "Expected number but found string instead.".to_owned()
        )]
    );
}

#[test]
fn collects_errors_from_every_argument() {
    let errs = errors(parse(json!(["+", "a", ["nope"], true])));
    let keys: Vec<&str> = errs.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, ["[1]", "[2][0]", "[3]"]);
}

#[test]
fn fixed_arity_mismatch() {
    let errs = errors(parse(json!(["sqrt", 1, 2])));
    assert_eq!(errs[0].1, "Expected 1 arguments, but found 2 instead.");
}

#[test]
fn overload_mismatch_lists_signatures() {
    let errs = errors(parse(json!(["-", 1, 2, 3])));
    assert_eq!(
        errs[0].1,
        "Expected arguments of type (number, number) | (number), but found (number, number, number) instead."
    );
}

#[test]
fn value_typed_argument_gets_an_assertion() {
    let expr = parse(json!(["+", ["get", "x"], 1])).unwrap();
    let Expr::Compound { args, .. } = &expr else {
        panic!("expected compound, got {expr:?}");
    };
    assert!(matches!(&args[0], Expr::Assertion { ty: Type::Number, .. }));
}

#[test]
fn string_for_color_gets_a_coercion() {
    let expr = parse_as(json!(["get", "c"]), Type::Color).unwrap();
    assert!(matches!(expr, Expr::Coercion { ty: Type::Color, .. }));

    // Constant color strings coerce and fold at parse time.
    let expr = parse_as(json!("red"), Type::Color).unwrap();
    assert_eq!(expr.ty(), &Type::Color);
    assert!(matches!(literal_value(&expr), Value::Color(_)));
}

#[test]
fn expected_type_mismatch_is_reported_at_node() {
    let errs = errors(parse_as(json!(true), Type::Number));
    assert_eq!(
        errs,
        vec![(
            String::new(),
            "Expected number but found boolean instead.".to_owned()
        )]
    );
}

#[test]
fn literal_arity_and_empty_array_typing() {
    let errs = errors(parse(json!(["literal", 1, 2])));
    assert_eq!(
        errs[0].1,
        "'literal' expression requires exactly one argument, but found 2 instead."
    );

    let expected = Type::array(Type::String, None);
    let expr = parse_as(json!(["literal", []]), expected.clone()).unwrap();
    assert_eq!(expr.ty(), &expected);
}

#[test]
fn let_and_var_bind_lexically() {
    let expr = parse(json!(["let", "a", 1, ["+", ["var", "a"], ["get", "x"]]])).unwrap();
    assert_eq!(expr.ty(), &Type::Number);

    let errs = errors(parse(json!(["var", "a"])));
    assert_eq!(errs[0].0, "[1]");
    assert!(errs[0].1.starts_with(r#"Unknown variable "a"."#));
}

#[test]
fn let_validates_names() {
    let errs = errors(parse(json!(["let", "a-b", 1, 2])));
    assert_eq!(
        errs,
        vec![(
            "[1]".to_owned(),
            "Variable names must contain only alphanumeric characters or '_'.".to_owned()
        )]
    );
    let errs = errors(parse(json!(["let", 1, 1, 2])));
    assert_eq!(errs[0].1, "Expected string, but found number instead.");
    let errs = errors(parse(json!(["let", "a", 1])));
    assert_eq!(errs[0].1, "Expected at least 3 arguments, but found 2 instead.");
}

#[test]
fn case_types_outputs_from_first_branch() {
    let expr = parse(json!(["case", ["has", "x"], 1, 2])).unwrap();
    assert_eq!(expr.ty(), &Type::Number);

    let errs = errors(parse(json!(["case", ["has", "x"], 1, "no"])));
    assert_eq!(
        errs,
        vec![(
            "[3]".to_owned(),
            "Expected number but found string instead.".to_owned()
        )]
    );
    let errs = errors(parse(json!(["case", true, 1, 2, 3])));
    assert_eq!(errs[0].1, "Expected an odd number of arguments.");
}

#[test]
fn match_label_validation() {
    let expr = parse(json!(["match", ["get", "k"], ["a", "b"], 1, "c", 2, 0])).unwrap();
    assert_eq!(expr.ty(), &Type::Number);
    let Expr::Match { input, cases, .. } = &expr else {
        panic!("expected match, got {expr:?}");
    };
    assert_eq!(cases.len(), 3);
    assert!(matches!(input.as_ref(), Expr::Assertion { ty: Type::String, .. }));

    let errs = errors(parse(json!(["match", ["get", "k"], 1.5, 1, 0])));
    assert_eq!(
        errs,
        vec![(
            "[2]".to_owned(),
            "Numeric branch labels must be integer values.".to_owned()
        )]
    );
    let errs = errors(parse(json!(["match", ["get", "k"], "a", 1, "a", 2, 0])));
    assert_eq!(errs[0], ("[4]".to_owned(), "Branch labels must be unique.".to_owned()));
    let errs = errors(parse(json!(["match", ["get", "k"], "a", 1, 2, 2, 0])));
    assert_eq!(
        errs[0],
        (
            "[4]".to_owned(),
            "Expected string but found number instead.".to_owned()
        )
    );
    let errs = errors(parse(json!(["match", ["get", "k"], [], 1, 0])));
    assert_eq!(errs[0].1, "Expected at least one branch label.");
    let errs = errors(parse(json!(["match", ["get", "k"], "a", 1])));
    assert_eq!(errs[0].1, "Expected at least 4 arguments, but found only 3.");
}

#[test]
fn coalesce_widens_to_value_when_an_argument_needs_checking() {
    let expr = parse_as(json!(["coalesce", ["get", "a"], 0]), Type::Number).unwrap();
    // The whole coalesce is asserted rather than each argument.
    let Expr::Assertion { args, .. } = &expr else {
        panic!("expected assertion, got {expr:?}");
    };
    assert!(matches!(&args[0], Expr::Coalesce { ty: Type::Value, .. }));
}

#[test]
fn array_assertion_arguments() {
    let expr = parse(json!(["array", "number", 2, ["get", "xs"]])).unwrap();
    assert_eq!(expr.ty(), &Type::array(Type::Number, Some(2)));

    let errs = errors(parse(json!(["array", "color", ["get", "xs"]])));
    assert_eq!(errs[0].0, "[1]");
    let errs = errors(parse(json!(["array", "number", -1, ["get", "xs"]])));
    assert_eq!(errs[0].0, "[2]");
}

#[test]
fn at_takes_item_type() {
    let expr = parse(json!(["at", ["get", "i"], ["literal", [1, 2, 3]]])).unwrap();
    assert_eq!(expr.ty(), &Type::Number);
    let errs = errors(parse(json!(["at", 1])));
    assert_eq!(errs[0].1, "Expected 2 arguments, but found 1 instead.");
}

#[test]
fn step_requires_literal_ascending_labels() {
    let expr = parse(json!(["step", ["zoom"], 0, 5, 1, 10, 2])).unwrap();
    let Expr::Step { labels, .. } = &expr else {
        panic!("expected step, got {expr:?}");
    };
    assert_eq!(labels, &[f64::NEG_INFINITY, 5.0, 10.0]);

    let errs = errors(parse(json!(["step", ["zoom"], 0, 10, 1, 5, 2])));
    assert_eq!(errs[0].0, "[5]");
    assert!(errs[0].1.contains("strictly ascending order"));

    let errs = errors(parse(json!(["step", ["zoom"], 0, ["get", "a"], 1])));
    assert!(errs[0].1.contains("literal numeric values"));
}

#[test]
fn interpolate_rejects_descending_stops() {
    let errs = errors(parse(json!([
        "interpolate", ["linear"], ["zoom"], 10, 1, 5, 2
    ])));
    assert_eq!(
        errs,
        vec![(
            "[5]".to_owned(),
            r#"Input/output pairs for "interpolate" expressions must be arranged with input values in strictly ascending order."#
                .to_owned()
        )]
    );
}

#[test]
fn interpolation_type_errors() {
    let errs = errors(parse(json!(["interpolate", ["exponential"], ["zoom"], 0, 1, 1, 2])));
    assert_eq!(errs[0].0, "[1][1]");
    let errs = errors(parse(json!(["interpolate", ["cubic-bezier", 0, 0, 2, 1], ["zoom"], 0, 1, 1, 2])));
    assert_eq!(errs[0].0, "[1]");
    let errs = errors(parse(json!(["interpolate", ["spline"], ["zoom"], 0, 1, 1, 2])));
    assert_eq!(errs[0], ("[1][0]".to_owned(), "Unknown interpolation type spline".to_owned()));
    let errs = errors(parse(json!(["interpolate", "linear", ["zoom"], 0, 1])));
    assert_eq!(errs[0].1, "Expected an interpolation type expression.");
}

#[test]
fn interpolate_output_must_be_interpolatable() {
    let errs = errors(parse(json!(["interpolate", ["linear"], ["zoom"], 0, "a", 1, "b"])));
    assert_eq!(errs[0].1, "Type string is not interpolatable.");

    let expr = parse(json!(["interpolate-lab", ["linear"], ["zoom"], 0, "red", 10, "blue"])).unwrap();
    assert_eq!(expr.ty(), &Type::Color);
}

#[test]
fn comparisons_check_operand_types() {
    assert!(parse(json!(["==", ["get", "a"], 1])).is_ok());
    let errs = errors(parse(json!(["==", 1, "1"])));
    assert_eq!(errs[0].1, "Cannot compare types 'number' and 'string'.");
    let errs = errors(parse(json!(["<", true, false])));
    assert_eq!(
        errs[0].1,
        r#""<" comparisons are not supported for type 'boolean'."#
    );
}

#[test]
fn key_renders_nested_path() {
    let ctx = ParsingContext::new(None).child(2, None).child(1, None);
    assert_eq!(ctx.key(), "[2][1]");
}

#[test]
fn recognizes_expressions_by_operator_name() {
    assert!(is_expression(&json!(["get", "x"])));
    assert!(is_expression(&json!(["interpolate-hcl", ["linear"], ["zoom"], 0, "red", 1, "blue"])));
    assert!(!is_expression(&json!(["Open Sans Regular", "Arial Unicode MS Regular"])));
    assert!(!is_expression(&json!([0, 0])));
    assert!(!is_expression(&json!("get")));
}

#[test]
fn value_typed_operands_pass_through_comparisons_and_assertions() {
    let expr = parse(json!(["==", ["get", "size"], "large"])).unwrap();
    assert_eq!(expr.ty(), &Type::Boolean);

    let expr = parse(json!(["string", ["get", "x"]])).unwrap();
    assert_eq!(expr.ty(), &Type::String);
}

#[test]
fn overloaded_operator_accepts_value_argument() {
    use crate::expression::eval::{ColorCache, EvaluationContext, Feature, Globals};

    let expr = parse(json!(["length", ["get", "name"]])).unwrap();
    assert_eq!(expr.ty(), &Type::Number);
    let Expr::Compound { args, .. } = &expr else {
        panic!("expected a compound, got {expr:?}");
    };
    assert!(matches!(&args[0], Expr::Assertion { ty: Type::String, .. }));

    let feature: Feature =
        serde_json::from_value(json!({"properties": {"name": "Main"}})).unwrap();
    let colors = ColorCache::new();
    let mut ctx = EvaluationContext::new(&colors);
    ctx.reset(Globals::at_zoom(0.0), Some(&feature));
    assert_eq!(expr.evaluate(&mut ctx).unwrap(), Value::Number(4.0));
}

#[test]
fn folding_preserves_evaluation_results() {
    use crate::expression::eval::{ColorCache, EvaluationContext, Feature, Globals};

    let constants = [
        json!(["+", 1, ["*", 2, 3]]),
        json!(["^", 2, 10]),
        json!(["rgb", 255, 128, 0]),
        json!(["concat", "a", 1, true]),
        json!(["interpolate", ["linear"], 5, 0, 0, 10, 100]),
        json!(["match", "b", "a", 1, "b", 2, 3]),
        json!(["at", 1, ["literal", [10, 20, 30]]]),
        json!(["case", [">", 2, 1], "yes", "no"]),
        json!(["typeof", ["literal", {"k": 1}]]),
        json!(["coalesce", null, 7]),
        json!(["to-string", ["to-color", "#0f0"]]),
    ];
    let features: [Option<Feature>; 2] = [
        None,
        Some(
            serde_json::from_value(json!({
                "id": 9,
                "type": "Point",
                "properties": {"x": 1, "name": "Main"}
            }))
            .unwrap(),
        ),
    ];
    let colors = ColorCache::new();

    for json in constants {
        let folded = parse(json.clone()).unwrap();
        assert!(folded.is_literal(), "{json} should fold");
        let unfolded = ParsingContext::without_folding(None).parse(&json).unwrap();
        assert!(!unfolded.is_literal(), "{json} should stay unfolded");
        assert_eq!(folded.ty(), unfolded.ty(), "{json}");

        for zoom in [0.0, 7.5, 22.0] {
            for feature in &features {
                let mut ctx = EvaluationContext::new(&colors);
                ctx.reset(Globals::at_zoom(zoom), feature.as_ref());
                let live = unfolded.evaluate(&mut ctx).unwrap();
                assert_eq!(literal_value(&folded), &live, "{json} at z{zoom}");
            }
        }
    }
}
