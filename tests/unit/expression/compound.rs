use super::*;
use crate::expression::eval::{ColorCache, Feature, Globals};
use crate::expression::parse::parse_expression;
use serde_json::json;

fn eval_with(json: serde_json::Value, feature: Option<&Feature>) -> Result<Value, RuntimeError> {
    let expr = parse_expression(&json, None).expect("expression parses");
    let colors = ColorCache::new();
    let mut ctx = EvaluationContext::new(&colors);
    ctx.reset(Globals::at_zoom(5.0), feature);
    expr.evaluate(&mut ctx)
}

fn eval(json: serde_json::Value) -> Value {
    eval_with(json, None).expect("expression evaluates")
}

#[test]
fn names_round_trip_through_the_table() {
    for (name, op) in OPS {
        assert_eq!(CompoundOp::from_name(name), Some(*op));
        assert_eq!(op.name(), *name);
    }
    assert_eq!(CompoundOp::from_name("interpolate"), None);
}

#[test]
fn params_display_and_arity() {
    let fixed = Params::Fixed(vec![Type::Number, Type::String]);
    assert_eq!(fixed.to_string(), "(number, string)");
    assert!(fixed.accepts_arity(2));
    assert!(!fixed.accepts_arity(1));
    let var = Params::Varargs(Type::Boolean);
    assert_eq!(var.to_string(), "(boolean...)");
    assert_eq!(var.param(7), Some(&Type::Boolean));
}

#[test]
fn arithmetic_follows_ieee_semantics() {
    assert_eq!(eval(json!(["/", 1, 0])), Value::Number(f64::INFINITY));
    assert_eq!(eval(json!(["%", 7, 3])), Value::Number(1.0));
    assert_eq!(eval(json!(["-", 4])), Value::Number(-4.0));
    assert_eq!(eval(json!(["^", 2, 10])), Value::Number(1024.0));
    assert_eq!(eval(json!(["min", 3, 1, 2])), Value::Number(1.0));
    assert_eq!(eval(json!(["max"])), Value::Number(f64::NEG_INFINITY));
    assert_eq!(eval(json!(["round", -2.5])), Value::Number(-2.0));
    assert_eq!(eval(json!(["round", 2.5])), Value::Number(3.0));
}

#[test]
fn zoom_reads_globals() {
    assert_eq!(eval(json!(["*", ["zoom"], 2])), Value::Number(10.0));
    assert_eq!(eval(json!(["heatmap-density"])), Value::Number(0.0));
}

#[test]
fn feature_accessors() {
    let feature: Feature = serde_json::from_value(json!({
        "properties": {"name": "Main St", "lanes": 2},
        "type": "MultiLineString",
        "id": 42
    }))
    .expect("feature json");

    let get = eval_with(json!(["get", "name"]), Some(&feature)).unwrap();
    assert_eq!(get, Value::String("Main St".into()));
    let has = eval_with(json!(["has", "missing"]), Some(&feature)).unwrap();
    assert_eq!(has, Value::Bool(false));
    let ty = eval_with(json!(["geometry-type"]), Some(&feature)).unwrap();
    assert_eq!(ty, Value::String("LineString".into()));
    let id = eval_with(json!(["id"]), Some(&feature)).unwrap();
    assert_eq!(id, Value::Number(42.0));
    let missing = eval_with(json!(["get", "name"]), None).unwrap();
    assert_eq!(missing, Value::Null);
}

#[test]
fn get_from_object_argument() {
    let v = eval(json!(["get", "a", ["literal", {"a": 1}]]));
    assert_eq!(v, Value::Number(1.0));
    let v = eval(json!(["has", "b", ["literal", {"a": 1}]]));
    assert_eq!(v, Value::Bool(false));
}

#[test]
fn conversions() {
    assert_eq!(eval(json!(["to-string", 1.5])), Value::String("1.5".into()));
    assert_eq!(eval(json!(["to-string", null])), Value::String(String::new()));
    assert_eq!(eval(json!(["to-boolean", ""])), Value::Bool(false));
    assert_eq!(eval(json!(["to-boolean", 0])), Value::Bool(false));
    assert_eq!(eval(json!(["to-boolean", "0"])), Value::Bool(true));
    assert_eq!(eval(json!(["typeof", ["literal", [1, 2]]])), Value::String("array<number, 2>".into()));
    assert_eq!(
        eval(json!(["to-rgba", ["rgba", 255, 0, 0, 0.5]])),
        Value::Array(vec![
            Value::Number(255.0),
            Value::Number(0.0),
            Value::Number(0.0),
            Value::Number(0.5)
        ])
    );
}

#[test]
fn strings() {
    assert_eq!(eval(json!(["upcase", "abc"])), Value::String("ABC".into()));
    assert_eq!(eval(json!(["downcase", "ÀB"])), Value::String("àb".into()));
    assert_eq!(eval(json!(["concat", "a", 1, true])), Value::String("a1true".into()));
    assert_eq!(eval(json!(["length", "héllo"])), Value::Number(5.0));
    assert_eq!(eval(json!(["length", ["literal", [1, 2]]])), Value::Number(2.0));
}

#[test]
fn logic_short_circuits() {
    // The second operand would fail if evaluated.
    let v = eval(json!(["any", true, ["boolean", ["get", "missing"]]]));
    assert_eq!(v, Value::Bool(true));
    let v = eval(json!(["all", false, ["boolean", ["get", "missing"]]]));
    assert_eq!(v, Value::Bool(false));
    assert_eq!(eval(json!(["!", true])), Value::Bool(false));
    assert_eq!(eval(json!(["all"])), Value::Bool(true));
}

#[test]
fn comparisons() {
    assert_eq!(eval(json!(["==", 1, 1])), Value::Bool(true));
    assert_eq!(eval(json!(["!=", "a", "b"])), Value::Bool(true));
    assert_eq!(eval(json!(["<", "a", "b"])), Value::Bool(true));
    assert_eq!(eval(json!([">=", 2, 2])), Value::Bool(true));

    let feature = Feature::with_properties([("x".to_owned(), Value::Bool(true))]);
    let err = eval_with(json!(["<", ["get", "x"], 1]), Some(&feature)).unwrap_err();
    assert!(err.message.starts_with(r#"Expected arguments for "<""#));
}

#[test]
fn rgba_validation_messages() {
    let feature = Feature::with_properties([("a".to_owned(), Value::Number(2.0))]);
    let err = eval_with(json!(["rgba", 0, 0, 0, ["get", "a"]]), Some(&feature)).unwrap_err();
    assert_eq!(
        err.message,
        "Invalid rgba value [0, 0, 0, 2]: 'a' must be between 0 and 1."
    );
}

#[test]
fn error_operator_raises_its_message() {
    let err = eval_with(json!(["error", "boom"]), None).unwrap_err();
    assert_eq!(err.message, "boom");
}

#[test]
fn check_comparable_rules() {
    assert!(CompoundOp::Eq.check_comparable(&Type::Boolean, &Type::Boolean).is_ok());
    assert!(CompoundOp::Eq.check_comparable(&Type::Value, &Type::Number).is_ok());
    assert!(CompoundOp::Lt.check_comparable(&Type::Boolean, &Type::Boolean).is_err());
    assert!(CompoundOp::Eq.check_comparable(&Type::Color, &Type::Color).is_err());
    assert_eq!(
        CompoundOp::Ne.check_comparable(&Type::Number, &Type::String),
        Err("Cannot compare types 'number' and 'string'.".to_owned())
    );
}
