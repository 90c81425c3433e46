use super::*;
use serde_json::json;

#[test]
fn type_of_scalars() {
    assert_eq!(Value::Null.type_of(), Type::Null);
    assert_eq!(Value::from(1.5).type_of(), Type::Number);
    assert_eq!(Value::from("x").type_of(), Type::String);
    assert_eq!(Value::from(true).type_of(), Type::Boolean);
    assert_eq!(Value::Color(Color::BLACK).type_of(), Type::Color);
    assert_eq!(Value::from(json!({"a": 1})).type_of(), Type::Object);
}

#[test]
fn type_of_arrays_uses_common_item_type() {
    assert_eq!(
        Value::from(json!([1, 2, 3])).type_of(),
        Type::array(Type::Number, Some(3))
    );
    assert_eq!(
        Value::from(json!([1, "a"])).type_of(),
        Type::array(Type::Value, Some(2))
    );
    assert_eq!(
        Value::from(json!([])).type_of(),
        Type::array(Type::Value, Some(0))
    );
    assert_eq!(
        Value::from(json!([[1], [2]])).type_of().to_string(),
        "array<array<number, 1>, 2>"
    );
}

#[test]
fn numbers_format_like_the_style_language() {
    assert_eq!(format_number(6.0), "6");
    assert_eq!(format_number(-0.0), "0");
    assert_eq!(format_number(0.5), "0.5");
    assert_eq!(format_number(1e21), "1e+21");
    assert_eq!(format_number(1.5e-7), "1.5e-7");
    assert_eq!(format_number(f64::INFINITY), "Infinity");
    assert_eq!(format_number(f64::NAN), "NaN");
}

#[test]
fn display_is_to_string_semantics() {
    assert_eq!(Value::Null.to_string(), "");
    assert_eq!(Value::from("abc").to_string(), "abc");
    assert_eq!(Value::from(true).to_string(), "true");
    assert_eq!(Value::from(3.0).to_string(), "3");
    assert_eq!(Value::from(json!([1, "a"])).to_string(), r#"[1,"a"]"#);
    assert_eq!(
        Value::Color(Color::from_rgba255(255.0, 0.0, 0.0, 1.0)).to_string(),
        "rgba(255,0,0,1)"
    );
}

#[test]
fn json_conversion_keeps_integers_integral() {
    let v = Value::from(json!({"n": 2, "f": 2.5, "list": [true, null]}));
    assert_eq!(v.to_json(), json!({"n": 2, "f": 2.5, "list": [true, null]}));
}

#[test]
fn serde_reads_and_writes_json_shapes() {
    let v: Value = serde_json::from_str(r#"{"class": "park", "rank": 3}"#).unwrap();
    let Value::Object(map) = &v else {
        panic!("expected object, got {v:?}");
    };
    assert_eq!(map.get("class"), Some(&Value::from("park")));
    assert_eq!(serde_json::to_string(&v).unwrap(), r#"{"class":"park","rank":3}"#);
}
