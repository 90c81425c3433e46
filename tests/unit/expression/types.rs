use super::*;

fn all_types() -> Vec<Type> {
    vec![
        Type::Null,
        Type::Number,
        Type::String,
        Type::Boolean,
        Type::Color,
        Type::Object,
        Type::Value,
        Type::Error,
        Type::array(Type::Number, None),
        Type::array(Type::Number, Some(2)),
        Type::array(Type::Value, None),
    ]
}

#[test]
fn subtyping_is_reflexive() {
    for t in all_types() {
        assert!(check_subtype(&t, &t).is_ok(), "{t}");
    }
}

#[test]
fn error_subtypes_everything() {
    for t in all_types() {
        assert!(check_subtype(&t, &Type::Error).is_ok(), "{t}");
    }
}

#[test]
fn value_is_supertype_of_concrete_kinds() {
    for t in [
        Type::Null,
        Type::Number,
        Type::String,
        Type::Boolean,
        Type::Color,
        Type::Object,
        Type::array(Type::Value, None),
        Type::array(Type::Number, Some(3)),
    ] {
        assert!(check_subtype(&Type::Value, &t).is_ok(), "{t}");
    }
}

#[test]
fn concrete_kinds_do_not_subtype_each_other() {
    assert_eq!(
        check_subtype(&Type::Number, &Type::String),
        Err("Expected number but found string instead.".to_owned())
    );
    assert!(check_subtype(&Type::Number, &Type::Value).is_err());
    assert!(check_subtype(&Type::Color, &Type::String).is_err());
}

#[test]
fn array_subtyping_checks_item_and_length() {
    let fixed = Type::array(Type::Number, Some(2));
    let open = Type::array(Type::Number, None);
    assert!(check_subtype(&open, &fixed).is_ok());
    assert!(check_subtype(&fixed, &open).is_err());
    assert!(check_subtype(&fixed, &Type::array(Type::Number, Some(3))).is_err());
    assert!(check_subtype(&Type::array(Type::Value, None), &fixed).is_ok());
    assert!(check_subtype(&Type::array(Type::String, None), &fixed).is_err());
    assert!(check_subtype(&open, &Type::Number).is_err());
}

#[test]
fn display_matches_type_names() {
    assert_eq!(Type::array(Type::Value, None).to_string(), "array");
    assert_eq!(Type::array(Type::Number, None).to_string(), "array<number>");
    assert_eq!(
        Type::array(Type::String, Some(4)).to_string(),
        "array<string, 4>"
    );
    assert_eq!(
        Type::array(Type::Value, Some(2)).to_string(),
        "array<value, 2>"
    );
}

#[test]
fn value_accepts_value_and_untyped_arrays() {
    assert_eq!(check_subtype(&Type::Value, &Type::Value), Ok(()));
    let values = Type::array(Type::Value, None);
    assert_eq!(check_subtype(&values, &values), Ok(()));
    assert!(check_subtype(&Type::array(Type::Value, Some(2)), &values).is_err());
}
