use super::*;

#[test]
fn parsing_error_display_includes_key() {
    let e = ParsingError::new("[2][1]", "Expected number but found string instead.");
    assert_eq!(
        e.to_string(),
        "[2][1]: Expected number but found string instead."
    );
}

#[test]
fn root_parsing_error_has_no_key_prefix() {
    let e = ParsingError::new("", "Expected an array with at least one element.");
    assert_eq!(e.to_string(), "Expected an array with at least one element.");
}

#[test]
fn runtime_error_displays_message() {
    let e = RuntimeError::new("Could not parse color from value 'nope'");
    assert_eq!(e.to_string(), "Could not parse color from value 'nope'");
}
