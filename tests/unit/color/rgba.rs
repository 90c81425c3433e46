use super::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn parses_hex_short_and_long() {
    assert_eq!(Color::parse("#ff0000"), Some(Color::new(1.0, 0.0, 0.0, 1.0)));
    assert_eq!(Color::parse("#0f0"), Some(Color::new(0.0, 1.0, 0.0, 1.0)));
    assert_eq!(Color::parse("#FFF"), Some(Color::WHITE));
    assert_eq!(Color::parse("#12345"), None);
    assert_eq!(Color::parse("#gggggg"), None);
}

#[test]
fn parses_named_colors_and_transparent() {
    assert_eq!(Color::parse("black"), Some(Color::BLACK));
    assert_eq!(Color::parse("Transparent"), Some(Color::TRANSPARENT));
    let c = Color::parse("rebeccapurple").unwrap();
    assert!(approx(c.r, 102.0 / 255.0));
    assert!(approx(c.g, 51.0 / 255.0));
    assert!(approx(c.b, 153.0 / 255.0));
    assert_eq!(Color::parse("notacolor"), None);
}

#[test]
fn rgba_function_premultiplies() {
    let c = Color::parse("rgba(255, 0, 0, 0.5)").unwrap();
    assert!(approx(c.r, 0.5));
    assert!(approx(c.a, 0.5));
    assert_eq!(c.to_rgba_array(), [255.0, 0.0, 0.0, 0.5]);
}

#[test]
fn rgb_function_accepts_percentages_and_clamps() {
    let c = Color::parse("rgb(100%, 50%, 300)").unwrap();
    assert!(approx(c.r, 1.0));
    assert!(approx(c.g, 128.0 / 255.0));
    assert!(approx(c.b, 1.0));
    assert_eq!(Color::parse("rgb(1, 2)"), None);
    assert_eq!(Color::parse("rgba(1, 2, 3)"), None);
}

#[test]
fn hsl_function_matches_rgb() {
    assert_eq!(Color::parse("hsl(0, 100%, 50%)"), Color::parse("#ff0000"));
    assert_eq!(Color::parse("hsl(120, 100%, 50%)"), Color::parse("#00ff00"));
    let c = Color::parse("hsla(240, 100%, 50%, 0.25)").unwrap();
    assert!(approx(c.b, 0.25));
    assert!(approx(c.a, 0.25));
}

#[test]
fn display_renders_straight_rgba() {
    assert_eq!(Color::parse("#ff8000").unwrap().to_string(), "rgba(255,128,0,1)");
    assert_eq!(
        Color::parse("rgba(0, 0, 255, 0.5)").unwrap().to_string(),
        "rgba(0,0,255,0.5)"
    );
    assert_eq!(Color::TRANSPARENT.to_string(), "rgba(0,0,0,0)");
}

#[test]
fn serde_roundtrips_through_css_string() {
    let c: Color = serde_json::from_value(serde_json::json!("#336699")).unwrap();
    let s = serde_json::to_value(c).unwrap();
    assert_eq!(s, serde_json::json!("rgba(51,102,153,1)"));
    assert!(serde_json::from_value::<Color>(serde_json::json!("nope")).is_err());
}
