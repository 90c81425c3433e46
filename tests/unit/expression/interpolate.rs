use super::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn linear_factor_is_proportional() {
    let t = interpolation_factor(&Interpolation::Linear, 7.5, 5.0, 10.0);
    assert!(close(t, 0.5));
}

#[test]
fn exponential_factor_accelerates() {
    let linear = interpolation_factor(&Interpolation::Linear, 7.5, 5.0, 10.0);
    let exp = interpolation_factor(&Interpolation::Exponential { base: 2.0 }, 7.5, 5.0, 10.0);
    assert!(exp < linear);
    let at_end = interpolation_factor(&Interpolation::Exponential { base: 2.0 }, 10.0, 5.0, 10.0);
    assert!(close(at_end, 1.0));
}

#[test]
fn cubic_bezier_identity_curve_is_linear() {
    let curve = Interpolation::CubicBezier([0.0, 0.0, 1.0, 1.0]);
    for x in [0.0, 0.25, 0.5, 0.9] {
        let t = interpolation_factor(&curve, x * 10.0, 0.0, 10.0);
        assert!((t - x).abs() < 1e-5, "x={x} t={t}");
    }
}

#[test]
fn numbers_and_arrays_blend_componentwise() {
    let v = blend(ColorSpace::Rgb, &Value::Number(0.0), &Value::Number(10.0), 0.25).unwrap();
    assert_eq!(v, Value::Number(2.5));

    let from = Value::Array(vec![Value::Number(0.0), Value::Number(10.0)]);
    let to = Value::Array(vec![Value::Number(10.0), Value::Number(20.0)]);
    let v = blend(ColorSpace::Rgb, &from, &to, 0.5).unwrap();
    assert_eq!(v, Value::Array(vec![Value::Number(5.0), Value::Number(15.0)]));
}

#[test]
fn mismatched_values_are_rejected() {
    let err = blend(
        ColorSpace::Rgb,
        &Value::Number(0.0),
        &Value::String("a".into()),
        0.5,
    )
    .unwrap_err();
    assert_eq!(
        err.message,
        "Cannot interpolate between values of type number and string."
    );
}

#[test]
fn rgb_blend_is_channel_lerp() {
    let c = blend_color(ColorSpace::Rgb, Color::BLACK, Color::WHITE, 0.5);
    assert!(close(c.r, 0.5) && close(c.g, 0.5) && close(c.b, 0.5) && close(c.a, 1.0));
}

#[test]
fn lab_and_hcl_preserve_endpoints() {
    let red = Color::new(1.0, 0.0, 0.0, 1.0);
    let blue = Color::new(0.0, 0.0, 1.0, 1.0);
    for space in [ColorSpace::Lab, ColorSpace::Hcl] {
        let start = blend_color(space, red, blue, 0.0);
        let end = blend_color(space, red, blue, 1.0);
        assert!((start.r - 1.0).abs() < 1e-6 && start.b.abs() < 1e-6, "{space:?}");
        assert!((end.b - 1.0).abs() < 1e-6 && end.r.abs() < 1e-6, "{space:?}");
    }
}

#[test]
fn hue_takes_the_short_way_round() {
    assert!(close(interpolate_hue(350.0, 10.0, 0.5), 360.0));
    assert!(close(interpolate_hue(10.0, 350.0, 0.5), 0.0));
    assert!(close(interpolate_hue(0.0, 90.0, 0.5), 45.0));
}
