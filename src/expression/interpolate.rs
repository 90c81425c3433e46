//! Interpolation factors and value blending for `interpolate` outputs.

use crate::color::rgba::Color;
use crate::color::space::{self, Hcl, Lab};
use crate::expression::ast::{ColorSpace, Interpolation};
use crate::expression::error::RuntimeError;
use crate::expression::value::Value;
use crate::foundation::math::{UnitBezier, exponential_factor, lerp};

/// Blend factor in `[0, 1]` for `input` between the stop inputs `lower` and `upper`.
pub fn interpolation_factor(interpolation: &Interpolation, input: f64, lower: f64, upper: f64) -> f64 {
    match interpolation {
        Interpolation::Linear => exponential_factor(input, 1.0, lower, upper),
        Interpolation::Exponential { base } => exponential_factor(input, *base, lower, upper),
        Interpolation::CubicBezier([x1, y1, x2, y2]) => {
            UnitBezier::new(*x1, *y1, *x2, *y2).solve(exponential_factor(input, 1.0, lower, upper))
        }
    }
}

/// Blend two evaluated stop outputs.
pub(crate) fn blend(space: ColorSpace, from: &Value, to: &Value, t: f64) -> Result<Value, RuntimeError> {
    match (from, to) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(lerp(*a, *b, t))),
        (Value::Color(a), Value::Color(b)) => Ok(Value::Color(blend_color(space, *a, *b, t))),
        (Value::Array(a), Value::Array(b)) if a.len() == b.len() => a
            .iter()
            .zip(b)
            .map(|(x, y)| match (x, y) {
                (Value::Number(x), Value::Number(y)) => Ok(Value::Number(lerp(*x, *y, t))),
                _ => Err(not_interpolatable(x, y)),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        _ => Err(not_interpolatable(from, to)),
    }
}

fn not_interpolatable(from: &Value, to: &Value) -> RuntimeError {
    RuntimeError::new(format!(
        "Cannot interpolate between values of type {} and {}.",
        from.type_of(),
        to.type_of()
    ))
}

/// Blend two colors in `space`.
pub fn blend_color(space: ColorSpace, from: Color, to: Color, t: f64) -> Color {
    match space {
        ColorSpace::Rgb => Color::new(
            lerp(from.r, to.r, t),
            lerp(from.g, to.g, t),
            lerp(from.b, to.b, t),
            lerp(from.a, to.a, t),
        ),
        ColorSpace::Lab => {
            let (a, b) = (space::rgb_to_lab(from), space::rgb_to_lab(to));
            space::lab_to_rgb(Lab {
                l: lerp(a.l, b.l, t),
                a: lerp(a.a, b.a, t),
                b: lerp(a.b, b.b, t),
                alpha: lerp(a.alpha, b.alpha, t),
            })
        }
        ColorSpace::Hcl => {
            let (a, b) = (space::rgb_to_hcl(from), space::rgb_to_hcl(to));
            space::hcl_to_rgb(Hcl {
                h: interpolate_hue(a.h, b.h, t),
                c: lerp(a.c, b.c, t),
                l: lerp(a.l, b.l, t),
                alpha: lerp(a.alpha, b.alpha, t),
            })
        }
    }
}

/// Hue blend along the shorter arc.
fn interpolate_hue(a: f64, b: f64, t: f64) -> f64 {
    let d = b - a;
    let d = if !(-180.0..=180.0).contains(&d) {
        d - 360.0 * (d / 360.0).round()
    } else {
        d
    };
    a + t * d
}

#[cfg(test)]
#[path = "../../tests/unit/expression/interpolate.rs"]
mod tests;
