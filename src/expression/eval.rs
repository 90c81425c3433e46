use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::color::rgba::Color;
use crate::expression::ast::{Expr, MatchKey};
use crate::expression::compound::{self, type_mismatch, validate_rgba};
use crate::expression::error::RuntimeError;
use crate::expression::interpolate::{blend, interpolation_factor};
use crate::expression::scope::Scope;
use crate::expression::types::{Type, check_subtype};
use crate::expression::value::Value;
use crate::foundation::math::find_stop_less_than_or_equal_to;

/// Per-call global inputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Globals {
    /// Current zoom level.
    pub zoom: f64,
    /// Kernel density estimate, for heatmap layers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heatmap_density: Option<f64>,
}

impl Globals {
    /// Globals at `zoom`.
    pub fn at_zoom(zoom: f64) -> Self {
        Self {
            zoom,
            heatmap_density: None,
        }
    }
}

/// Geometry of a feature, as a numeric vector-tile code or a geometry type name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeometryType {
    /// `1` point, `2` line string, `3` polygon.
    Code(u32),
    /// Geometry type name such as `"Polygon"` or `"MultiLineString"`.
    Name(String),
}

impl GeometryType {
    /// Name reported by `geometry-type`. Multi-geometries report their single-part name.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Code(1) => Some("Point"),
            Self::Code(2) => Some("LineString"),
            Self::Code(3) => Some("Polygon"),
            Self::Code(_) => None,
            Self::Name(name) => Some(match name.as_str() {
                "MultiPoint" => "Point",
                "MultiLineString" => "LineString",
                "MultiPolygon" => "Polygon",
                other => other,
            }),
        }
    }
}

/// A map feature as seen by expressions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Feature attributes.
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
    /// Geometry type.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub geometry: Option<GeometryType>,
    /// Feature identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

impl Feature {
    /// A feature with only attributes.
    pub fn with_properties(properties: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            properties: properties.into_iter().collect(),
            ..Self::default()
        }
    }
}

/// Memo of parsed color strings, shared by every evaluation of one style.
///
/// Append-only: entries are never invalidated because color strings parse
/// deterministically.
#[derive(Debug, Default)]
pub struct ColorCache {
    entries: Mutex<HashMap<String, Option<Color>>>,
}

impl ColorCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `input`, consulting and filling the cache.
    pub fn parse(&self, input: &str) -> Option<Color> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(hit) = entries.get(input) {
            return *hit;
        }
        let parsed = Color::parse(input);
        entries.insert(input.to_owned(), parsed);
        parsed
    }

    /// Number of memoized strings.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// `true` when nothing has been parsed yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// State threaded through one evaluation: globals, the current feature, the active
/// `let` scope, and the color cache.
///
/// One context serves many sequential evaluations; use one per thread.
#[derive(Debug)]
pub struct EvaluationContext<'a> {
    /// Zoom and other globals.
    pub globals: Globals,
    /// Feature under evaluation, if any.
    pub feature: Option<&'a Feature>,
    pub(crate) scope: Scope,
    colors: &'a ColorCache,
}

impl<'a> EvaluationContext<'a> {
    /// A context with default globals and no feature.
    pub fn new(colors: &'a ColorCache) -> Self {
        Self {
            globals: Globals::default(),
            feature: None,
            scope: Scope::root(),
            colors,
        }
    }

    /// Point the context at new inputs, resetting the scope.
    pub fn reset(&mut self, globals: Globals, feature: Option<&'a Feature>) {
        self.globals = globals;
        self.feature = feature;
        self.scope = Scope::root();
    }

    pub(crate) fn properties(&self) -> Option<&BTreeMap<String, Value>> {
        self.feature.map(|f| &f.properties)
    }

    pub(crate) fn geometry_type(&self) -> Option<&str> {
        self.feature?.geometry.as_ref()?.name()
    }

    pub(crate) fn id(&self) -> Option<&Value> {
        self.feature?.id.as_ref()
    }

    pub(crate) fn parse_color(&self, input: &str) -> Option<Color> {
        self.colors.parse(input)
    }
}

impl Expr {
    /// Evaluate against `ctx`.
    pub fn evaluate(&self, ctx: &mut EvaluationContext<'_>) -> Result<Value, RuntimeError> {
        match self {
            Self::Literal { value, .. } => Ok(value.clone()),
            Self::Var { name, bound } => {
                // Evaluate in the scope that was active where the binding was declared.
                let Some((expr, enclosing)) = ctx
                    .scope
                    .resolve(name)
                    .map(|(e, s)| (e.clone(), s.clone()))
                else {
                    return bound.evaluate(ctx);
                };
                let saved = std::mem::replace(&mut ctx.scope, enclosing);
                let out = expr.evaluate(ctx);
                ctx.scope = saved;
                out
            }
            Self::Let { bindings, body } => {
                let frame = ctx.scope.concat(bindings.clone());
                let saved = std::mem::replace(&mut ctx.scope, frame);
                let out = body.evaluate(ctx);
                ctx.scope = saved;
                out
            }
            Self::Case {
                branches,
                otherwise,
                ..
            } => {
                for (test, output) in branches {
                    match test.evaluate(ctx)? {
                        Value::Bool(true) => return output.evaluate(ctx),
                        Value::Bool(false) => {}
                        other => return Err(type_mismatch("boolean", &other)),
                    }
                }
                otherwise.evaluate(ctx)
            }
            Self::Match {
                input,
                cases,
                outputs,
                otherwise,
                ..
            } => {
                let key = MatchKey::from_value(&input.evaluate(ctx)?);
                match key.and_then(|k| cases.get(&k)).and_then(|&i| outputs.get(i)) {
                    Some(output) => output.evaluate(ctx),
                    None => otherwise.evaluate(ctx),
                }
            }
            Self::Coalesce { args, .. } => {
                for arg in args {
                    let v = arg.evaluate(ctx)?;
                    if !v.is_null() {
                        return Ok(v);
                    }
                }
                Ok(Value::Null)
            }
            Self::Assertion { ty, args } => {
                let mut last = Value::Null;
                for arg in args {
                    let v = arg.evaluate(ctx)?;
                    if check_subtype(ty, &v.type_of()).is_ok() {
                        return Ok(v);
                    }
                    last = v;
                }
                Err(type_mismatch(&ty.to_string(), &last))
            }
            Self::Coercion { ty, args } => {
                if *ty == Type::Color {
                    coerce_color(args, ctx)
                } else {
                    coerce_number(args, ctx)
                }
            }
            Self::At { index, input, .. } => {
                let index = match index.evaluate(ctx)? {
                    Value::Number(n) => n,
                    other => return Err(type_mismatch("number", &other)),
                };
                let items = match input.evaluate(ctx)? {
                    Value::Array(items) => items,
                    other => return Err(type_mismatch("array", &other)),
                };
                if index < 0.0 {
                    return Err(RuntimeError::new(format!(
                        "Array index out of bounds: {} < 0.",
                        Value::Number(index)
                    )));
                }
                if index >= items.len() as f64 {
                    return Err(RuntimeError::new(format!(
                        "Array index out of bounds: {} > {}.",
                        Value::Number(index),
                        Value::Number(items.len() as f64 - 1.0)
                    )));
                }
                if index.fract() != 0.0 {
                    return Err(RuntimeError::new(format!(
                        "Array index must be an integer, but found {} instead.",
                        Value::Number(index)
                    )));
                }
                let mut items = items;
                Ok(items.swap_remove(index as usize))
            }
            Self::Step {
                input,
                labels,
                outputs,
                ..
            } => {
                if let [only] = outputs.as_slice() {
                    return only.evaluate(ctx);
                }
                let x = match input.evaluate(ctx)? {
                    Value::Number(n) => n,
                    other => return Err(type_mismatch("number", &other)),
                };
                let i = find_stop_less_than_or_equal_to(labels, x);
                match outputs.get(i) {
                    Some(output) => output.evaluate(ctx),
                    None => Ok(Value::Null),
                }
            }
            Self::Interpolate {
                interpolation,
                space,
                input,
                labels,
                outputs,
                ..
            } => {
                if let [only] = outputs.as_slice() {
                    return only.evaluate(ctx);
                }
                let x = match input.evaluate(ctx)? {
                    Value::Number(n) => n,
                    other => return Err(type_mismatch("number", &other)),
                };
                let (Some(&first), Some(&last)) = (labels.first(), labels.last()) else {
                    return Ok(Value::Null);
                };
                if x <= first {
                    return outputs[0].evaluate(ctx);
                }
                let n = outputs.len();
                if x >= last {
                    return outputs[n - 1].evaluate(ctx);
                }
                let i = find_stop_less_than_or_equal_to(labels, x);
                let t = interpolation_factor(interpolation, x, labels[i], labels[i + 1]);
                let lower = outputs[i].evaluate(ctx)?;
                let upper = outputs[i + 1].evaluate(ctx)?;
                blend(*space, &lower, &upper, t)
            }
            Self::Compound { op, args, .. } => compound::evaluate(*op, args, ctx),
        }
    }
}

fn coerce_color(args: &[Expr], ctx: &mut EvaluationContext<'_>) -> Result<Value, RuntimeError> {
    let mut failure = None;
    let mut last = Value::Null;
    for arg in args {
        let input = arg.evaluate(ctx)?;
        failure = None;
        match &input {
            Value::Color(c) => return Ok(Value::Color(*c)),
            Value::String(s) => {
                if let Some(c) = ctx.parse_color(s) {
                    return Ok(Value::Color(c));
                }
            }
            Value::Array(items) => {
                if !(3..=4).contains(&items.len()) {
                    failure = Some(format!(
                        "Invalid rbga value {}: expected an array containing either three or four numeric values.",
                        input.to_json()
                    ));
                } else {
                    failure = validate_rgba(&items[0], &items[1], &items[2], items.get(3));
                    if failure.is_none() {
                        let ch = |i: usize| items.get(i).and_then(Value::as_f64);
                        return Ok(Value::Color(Color::from_rgba255(
                            ch(0).unwrap_or(0.0),
                            ch(1).unwrap_or(0.0),
                            ch(2).unwrap_or(0.0),
                            ch(3).unwrap_or(1.0),
                        )));
                    }
                }
            }
            _ => {}
        }
        last = input;
    }
    Err(RuntimeError::new(failure.unwrap_or_else(|| {
        let shown = match &last {
            Value::String(s) => s.clone(),
            other => other.to_json().to_string(),
        };
        format!("Could not parse color from value '{shown}'")
    })))
}

fn coerce_number(args: &[Expr], ctx: &mut EvaluationContext<'_>) -> Result<Value, RuntimeError> {
    let mut last = Value::Null;
    for arg in args {
        let v = arg.evaluate(ctx)?;
        if !v.is_null() {
            if let Some(n) = to_number(&v) {
                return Ok(Value::Number(n));
            }
        }
        last = v;
    }
    Err(RuntimeError::new(format!(
        "Could not convert {} to number.",
        last.to_json()
    )))
}

/// Numeric conversion of a non-null value; `None` when the result would be NaN.
fn to_number(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => *n,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::String(s) => {
            let s = s.trim();
            if let Some((base, digits)) = radix(s) {
                return parse_radix(digits, base);
            }
            match s {
                "" => 0.0,
                "Infinity" | "+Infinity" => f64::INFINITY,
                "-Infinity" => f64::NEG_INFINITY,
                _ if s.bytes().any(|b| b.is_ascii_alphabetic() && !matches!(b, b'e' | b'E')) => {
                    return None;
                }
                _ => s.parse().ok()?,
            }
        }
        Value::Null | Value::Color(_) | Value::Array(_) | Value::Object(_) => return None,
    };
    (!n.is_nan()).then_some(n)
}

/// Base and digits of a `0x`, `0o` or `0b` literal.
fn radix(s: &str) -> Option<(u32, &str)> {
    let base = match s.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    Some((base, &s[2..]))
}

fn parse_radix(digits: &str, base: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0.0, |acc, c| {
        c.to_digit(base).map(|d| acc * f64::from(base) + f64::from(d))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/expression/eval.rs"]
mod tests;
