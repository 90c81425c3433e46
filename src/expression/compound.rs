//! Built-in operators with fixed or variadic signatures.
//!
//! Each operator is a pure function over its evaluated arguments plus the feature and
//! globals in the evaluation context.

use std::collections::BTreeMap;

use crate::color::rgba::Color;
use crate::expression::ast::Expr;
use crate::expression::error::RuntimeError;
use crate::expression::eval::EvaluationContext;
use crate::expression::types::Type;
use crate::expression::value::Value;

/// Operator of an [`Expr::Compound`] node.
///
/// Variants are named after the expression operator they implement; see
/// [`CompoundOp::name`] for the spelling used in expressions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum CompoundOp {
    Error,
    Typeof,
    ToString,
    ToBoolean,
    ToRgba,
    Rgb,
    Rgba,
    Length,
    Has,
    Get,
    Properties,
    GeometryType,
    Id,
    Zoom,
    HeatmapDensity,
    Add,
    Mul,
    Sub,
    Div,
    Rem,
    Ln2,
    Pi,
    E,
    Pow,
    Sqrt,
    Log10,
    Ln,
    Log2,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Abs,
    Floor,
    Ceil,
    Round,
    Min,
    Max,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    All,
    Any,
    Not,
    Upcase,
    Downcase,
    Concat,
}

/// Parameter list of one overload.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Params {
    /// Exactly these argument types.
    Fixed(Vec<Type>),
    /// Any number of arguments of this type.
    Varargs(Type),
}

impl Params {
    pub(crate) fn accepts_arity(&self, n: usize) -> bool {
        match self {
            Self::Fixed(types) => types.len() == n,
            Self::Varargs(_) => true,
        }
    }

    pub(crate) fn param(&self, i: usize) -> Option<&Type> {
        match self {
            Self::Fixed(types) => types.get(i),
            Self::Varargs(t) => Some(t),
        }
    }
}

impl std::fmt::Display for Params {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed(types) => {
                let names: Vec<String> = types.iter().map(ToString::to_string).collect();
                write!(f, "({})", names.join(", "))
            }
            Self::Varargs(t) => write!(f, "({t}...)"),
        }
    }
}

const OPS: &[(&str, CompoundOp)] = &[
    ("error", CompoundOp::Error),
    ("typeof", CompoundOp::Typeof),
    ("to-string", CompoundOp::ToString),
    ("to-boolean", CompoundOp::ToBoolean),
    ("to-rgba", CompoundOp::ToRgba),
    ("rgb", CompoundOp::Rgb),
    ("rgba", CompoundOp::Rgba),
    ("length", CompoundOp::Length),
    ("has", CompoundOp::Has),
    ("get", CompoundOp::Get),
    ("properties", CompoundOp::Properties),
    ("geometry-type", CompoundOp::GeometryType),
    ("id", CompoundOp::Id),
    ("zoom", CompoundOp::Zoom),
    ("heatmap-density", CompoundOp::HeatmapDensity),
    ("+", CompoundOp::Add),
    ("*", CompoundOp::Mul),
    ("-", CompoundOp::Sub),
    ("/", CompoundOp::Div),
    ("%", CompoundOp::Rem),
    ("ln2", CompoundOp::Ln2),
    ("pi", CompoundOp::Pi),
    ("e", CompoundOp::E),
    ("^", CompoundOp::Pow),
    ("sqrt", CompoundOp::Sqrt),
    ("log10", CompoundOp::Log10),
    ("ln", CompoundOp::Ln),
    ("log2", CompoundOp::Log2),
    ("sin", CompoundOp::Sin),
    ("cos", CompoundOp::Cos),
    ("tan", CompoundOp::Tan),
    ("asin", CompoundOp::Asin),
    ("acos", CompoundOp::Acos),
    ("atan", CompoundOp::Atan),
    ("abs", CompoundOp::Abs),
    ("floor", CompoundOp::Floor),
    ("ceil", CompoundOp::Ceil),
    ("round", CompoundOp::Round),
    ("min", CompoundOp::Min),
    ("max", CompoundOp::Max),
    ("==", CompoundOp::Eq),
    ("!=", CompoundOp::Ne),
    ("<", CompoundOp::Lt),
    (">", CompoundOp::Gt),
    ("<=", CompoundOp::Le),
    (">=", CompoundOp::Ge),
    ("all", CompoundOp::All),
    ("any", CompoundOp::Any),
    ("!", CompoundOp::Not),
    ("upcase", CompoundOp::Upcase),
    ("downcase", CompoundOp::Downcase),
    ("concat", CompoundOp::Concat),
];

impl CompoundOp {
    /// Look up an operator by its expression name.
    pub fn from_name(name: &str) -> Option<Self> {
        OPS.iter().find(|(n, _)| *n == name).map(|(_, op)| *op)
    }

    /// Expression name, e.g. `"geometry-type"`.
    pub fn name(self) -> &'static str {
        OPS.iter()
            .find(|(_, op)| *op == self)
            .map(|(n, _)| *n)
            .unwrap_or("")
    }

    /// `true` for `==`, `!=`, `<`, `>`, `<=`, `>=`.
    pub(crate) fn is_comparison(self) -> bool {
        self.is_equality() || self.is_ordering()
    }

    pub(crate) fn is_equality(self) -> bool {
        matches!(self, Self::Eq | Self::Ne)
    }

    pub(crate) fn is_ordering(self) -> bool {
        matches!(self, Self::Lt | Self::Gt | Self::Le | Self::Ge)
    }

    /// Result type and overloads.
    ///
    /// Comparisons accept any operands here; the parser narrows them to comparable pairs.
    pub(crate) fn definition(self) -> (Type, Vec<Params>) {
        use Params::{Fixed, Varargs};
        let n = || Type::Number;
        match self {
            Self::Error => (Type::Error, vec![Fixed(vec![Type::String])]),
            Self::Typeof | Self::ToString => (Type::String, vec![Fixed(vec![Type::Value])]),
            Self::ToBoolean => (Type::Boolean, vec![Fixed(vec![Type::Value])]),
            Self::ToRgba => (
                Type::array(Type::Number, Some(4)),
                vec![Fixed(vec![Type::Color])],
            ),
            Self::Rgb => (Type::Color, vec![Fixed(vec![n(), n(), n()])]),
            Self::Rgba => (Type::Color, vec![Fixed(vec![n(), n(), n(), n()])]),
            Self::Length => (
                Type::Number,
                vec![
                    Fixed(vec![Type::String]),
                    Fixed(vec![Type::array(Type::Value, None)]),
                ],
            ),
            Self::Has => (
                Type::Boolean,
                vec![
                    Fixed(vec![Type::String]),
                    Fixed(vec![Type::String, Type::Object]),
                ],
            ),
            Self::Get => (
                Type::Value,
                vec![
                    Fixed(vec![Type::String]),
                    Fixed(vec![Type::String, Type::Object]),
                ],
            ),
            Self::Properties => (Type::Object, vec![Fixed(vec![])]),
            Self::GeometryType => (Type::String, vec![Fixed(vec![])]),
            Self::Id => (Type::Value, vec![Fixed(vec![])]),
            Self::Zoom | Self::HeatmapDensity | Self::Ln2 | Self::Pi | Self::E => {
                (Type::Number, vec![Fixed(vec![])])
            }
            Self::Add | Self::Mul | Self::Min | Self::Max => (Type::Number, vec![Varargs(n())]),
            Self::Sub => (
                Type::Number,
                vec![Fixed(vec![n(), n()]), Fixed(vec![n()])],
            ),
            Self::Div | Self::Rem | Self::Pow => (Type::Number, vec![Fixed(vec![n(), n()])]),
            Self::Sqrt
            | Self::Log10
            | Self::Ln
            | Self::Log2
            | Self::Sin
            | Self::Cos
            | Self::Tan
            | Self::Asin
            | Self::Acos
            | Self::Atan
            | Self::Abs
            | Self::Floor
            | Self::Ceil
            | Self::Round => (Type::Number, vec![Fixed(vec![n()])]),
            Self::Eq | Self::Ne | Self::Lt | Self::Gt | Self::Le | Self::Ge => (
                Type::Boolean,
                vec![Fixed(vec![Type::Value, Type::Value])],
            ),
            Self::All | Self::Any => (Type::Boolean, vec![Varargs(Type::Boolean)]),
            Self::Not => (Type::Boolean, vec![Fixed(vec![Type::Boolean])]),
            Self::Upcase | Self::Downcase => (Type::String, vec![Fixed(vec![Type::String])]),
            Self::Concat => (Type::String, vec![Varargs(Type::Value)]),
        }
    }

    /// Static operand check for comparisons, run after both operands parsed.
    pub(crate) fn check_comparable(self, lhs: &Type, rhs: &Type) -> Result<(), String> {
        let allowed: &[&str] = if self.is_ordering() {
            &["number", "string", "value"]
        } else {
            &["number", "string", "boolean", "null", "value"]
        };
        for t in [lhs, rhs] {
            if !allowed.contains(&t.kind()) {
                return Err(format!(
                    "\"{}\" comparisons are not supported for type '{t}'.",
                    self.name()
                ));
            }
        }
        if lhs != rhs && lhs.kind() != "value" && rhs.kind() != "value" {
            return Err(format!("Cannot compare types '{lhs}' and '{rhs}'."));
        }
        Ok(())
    }
}

fn num(expr: &Expr, ctx: &mut EvaluationContext<'_>) -> Result<f64, RuntimeError> {
    match expr.evaluate(ctx)? {
        Value::Number(n) => Ok(n),
        other => Err(type_mismatch("number", &other)),
    }
}

fn string(expr: &Expr, ctx: &mut EvaluationContext<'_>) -> Result<String, RuntimeError> {
    match expr.evaluate(ctx)? {
        Value::String(s) => Ok(s),
        other => Err(type_mismatch("string", &other)),
    }
}

fn boolean(expr: &Expr, ctx: &mut EvaluationContext<'_>) -> Result<bool, RuntimeError> {
    match expr.evaluate(ctx)? {
        Value::Bool(b) => Ok(b),
        other => Err(type_mismatch("boolean", &other)),
    }
}

fn object(
    expr: &Expr,
    ctx: &mut EvaluationContext<'_>,
) -> Result<BTreeMap<String, Value>, RuntimeError> {
    match expr.evaluate(ctx)? {
        Value::Object(map) => Ok(map),
        other => Err(type_mismatch("object", &other)),
    }
}

pub(crate) fn type_mismatch(expected: &str, found: &Value) -> RuntimeError {
    RuntimeError::new(format!(
        "Expected value to be of type {expected}, but found {} instead.",
        found.type_of()
    ))
}

/// Validate straight-alpha RGBA components; `None` when valid.
pub(crate) fn validate_rgba(r: &Value, g: &Value, b: &Value, a: Option<&Value>) -> Option<String> {
    let in_range = |v: &Value, hi: f64| v.as_f64().is_some_and(|n| (0.0..=hi).contains(&n));
    let list = |vals: &[&Value]| {
        vals.iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };

    if !(in_range(r, 255.0) && in_range(g, 255.0) && in_range(b, 255.0)) {
        let shown = match a {
            Some(a) if a.as_f64().is_some() => list(&[r, g, b, a]),
            _ => list(&[r, g, b]),
        };
        return Some(format!(
            "Invalid rgba value [{shown}]: 'r', 'g', and 'b' must be between 0 and 255."
        ));
    }
    match a {
        Some(a) if !in_range(a, 1.0) => Some(format!(
            "Invalid rgba value [{}]: 'a' must be between 0 and 1.",
            list(&[r, g, b, a])
        )),
        _ => None,
    }
}

/// JavaScript-style truthiness.
fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => *n != 0.0 && !n.is_nan(),
        Value::String(s) => !s.is_empty(),
        Value::Color(_) | Value::Array(_) | Value::Object(_) => true,
    }
}

fn compare(op: CompoundOp, lhs: &Value, rhs: &Value) -> Result<bool, RuntimeError> {
    if op.is_equality() {
        let eq = lhs == rhs;
        return Ok(if op == CompoundOp::Eq { eq } else { !eq });
    }
    let ordering = match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => {
            return Err(RuntimeError::new(format!(
                "Expected arguments for \"{}\" to be (string, string) or (number, number), but found ({}, {}) instead.",
                op.name(),
                lhs.type_of(),
                rhs.type_of()
            )));
        }
    };
    // NaN compares false under every ordering operator.
    let Some(ordering) = ordering else {
        return Ok(false);
    };
    Ok(match op {
        CompoundOp::Lt => ordering.is_lt(),
        CompoundOp::Gt => ordering.is_gt(),
        CompoundOp::Le => ordering.is_le(),
        _ => ordering.is_ge(),
    })
}

fn js_round(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Evaluate `op` applied to `args`.
pub(crate) fn evaluate(
    op: CompoundOp,
    args: &[Expr],
    ctx: &mut EvaluationContext<'_>,
) -> Result<Value, RuntimeError> {
    match op {
        CompoundOp::Error => {
            let [msg] = args else {
                return Err(arity(op, args.len()));
            };
            Err(RuntimeError::new(string(msg, ctx)?))
        }
        CompoundOp::Typeof => {
            let [x] = args else {
                return Err(arity(op, args.len()));
            };
            Ok(Value::String(x.evaluate(ctx)?.type_of().to_string()))
        }
        CompoundOp::ToString => {
            let [x] = args else {
                return Err(arity(op, args.len()));
            };
            Ok(Value::String(x.evaluate(ctx)?.to_string()))
        }
        CompoundOp::ToBoolean => {
            let [x] = args else {
                return Err(arity(op, args.len()));
            };
            Ok(Value::Bool(truthy(&x.evaluate(ctx)?)))
        }
        CompoundOp::ToRgba => {
            let [x] = args else {
                return Err(arity(op, args.len()));
            };
            match x.evaluate(ctx)? {
                Value::Color(c) => Ok(Value::Array(
                    c.to_rgba_array().into_iter().map(Value::Number).collect(),
                )),
                other => Err(type_mismatch("color", &other)),
            }
        }
        CompoundOp::Rgb | CompoundOp::Rgba => {
            let vals = args
                .iter()
                .map(|a| a.evaluate(ctx))
                .collect::<Result<Vec<_>, _>>()?;
            let (r, g, b, a) = match vals.as_slice() {
                [r, g, b] => (r, g, b, None),
                [r, g, b, a] => (r, g, b, Some(a)),
                _ => return Err(arity(op, vals.len())),
            };
            if let Some(msg) = validate_rgba(r, g, b, a) {
                return Err(RuntimeError::new(msg));
            }
            let ch = |v: &Value| v.as_f64().unwrap_or(0.0);
            Ok(Value::Color(Color::from_rgba255(
                ch(r),
                ch(g),
                ch(b),
                a.map_or(1.0, ch),
            )))
        }
        CompoundOp::Length => {
            let [x] = args else {
                return Err(arity(op, args.len()));
            };
            match x.evaluate(ctx)? {
                Value::String(s) => Ok(Value::Number(s.chars().count() as f64)),
                Value::Array(items) => Ok(Value::Number(items.len() as f64)),
                other => Err(RuntimeError::new(format!(
                    "Expected value to be of type string or array, but found {} instead.",
                    other.type_of()
                ))),
            }
        }
        CompoundOp::Has | CompoundOp::Get => {
            let found = match args {
                [key] => {
                    let key = string(key, ctx)?;
                    ctx.properties().and_then(|p| p.get(&key)).cloned()
                }
                [key, obj] => {
                    let key = string(key, ctx)?;
                    object(obj, ctx)?.remove(&key)
                }
                _ => return Err(arity(op, args.len())),
            };
            Ok(if op == CompoundOp::Has {
                Value::Bool(found.is_some())
            } else {
                found.unwrap_or(Value::Null)
            })
        }
        CompoundOp::Properties => Ok(Value::Object(ctx.properties().cloned().unwrap_or_default())),
        CompoundOp::GeometryType => Ok(ctx
            .geometry_type()
            .map_or(Value::Null, |t| Value::String(t.to_owned()))),
        CompoundOp::Id => Ok(ctx.id().cloned().unwrap_or(Value::Null)),
        CompoundOp::Zoom => Ok(Value::Number(ctx.globals.zoom)),
        CompoundOp::HeatmapDensity => Ok(Value::Number(ctx.globals.heatmap_density.unwrap_or(0.0))),
        CompoundOp::Add | CompoundOp::Mul | CompoundOp::Min | CompoundOp::Max => {
            let mut acc = match op {
                CompoundOp::Add => 0.0,
                CompoundOp::Mul => 1.0,
                CompoundOp::Min => f64::INFINITY,
                _ => f64::NEG_INFINITY,
            };
            for a in args {
                let x = num(a, ctx)?;
                acc = match op {
                    CompoundOp::Add => acc + x,
                    CompoundOp::Mul => acc * x,
                    CompoundOp::Min => acc.min(x),
                    _ => acc.max(x),
                };
            }
            Ok(Value::Number(acc))
        }
        CompoundOp::Sub => match args {
            [a, b] => Ok(Value::Number(num(a, ctx)? - num(b, ctx)?)),
            [a] => Ok(Value::Number(-num(a, ctx)?)),
            _ => Err(arity(op, args.len())),
        },
        CompoundOp::Div | CompoundOp::Rem | CompoundOp::Pow => {
            let [a, b] = args else {
                return Err(arity(op, args.len()));
            };
            let (a, b) = (num(a, ctx)?, num(b, ctx)?);
            Ok(Value::Number(match op {
                CompoundOp::Div => a / b,
                CompoundOp::Rem => a % b,
                _ => a.powf(b),
            }))
        }
        CompoundOp::Ln2 => Ok(Value::Number(std::f64::consts::LN_2)),
        CompoundOp::Pi => Ok(Value::Number(std::f64::consts::PI)),
        CompoundOp::E => Ok(Value::Number(std::f64::consts::E)),
        CompoundOp::Sqrt => unary(op, args, ctx, f64::sqrt),
        CompoundOp::Log10 => unary(op, args, ctx, f64::log10),
        CompoundOp::Ln => unary(op, args, ctx, f64::ln),
        CompoundOp::Log2 => unary(op, args, ctx, f64::log2),
        CompoundOp::Sin => unary(op, args, ctx, f64::sin),
        CompoundOp::Cos => unary(op, args, ctx, f64::cos),
        CompoundOp::Tan => unary(op, args, ctx, f64::tan),
        CompoundOp::Asin => unary(op, args, ctx, f64::asin),
        CompoundOp::Acos => unary(op, args, ctx, f64::acos),
        CompoundOp::Atan => unary(op, args, ctx, f64::atan),
        CompoundOp::Abs => unary(op, args, ctx, f64::abs),
        CompoundOp::Floor => unary(op, args, ctx, f64::floor),
        CompoundOp::Ceil => unary(op, args, ctx, f64::ceil),
        CompoundOp::Round => unary(op, args, ctx, js_round),
        CompoundOp::Eq
        | CompoundOp::Ne
        | CompoundOp::Lt
        | CompoundOp::Gt
        | CompoundOp::Le
        | CompoundOp::Ge => {
            let [a, b] = args else {
                return Err(arity(op, args.len()));
            };
            let (a, b) = (a.evaluate(ctx)?, b.evaluate(ctx)?);
            Ok(Value::Bool(compare(op, &a, &b)?))
        }
        CompoundOp::All => {
            for a in args {
                if !boolean(a, ctx)? {
                    return Ok(Value::Bool(false));
                }
            }
            Ok(Value::Bool(true))
        }
        CompoundOp::Any => {
            for a in args {
                if boolean(a, ctx)? {
                    return Ok(Value::Bool(true));
                }
            }
            Ok(Value::Bool(false))
        }
        CompoundOp::Not => {
            let [x] = args else {
                return Err(arity(op, args.len()));
            };
            Ok(Value::Bool(!boolean(x, ctx)?))
        }
        CompoundOp::Upcase | CompoundOp::Downcase => {
            let [x] = args else {
                return Err(arity(op, args.len()));
            };
            let s = string(x, ctx)?;
            Ok(Value::String(if op == CompoundOp::Upcase {
                s.to_uppercase()
            } else {
                s.to_lowercase()
            }))
        }
        CompoundOp::Concat => {
            let mut out = String::new();
            for a in args {
                out.push_str(&a.evaluate(ctx)?.to_string());
            }
            Ok(Value::String(out))
        }
    }
}

fn unary(
    op: CompoundOp,
    args: &[Expr],
    ctx: &mut EvaluationContext<'_>,
    f: fn(f64) -> f64,
) -> Result<Value, RuntimeError> {
    let [x] = args else {
        return Err(arity(op, args.len()));
    };
    Ok(Value::Number(f(num(x, ctx)?)))
}

fn arity(op: CompoundOp, found: usize) -> RuntimeError {
    RuntimeError::new(format!(
        "\"{}\" called with {found} arguments",
        op.name()
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/expression/compound.rs"]
mod tests;
