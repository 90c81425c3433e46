use std::collections::HashMap;
use std::sync::Arc;

use crate::expression::compound::CompoundOp;
use crate::expression::types::Type;
use crate::expression::value::Value;

/// How `interpolate` blends between two adjacent stops.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Interpolation {
    /// Linear progress.
    Linear,
    /// Exponential progress with the given base.
    Exponential {
        /// Growth rate; `1` is linear.
        base: f64,
    },
    /// Progress eased along a unit cubic Bézier with control points `[x1, y1, x2, y2]`.
    CubicBezier([f64; 4]),
}

/// Color space colors are blended in by `interpolate`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ColorSpace {
    /// Premultiplied RGBA channels (`interpolate`).
    #[default]
    Rgb,
    /// CIE-LAB (`interpolate-lab`).
    Lab,
    /// CIE-LCH, shortest hue path (`interpolate-hcl`).
    Hcl,
}

/// A `match` branch label.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MatchKey {
    /// Integer-valued number label.
    Int(i64),
    /// String label.
    Str(String),
}

impl MatchKey {
    /// Key for a runtime input, if it can match any label at all.
    pub(crate) fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER => {
                Some(Self::Int(*n as i64))
            }
            Value::String(s) => Some(Self::Str(s.clone())),
            _ => None,
        }
    }
}

/// Largest integer a `match` label may carry.
pub(crate) const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A parsed, type-checked expression node. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Constant value.
    Literal {
        /// Static type of `value`.
        ty: Type,
        /// The value.
        value: Value,
    },
    /// Reference to a `let` binding.
    Var {
        /// Bound name.
        name: String,
        /// The expression bound at parse time.
        bound: Arc<Expr>,
    },
    /// Local bindings visible in `body`.
    Let {
        /// Name/expression pairs, in declaration order.
        bindings: Vec<(String, Arc<Expr>)>,
        /// Result expression.
        body: Box<Expr>,
    },
    /// First branch whose test is true, else `otherwise`.
    Case {
        /// Result type.
        ty: Type,
        /// `(test, output)` pairs.
        branches: Vec<(Expr, Expr)>,
        /// Fallback output.
        otherwise: Box<Expr>,
    },
    /// Label lookup on an evaluated input.
    Match {
        /// Result type.
        ty: Type,
        /// Looked-up input.
        input: Box<Expr>,
        /// Label to index into `outputs`.
        cases: HashMap<MatchKey, usize>,
        /// Branch outputs.
        outputs: Vec<Expr>,
        /// Fallback output.
        otherwise: Box<Expr>,
    },
    /// First non-null argument.
    Coalesce {
        /// Result type.
        ty: Type,
        /// Candidates, tried in order.
        args: Vec<Expr>,
    },
    /// Runtime type assertion (`string`, `number`, `boolean`, `object`, `array`).
    Assertion {
        /// Asserted type.
        ty: Type,
        /// Candidates, tried in order.
        args: Vec<Expr>,
    },
    /// Runtime conversion (`to-color`, `to-number`).
    Coercion {
        /// Target type, `color` or `number`.
        ty: Type,
        /// Candidates, tried in order.
        args: Vec<Expr>,
    },
    /// Array indexing.
    At {
        /// Element type.
        ty: Type,
        /// Index expression.
        index: Box<Expr>,
        /// Indexed array.
        input: Box<Expr>,
    },
    /// Piecewise-constant function of a numeric input.
    Step {
        /// Result type.
        ty: Type,
        /// Numeric input.
        input: Box<Expr>,
        /// Ascending stop inputs; the first is `-inf`.
        labels: Vec<f64>,
        /// One output per label.
        outputs: Vec<Expr>,
    },
    /// Continuous function of a numeric input.
    Interpolate {
        /// Result type.
        ty: Type,
        /// Interpolation curve.
        interpolation: Interpolation,
        /// Color space for color outputs.
        space: ColorSpace,
        /// Numeric input.
        input: Box<Expr>,
        /// Ascending stop inputs.
        labels: Vec<f64>,
        /// One output per label.
        outputs: Vec<Expr>,
    },
    /// Built-in operator applied to arguments.
    Compound {
        /// Operator.
        op: CompoundOp,
        /// Result type.
        ty: Type,
        /// Arguments.
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Static result type.
    pub fn ty(&self) -> &Type {
        match self {
            Self::Literal { ty, .. }
            | Self::Case { ty, .. }
            | Self::Match { ty, .. }
            | Self::Coalesce { ty, .. }
            | Self::Assertion { ty, .. }
            | Self::Coercion { ty, .. }
            | Self::At { ty, .. }
            | Self::Step { ty, .. }
            | Self::Interpolate { ty, .. }
            | Self::Compound { ty, .. } => ty,
            Self::Var { bound, .. } => bound.ty(),
            Self::Let { body, .. } => body.ty(),
        }
    }

    /// Direct sub-expressions, in argument order.
    ///
    /// A variable reference has no children; its bound expression is a child of the `let`
    /// that declared it.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Self::Literal { .. } | Self::Var { .. } => Vec::new(),
            Self::Let { bindings, body } => bindings
                .iter()
                .map(|(_, e)| e.as_ref())
                .chain(std::iter::once(body.as_ref()))
                .collect(),
            Self::Case {
                branches,
                otherwise,
                ..
            } => branches
                .iter()
                .flat_map(|(test, out)| [test, out])
                .chain(std::iter::once(otherwise.as_ref()))
                .collect(),
            Self::Match {
                input,
                outputs,
                otherwise,
                ..
            } => std::iter::once(input.as_ref())
                .chain(outputs)
                .chain(std::iter::once(otherwise.as_ref()))
                .collect(),
            Self::Coalesce { args, .. }
            | Self::Assertion { args, .. }
            | Self::Coercion { args, .. }
            | Self::Compound { args, .. } => args.iter().collect(),
            Self::At { index, input, .. } => vec![index.as_ref(), input.as_ref()],
            Self::Step { input, outputs, .. } | Self::Interpolate { input, outputs, .. } => {
                std::iter::once(input.as_ref()).chain(outputs).collect()
            }
        }
    }

    /// `true` for [`Expr::Literal`].
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal { .. })
    }

    /// The operator of a compound node.
    pub fn compound_op(&self) -> Option<CompoundOp> {
        match self {
            Self::Compound { op, .. } => Some(*op),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/expression/ast.rs"]
mod tests;
