//! Tree-walking passes that classify a parsed expression by what it depends on.

use crate::expression::ast::Expr;
use crate::expression::compound::CompoundOp;
use crate::expression::error::ParsingError;

pub(crate) const ZOOM_OUTSIDE_CURVE: &str =
    "\"zoom\" expression may only be used as input to a top-level \"step\" or \"interpolate\" expression.";
pub(crate) const MULTIPLE_ZOOM_CURVES: &str =
    "Only one zoom-based \"step\" or \"interpolate\" subexpression may be used in an expression.";

/// `true` when the expression never reads the current feature.
pub fn is_feature_constant(expr: &Expr) -> bool {
    if let Expr::Compound { op, args, .. } = expr {
        match op {
            CompoundOp::Get | CompoundOp::Has if args.len() == 1 => return false,
            CompoundOp::Properties | CompoundOp::GeometryType | CompoundOp::Id => return false,
            _ => {}
        }
    }
    expr.children().into_iter().all(is_feature_constant)
}

/// `true` when none of the global accessors in `names` (e.g. `"zoom"`) occur in the tree.
pub fn is_global_property_constant(expr: &Expr, names: &[&str]) -> bool {
    if expr
        .compound_op()
        .is_some_and(|op| names.contains(&op.name()))
    {
        return false;
    }
    expr.children()
        .into_iter()
        .all(|child| is_global_property_constant(child, names))
}

/// The single top-level `step`/`interpolate` node whose input is `["zoom"]`, looking through
/// `let` bodies and `coalesce` arguments only.
///
/// Fails when a zoom curve is nested anywhere else or when more than one exists. A tree with
/// `zoom` but no curve yields `Ok(None)`; callers combine this with
/// [`is_global_property_constant`] to reject that case.
pub fn find_zoom_curve(expr: &Expr) -> Result<Option<&Expr>, ParsingError> {
    let result = match expr {
        Expr::Let { body, .. } => find_zoom_curve(body)?,
        Expr::Coalesce { args, .. } => {
            let mut found = None;
            for arg in args {
                found = find_zoom_curve(arg)?;
                if found.is_some() {
                    break;
                }
            }
            found
        }
        Expr::Step { input, .. } | Expr::Interpolate { input, .. }
            if input.compound_op() == Some(CompoundOp::Zoom) =>
        {
            Some(expr)
        }
        _ => None,
    };

    for child in expr.children() {
        match (result, find_zoom_curve(child)?) {
            (_, None) => {}
            (None, Some(_)) => return Err(ParsingError::new("", ZOOM_OUTSIDE_CURVE)),
            (Some(curve), Some(other)) if !std::ptr::eq(curve, other) => {
                return Err(ParsingError::new("", MULTIPLE_ZOOM_CURVES));
            }
            (Some(_), Some(_)) => {}
        }
    }

    Ok(result)
}

/// `true` when the subtree can be evaluated once at parse time.
pub(crate) fn is_constant(expr: &Expr) -> bool {
    match expr {
        Expr::Var { .. } => false,
        Expr::Compound {
            op: CompoundOp::Error,
            ..
        } => false,
        _ => {
            expr.children().into_iter().all(Expr::is_literal)
                && is_feature_constant(expr)
                && is_global_property_constant(expr, &["zoom", "heatmap-density"])
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/expression/analysis.rs"]
mod tests;
