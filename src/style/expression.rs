//! Top-level expression API: parse against a property spec, evaluate with default
//! fallback, and classify by zoom and feature dependence.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::expression::analysis::{
    ZOOM_OUTSIDE_CURVE, find_zoom_curve, is_feature_constant, is_global_property_constant,
};
use crate::expression::ast::{Expr, Interpolation};
use crate::expression::error::{ParsingError, RuntimeError};
use crate::expression::eval::{ColorCache, EvaluationContext, Feature, Globals};
use crate::expression::interpolate::interpolation_factor;
use crate::expression::parse::parse_expression;
use crate::expression::value::Value;
use crate::foundation::error::{StyleError, StyleResult};
use crate::style::spec::{FunctionKind, PropertySpec, PropertyType};

/// Options for [`create_expression`] and [`create_property_expression`].
#[derive(Clone, Debug)]
pub struct ExpressionOptions {
    /// Replace runtime failures and null results with the property default.
    pub handle_errors: bool,
    /// Color-string memo to share between expressions; a fresh one when `None`.
    pub color_cache: Option<Arc<ColorCache>>,
}

impl Default for ExpressionOptions {
    fn default() -> Self {
        Self {
            handle_errors: true,
            color_cache: None,
        }
    }
}

impl ExpressionOptions {
    /// Options that surface runtime errors instead of falling back to defaults.
    pub fn strict() -> Self {
        Self {
            handle_errors: false,
            ..Self::default()
        }
    }
}

/// A parsed expression bound to its property's default and allowed values.
#[derive(Debug)]
pub struct StyleExpression {
    expression: Expr,
    default: Value,
    enum_values: Option<Vec<String>>,
    handle_errors: bool,
    colors: Arc<ColorCache>,
    warned: Mutex<HashSet<String>>,
}

/// Parse `json` against `spec` (or untyped when `None`).
#[tracing::instrument(skip(json, spec, options))]
pub fn create_expression(
    json: &serde_json::Value,
    spec: Option<&PropertySpec>,
    options: &ExpressionOptions,
) -> Result<StyleExpression, Vec<ParsingError>> {
    let expected = spec.map(PropertySpec::expected_type);
    let expression = parse_expression(json, expected).inspect_err(|errors| {
        tracing::debug!(count = errors.len(), "expression rejected");
    })?;

    Ok(StyleExpression {
        expression,
        default: spec.map_or(Value::Null, PropertySpec::default_value),
        enum_values: spec
            .filter(|s| s.kind == PropertyType::Enum)
            .and_then(|s| s.values.clone()),
        handle_errors: options.handle_errors,
        colors: options.color_cache.clone().unwrap_or_default(),
        warned: Mutex::new(HashSet::new()),
    })
}

impl StyleExpression {
    /// The type-checked tree.
    pub fn expression(&self) -> &Expr {
        &self.expression
    }

    /// Fallback value.
    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// Evaluate for one zoom/feature pair.
    ///
    /// With error handling on (the default) this never fails: null results and runtime errors
    /// yield the default value, and each distinct error message is logged once.
    pub fn evaluate(&self, globals: &Globals, feature: Option<&Feature>) -> StyleResult<Value> {
        let mut ctx = EvaluationContext::new(&self.colors);
        ctx.reset(*globals, feature);
        self.evaluate_in(&mut ctx)
    }

    /// Evaluate without enum checks or fallbacks.
    pub fn evaluate_without_error_handling(
        &self,
        globals: &Globals,
        feature: Option<&Feature>,
    ) -> Result<Value, RuntimeError> {
        let mut ctx = EvaluationContext::new(&self.colors);
        ctx.reset(*globals, feature);
        self.expression.evaluate(&mut ctx)
    }

    pub(crate) fn evaluate_in(&self, ctx: &mut EvaluationContext<'_>) -> StyleResult<Value> {
        if !self.handle_errors {
            return self
                .expression
                .evaluate(ctx)
                .map_err(|e| StyleError::evaluation(e.message));
        }

        match self.checked(ctx) {
            Ok(Value::Null) => Ok(self.default.clone()),
            Ok(value) => Ok(value),
            Err(e) => {
                self.warn_once(&e.message);
                Ok(self.default.clone())
            }
        }
    }

    fn checked(&self, ctx: &mut EvaluationContext<'_>) -> Result<Value, RuntimeError> {
        let value = self.expression.evaluate(ctx)?;
        if let (Some(allowed), Value::String(s)) = (&self.enum_values, &value) {
            if !allowed.contains(s) {
                let listed: Vec<String> = allowed
                    .iter()
                    .map(|v| serde_json::Value::from(v.as_str()).to_string())
                    .collect();
                return Err(RuntimeError::new(format!(
                    "Expected value to be one of {}, but found {} instead.",
                    listed.join(", "),
                    value.to_json()
                )));
            }
        }
        Ok(value)
    }

    fn warn_once(&self, message: &str) {
        let mut warned = self.warned.lock().unwrap_or_else(PoisonError::into_inner);
        if warned.insert(message.to_owned()) {
            tracing::warn!(%message, "expression evaluation failed; using default value");
        }
    }
}

/// Zoom and feature dependence of a property expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyExpressionKind {
    /// Depends on neither zoom nor feature.
    Constant,
    /// Depends on the feature only.
    Source,
    /// Depends on zoom only.
    Camera,
    /// Depends on both.
    Composite,
}

/// A [`StyleExpression`] classified for a property, with its zoom curve summary.
#[derive(Debug)]
pub struct PropertyExpression {
    kind: PropertyExpressionKind,
    expression: StyleExpression,
    zoom_stops: Vec<f64>,
    interpolation: Option<Interpolation>,
}

/// Parse and classify `json` for `spec`, rejecting variance the property does not allow.
#[tracing::instrument(skip(json, spec, options))]
pub fn create_property_expression(
    json: &serde_json::Value,
    spec: &PropertySpec,
    options: &ExpressionOptions,
) -> Result<PropertyExpression, Vec<ParsingError>> {
    let expression = create_expression(json, Some(spec), options)?;
    let parsed = expression.expression();

    let feature_constant = is_feature_constant(parsed);
    if !feature_constant && !spec.property_function {
        return Err(vec![ParsingError::new("", "property expressions not supported")]);
    }

    let zoom_constant = is_global_property_constant(parsed, &["zoom"]);
    if !zoom_constant && !spec.zoom_function {
        return Err(vec![ParsingError::new("", "zoom expressions not supported")]);
    }

    let curve = find_zoom_curve(parsed).map_err(|e| vec![e])?;
    let (zoom_stops, interpolation) = match curve {
        None if !zoom_constant => {
            return Err(vec![ParsingError::new("", ZOOM_OUTSIDE_CURVE)]);
        }
        None => (Vec::new(), None),
        Some(Expr::Interpolate { .. }) if spec.function == Some(FunctionKind::PiecewiseConstant) => {
            return Err(vec![ParsingError::new(
                "",
                "\"interpolate\" expressions cannot be used with this property",
            )]);
        }
        Some(Expr::Interpolate {
            labels,
            interpolation,
            ..
        }) => (labels.clone(), Some(*interpolation)),
        Some(Expr::Step { labels, .. }) => (labels.clone(), None),
        Some(_) => (Vec::new(), None),
    };

    let kind = match (feature_constant, zoom_constant) {
        (true, true) => PropertyExpressionKind::Constant,
        (false, true) => PropertyExpressionKind::Source,
        (true, false) => PropertyExpressionKind::Camera,
        (false, false) => PropertyExpressionKind::Composite,
    };
    tracing::debug!(?kind, stops = zoom_stops.len(), "classified property expression");

    Ok(PropertyExpression {
        kind,
        expression,
        zoom_stops,
        interpolation,
    })
}

impl PropertyExpression {
    /// Classification.
    pub fn kind(&self) -> PropertyExpressionKind {
        self.kind
    }

    /// Underlying expression.
    pub fn expression(&self) -> &StyleExpression {
        &self.expression
    }

    /// Stop inputs of the zoom curve; empty for constant and source expressions.
    pub fn zoom_stops(&self) -> &[f64] {
        &self.zoom_stops
    }

    /// Blend factor between two zoom stops; always `0` for `step` curves.
    pub fn interpolation_factor(&self, zoom: f64, lower: f64, upper: f64) -> f64 {
        self.interpolation
            .as_ref()
            .map_or(0.0, |i| interpolation_factor(i, zoom, lower, upper))
    }

    /// Evaluate for one zoom/feature pair.
    pub fn evaluate(&self, globals: &Globals, feature: Option<&Feature>) -> StyleResult<Value> {
        self.expression.evaluate(globals, feature)
    }

    /// Evaluate for many features in parallel, one context per worker.
    pub fn evaluate_many(&self, globals: &Globals, features: &[Feature]) -> Vec<StyleResult<Value>> {
        features
            .par_iter()
            .map_init(
                || EvaluationContext::new(&self.expression.colors),
                |ctx, feature| {
                    ctx.reset(*globals, Some(feature));
                    self.expression.evaluate_in(ctx)
                },
            )
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/expression.rs"]
mod tests;
