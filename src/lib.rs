//! mbstyle is a typed expression engine for vector map styles.
//!
//! Style properties such as line widths, fill colors and label text are written as JSON
//! S-expressions (`["interpolate", ["linear"], ["zoom"], 5, 1, 15, 8]`). This crate:
//!
//! - parses and type-checks them, reporting every error with its argument path
//! - evaluates them against a zoom level and a feature, falling back to property defaults
//! - classifies them as constant, source, camera or composite for zoom pre-sampling
//! - converts legacy stop-based functions into expressions
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod color;
mod foundation;

pub mod expression;
pub mod style;

pub use crate::color::rgba::Color;
pub use crate::expression::{
    ColorCache, EvaluationContext, Expr, Feature, GeometryType, Globals, ParsingError,
    RuntimeError, Type, Value, parse_expression,
};
pub use crate::foundation::error::{StyleError, StyleResult};
pub use crate::style::catalog::PropertyCatalog;
pub use crate::style::expression::{
    ExpressionOptions, PropertyExpression, PropertyExpressionKind, StyleExpression,
    create_expression, create_property_expression,
};
pub use crate::style::function::{convert_function, normalize_property_value, resolve_tokens};
pub use crate::style::layer::LayerProperties;
pub use crate::style::spec::{FunctionKind, PropertySpec, PropertyType};
