//! Typed expression language: parsing, type checking, evaluation and static analysis.

pub mod analysis;
/// Expression tree node types.
pub mod ast;
pub mod compound;
/// Parse-time and runtime error types.
pub mod error;
/// Evaluation context, inputs and the tree-walking evaluator.
pub mod eval;
pub mod interpolate;
pub mod parse;
/// `let` binding environments.
pub mod scope;
/// Static types and the subtyping relation.
pub mod types;
/// Runtime values.
pub mod value;

pub use analysis::{find_zoom_curve, is_feature_constant, is_global_property_constant};
pub use ast::{ColorSpace, Expr, Interpolation, MatchKey};
pub use compound::CompoundOp;
pub use error::{ParsingError, RuntimeError};
pub use eval::{ColorCache, EvaluationContext, Feature, GeometryType, Globals};
pub use parse::{ParseResult, is_expression, parse_expression};
pub use scope::Scope;
pub use types::{Type, check_subtype};
pub use value::Value;
