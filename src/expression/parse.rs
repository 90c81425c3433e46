//! Recursive-descent parser and type checker for JSON expressions.
//!
//! Every recursive call returns its own errors; callers merge them, so a single pass
//! reports every problem in the tree.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value as Json;

use crate::expression::analysis::is_constant;
use crate::expression::ast::{ColorSpace, Expr, Interpolation, MAX_SAFE_INTEGER, MatchKey};
use crate::expression::compound::{CompoundOp, Params};
use crate::expression::error::ParsingError;
use crate::expression::eval::{ColorCache, EvaluationContext};
use crate::expression::scope::Scope;
use crate::expression::types::{Type, check_subtype};
use crate::expression::value::Value;

/// Result of parsing one node.
pub type ParseResult<T = Expr> = Result<T, Vec<ParsingError>>;

/// Parse and type-check `json`, optionally against an expected result type.
pub fn parse_expression(json: &Json, expected: Option<Type>) -> ParseResult {
    ParsingContext::new(expected).parse(json)
}

const SPECIAL_FORMS: &[&str] = &[
    "literal",
    "let",
    "var",
    "case",
    "match",
    "coalesce",
    "at",
    "step",
    "interpolate",
    "interpolate-lab",
    "interpolate-hcl",
    "string",
    "number",
    "boolean",
    "object",
    "array",
    "to-color",
    "to-number",
];

/// `true` when `json` is an array whose first element names a known operator.
///
/// Used to tell expressions apart from constant array values such as font stacks.
pub fn is_expression(json: &Json) -> bool {
    match json.as_array().and_then(|items| items.first()) {
        Some(Json::String(op)) => {
            SPECIAL_FORMS.contains(&op.as_str()) || CompoundOp::from_name(op).is_some()
        }
        _ => false,
    }
}

/// Accumulates errors from sibling parses.
#[derive(Default)]
struct Errors(Vec<ParsingError>);

impl Errors {
    fn take<T>(&mut self, result: ParseResult<T>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(errors) => {
                self.0.extend(errors);
                None
            }
        }
    }

    fn extend(&mut self, errors: Vec<ParsingError>) {
        self.0.extend(errors);
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn into_result<T>(self, value: Option<T>) -> ParseResult<T> {
        match value {
            Some(v) if self.0.is_empty() => Ok(v),
            _ => Err(self.0),
        }
    }
}

/// Position, expected type and scope of the node being parsed.
///
/// Derived, never mutated, when descending into an argument.
#[derive(Clone, Debug, Default)]
pub(crate) struct ParsingContext {
    path: Vec<usize>,
    expected: Option<Type>,
    scope: Scope,
    no_fold: bool,
}

impl ParsingContext {
    pub(crate) fn new(expected: Option<Type>) -> Self {
        Self {
            expected,
            ..Self::default()
        }
    }

    /// A context that keeps constant subtrees as written.
    #[cfg(test)]
    pub(crate) fn without_folding(expected: Option<Type>) -> Self {
        Self {
            expected,
            no_fold: true,
            ..Self::default()
        }
    }

    /// Path rendered as `[2][1]`.
    pub(crate) fn key(&self) -> String {
        self.path.iter().map(|i| format!("[{i}]")).collect()
    }

    fn child(&self, index: usize, expected: Option<Type>) -> Self {
        let mut path = self.path.clone();
        path.push(index);
        Self {
            path,
            expected,
            scope: self.scope.clone(),
            no_fold: self.no_fold,
        }
    }

    fn error(&self, message: impl Into<String>) -> Vec<ParsingError> {
        vec![ParsingError::new(self.key(), message)]
    }

    fn error_at(&self, indices: &[usize], message: impl Into<String>) -> Vec<ParsingError> {
        let key: String = indices.iter().map(|i| format!("[{i}]")).collect();
        vec![ParsingError::new(self.key() + &key, message)]
    }

    /// Expected type used for branch outputs; `value` imposes nothing.
    fn output_type(&self) -> Option<Type> {
        self.expected.clone().filter(|t| *t != Type::Value)
    }

    pub(crate) fn parse(&self, json: &Json) -> ParseResult {
        self.parse_node(json, true)
    }

    fn parse_arg(&self, json: &Json, index: usize, expected: Option<Type>) -> ParseResult {
        self.child(index, expected).parse(json)
    }

    fn parse_node(&self, json: &Json, annotate: bool) -> ParseResult {
        let wrapped;
        let items: &[Json] = match json {
            Json::Null | Json::Bool(_) | Json::Number(_) | Json::String(_) => {
                wrapped = [Json::from("literal"), json.clone()];
                &wrapped
            }
            Json::Array(items) => items,
            Json::Object(_) => {
                return Err(self.error(r#"Bare objects invalid. Use ["literal", {...}] instead."#));
            }
        };

        let Some(first) = items.first() else {
            return Err(self.error(
                r#"Expected an array with at least one element. If you wanted a literal array, use ["literal", []]."#,
            ));
        };
        let Json::String(op) = first else {
            return Err(self.error_at(
                &[0],
                format!(
                    r#"Expression name must be a string, but found {} instead. If you wanted a literal array, use ["literal", [...]]."#,
                    json_kind(first)
                ),
            ));
        };

        let parsed = self.parse_operator(op, items)?;
        let parsed = self.annotate(parsed, annotate)?;
        self.fold(parsed)
    }

    fn parse_operator(&self, op: &str, items: &[Json]) -> ParseResult {
        match op {
            "literal" => self.parse_literal(items),
            "let" => self.parse_let(items),
            "var" => self.parse_var(items),
            "case" => self.parse_case(items),
            "match" => self.parse_match(items),
            "coalesce" => self.parse_coalesce(items),
            "at" => self.parse_at(items),
            "step" => self.parse_step(items),
            "interpolate" => self.parse_interpolate(items, ColorSpace::Rgb),
            "interpolate-lab" => self.parse_interpolate(items, ColorSpace::Lab),
            "interpolate-hcl" => self.parse_interpolate(items, ColorSpace::Hcl),
            "string" | "number" | "boolean" | "object" | "array" => {
                self.parse_assertion(op, items)
            }
            "to-color" => self.parse_coercion(Type::Color, items),
            "to-number" => self.parse_coercion(Type::Number, items),
            _ => match CompoundOp::from_name(op) {
                Some(compound) => self.parse_compound(compound, items),
                None => Err(self.error_at(
                    &[0],
                    format!(
                        r#"Unknown expression "{op}". If you wanted a literal array, use ["literal", [...]]."#
                    ),
                )),
            },
        }
    }

    /// Reconcile the parsed type with the expected one, wrapping in an implicit assertion
    /// or coercion where the language allows it.
    fn annotate(&self, parsed: Expr, annotate: bool) -> ParseResult {
        let Some(expected) = &self.expected else {
            return Ok(parsed);
        };
        let actual = parsed.ty();

        let assertable = matches!(
            expected,
            Type::String | Type::Number | Type::Boolean | Type::Object | Type::Array { .. }
        ) && *actual == Type::Value;
        let coercible = *expected == Type::Color && matches!(actual, Type::Value | Type::String);

        if assertable || coercible {
            if !annotate {
                return Ok(parsed);
            }
            let ty = expected.clone();
            let args = vec![parsed];
            return Ok(if assertable {
                Expr::Assertion { ty, args }
            } else {
                Expr::Coercion { ty, args }
            });
        }

        check_subtype(expected, actual).map_err(|m| self.error(m))?;
        Ok(parsed)
    }

    /// Replace a provably constant subtree by its value.
    fn fold(&self, parsed: Expr) -> ParseResult {
        if self.no_fold || parsed.is_literal() || !is_constant(&parsed) {
            return Ok(parsed);
        }
        let colors = ColorCache::new();
        let mut ctx = EvaluationContext::new(&colors);
        match parsed.evaluate(&mut ctx) {
            Ok(value) => Ok(Expr::Literal {
                ty: parsed.ty().clone(),
                value,
            }),
            Err(e) => Err(self.error(e.message)),
        }
    }

    fn parse_literal(&self, items: &[Json]) -> ParseResult {
        let [_, json] = items else {
            return Err(self.error(format!(
                "'literal' expression requires exactly one argument, but found {} instead.",
                items.len() - 1
            )));
        };
        let value = Value::from(json);
        let mut ty = value.type_of();

        // An empty array literal takes the expected array type.
        let empty = matches!(ty, Type::Array { len: Some(0), .. });
        if let Some(expected @ Type::Array { len: None | Some(0), .. }) = &self.expected {
            if empty {
                ty = expected.clone();
            }
        }
        Ok(Expr::Literal { ty, value })
    }

    fn parse_let(&self, items: &[Json]) -> ParseResult {
        let argc = items.len() - 1;
        if argc < 3 {
            return Err(self.error(format!(
                "Expected at least 3 arguments, but found {argc} instead."
            )));
        }
        if argc % 2 == 0 {
            return Err(self.error("Expected an odd number of arguments."));
        }

        let mut errs = Errors::default();
        let mut bindings = Vec::new();
        for i in (1..argc).step_by(2) {
            let Json::String(name) = &items[i] else {
                errs.extend(self.error_at(
                    &[i],
                    format!("Expected string, but found {} instead.", json_kind(&items[i])),
                ));
                continue;
            };
            if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                errs.extend(self.error_at(
                    &[i],
                    "Variable names must contain only alphanumeric characters or '_'.",
                ));
                continue;
            }
            if let Some(value) = errs.take(self.parse_arg(&items[i + 1], i + 1, None)) {
                bindings.push((name.clone(), Arc::new(value)));
            }
        }
        if !errs.is_empty() {
            return Err(errs.0);
        }

        let mut body_ctx = self.child(argc, self.expected.clone());
        body_ctx.scope = self.scope.concat(bindings.clone());
        let body = body_ctx.parse(&items[argc])?;
        Ok(Expr::Let {
            bindings,
            body: Box::new(body),
        })
    }

    fn parse_var(&self, items: &[Json]) -> ParseResult {
        let [_, Json::String(name)] = items else {
            return Err(self.error("'var' expression requires exactly one string literal argument."));
        };
        let Some(bound) = self.scope.get(name) else {
            return Err(self.error_at(
                &[1],
                format!(
                    r#"Unknown variable "{name}". Make sure "{name}" has been bound in an enclosing "let" expression before using it."#
                ),
            ));
        };
        Ok(Expr::Var {
            name: name.clone(),
            bound: Arc::clone(bound),
        })
    }

    fn parse_case(&self, items: &[Json]) -> ParseResult {
        let argc = items.len() - 1;
        if argc < 3 {
            return Err(self.error(format!(
                "Expected at least 3 arguments, but found only {argc}."
            )));
        }
        if argc % 2 == 0 {
            return Err(self.error("Expected an odd number of arguments."));
        }

        let mut errs = Errors::default();
        let mut output_type = self.output_type();
        let mut branches = Vec::new();
        for i in (1..argc).step_by(2) {
            let test = errs.take(self.parse_arg(&items[i], i, Some(Type::Boolean)));
            let output = errs.take(self.parse_arg(&items[i + 1], i + 1, output_type.clone()));
            if let Some(output) = &output {
                output_type.get_or_insert_with(|| output.ty().clone());
            }
            if let (Some(test), Some(output)) = (test, output) {
                branches.push((test, output));
            }
        }
        let otherwise = errs.take(self.parse_arg(&items[argc], argc, output_type.clone()));

        errs.into_result(otherwise.map(|otherwise| Expr::Case {
            ty: output_type.unwrap_or(Type::Value),
            branches,
            otherwise: Box::new(otherwise),
        }))
    }

    fn parse_match(&self, items: &[Json]) -> ParseResult {
        let argc = items.len() - 1;
        if argc < 4 {
            return Err(self.error(format!(
                "Expected at least 4 arguments, but found only {argc}."
            )));
        }
        if argc % 2 != 0 {
            return Err(self.error("Expected an even number of arguments."));
        }

        let mut errs = Errors::default();
        let mut input_type: Option<Type> = None;
        let mut output_type = self.output_type();
        let mut cases = HashMap::new();
        let mut outputs = Vec::new();

        for i in (2..argc).step_by(2) {
            let labels: Vec<&Json> = match &items[i] {
                Json::Array(labels) => labels.iter().collect(),
                label => vec![label],
            };
            if labels.is_empty() {
                errs.extend(self.error_at(&[i], "Expected at least one branch label."));
            }
            for label in labels {
                match self.match_label(label, i, &mut input_type) {
                    Ok(key) if cases.contains_key(&key) => {
                        errs.extend(self.error_at(&[i], "Branch labels must be unique."));
                        break;
                    }
                    Ok(key) => {
                        cases.insert(key, outputs.len());
                    }
                    Err(e) => {
                        errs.extend(e);
                        break;
                    }
                }
            }

            let output = errs.take(self.parse_arg(&items[i + 1], i + 1, output_type.clone()));
            if let Some(output) = output {
                output_type.get_or_insert_with(|| output.ty().clone());
                outputs.push(output);
            }
        }

        let input = errs.take(self.parse_arg(&items[1], 1, input_type));
        let otherwise = errs.take(self.parse_arg(&items[argc], argc, output_type.clone()));

        let parsed = input.zip(otherwise).map(|(input, otherwise)| Expr::Match {
            ty: output_type.unwrap_or(Type::Value),
            input: Box::new(input),
            cases,
            outputs,
            otherwise: Box::new(otherwise),
        });
        errs.into_result(parsed)
    }

    fn match_label(
        &self,
        label: &Json,
        index: usize,
        input_type: &mut Option<Type>,
    ) -> ParseResult<MatchKey> {
        let (key, ty) = match label {
            Json::String(s) => (MatchKey::Str(s.clone()), Type::String),
            Json::Number(n) => {
                let n = n.as_f64().unwrap_or(f64::NAN);
                if n.abs() > MAX_SAFE_INTEGER {
                    return Err(self.error_at(
                        &[index],
                        "Branch labels must be integers no larger than 9007199254740991.",
                    ));
                }
                if n.fract() != 0.0 {
                    return Err(
                        self.error_at(&[index], "Numeric branch labels must be integer values.")
                    );
                }
                (MatchKey::Int(n as i64), Type::Number)
            }
            _ => {
                return Err(self.error_at(&[index], "Branch labels must be numbers or strings."));
            }
        };
        match input_type {
            None => *input_type = Some(ty),
            Some(expected) => {
                check_subtype(expected, &ty).map_err(|m| self.error_at(&[index], m))?;
            }
        }
        Ok(key)
    }

    fn parse_coalesce(&self, items: &[Json]) -> ParseResult {
        if items.len() < 2 {
            return Err(self.error("Expected at least one argument."));
        }

        let mut errs = Errors::default();
        let mut output_type = self.output_type();
        let mut args = Vec::new();
        for (i, item) in items.iter().enumerate().skip(1) {
            let parsed = self.child(i, output_type.clone()).parse_node(item, false);
            if let Some(arg) = errs.take(parsed) {
                output_type.get_or_insert_with(|| arg.ty().clone());
                args.push(arg);
            }
        }
        if !errs.is_empty() {
            return Err(errs.0);
        }

        // An argument that skipped its annotation makes the whole coalesce need one.
        let needs_annotation = self
            .expected
            .as_ref()
            .is_some_and(|expected| args.iter().any(|a| check_subtype(expected, a.ty()).is_err()));
        let ty = if needs_annotation {
            Type::Value
        } else {
            output_type.unwrap_or(Type::Value)
        };
        Ok(Expr::Coalesce { ty, args })
    }

    fn parse_assertion(&self, name: &str, items: &[Json]) -> ParseResult {
        if items.len() < 2 {
            return Err(self.error("Expected at least one argument."));
        }

        let mut first_arg = 1;
        let ty = if name == "array" {
            let mut item = Type::Value;
            let mut len = None;
            if items.len() > 2 {
                item = match items[1].as_str() {
                    Some("string") => Type::String,
                    Some("number") => Type::Number,
                    Some("boolean") => Type::Boolean,
                    _ => {
                        return Err(self.error_at(
                            &[1],
                            r#"The item type argument of "array" must be one of string, number, boolean"#,
                        ));
                    }
                };
                first_arg += 1;
            }
            if items.len() > 3 {
                len = match &items[2] {
                    Json::Null => None,
                    Json::Number(n) => match n.as_f64() {
                        Some(n) if n >= 0.0 && n.fract() == 0.0 => Some(n as usize),
                        _ => return Err(self.array_length_error()),
                    },
                    _ => return Err(self.array_length_error()),
                };
                first_arg += 1;
            }
            Type::array(item, len)
        } else {
            match name {
                "string" => Type::String,
                "number" => Type::Number,
                "boolean" => Type::Boolean,
                _ => Type::Object,
            }
        };

        let args = self.parse_args(items, first_arg, Some(Type::Value))?;
        Ok(Expr::Assertion { ty, args })
    }

    fn array_length_error(&self) -> Vec<ParsingError> {
        self.error_at(
            &[2],
            r#"The length argument to "array" must be a positive integer literal"#,
        )
    }

    fn parse_coercion(&self, ty: Type, items: &[Json]) -> ParseResult {
        if items.len() < 2 {
            return Err(self.error("Expected at least one argument."));
        }
        let args = self.parse_args(items, 1, Some(Type::Value))?;
        Ok(Expr::Coercion { ty, args })
    }

    /// Parse `items[from..]` against one expected type, collecting every error.
    fn parse_args(&self, items: &[Json], from: usize, expected: Option<Type>) -> ParseResult<Vec<Expr>> {
        let mut errs = Errors::default();
        let args: Vec<Expr> = items
            .iter()
            .enumerate()
            .skip(from)
            .filter_map(|(i, item)| errs.take(self.parse_arg(item, i, expected.clone())))
            .collect();
        errs.into_result(Some(args))
    }

    fn parse_at(&self, items: &[Json]) -> ParseResult {
        let [_, index, input] = items else {
            return Err(self.error(format!(
                "Expected 2 arguments, but found {} instead.",
                items.len() - 1
            )));
        };
        let mut errs = Errors::default();
        let item_type = self.expected.clone().unwrap_or(Type::Value);
        let index = errs.take(self.parse_arg(index, 1, Some(Type::Number)));
        let input = errs.take(self.parse_arg(input, 2, Some(Type::array(item_type, None))));

        let parsed = index.zip(input).map(|(index, input)| {
            let ty = match input.ty() {
                Type::Array { item, .. } => (**item).clone(),
                _ => Type::Value,
            };
            Expr::At {
                ty,
                index: Box::new(index),
                input: Box::new(input),
            }
        });
        errs.into_result(parsed)
    }

    fn parse_step(&self, items: &[Json]) -> ParseResult {
        let argc = items.len() - 1;
        if argc < 4 {
            return Err(self.error(format!(
                "Expected at least 4 arguments, but found only {argc}."
            )));
        }
        if argc % 2 != 0 {
            return Err(self.error("Expected an even number of arguments."));
        }

        let mut errs = Errors::default();
        let input = errs.take(self.parse_arg(&items[1], 1, Some(Type::Number)));
        let mut output_type = self.output_type();
        let mut labels = Vec::new();
        let mut outputs = Vec::new();

        for i in (1..items.len()).step_by(2) {
            let label = if i == 1 {
                Some(f64::NEG_INFINITY)
            } else {
                self.stop_label(&items[i], i, "step", labels.last().copied(), &mut errs)
            };
            let Some(label) = label else {
                continue;
            };
            labels.push(label);
            if let Some(output) = errs.take(self.parse_arg(&items[i + 1], i + 1, output_type.clone())) {
                output_type.get_or_insert_with(|| output.ty().clone());
                outputs.push(output);
            }
        }

        errs.into_result(input.map(|input| Expr::Step {
            ty: output_type.unwrap_or(Type::Value),
            input: Box::new(input),
            labels,
            outputs,
        }))
    }

    /// Validate a literal stop input, recording an error and returning `None` when invalid.
    fn stop_label(
        &self,
        json: &Json,
        index: usize,
        op: &str,
        previous: Option<f64>,
        errs: &mut Errors,
    ) -> Option<f64> {
        let Some(label) = json.as_f64() else {
            errs.extend(self.error_at(
                &[index],
                format!(
                    r#"Input/output pairs for "{op}" expressions must be defined using literal numeric values (not computed expressions) for the input values."#
                ),
            ));
            return None;
        };
        if previous.is_some_and(|prev| prev >= label) {
            errs.extend(self.error_at(
                &[index],
                format!(
                    r#"Input/output pairs for "{op}" expressions must be arranged with input values in strictly ascending order."#
                ),
            ));
            return None;
        }
        Some(label)
    }

    fn parse_interpolate(&self, items: &[Json], space: ColorSpace) -> ParseResult {
        let interpolation = self.parse_interpolation(items.get(1))?;

        let argc = items.len() - 1;
        if argc < 4 {
            return Err(self.error(format!(
                "Expected at least 4 arguments, but found only {argc}."
            )));
        }
        if argc % 2 != 0 {
            return Err(self.error("Expected an even number of arguments."));
        }

        let mut errs = Errors::default();
        let input = errs.take(self.parse_arg(&items[2], 2, Some(Type::Number)));
        let mut output_type = match space {
            ColorSpace::Rgb => self.output_type(),
            ColorSpace::Lab | ColorSpace::Hcl => Some(Type::Color),
        };
        let mut labels = Vec::new();
        let mut outputs = Vec::new();

        for i in (3..items.len()).step_by(2) {
            let previous = labels.last().copied();
            let Some(label) = self.stop_label(&items[i], i, "interpolate", previous, &mut errs) else {
                continue;
            };
            labels.push(label);
            if let Some(output) = errs.take(self.parse_arg(&items[i + 1], i + 1, output_type.clone())) {
                output_type.get_or_insert_with(|| output.ty().clone());
                outputs.push(output);
            }
        }
        if !errs.is_empty() {
            return Err(errs.0);
        }

        let ty = output_type.unwrap_or(Type::Value);
        let interpolatable = match &ty {
            Type::Number | Type::Color => true,
            Type::Array { item, len: Some(_) } => **item == Type::Number,
            _ => false,
        };
        if !interpolatable {
            return Err(self.error(format!("Type {ty} is not interpolatable.")));
        }

        errs.into_result(input.map(|input| Expr::Interpolate {
            ty,
            interpolation,
            space,
            input: Box::new(input),
            labels,
            outputs,
        }))
    }

    fn parse_interpolation(&self, json: Option<&Json>) -> ParseResult<Interpolation> {
        let Some(Json::Array(spec)) = json.filter(|j| j.as_array().is_some_and(|a| !a.is_empty()))
        else {
            return Err(self.error_at(&[1], "Expected an interpolation type expression."));
        };
        match spec[0].as_str() {
            Some("linear") => Ok(Interpolation::Linear),
            Some("exponential") => match spec.get(1).and_then(Json::as_f64) {
                Some(base) => Ok(Interpolation::Exponential { base }),
                None => Err(self.error_at(&[1, 1], "Exponential interpolation requires a numeric base.")),
            },
            Some("cubic-bezier") => {
                let points: Option<Vec<f64>> = spec[1..]
                    .iter()
                    .map(|p| p.as_f64().filter(|t| (0.0..=1.0).contains(t)))
                    .collect();
                match points.as_deref() {
                    Some(&[x1, y1, x2, y2]) => Ok(Interpolation::CubicBezier([x1, y1, x2, y2])),
                    _ => Err(self.error_at(
                        &[1],
                        "Cubic bezier interpolation requires four numeric arguments with values between 0 and 1.",
                    )),
                }
            }
            _ => {
                let name = match &spec[0] {
                    Json::String(s) => s.clone(),
                    other => other.to_string(),
                };
                Err(self.error_at(&[1, 0], format!("Unknown interpolation type {name}")))
            }
        }
    }

    fn parse_compound(&self, op: CompoundOp, items: &[Json]) -> ParseResult {
        let (ty, overloads) = op.definition();
        let argc = items.len() - 1;

        if let [Params::Fixed(params)] = overloads.as_slice() {
            if params.len() != argc {
                return Err(self.error(format!(
                    "Expected {} arguments, but found {argc} instead.",
                    params.len()
                )));
            }
        }

        let candidates: Vec<&Params> = overloads.iter().filter(|p| p.accepts_arity(argc)).collect();

        // A single possible signature reports its own argument errors.
        if let [only] = candidates.as_slice() {
            let args = self.parse_signature(items, Some(*only))?;
            let errors: Vec<ParsingError> = args
                .iter()
                .enumerate()
                .filter_map(|(i, arg)| {
                    let expected = only.param(i)?;
                    let message = check_subtype(expected, arg.ty()).err()?;
                    Some(ParsingError::new(format!("{}[{}]", self.key(), i + 1), message))
                })
                .collect();
            if !errors.is_empty() {
                return Err(errors);
            }
            if op.is_comparison() {
                if let [lhs, rhs] = args.as_slice() {
                    op.check_comparable(lhs.ty(), rhs.ty())
                        .map_err(|m| self.error(m))?;
                }
            }
            return Ok(Expr::Compound { op, ty, args });
        }

        // Otherwise the first signature whose arguments parse against it wins.
        for &params in &candidates {
            if let Ok(args) = self.parse_signature(items, Some(params)) {
                return Ok(Expr::Compound { op, ty, args });
            }
        }

        let args = self.parse_signature(items, None)?;
        let listed: Vec<&Params> = if candidates.is_empty() {
            overloads.iter().collect()
        } else {
            candidates
        };
        let signatures: Vec<String> = listed.iter().map(ToString::to_string).collect();
        let actual: Vec<String> = args.iter().map(|a| a.ty().to_string()).collect();
        Err(self.error(format!(
            "Expected arguments of type {}, but found ({}) instead.",
            signatures.join(" | "),
            actual.join(", ")
        )))
    }

    /// Parse the arguments of a compound node, each against its parameter in `params`.
    fn parse_signature(&self, items: &[Json], params: Option<&Params>) -> ParseResult<Vec<Expr>> {
        let mut errs = Errors::default();
        let mut args = Vec::with_capacity(items.len().saturating_sub(1));
        for (i, item) in items.iter().enumerate().skip(1) {
            let expected = params.and_then(|p| p.param(i - 1)).cloned();
            if let Some(arg) = errs.take(self.parse_arg(item, i, expected)) {
                args.push(arg);
            }
        }
        errs.into_result(Some(args))
    }
}

/// JavaScript `typeof` name of a JSON value, used in messages.
fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Null | Json::Array(_) | Json::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "../../tests/unit/expression/parse.rs"]
mod tests;
