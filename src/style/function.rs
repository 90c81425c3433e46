//! Conversion of legacy stop-based property functions into expressions.
//!
//! A legacy function is a JSON object such as
//! `{"property": "rank", "type": "interval", "stops": [[0, 2], [5, 4]]}`. Each one maps
//! onto an equivalent `step`, `interpolate`, `match` or `case` expression, which then goes
//! through the ordinary parser.

use serde_json::{Value as Json, json};

use crate::expression::parse::is_expression;
use crate::foundation::error::{StyleError, StyleResult};
use crate::style::expression::{ExpressionOptions, PropertyExpression, create_property_expression};
use crate::style::spec::{PropertySpec, PropertyType};

/// `true` for a legacy function object.
pub fn is_function(value: &Json) -> bool {
    value.is_object()
}

/// Turn any property value (constant, legacy function or expression) into expression JSON.
pub fn normalize_property_value(value: &Json, spec: &PropertySpec) -> StyleResult<Json> {
    if is_function(value) {
        convert_function(value, spec)
    } else if is_expression(value) {
        Ok(value.clone())
    } else if let (Some(text), true) = (value.as_str(), spec.tokens) {
        Ok(resolve_tokens(text))
    } else {
        Ok(literal(value.clone()))
    }
}

/// Expand `{field}` references in a string into a `concat` of the text around them and
/// the stringified feature properties. Missing properties render as empty text.
pub fn resolve_tokens(text: &str) -> Json {
    let mut parts = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        let Some(len) = rest[open..].find('}') else {
            break;
        };
        let field = &rest[open + 1..open + len];
        if !rest[..open].is_empty() {
            parts.push(Json::String(rest[..open].to_owned()));
        }
        parts.push(json!(["to-string", ["get", field]]));
        rest = &rest[open + len + 1..];
    }
    if parts.is_empty() {
        return json!(text);
    }
    if !rest.is_empty() {
        parts.push(Json::String(rest.to_owned()));
    }
    match <[Json; 1]>::try_from(parts) {
        Ok([only]) => only,
        Err(parts) => {
            let mut concat = vec![json!("concat")];
            concat.extend(parts);
            Json::Array(concat)
        }
    }
}

/// Normalize `value` and compile it for `spec`.
pub fn compile_property_value(
    value: &Json,
    spec: &PropertySpec,
    options: &ExpressionOptions,
) -> StyleResult<PropertyExpression> {
    let expression = normalize_property_value(value, spec)?;
    Ok(create_property_expression(&expression, spec, options)?)
}

fn literal(value: Json) -> Json {
    match value {
        Json::Array(_) | Json::Object(_) => json!(["literal", value]),
        other => other,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FunctionType {
    Identity,
    Exponential,
    Interval,
    Categorical,
}

impl FunctionType {
    fn parse(name: &str) -> StyleResult<Self> {
        match name {
            "identity" => Ok(Self::Identity),
            "exponential" => Ok(Self::Exponential),
            "interval" => Ok(Self::Interval),
            "categorical" => Ok(Self::Categorical),
            other => Err(StyleError::validation(format!(
                "unknown function type \"{other}\""
            ))),
        }
    }
}

/// Parsed fields of a legacy function object.
struct Parameters<'a> {
    ty: Option<FunctionType>,
    property: Option<&'a str>,
    base: f64,
    default: Option<&'a Json>,
    interpolate_op: &'static str,
}

impl<'a> Parameters<'a> {
    fn parse(json: &'a Json) -> StyleResult<Self> {
        let ty = json
            .get("type")
            .map(|t| {
                t.as_str()
                    .ok_or_else(|| StyleError::validation("function type must be a string"))
                    .and_then(FunctionType::parse)
            })
            .transpose()?;
        let property = json
            .get("property")
            .map(|p| {
                p.as_str()
                    .ok_or_else(|| StyleError::validation("function property must be a string"))
            })
            .transpose()?;
        let base = match json.get("base") {
            None => 1.0,
            Some(b) => b
                .as_f64()
                .ok_or_else(|| StyleError::validation("function base must be a number"))?,
        };
        let interpolate_op = match json.get("colorSpace").and_then(Json::as_str) {
            None | Some("rgb") => "interpolate",
            Some("lab") => "interpolate-lab",
            Some("hcl") => "interpolate-hcl",
            Some(other) => {
                return Err(StyleError::validation(format!(
                    "unknown color space \"{other}\""
                )));
            }
        };
        Ok(Self {
            ty,
            property,
            base,
            default: json.get("default"),
            interpolate_op,
        })
    }

    fn function_type(&self, spec: &PropertySpec) -> FunctionType {
        self.ty.unwrap_or(if spec.is_interpolated() {
            FunctionType::Exponential
        } else {
            FunctionType::Interval
        })
    }

    fn property(&self) -> StyleResult<&'a str> {
        self.property
            .ok_or_else(|| StyleError::validation("property function requires a \"property\""))
    }

    fn interpolation(&self) -> Json {
        if self.base == 1.0 {
            json!(["linear"])
        } else {
            json!(["exponential", self.base])
        }
    }
}

type Stop = (Json, Json);

/// Convert a legacy function object into expression JSON.
#[tracing::instrument(skip(parameters, spec))]
pub fn convert_function(parameters: &Json, spec: &PropertySpec) -> StyleResult<Json> {
    let params = Parameters::parse(parameters)?;
    let Some(stops) = parameters.get("stops") else {
        return convert_identity(&params, spec);
    };
    if params.ty == Some(FunctionType::Identity) {
        return convert_identity(&params, spec);
    }

    let stops = parse_stops(stops)?;
    let zoom_and_property = stops.first().is_some_and(|(input, _)| input.is_object());

    if zoom_and_property {
        convert_zoom_and_property(&params, spec, stops)
    } else if params.property.is_some() {
        convert_property(&params, spec, &stops)
    } else {
        convert_zoom(&params, spec, &stops)
    }
}

fn parse_stops(stops: &Json) -> StyleResult<Vec<Stop>> {
    let stops = stops
        .as_array()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| StyleError::validation("function stops must be a non-empty array"))?;
    stops
        .iter()
        .map(|stop| match stop.as_array().map(Vec::as_slice) {
            Some([input, output]) => Ok((input.clone(), literal(output.clone()))),
            _ => Err(StyleError::validation(format!(
                "function stop must be an [input, output] pair, found {stop}"
            ))),
        })
        .collect()
}

fn convert_identity(params: &Parameters<'_>, spec: &PropertySpec) -> StyleResult<Json> {
    let get = json!(["get", params.property()?]);
    let Some(default) = params.default else {
        return Ok(if spec.kind == PropertyType::String {
            json!(["string", get])
        } else {
            get
        });
    };

    Ok(match spec.kind {
        PropertyType::Enum => {
            let values = spec.values.clone().unwrap_or_default();
            json!(["match", get, values, get, default])
        }
        PropertyType::Color => json!(["to-color", get, literal(default.clone())]),
        PropertyType::Array => {
            let item = match spec.value {
                Some(PropertyType::String) => json!("string"),
                Some(PropertyType::Boolean) => json!("boolean"),
                _ => json!("number"),
            };
            json!(["array", item, spec.length, get, literal(default.clone())])
        }
        PropertyType::Number => json!(["number", get, default]),
        PropertyType::String => json!(["string", get, default]),
        PropertyType::Boolean => json!(["boolean", get, default]),
    })
}

fn convert_zoom(params: &Parameters<'_>, spec: &PropertySpec, stops: &[Stop]) -> StyleResult<Json> {
    curve(params, params.function_type(spec), json!(["zoom"]), stops)
}

/// Build a `step` or `interpolate` over `input`.
fn curve(params: &Parameters<'_>, ty: FunctionType, input: Json, stops: &[Stop]) -> StyleResult<Json> {
    let mut expression = match ty {
        FunctionType::Interval => vec![json!("step"), input],
        FunctionType::Exponential => vec![json!(params.interpolate_op), params.interpolation(), input],
        other => {
            return Err(StyleError::validation(format!(
                "{other:?} functions cannot be used with zoom"
            )));
        }
    };
    let is_step = ty == FunctionType::Interval;
    for (input, output) in stops {
        append_stop(&mut expression, input.clone(), output.clone(), is_step);
    }
    pad_degenerate_step(&mut expression);
    Ok(Json::Array(expression))
}

fn convert_property(
    params: &Parameters<'_>,
    spec: &PropertySpec,
    stops: &[Stop],
) -> StyleResult<Json> {
    let property = params.property()?;
    let get = json!(["get", property]);

    match params.function_type(spec) {
        FunctionType::Categorical => {
            check_uniform_keys(stops)?;
            let fallback = fallback(params, spec);
            if stops.first().is_some_and(|(k, _)| k.is_boolean()) {
                let mut expression = vec![json!("case")];
                for (key, output) in stops {
                    expression.push(json!(["==", get, key]));
                    expression.push(output.clone());
                }
                expression.push(fallback);
                return Ok(Json::Array(expression));
            }
            let mut expression = vec![json!("match"), get];
            for (key, output) in stops {
                append_stop(&mut expression, key.clone(), output.clone(), false);
            }
            expression.push(fallback);
            Ok(Json::Array(expression))
        }
        ty @ (FunctionType::Interval | FunctionType::Exponential) => {
            let input = json!(["number", get]);
            let expression = match ty {
                FunctionType::Interval => curve(params, ty, input, stops)?,
                _ => {
                    let mut expression = vec![
                        json!(params.interpolate_op),
                        params.interpolation(),
                        input,
                    ];
                    for (key, output) in stops {
                        append_stop(&mut expression, key.clone(), output.clone(), false);
                    }
                    Json::Array(expression)
                }
            };
            Ok(match params.default {
                None => expression,
                Some(default) => json!([
                    "case",
                    ["==", ["typeof", get], "number"],
                    expression,
                    literal(default.clone())
                ]),
            })
        }
        FunctionType::Identity => convert_identity(params, spec),
    }
}

fn convert_zoom_and_property(
    params: &Parameters<'_>,
    spec: &PropertySpec,
    stops: Vec<Stop>,
) -> StyleResult<Json> {
    // Group the property stops by zoom, preserving first-seen zoom order.
    let mut groups: Vec<(Json, Vec<Stop>)> = Vec::new();
    for (key, output) in stops {
        let (Some(zoom), Some(value)) = (key.get("zoom"), key.get("value")) else {
            return Err(StyleError::validation(format!(
                "zoom-and-property stop keys need \"zoom\" and \"value\", found {key}"
            )));
        };
        let stop = (value.clone(), output);
        match groups.iter_mut().find(|(z, _)| z == zoom) {
            Some((_, group)) => group.push(stop),
            None => groups.push((zoom.clone(), vec![stop])),
        }
    }

    let outer = if spec.is_interpolated() {
        FunctionType::Exponential
    } else {
        FunctionType::Interval
    };
    let mut zoom_stops = Vec::with_capacity(groups.len());
    for (zoom, group) in groups {
        zoom_stops.push((zoom, convert_property(params, spec, &group)?));
    }

    let outer_params = Parameters {
        ty: Some(outer),
        base: 1.0,
        ..*params
    };
    curve(&outer_params, outer, json!(["zoom"]), &zoom_stops)
}

fn fallback(params: &Parameters<'_>, spec: &PropertySpec) -> Json {
    params
        .default
        .or(spec.default.as_ref())
        .map_or(Json::Null, |d| literal(d.clone()))
}

/// Reject categorical stops whose keys mix JSON types; they could never all match.
fn check_uniform_keys(stops: &[Stop]) -> StyleResult<()> {
    let kind = |k: &Json| match k {
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        _ => "other",
    };
    let Some((first, _)) = stops.first() else {
        return Ok(());
    };
    let expected = kind(first);
    if expected == "other" {
        return Err(StyleError::validation(format!(
            "categorical function keys must be strings, numbers or booleans, found {first}"
        )));
    }
    match stops.iter().find(|(k, _)| kind(k) != expected) {
        Some((key, _)) => Err(StyleError::validation(format!(
            "categorical function keys must all be of type {expected}, found {key}"
        ))),
        None => Ok(()),
    }
}

fn append_stop(curve: &mut Vec<Json>, input: Json, output: Json, is_step: bool) {
    // Duplicate stop inputs were tolerated by legacy functions; keep the first.
    if curve.len() > 3 && curve.get(curve.len() - 2) == Some(&input) {
        return;
    }
    // `step` takes no input for its first output.
    if !(is_step && curve.len() == 2) {
        curve.push(input);
    }
    curve.push(output);
}

fn pad_degenerate_step(expression: &mut Vec<Json>) {
    if expression.len() == 3 && expression[0] == "step" {
        let only = expression[2].clone();
        expression.push(json!(0));
        expression.push(only);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/function.rs"]
mod tests;
