//! Property specifications: the metadata that drives expected types, defaults, and which
//! kinds of variance a property accepts.

use serde::{Deserialize, Deserializer, Serialize};

use crate::color::rgba::Color;
use crate::expression::types::Type;
use crate::expression::value::Value;

/// Declared value type of a property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    /// Numeric.
    Number,
    /// Free-form string.
    String,
    /// Boolean.
    Boolean,
    /// CSS color string.
    Color,
    /// String restricted to [`PropertySpec::values`].
    Enum,
    /// Array of [`PropertySpec::value`] items.
    Array,
}

/// How legacy functions of a property behave between stops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FunctionKind {
    /// Outputs blend between stops.
    Interpolated,
    /// Outputs change in steps.
    PiecewiseConstant,
}

/// Style-spec description of one paint or layout property.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertySpec {
    /// Value type.
    #[serde(rename = "type")]
    pub kind: PropertyType,
    /// Item type for arrays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<PropertyType>,
    /// Fixed length for arrays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    /// Value used when an expression yields null or fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// Allowed values of an enum property. Accepts a list or an object keyed by value.
    #[serde(
        default,
        deserialize_with = "deserialize_values",
        skip_serializing_if = "Option::is_none"
    )]
    pub values: Option<Vec<String>>,
    /// Whether the value may depend on feature properties.
    #[serde(rename = "property-function", default)]
    pub property_function: bool,
    /// Whether the value may depend on zoom.
    #[serde(rename = "zoom-function", default = "default_true")]
    pub zoom_function: bool,
    /// Legacy function behavior.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<FunctionKind>,
    /// Whether constant strings may embed `{field}` references to feature properties.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub tokens: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ValuesRepr {
    List(Vec<String>),
    Map(serde_json::Map<String, serde_json::Value>),
}

fn deserialize_values<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let repr = Option::<ValuesRepr>::deserialize(deserializer)?;
    Ok(repr.map(|repr| match repr {
        ValuesRepr::List(values) => values,
        ValuesRepr::Map(map) => map.keys().cloned().collect(),
    }))
}

impl PropertySpec {
    /// A spec of `kind` that accepts zoom and property variance and has no default.
    pub fn new(kind: PropertyType) -> Self {
        Self {
            kind,
            value: None,
            length: None,
            default: None,
            values: None,
            property_function: true,
            zoom_function: true,
            function: None,
            tokens: false,
        }
    }

    /// Set the default value.
    pub fn with_default(mut self, default: serde_json::Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Expected result type of expressions for this property.
    pub fn expected_type(&self) -> Type {
        match self.kind {
            PropertyType::Array => Type::array(
                self.value.map_or(Type::Value, scalar_type),
                self.length,
            ),
            kind => scalar_type(kind),
        }
    }

    /// The default as a runtime value; color strings are parsed, unparsable ones become null.
    pub fn default_value(&self) -> Value {
        match (&self.default, self.kind) {
            (None, _) => Value::Null,
            (Some(serde_json::Value::String(s)), PropertyType::Color) => {
                Color::parse(s).map_or(Value::Null, Value::Color)
            }
            (Some(json), _) => Value::from(json),
        }
    }

    /// `true` when legacy functions interpolate by default.
    pub fn is_interpolated(&self) -> bool {
        self.function == Some(FunctionKind::Interpolated)
    }
}

fn scalar_type(kind: PropertyType) -> Type {
    match kind {
        PropertyType::Number => Type::Number,
        PropertyType::String | PropertyType::Enum => Type::String,
        PropertyType::Boolean => Type::Boolean,
        PropertyType::Color => Type::Color,
        PropertyType::Array => Type::array(Type::Value, None),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/spec.rs"]
mod tests;
