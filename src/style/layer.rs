//! Compiled paint and layout properties of one style layer.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::expression::error::ParsingError;
use crate::expression::eval::{ColorCache, Feature, Globals};
use crate::expression::value::Value;
use crate::foundation::error::{StyleError, StyleResult};
use crate::style::catalog::PropertyCatalog;
use crate::style::expression::{ExpressionOptions, PropertyExpression};
use crate::style::function::compile_property_value;

type JsonMap = serde_json::Map<String, serde_json::Value>;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
struct LayerDef {
    id: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    source: Option<String>,
    #[serde(rename = "source-layer")]
    source_layer: Option<String>,
    filter: Option<serde_json::Value>,
    #[serde(rename = "ref")]
    reference: Option<String>,
    minzoom: Option<f64>,
    maxzoom: Option<f64>,
    paint: JsonMap,
    layout: JsonMap,
}

impl LayerDef {
    /// Take type, source, zoom range, filter and layout from the layer named by `ref`.
    fn resolve_ref(&mut self, style_layers: &[serde_json::Value]) -> StyleResult<()> {
        let Some(reference) = self.reference.as_deref() else {
            return Ok(());
        };
        let target = style_layers
            .iter()
            .find(|l| l.get("id").and_then(serde_json::Value::as_str) == Some(reference))
            .ok_or_else(|| {
                StyleError::validation(format!("layer references unknown layer \"{reference}\""))
            })?;
        let target = LayerDef::deserialize(target)?;
        self.kind = target.kind;
        self.source = target.source;
        self.source_layer = target.source_layer;
        self.minzoom = target.minzoom;
        self.maxzoom = target.maxzoom;
        self.filter = target.filter;
        self.layout = target.layout;
        Ok(())
    }
}

/// A layer's properties compiled against a catalog.
#[derive(Debug)]
pub struct LayerProperties {
    id: Option<String>,
    kind: Option<String>,
    source: Option<String>,
    source_layer: Option<String>,
    filter: Option<serde_json::Value>,
    visible: bool,
    minzoom: Option<f64>,
    maxzoom: Option<f64>,
    properties: BTreeMap<String, PropertyExpression>,
}

impl LayerProperties {
    /// Compile every cataloged property of a style-layer JSON object.
    ///
    /// Layout properties are merged into paint (paint wins) and catalog defaults fill the
    /// gaps. Properties outside the catalog are ignored. Failures from all properties are
    /// reported together, each key prefixed with the property name.
    pub fn compile(
        layer: &serde_json::Value,
        catalog: &PropertyCatalog,
        options: &ExpressionOptions,
    ) -> StyleResult<Self> {
        Self::compile_in_style(layer, &[], catalog, options)
    }

    /// Like [`compile`](Self::compile), resolving a `ref` against the style's `layers`.
    ///
    /// A referencing layer takes type, source, source layer, zoom range, filter and layout
    /// from the referenced one. Its layout is not merged into paint.
    #[tracing::instrument(skip(layer, style_layers, catalog, options))]
    pub fn compile_in_style(
        layer: &serde_json::Value,
        style_layers: &[serde_json::Value],
        catalog: &PropertyCatalog,
        options: &ExpressionOptions,
    ) -> StyleResult<Self> {
        let mut def = LayerDef::deserialize(layer)?;
        def.resolve_ref(style_layers)?;

        let visible = def.layout.get("visibility").and_then(|v| v.as_str()) != Some("none");

        let mut merged = def.paint;
        if def.reference.is_none() {
            for (name, value) in def.layout {
                merged.entry(name).or_insert(value);
            }
        }

        // One color memo for the whole layer.
        let options = ExpressionOptions {
            color_cache: Some(options.color_cache.clone().unwrap_or_else(|| Arc::new(ColorCache::new()))),
            ..options.clone()
        };

        let mut properties = BTreeMap::new();
        let mut errors = Vec::new();
        for (name, spec) in catalog.iter() {
            let value = match (merged.get(name), &spec.default) {
                (Some(value), _) => value,
                (None, Some(default)) => default,
                (None, None) => continue,
            };
            match compile_property_value(value, spec, &options) {
                Ok(compiled) => {
                    properties.insert(name.to_owned(), compiled);
                }
                Err(StyleError::Parse(errs)) => errors.extend(
                    errs.into_iter()
                        .map(|e| ParsingError::new(format!("{name}{}", e.key), e.message)),
                ),
                Err(other) => errors.push(ParsingError::new(name, other.to_string())),
            }
        }

        if !errors.is_empty() {
            tracing::debug!(layer = ?def.id, failures = errors.len(), "layer rejected");
            return Err(StyleError::Parse(errors));
        }

        Ok(Self {
            id: def.id,
            kind: def.kind,
            source: def.source,
            source_layer: def.source_layer,
            filter: def.filter,
            visible,
            minzoom: def.minzoom,
            maxzoom: def.maxzoom,
            properties,
        })
    }

    /// Layer id, if the layer has one.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Layer type, such as `line` or `symbol`.
    pub fn layer_type(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// Source id.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Layer within a vector source.
    pub fn source_layer(&self) -> Option<&str> {
        self.source_layer.as_deref()
    }

    /// The layer filter as written; filters are not compiled.
    pub fn filter(&self) -> Option<&serde_json::Value> {
        self.filter.as_ref()
    }

    /// `true` when the layer draws at `zoom`: visible, `minzoom <= zoom < maxzoom`.
    pub fn is_visible(&self, zoom: f64) -> bool {
        self.visible
            && self.minzoom.is_none_or(|min| zoom >= min)
            && self.maxzoom.is_none_or(|max| zoom < max)
    }

    /// Compiled expression of `name`.
    pub fn get(&self, name: &str) -> Option<&PropertyExpression> {
        self.properties.get(name)
    }

    /// Names of the compiled properties.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    /// Evaluate `name` for one zoom/feature pair.
    pub fn evaluate(
        &self,
        name: &str,
        globals: &Globals,
        feature: Option<&Feature>,
    ) -> StyleResult<Value> {
        self.get(name)
            .ok_or_else(|| StyleError::validation(format!("unknown property \"{name}\"")))?
            .evaluate(globals, feature)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/layer.rs"]
mod tests;
