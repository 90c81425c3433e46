use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::foundation::error::StyleResult;
use crate::style::spec::PropertySpec;

const BUILTIN: &str = include_str!("catalog.json");

/// Property specs keyed by property name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyCatalog {
    properties: BTreeMap<String, PropertySpec>,
}

impl PropertyCatalog {
    /// The paint and layout properties understood by the vector renderer.
    pub fn builtin() -> StyleResult<Self> {
        Self::from_json_str(BUILTIN)
    }

    /// Load a catalog from a JSON object of property specs.
    pub fn from_json_str(json: &str) -> StyleResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Spec of `name`, if cataloged.
    pub fn get(&self, name: &str) -> Option<&PropertySpec> {
        self.properties.get(name)
    }

    /// Add or replace a property.
    pub fn insert(&mut self, name: impl Into<String>, spec: PropertySpec) {
        self.properties.insert(name.into(), spec);
    }

    /// Properties in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertySpec)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// `true` when empty.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/catalog.rs"]
mod tests;
