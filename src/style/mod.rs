//! Style-level glue: property specs, the built-in catalog, legacy functions, and layers.

/// Built-in and user-supplied property catalogs.
pub mod catalog;
pub mod expression;
pub mod function;
pub mod layer;
pub mod spec;
