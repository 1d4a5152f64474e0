//! Feature validation and canonical ordering
//!
//! Converts raw front-end input into model-ready features.

pub mod vector;

pub use vector::{FeatureMap, FeatureVector, RawValue, ValidationMode};
