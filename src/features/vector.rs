//! Mix-design feature representation and validation
//!
//! Raw front-end input is validated here into the canonical feature vector
//! the model consumes.

use std::collections::HashMap;
use std::fmt;

use crate::{Result, StrengthError};

/// A feature value as it arrives from a front end, before validation
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Untyped text (form fields, CSV cells)
    Text(String),
    /// Already-numeric input (typed CLI flags)
    Number(f64),
}

impl RawValue {
    /// Numeric reading of the value, if it has one
    pub fn as_float(&self) -> Option<f64> {
        match self {
            RawValue::Text(s) => s.trim().parse::<f64>().ok(),
            RawValue::Number(n) => Some(*n),
        }
    }

    /// Whole-day reading of the value for curing age
    pub fn as_age(&self) -> Option<u32> {
        let n = match self {
            RawValue::Text(s) => {
                if let Ok(days) = s.trim().parse::<u32>() {
                    return Some(days);
                }
                s.trim().parse::<f64>().ok()?
            }
            RawValue::Number(n) => *n,
        };
        if n.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&n) {
            Some(n as u32)
        } else {
            None
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Text(s) => write!(f, "{}", s),
            RawValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        RawValue::Number(n)
    }
}

impl From<f32> for RawValue {
    fn from(n: f32) -> Self {
        RawValue::Number(f64::from(n))
    }
}

impl From<u32> for RawValue {
    fn from(n: u32) -> Self {
        RawValue::Number(f64::from(n))
    }
}

/// Named raw feature values collected by a front end
#[derive(Debug, Clone, Default)]
pub struct FeatureMap {
    values: HashMap<String, RawValue>,
}

impl FeatureMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<RawValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.values.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<RawValue> {
        self.values.remove(name)
    }

    /// Reference mix used by the `--use-sample` smoke test
    pub fn sample() -> Self {
        let mut map = FeatureMap::new();
        map.insert("cement", 300.0);
        map.insert("slag", 100.0);
        map.insert("fly_ash", 0.0);
        map.insert("water", 180.0);
        map.insert("superplasticizer", 5.0);
        map.insert("coarse_agg", 1000.0);
        map.insert("fine_agg", 800.0);
        map.insert("age", 28u32);
        map
    }
}

impl From<HashMap<String, String>> for FeatureMap {
    fn from(fields: HashMap<String, String>) -> Self {
        let values = fields
            .into_iter()
            .map(|(name, value)| (name, RawValue::Text(value)))
            .collect();
        FeatureMap { values }
    }
}

/// How validation reports problems
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Stop at the first missing or unconvertible field
    FailFast,
    /// Gather every missing field into one combined error
    CollectAll,
}

/// Validated mix features in canonical model-input order
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    /// Cement (kg per m^3 of mixture)
    pub cement: f32,
    /// Blast furnace slag
    pub slag: f32,
    /// Fly ash
    pub fly_ash: f32,
    /// Mixing water
    pub water: f32,
    /// Superplasticizer
    pub superplasticizer: f32,
    /// Coarse aggregate
    pub coarse_agg: f32,
    /// Fine aggregate
    pub fine_agg: f32,
    /// Curing age in days
    pub age: u32,
}

impl FeatureVector {
    /// Dimension of the model input vector
    pub const DIM: usize = 8;

    /// Field names in canonical order
    pub const FIELD_NAMES: [&'static str; Self::DIM] = [
        "cement",
        "slag",
        "fly_ash",
        "water",
        "superplasticizer",
        "coarse_agg",
        "fine_agg",
        "age",
    ];

    /// Validate raw values into a typed vector
    ///
    /// Values pass through unchecked for range: the model sees whatever
    /// parses, negative quantities included. Only `age` is held to its
    /// whole-day type.
    pub fn build(raw: &FeatureMap, mode: ValidationMode) -> Result<Self> {
        if mode == ValidationMode::CollectAll {
            let missing: Vec<&'static str> = Self::FIELD_NAMES
                .iter()
                .copied()
                .filter(|name| raw.get(name).is_none())
                .collect();
            if !missing.is_empty() {
                return Err(StrengthError::MissingFields(missing));
            }
        }
        Ok(FeatureVector {
            cement: float_field(raw, "cement")?,
            slag: float_field(raw, "slag")?,
            fly_ash: float_field(raw, "fly_ash")?,
            water: float_field(raw, "water")?,
            superplasticizer: float_field(raw, "superplasticizer")?,
            coarse_agg: float_field(raw, "coarse_agg")?,
            fine_agg: float_field(raw, "fine_agg")?,
            age: age_field(raw, "age")?,
        })
    }

    /// Convert to a flat vector in canonical order
    pub fn to_vec(&self) -> Vec<f32> {
        vec![
            self.cement,
            self.slag,
            self.fly_ash,
            self.water,
            self.superplasticizer,
            self.coarse_agg,
            self.fine_agg,
            self.age as f32,
        ]
    }
}

fn float_field(raw: &FeatureMap, field: &'static str) -> Result<f32> {
    let value = raw.get(field).ok_or(StrengthError::MissingField { field })?;
    value
        .as_float()
        .map(|n| n as f32)
        .ok_or_else(|| StrengthError::TypeConversion {
            field,
            value: value.to_string(),
        })
}

fn age_field(raw: &FeatureMap, field: &'static str) -> Result<u32> {
    let value = raw.get(field).ok_or(StrengthError::MissingField { field })?;
    value
        .as_age()
        .ok_or_else(|| StrengthError::TypeConversion {
            field,
            value: value.to_string(),
        })
}
