//! Neural network architecture
//!
//! A small feed-forward regressor maps the eight mix-design features to a
//! single compressive strength estimate.

pub mod regressor;

pub use regressor::{RegressorConfig, StrengthRegressor};
