//! Prediction and inference
//!
//! Load trained models and generate predictions.

pub mod service;

pub use service::{evaluate_row, PredictionService, RowEvaluation};
