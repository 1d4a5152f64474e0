//! Dataset access
//!
//! CSV access to the published concrete strength dataset.

pub mod dataset;

pub use dataset::{ConcreteDataset, EvaluationRow, COLUMN_TO_FEATURE, TARGET_COLUMN};
