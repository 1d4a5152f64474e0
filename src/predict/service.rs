//! Model inference behind a front-end-agnostic service

use burn::tensor::backend::Backend;

use crate::data::ConcreteDataset;
use crate::features::{FeatureMap, FeatureVector, ValidationMode};
use crate::model::{RegressorConfig, StrengthRegressor};
use crate::Result;

/// Prediction entry point shared by the web, CLI and evaluator front ends
///
/// Holds the loaded model and its device; callers receive the service
/// explicitly rather than through any global state.
pub struct PredictionService<B: Backend> {
    model: StrengthRegressor<B>,
    device: B::Device,
}

impl<B: Backend> PredictionService<B> {
    /// Create a service around an already-constructed model
    pub fn new(model: StrengthRegressor<B>, device: B::Device) -> Self {
        PredictionService { model, device }
    }

    /// Validate raw features and predict compressive strength in MPa
    ///
    /// The value is returned unrounded; formatting belongs to each front end.
    pub fn predict(&self, raw: &FeatureMap, mode: ValidationMode) -> Result<f32> {
        let features = FeatureVector::build(raw, mode)?;
        self.predict_vector(&features)
    }

    /// Predict from an already-validated feature vector
    pub fn predict_vector(&self, features: &FeatureVector) -> Result<f32> {
        self.model.predict_one(&features.to_vec(), &self.device)
    }
}

impl<B: Backend> PredictionService<B>
where
    B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
    B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
{
    /// Load the service from a saved model artifact
    pub fn load(model_path: &str, config: RegressorConfig, device: B::Device) -> Result<Self> {
        let model = StrengthRegressor::load(&device, model_path, config)?;
        log::info!("Loaded model from {}", model_path);
        Ok(Self::new(model, device))
    }
}

/// Outcome of evaluating one dataset row against the model
#[derive(Debug, Clone)]
pub struct RowEvaluation {
    pub row_index: usize,
    pub features: FeatureVector,
    pub predicted: f32,
    pub actual: f32,
}

impl RowEvaluation {
    /// Signed prediction error (positive = overestimate)
    pub fn signed_error(&self) -> f32 {
        self.predicted - self.actual
    }
}

/// Predict one dataset row and compare it against the recorded strength
pub fn evaluate_row<B: Backend>(
    service: &PredictionService<B>,
    dataset: &ConcreteDataset,
    index: i64,
) -> Result<RowEvaluation> {
    let row = dataset.evaluation_row(index)?;
    let features = FeatureVector::build(&row.features, ValidationMode::FailFast)?;
    let predicted = service.predict_vector(&features)?;

    Ok(RowEvaluation {
        row_index: index as usize,
        features,
        predicted,
        actual: row.actual,
    })
}
