//! Feed-forward strength regression network
//!
//! Architecture: Input(8) → Hidden1(64) → ReLU
//!                        → Hidden2(32) → ReLU
//!                        → output(1)

use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::record::{FullPrecisionSettings, Recorder};
use burn::tensor::activation::relu;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::features::FeatureVector;

/// Configuration for the regression network
#[derive(Debug, Clone)]
pub struct RegressorConfig {
    /// Input dimension (mix-design features)
    pub input_dim: usize,
    /// Hidden layer dimensions (e.g., [64, 32] for two layers)
    pub hidden_dims: Vec<usize>,
}

impl Default for RegressorConfig {
    fn default() -> Self {
        RegressorConfig {
            input_dim: FeatureVector::DIM,
            hidden_dims: vec![64, 32],
        }
    }
}

impl RegressorConfig {
    /// Derive the network shape from application configuration
    pub fn from_model_config(model: &crate::ModelConfig) -> Self {
        RegressorConfig {
            input_dim: FeatureVector::DIM,
            hidden_dims: model.hidden_dims.clone(),
        }
    }
}

/// Multi-layer perceptron regressor with a single scalar head
#[derive(Module, Debug)]
pub struct StrengthRegressor<B: Backend> {
    hidden1: Linear<B>,
    hidden2: Option<Linear<B>>,
    output: Linear<B>,
}

impl<B: Backend> StrengthRegressor<B> {
    /// Create a new regressor with freshly initialized weights
    pub fn new(device: &B::Device, config: RegressorConfig) -> Self {
        let first_dim = config.hidden_dims.first().copied().unwrap_or(64);
        let hidden1 = LinearConfig::new(config.input_dim, first_dim).init(device);

        let (hidden2, head_input_dim) = if config.hidden_dims.len() > 1 {
            let h2 = LinearConfig::new(first_dim, config.hidden_dims[1]).init(device);
            (Some(h2), config.hidden_dims[1])
        } else {
            (None, first_dim)
        };

        StrengthRegressor {
            hidden1,
            hidden2,
            output: LinearConfig::new(head_input_dim, 1).init(device),
        }
    }

    /// Forward pass
    ///
    /// # Arguments
    /// * `features` - Mix-design features [batch, input_dim]
    ///
    /// # Returns
    /// Predicted compressive strength in MPa [batch, 1]
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.hidden1.forward(features));
        let x = if let Some(h2) = &self.hidden2 {
            relu(h2.forward(x))
        } else {
            x
        };
        self.output.forward(x)
    }

    /// Run inference on a single feature vector in canonical order
    pub fn predict_one(&self, vector: &[f32], device: &B::Device) -> crate::Result<f32> {
        if vector.len() != FeatureVector::DIM {
            return Err(crate::StrengthError::ModelInvocation(format!(
                "expected input of length {}, got {}",
                FeatureVector::DIM,
                vector.len()
            )));
        }

        let input = Tensor::<B, 1>::from_floats(vector, device).reshape([1, FeatureVector::DIM]);
        let output = self.forward(input);

        let data = output.into_data();
        let values = data
            .as_slice::<f32>()
            .map_err(|e| crate::StrengthError::ModelInvocation(format!("{:?}", e)))?;
        values
            .first()
            .copied()
            .ok_or_else(|| crate::StrengthError::ModelInvocation("empty model output".to_string()))
    }

    /// Save model to file
    pub fn save(&self, path: &str) -> crate::Result<()>
    where
        B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
        B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
    {
        let recorder = burn::record::NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        recorder
            .record(self.clone().into_record(), path.into())
            .map_err(|e| crate::StrengthError::Io(std::io::Error::other(e.to_string())))
    }

    /// Load model from file
    ///
    /// The recorder stores artifacts as `<path>.mpk`. A missing artifact and
    /// an unreadable one both surface as `ModelLoad` with the cause attached.
    pub fn load(device: &B::Device, path: &str, config: RegressorConfig) -> crate::Result<Self>
    where
        B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
        B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
    {
        let artifact = format!("{}.mpk", path);
        if !std::path::Path::new(&artifact).exists() {
            return Err(crate::StrengthError::ModelLoad {
                path: path.to_string(),
                cause: format!("{} not found", artifact),
            });
        }

        let recorder = burn::record::NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        let record = recorder
            .load(path.into(), device)
            .map_err(|e| crate::StrengthError::ModelLoad {
                path: path.to_string(),
                cause: e.to_string(),
            })?;

        let model = Self::new(device, config);
        Ok(model.load_record(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_forward_shape() {
        let device = Default::default();
        let config = RegressorConfig::default();
        let model = StrengthRegressor::<TestBackend>::new(&device, config);

        let features = Tensor::random(
            [4, FeatureVector::DIM],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );

        let output = model.forward(features);
        assert_eq!(output.dims(), [4, 1]);
    }

    #[test]
    fn test_single_hidden_layer() {
        let device = Default::default();
        let config = RegressorConfig {
            input_dim: FeatureVector::DIM,
            hidden_dims: vec![32],
        };
        let model = StrengthRegressor::<TestBackend>::new(&device, config);

        let features = Tensor::random(
            [2, FeatureVector::DIM],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );

        let output = model.forward(features);
        assert_eq!(output.dims(), [2, 1]);
    }

    #[test]
    fn test_predict_one_is_deterministic() {
        let device = Default::default();
        let model = StrengthRegressor::<TestBackend>::new(&device, RegressorConfig::default());

        let vector = [300.0, 100.0, 0.0, 180.0, 5.0, 1000.0, 800.0, 28.0];
        let first = model.predict_one(&vector, &device).unwrap();
        let second = model.predict_one(&vector, &device).unwrap();

        assert!(first.is_finite());
        assert_eq!(first, second);
    }

    #[test]
    fn test_predict_one_rejects_wrong_length() {
        let device = Default::default();
        let model = StrengthRegressor::<TestBackend>::new(&device, RegressorConfig::default());

        let err = model.predict_one(&[1.0, 2.0, 3.0], &device).unwrap_err();
        assert!(matches!(err, crate::StrengthError::ModelInvocation(_)));
    }

    #[test]
    fn test_save_load_roundtrip() {
        let device = Default::default();
        let config = RegressorConfig::default();
        let model = StrengthRegressor::<TestBackend>::new(&device, config.clone());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strength_model");
        let path = path.to_str().unwrap();

        model.save(path).unwrap();
        let restored = StrengthRegressor::<TestBackend>::load(&device, path, config).unwrap();

        let vector = [540.0, 0.0, 0.0, 162.0, 2.5, 1040.0, 676.0, 28.0];
        assert_eq!(
            model.predict_one(&vector, &device).unwrap(),
            restored.predict_one(&vector, &device).unwrap()
        );
    }

    #[test]
    fn test_load_missing_artifact() {
        let device = Default::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent_model");
        let path = path.to_str().unwrap();

        let err = StrengthRegressor::<TestBackend>::load(&device, path, RegressorConfig::default())
            .unwrap_err();
        match err {
            crate::StrengthError::ModelLoad { cause, .. } => {
                assert!(cause.contains("not found"));
            }
            other => panic!("expected ModelLoad, got {:?}", other),
        }
    }
}
