//! Concrete compressive strength prediction
//!
//! Serves a pre-trained regression model estimating compressive strength (MPa)
//! from eight concrete mix-design features, through a web form, a CLI and a
//! dataset evaluator that all share one validation and inference path.

pub mod data;
pub mod features;
pub mod model;
pub mod predict;
pub mod web;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-wide errors
#[derive(Debug, Error)]
pub enum StrengthError {
    #[error("Missing required feature: {field}")]
    MissingField { field: &'static str },

    #[error("Missing required features: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid value for {field}: {value:?}")]
    TypeConversion { field: &'static str, value: String },

    #[error("Row index {index} is out of range for dataset with {rows} rows")]
    RowOutOfRange { index: i64, rows: usize },

    #[error("Dataset is missing expected column: {column:?}")]
    MissingColumn { column: String },

    #[error("Failed to load model from {path}: {cause}")]
    ModelLoad { path: String, cause: String },

    #[error("Model invocation failed: {0}")]
    ModelInvocation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StrengthError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    pub model: ModelConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub model_path: String,
    pub dataset_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub hidden_dims: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data: DataConfig {
                model_path: "model/strength_model".to_string(),
                dataset_path: "data/Concrete_Data.csv".to_string(),
            },
            model: ModelConfig {
                hidden_dims: vec![64, 32],
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StrengthError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| StrengthError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| StrengthError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
