//! Concrete Compressive Strength Prediction CLI
//!
//! Serves a pre-trained strength model over a web form, predicts single
//! mixes from typed flags and evaluates rows of the sample dataset.

use clap::{Parser, Subcommand};
use concrete_strength::{Config, Result, StrengthError};

#[derive(Parser)]
#[command(name = "concrete")]
#[command(about = "Concrete compressive strength prediction", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the prediction form over HTTP
    Serve {
        /// Override the configured bind host
        #[arg(long)]
        host: Option<String>,
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Predict strength for a single mix given as flags
    Predict {
        /// Cement (kg/m3)
        #[arg(long)]
        cement: Option<f64>,
        /// Blast furnace slag (kg/m3)
        #[arg(long)]
        slag: Option<f64>,
        /// Fly ash (kg/m3)
        #[arg(long)]
        fly_ash: Option<f64>,
        /// Water (kg/m3)
        #[arg(long)]
        water: Option<f64>,
        /// Superplasticizer (kg/m3)
        #[arg(long)]
        superplasticizer: Option<f64>,
        /// Coarse aggregate (kg/m3)
        #[arg(long)]
        coarse_agg: Option<f64>,
        /// Fine aggregate (kg/m3)
        #[arg(long)]
        fine_agg: Option<f64>,
        /// Curing age in days
        #[arg(long)]
        age: Option<u32>,
        /// Predict the reference mix instead of passing each flag
        #[arg(long)]
        use_sample: bool,
    },
    /// Evaluate the model against one row of the sample dataset
    Evaluate {
        /// Path to the dataset CSV (defaults to the configured copy)
        #[arg(long)]
        data_path: Option<String>,
        /// Zero-based row index to test
        #[arg(long, default_value = "0")]
        row: i64,
    },
    /// Initialize a new project with default config
    Init,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    // Run command
    let result = match cli.command {
        Commands::Serve { host, port } => commands::serve(&config, host, port),
        Commands::Predict {
            cement,
            slag,
            fly_ash,
            water,
            superplasticizer,
            coarse_agg,
            fine_agg,
            age,
            use_sample,
        } => commands::predict(
            &config,
            cement,
            slag,
            fly_ash,
            water,
            superplasticizer,
            coarse_agg,
            fine_agg,
            age,
            use_sample,
        ),
        Commands::Evaluate { data_path, row } => commands::evaluate(&config, data_path, row),
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        match &e {
            StrengthError::MissingFields(fields) => {
                eprintln!(
                    "Error: Missing required flags: {}. Pass --use-sample to try the default mix.",
                    fields.join(", ")
                );
            }
            _ => eprintln!("Error: {}", e),
        }
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use concrete_strength::features::{FeatureMap, FeatureVector, ValidationMode};
    use concrete_strength::model::RegressorConfig;
    use concrete_strength::predict::PredictionService;

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        // Create data and model directories
        std::fs::create_dir_all("data")?;
        std::fs::create_dir_all("model")?;
        println!("Created data/ and model/ directories");

        println!("\nNext steps:");
        println!("  1. Edit {} to customize settings", config_path);
        println!("  2. Place the trained model at model/strength_model.mpk");
        println!("  3. Place Concrete_Data.csv in data/ for 'concrete evaluate'");
        println!("  4. Run 'concrete predict --use-sample' to check the setup");

        Ok(())
    }

    pub fn serve(config: &Config, host: Option<String>, port: Option<u16>) -> Result<()> {
        use concrete_strength::web;

        let mut server_config = config.server.clone();
        if let Some(host) = host {
            server_config.host = host;
        }
        if let Some(port) = port {
            server_config.port = port;
        }

        let device = Default::default();
        let model_config = RegressorConfig::from_model_config(&config.model);
        let service = PredictionService::<web::ServeBackend>::load(
            &config.data.model_path,
            model_config,
            device,
        )?;

        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(web::serve(service, &server_config))
    }

    pub fn predict(
        config: &Config,
        cement: Option<f64>,
        slag: Option<f64>,
        fly_ash: Option<f64>,
        water: Option<f64>,
        superplasticizer: Option<f64>,
        coarse_agg: Option<f64>,
        fine_agg: Option<f64>,
        age: Option<u32>,
        use_sample: bool,
    ) -> Result<()> {
        use burn::backend::NdArray;

        type MyBackend = NdArray<f32>;

        // --use-sample wins over any explicit flags
        let features = if use_sample {
            FeatureMap::sample()
        } else {
            let mut map = FeatureMap::new();
            let floats = [
                ("cement", cement),
                ("slag", slag),
                ("fly_ash", fly_ash),
                ("water", water),
                ("superplasticizer", superplasticizer),
                ("coarse_agg", coarse_agg),
                ("fine_agg", fine_agg),
            ];
            for (name, value) in floats {
                if let Some(v) = value {
                    map.insert(name, v);
                }
            }
            if let Some(days) = age {
                map.insert("age", days);
            }
            map
        };

        // Validate the mix before the model artifact is opened
        let vector = FeatureVector::build(&features, ValidationMode::CollectAll)?;

        let device = Default::default();
        let model_config = RegressorConfig::from_model_config(&config.model);
        let service =
            PredictionService::<MyBackend>::load(&config.data.model_path, model_config, device)?;

        let strength = service.predict_vector(&vector)?;
        println!("Predicted compressive strength: {:.2} MPa", strength);

        Ok(())
    }

    pub fn evaluate(config: &Config, data_path: Option<String>, row: i64) -> Result<()> {
        use burn::backend::NdArray;
        use concrete_strength::data::ConcreteDataset;
        use concrete_strength::predict::evaluate_row;

        type MyBackend = NdArray<f32>;

        let dataset_path = data_path.unwrap_or_else(|| config.data.dataset_path.clone());
        let dataset = ConcreteDataset::load(&dataset_path)?;
        // Reject a bad row index before the model artifact is opened
        dataset.row_index(row)?;

        let device = Default::default();
        let model_config = RegressorConfig::from_model_config(&config.model);
        let service =
            PredictionService::<MyBackend>::load(&config.data.model_path, model_config, device)?;

        let evaluation = evaluate_row(&service, &dataset, row)?;

        let file_name = std::path::Path::new(&dataset_path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| dataset_path.clone());

        println!("Using row {} from {}", evaluation.row_index, file_name);
        println!("Input features:");
        let features = &evaluation.features;
        println!("  cement: {}", features.cement);
        println!("  slag: {}", features.slag);
        println!("  fly_ash: {}", features.fly_ash);
        println!("  water: {}", features.water);
        println!("  superplasticizer: {}", features.superplasticizer);
        println!("  coarse_agg: {}", features.coarse_agg);
        println!("  fine_agg: {}", features.fine_agg);
        println!("  age: {}", features.age);
        println!("Actual strength:    {:.2} MPa", evaluation.actual);
        println!("Predicted strength: {:.2} MPa", evaluation.predicted);
        println!("Error: {:+.2} MPa", evaluation.signed_error());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concrete_strength::data::{COLUMN_TO_FEATURE, TARGET_COLUMN};

    /// Config pointing into a scratch directory with no model artifact
    fn test_config(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.data.model_path = dir.join("absent_model").to_str().unwrap().to_string();
        config.data.dataset_path = dir.join("mixes.csv").to_str().unwrap().to_string();
        config
    }

    fn write_dataset(path: &str) {
        let mut fields: Vec<&str> = COLUMN_TO_FEATURE.iter().map(|(column, _)| *column).collect();
        fields.push(TARGET_COLUMN);
        let header = fields
            .iter()
            .map(|h| format!("\"{}\"", h))
            .collect::<Vec<_>>()
            .join(",");
        let csv = format!(
            "{}\n540.0,0.0,0.0,162.0,2.5,1040.0,676.0,28,79.99\n",
            header
        );
        std::fs::write(path, csv).unwrap();
    }

    #[test]
    fn test_predict_reports_missing_flags_before_model_load() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let err = commands::predict(
            &config,
            Some(300.0),
            None,
            None,
            None,
            None,
            None,
            None,
            None,
            false,
        )
        .unwrap_err();

        match err {
            StrengthError::MissingFields(fields) => {
                assert_eq!(
                    fields,
                    vec![
                        "slag",
                        "fly_ash",
                        "water",
                        "superplasticizer",
                        "coarse_agg",
                        "fine_agg",
                        "age"
                    ]
                );
            }
            other => panic!("expected MissingFields, got {:?}", other),
        }
    }

    #[test]
    fn test_evaluate_checks_row_bounds_before_model_load() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        write_dataset(&config.data.dataset_path);

        let err = commands::evaluate(&config, None, 5).unwrap_err();
        assert!(matches!(
            err,
            StrengthError::RowOutOfRange { index: 5, rows: 1 }
        ));
    }
}
