//! Web form front end
//!
//! A single page posts the eight mix features and renders the prediction,
//! or the validation error, back into the same page.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Form, State};
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use burn::backend::NdArray;
use minijinja::{context, Environment};

use crate::features::{FeatureMap, ValidationMode};
use crate::predict::PredictionService;
use crate::{Result, ServerConfig};

/// CPU backend used by the serving path
pub type ServeBackend = NdArray<f32>;

const INDEX_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Concrete Compressive Strength Prediction</title>
</head>
<body>
  <h1>Concrete Compressive Strength Prediction</h1>
  <form action="/predict" method="post">
    <p><label>Cement (kg/m3): <input type="text" name="cement"></label></p>
    <p><label>Blast furnace slag (kg/m3): <input type="text" name="slag"></label></p>
    <p><label>Fly ash (kg/m3): <input type="text" name="fly_ash"></label></p>
    <p><label>Water (kg/m3): <input type="text" name="water"></label></p>
    <p><label>Superplasticizer (kg/m3): <input type="text" name="superplasticizer"></label></p>
    <p><label>Coarse aggregate (kg/m3): <input type="text" name="coarse_agg"></label></p>
    <p><label>Fine aggregate (kg/m3): <input type="text" name="fine_agg"></label></p>
    <p><label>Age (days): <input type="text" name="age"></label></p>
    <p><button type="submit">Predict</button></p>
  </form>
  {% if prediction %}
  <p><strong>{{ prediction }}</strong></p>
  {% endif %}
</body>
</html>
"#;

/// Shared handler state: the loaded model plus the page template
pub struct AppState {
    service: PredictionService<ServeBackend>,
    templates: Environment<'static>,
}

impl AppState {
    pub fn new(service: PredictionService<ServeBackend>) -> Result<Self> {
        let mut templates = Environment::new();
        // The .html name turns on auto-escaping for submitted values
        templates.add_template("index.html", INDEX_TEMPLATE)?;
        Ok(AppState { service, templates })
    }

    fn render(&self, prediction: Option<String>) -> Html<String> {
        let page = self
            .templates
            .get_template("index.html")
            .and_then(|template| template.render(context! { prediction }))
            .unwrap_or_else(|e| format!("Template render failed: {}", e));
        Html(page)
    }
}

async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    state.render(None)
}

async fn predict(
    State(state): State<Arc<AppState>>,
    Form(fields): Form<HashMap<String, String>>,
) -> Html<String> {
    let raw = FeatureMap::from(fields);
    let message = match state.service.predict(&raw, ValidationMode::FailFast) {
        Ok(strength) => {
            log::debug!("Form prediction: {:.2} MPa", strength);
            format!("Predicted Compressive Strength: {:.2} MPa", strength)
        }
        Err(e) => {
            log::debug!("Form submission rejected: {}", e);
            format!("Error: {}", e)
        }
    };
    state.render(Some(message))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "healthy"}))
}

/// Assemble the application routes around shared state
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict))
        .route("/health", get(health))
        .with_state(state)
}

/// Bind and serve until Ctrl+C
pub async fn serve(service: PredictionService<ServeBackend>, config: &ServerConfig) -> Result<()> {
    let state = Arc::new(AppState::new(service)?);
    let app = router(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    log::info!("Serving predictions on http://{}", bind_addr);
    println!("Serving on http://{}", bind_addr);
    println!("  GET  /         - Input form");
    println!("  POST /predict  - Form submission");
    println!("  GET  /health   - Health check");
    println!("Press Ctrl+C to stop");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
}
