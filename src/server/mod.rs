//! Minimal prediction web form
//!
//! One page: a form over the seven schema fields, posting to `/predict`.
//! Artifacts are loaded per request; at this traffic level the reload is
//! an accepted latency/simplicity trade-off. Core failures render as a
//! generic message, with details going to the log only.

use crate::config::PipelineConfig;
use crate::pipeline::PredictPipeline;
use crate::schema::StudentRecord;
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

struct AppState {
    pipeline_config: PipelineConfig,
}

/// Build the application router.
pub fn create_router(pipeline_config: PipelineConfig) -> Router {
    let state = Arc::new(AppState { pipeline_config });

    Router::new()
        .route("/", get(home))
        .route("/predict", post(predict))
        .route("/health", get(health))
        .with_state(state)
}

/// Start the server and block until shutdown.
pub async fn run_server(config: ServerConfig, pipeline_config: PipelineConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "prediction server listening");

    axum::serve(listener, create_router(pipeline_config)).await?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn home() -> Html<String> {
    Html(render_page(None, None))
}

/// Form fields mirror [`StudentRecord`]; scores arrive as text and are
/// validated here.
#[derive(Debug, Deserialize)]
struct PredictForm {
    gender: String,
    race_ethnicity: String,
    parental_level_of_education: String,
    lunch: String,
    test_preparation_course: String,
    reading_score: f64,
    writing_score: f64,
}

async fn predict(
    State(state): State<Arc<AppState>>,
    Form(form): Form<PredictForm>,
) -> Html<String> {
    let record = StudentRecord {
        gender: form.gender,
        race_ethnicity: form.race_ethnicity,
        parental_level_of_education: form.parental_level_of_education,
        lunch: form.lunch,
        test_preparation_course: form.test_preparation_course,
        reading_score: form.reading_score,
        writing_score: form.writing_score,
    };

    match PredictPipeline::new(state.pipeline_config.clone()).predict(&record) {
        Ok(prediction) => Html(render_page(Some(prediction), None)),
        Err(err) => {
            error!(%err, "prediction failed");
            Html(render_page(
                None,
                Some("Prediction is unavailable right now. Please try again later."),
            ))
        }
    }
}

fn select(name: &str, label: &str, options: &[&str]) -> String {
    let opts: String = options
        .iter()
        .map(|o| format!(r#"<option value="{o}">{o}</option>"#))
        .collect();
    format!(
        r#"<label>{label}<select name="{name}" required>
<option value="" disabled selected>select</option>{opts}</select></label>"#
    )
}

fn render_page(prediction: Option<f64>, failure: Option<&str>) -> String {
    let result = match (prediction, failure) {
        (Some(p), _) => format!(r#"<p class="result">Predicted math score: {p:.1}</p>"#),
        (None, Some(msg)) => format!(r#"<p class="error">{msg}</p>"#),
        _ => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<title>Exam Score Prediction</title>
<style>
body {{ font-family: sans-serif; max-width: 32rem; margin: 2rem auto; }}
label {{ display: block; margin: 0.6rem 0; }}
select, input {{ display: block; width: 100%; padding: 0.3rem; }}
button {{ margin-top: 1rem; padding: 0.5rem 1.5rem; }}
.result {{ color: #2a7a2a; font-size: 1.2rem; }}
.error {{ color: #a33; }}
</style>
</head>
<body>
<h1>Student Exam Score Prediction</h1>
{result}
<form method="post" action="/predict">
{gender}
{race}
{education}
{lunch}
{prep}
<label>Reading score<input type="number" name="reading_score" min="0" max="100" step="any" required></label>
<label>Writing score<input type="number" name="writing_score" min="0" max="100" step="any" required></label>
<button type="submit">Predict math score</button>
</form>
</body>
</html>"#,
        gender = select("gender", "Gender", &["female", "male"]),
        race = select(
            "race_ethnicity",
            "Race or ethnicity",
            &["group A", "group B", "group C", "group D", "group E"],
        ),
        education = select(
            "parental_level_of_education",
            "Parental level of education",
            &[
                "associate's degree",
                "bachelor's degree",
                "high school",
                "master's degree",
                "some college",
                "some high school",
            ],
        ),
        lunch = select("lunch", "Lunch type", &["standard", "free/reduced"]),
        prep = select(
            "test_preparation_course",
            "Test preparation course",
            &["none", "completed"],
        ),
    )
}
