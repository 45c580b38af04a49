//! Command-line interface

use crate::config::PipelineConfig;
use crate::pipeline::{PredictPipeline, TrainPipeline};
use crate::schema::StudentRecord;
use crate::server::{run_server, ServerConfig};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "scorecast", about = "Exam score prediction pipeline", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run ingestion, transformation, and model selection
    Train {
        /// Source dataset CSV
        #[arg(long, default_value = "data/stud.csv")]
        data: PathBuf,
        /// Directory for pipeline artifacts
        #[arg(long, default_value = "artifacts")]
        artifacts: PathBuf,
    },
    /// Predict one math score from persisted artifacts
    Predict {
        #[arg(long, default_value = "artifacts")]
        artifacts: PathBuf,
        #[arg(long)]
        gender: String,
        #[arg(long)]
        race_ethnicity: String,
        #[arg(long)]
        parental_level_of_education: String,
        #[arg(long)]
        lunch: String,
        #[arg(long)]
        test_preparation_course: String,
        #[arg(long)]
        reading_score: f64,
        #[arg(long)]
        writing_score: f64,
    },
    /// Serve the prediction web form
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        #[arg(long, default_value_t = 8080)]
        port: u16,
        #[arg(long, default_value = "artifacts")]
        artifacts: PathBuf,
    },
}

fn step_ok(msg: &str) {
    println!("  {} {}", "✓".green(), msg);
}

pub fn cmd_train(data: &PathBuf, artifacts: &PathBuf) -> anyhow::Result<()> {
    let config = PipelineConfig::new(data.clone()).with_artifacts_dir(artifacts);

    println!("Training on {}", data.display().to_string().cyan());
    let start = Instant::now();

    let test_r2 = TrainPipeline::new(config.clone()).run()?;

    step_ok(&format!("model saved to {}", config.model_path.display()));
    step_ok(&format!(
        "preprocessor saved to {}",
        config.preprocessor_path.display()
    ));
    step_ok(&format!("done in {:.1}s", start.elapsed().as_secs_f64()));
    println!("Best model test r2: {}", format!("{test_r2:.4}").green().bold());
    Ok(())
}

pub fn cmd_predict(artifacts: &PathBuf, record: StudentRecord) -> anyhow::Result<()> {
    let config = PipelineConfig::default().with_artifacts_dir(artifacts);
    let prediction = PredictPipeline::new(config).predict(&record)?;
    println!(
        "Predicted math score: {}",
        format!("{prediction:.1}").green().bold()
    );
    Ok(())
}

pub async fn cmd_serve(host: &str, port: u16, artifacts: &PathBuf) -> anyhow::Result<()> {
    let config = PipelineConfig::default().with_artifacts_dir(artifacts);
    run_server(
        ServerConfig {
            host: host.to_string(),
            port,
        },
        config,
    )
    .await
}
