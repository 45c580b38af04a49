//! scorecast - Main entry point

use clap::Parser;
use scorecast::cli::{cmd_predict, cmd_serve, cmd_train, Cli, Commands};
use scorecast::schema::StudentRecord;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scorecast=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train { data, artifacts } => {
            cmd_train(&data, &artifacts)?;
        }
        Commands::Predict {
            artifacts,
            gender,
            race_ethnicity,
            parental_level_of_education,
            lunch,
            test_preparation_course,
            reading_score,
            writing_score,
        } => {
            let record = StudentRecord {
                gender,
                race_ethnicity,
                parental_level_of_education,
                lunch,
                test_preparation_course,
                reading_score,
                writing_score,
            };
            cmd_predict(&artifacts, record)?;
        }
        Commands::Serve {
            host,
            port,
            artifacts,
        } => {
            cmd_serve(&host, port, &artifacts).await?;
        }
    }

    Ok(())
}
