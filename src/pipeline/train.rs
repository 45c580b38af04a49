//! Training pipeline orchestration

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::ingestion::DataIngestion;
use crate::training::{ModelCatalog, ModelTrainer, TrainerConfig};
use crate::transformation::DataTransformation;
use tracing::info;

/// Offline entry point: ingestion, transformation, and model selection in
/// order, each stage completing before the next starts. Returns the
/// selected model's test R².
pub struct TrainPipeline {
    config: PipelineConfig,
    catalog: Option<ModelCatalog>,
}

impl TrainPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            catalog: None,
        }
    }

    /// Use a custom model catalog instead of the standard grids.
    pub fn with_catalog(mut self, catalog: ModelCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn run(&self) -> Result<f64> {
        let (train_path, test_path) = DataIngestion::new(self.config.clone()).run()?;

        let transformed =
            DataTransformation::new(self.config.clone()).run(&train_path, &test_path)?;

        let trainer_config = TrainerConfig {
            model_path: self.config.model_path.clone(),
            cv_folds: self.config.cv_folds,
            quality_floor: self.config.quality_floor,
            seed: self.config.seed,
        };
        let mut trainer = ModelTrainer::new(trainer_config);
        if let Some(catalog) = &self.catalog {
            trainer = trainer.with_catalog(catalog.clone());
        }

        let test_r2 = trainer.train(&transformed.train, &transformed.test)?;
        info!(test_r2, "training pipeline complete");
        Ok(test_r2)
    }
}
