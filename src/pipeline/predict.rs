//! Prediction pipeline
//!
//! Loads the persisted preprocessor and model, transforms a single record
//! with the already-learned parameters, and runs inference. This path
//! never fits anything; the decision boundary stays fixed between
//! training and serving.

use crate::artifact;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::preprocessing::ColumnPreprocessor;
use crate::schema::StudentRecord;
use crate::training::Regressor;
use tracing::info;

pub struct PredictPipeline {
    config: PipelineConfig,
}

impl PredictPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Predict the target score for one record.
    pub fn predict(&self, record: &StudentRecord) -> Result<f64> {
        let preprocessor: ColumnPreprocessor = artifact::load(&self.config.preprocessor_path)?;
        let model: Regressor = artifact::load(&self.config.model_path)?;

        let features = record.to_dataframe()?;
        let matrix = preprocessor.transform(&features)?;

        let predictions = model.predict(&matrix)?;
        let prediction = *predictions.first().ok_or_else(|| {
            PipelineError::Computation("model returned no predictions".to_string())
        })?;

        info!(family = %model.family(), prediction, "served prediction");
        Ok(prediction)
    }
}
