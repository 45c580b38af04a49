//! Data transformation stage
//!
//! Bridges ingestion and training: reads the split CSVs, separates the
//! target from the features, fits the preprocessor on train features only,
//! transforms both partitions, and hands the trainer two numeric matrices
//! with the target as the last column.

use crate::config::PipelineConfig;
use crate::data_loader;
use crate::error::{PipelineError, Result};
use crate::preprocessing::ColumnPreprocessor;
use crate::schema;
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

/// Transformation stage output: train/test matrices plus where the fitted
/// preprocessor was persisted.
pub struct TransformedData {
    pub train: Array2<f64>,
    pub test: Array2<f64>,
    pub preprocessor_path: PathBuf,
}

pub struct DataTransformation {
    config: PipelineConfig,
}

impl DataTransformation {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Fit on the train partition, transform both partitions, persist the
    /// preprocessor.
    pub fn run(&self, train_path: &Path, test_path: &Path) -> Result<TransformedData> {
        let train_df = data_loader::load_csv(train_path)
            .map_err(|e| PipelineError::stage("transformation", e))?;
        let test_df = data_loader::load_csv(test_path)
            .map_err(|e| PipelineError::stage("transformation", e))?;
        info!(
            train_rows = train_df.height(),
            test_rows = test_df.height(),
            "read train and test partitions"
        );

        let (train_features, train_target) = Self::split_target(&train_df)?;
        let (test_features, test_target) = Self::split_target(&test_df)?;

        let mut preprocessor = ColumnPreprocessor::new(
            schema::NUMERIC_COLUMNS.iter().copied(),
            schema::CATEGORICAL_COLUMNS.iter().copied(),
        );

        let train_matrix = preprocessor.fit_transform(&train_features)?;
        let test_matrix = preprocessor.transform(&test_features)?;
        info!(
            features = train_matrix.ncols(),
            "fitted preprocessor on train partition"
        );

        let train = Self::append_target(train_matrix, &train_target)?;
        let test = Self::append_target(test_matrix, &test_target)?;

        preprocessor.save(&self.config.preprocessor_path)?;
        info!(path = %self.config.preprocessor_path.display(), "saved preprocessor");

        Ok(TransformedData {
            train,
            test,
            preprocessor_path: self.config.preprocessor_path.clone(),
        })
    }

    /// Drop the target from the feature side and return it separately.
    fn split_target(df: &DataFrame) -> Result<(DataFrame, Array1<f64>)> {
        let target = df
            .column(schema::TARGET_COLUMN)
            .map_err(|_| PipelineError::ColumnNotFound(schema::TARGET_COLUMN.to_string()))?
            .as_materialized_series()
            .cast(&DataType::Float64)
            .map_err(|e| PipelineError::Data(e.to_string()))?;

        let y: Array1<f64> = target
            .f64()
            .map_err(|e| PipelineError::Data(e.to_string()))?
            .into_iter()
            .map(|v| v.unwrap_or(0.0))
            .collect();

        let features = df.drop(schema::TARGET_COLUMN)?;
        Ok((features, y))
    }

    /// Concatenate the target as the final matrix column.
    fn append_target(features: Array2<f64>, target: &Array1<f64>) -> Result<Array2<f64>> {
        if features.nrows() != target.len() {
            return Err(PipelineError::Shape {
                expected: format!("{} target rows", features.nrows()),
                actual: format!("{} target rows", target.len()),
            });
        }
        let target_col = target.view().insert_axis(Axis(1));
        let combined = ndarray::concatenate(Axis(1), &[features.view(), target_col])?;
        Ok(combined)
    }
}
