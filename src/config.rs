//! Pipeline configuration
//!
//! All paths and tunables live in an explicit [`PipelineConfig`] passed to
//! each component at construction. Nothing is resolved at import time.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the full pipeline: artifact locations plus the
/// split/search tunables shared by the offline stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Source dataset (delimited CSV with the full schema)
    pub source_path: PathBuf,
    /// Raw dataset copy written by ingestion
    pub raw_data_path: PathBuf,
    /// Train split written by ingestion
    pub train_data_path: PathBuf,
    /// Test split written by ingestion
    pub test_data_path: PathBuf,
    /// Fitted preprocessor blob
    pub preprocessor_path: PathBuf,
    /// Fitted best-model blob
    pub model_path: PathBuf,
    /// Fraction of rows held out for the test split
    pub test_fraction: f64,
    /// Seed for the train/test shuffle and the k-fold shuffle
    pub seed: u64,
    /// Folds for grid-search cross-validation
    pub cv_folds: usize,
    /// Minimum acceptable test r2 for the selected model
    pub quality_floor: f64,
}

impl PipelineConfig {
    /// Build a config reading from `source_path`, with artifacts under
    /// the default `artifacts/` directory.
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            raw_data_path: PathBuf::new(),
            train_data_path: PathBuf::new(),
            test_data_path: PathBuf::new(),
            preprocessor_path: PathBuf::new(),
            model_path: PathBuf::new(),
            test_fraction: 0.2,
            seed: 42,
            cv_folds: 3,
            quality_floor: 0.6,
        }
        .with_artifacts_dir("artifacts")
    }

    /// Re-root every artifact path under `dir`. File names are fixed.
    pub fn with_artifacts_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        self.raw_data_path = dir.join("data.csv");
        self.train_data_path = dir.join("train.csv");
        self.test_data_path = dir.join("test.csv");
        self.preprocessor_path = dir.join("preprocessor.json");
        self.model_path = dir.join("model.json");
        self
    }

    /// Set the held-out test fraction.
    pub fn with_test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = fraction;
        self
    }

    /// Set the shuffle seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of cross-validation folds.
    pub fn with_cv_folds(mut self, folds: usize) -> Self {
        self.cv_folds = folds;
        self
    }

    /// Set the model-selection quality floor.
    pub fn with_quality_floor(mut self, floor: f64) -> Self {
        self.quality_floor = floor;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new("data/stud.csv")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = PipelineConfig::default();
        assert_eq!(config.raw_data_path, PathBuf::from("artifacts/data.csv"));
        assert_eq!(config.model_path, PathBuf::from("artifacts/model.json"));
        assert_eq!(config.test_fraction, 0.2);
        assert_eq!(config.seed, 42);
        assert_eq!(config.cv_folds, 3);
        assert_eq!(config.quality_floor, 0.6);
    }

    #[test]
    fn test_artifacts_dir_rebase() {
        let config = PipelineConfig::new("stud.csv").with_artifacts_dir("/tmp/run1");
        assert_eq!(config.train_data_path, PathBuf::from("/tmp/run1/train.csv"));
        assert_eq!(
            config.preprocessor_path,
            PathBuf::from("/tmp/run1/preprocessor.json")
        );
    }
}
