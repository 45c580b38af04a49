//! Data ingestion
//!
//! Reads the source dataset, writes a raw copy, and splits it into train
//! and test partitions with a seeded shuffle. Runs once per training run;
//! re-running overwrites the previous artifacts.

use crate::config::PipelineConfig;
use crate::data_loader;
use crate::error::{PipelineError, Result};
use crate::schema;
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use tracing::info;

/// Ingestion stage: source CSV in, raw/train/test CSVs out.
pub struct DataIngestion {
    config: PipelineConfig,
}

impl DataIngestion {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run ingestion and return the train and test split paths.
    pub fn run(&self) -> Result<(PathBuf, PathBuf)> {
        info!(source = %self.config.source_path.display(), "starting ingestion");

        let df = data_loader::load_csv(&self.config.source_path)
            .map_err(|e| PipelineError::Ingestion(e.to_string()))?;

        Self::validate_schema(&df)?;
        info!(rows = df.height(), cols = df.width(), "read source dataset");

        let mut raw = df.clone();
        data_loader::save_csv(&mut raw, &self.config.raw_data_path)
            .map_err(|e| PipelineError::Ingestion(e.to_string()))?;

        let (mut train, mut test) = self.split(&df)?;
        data_loader::save_csv(&mut train, &self.config.train_data_path)
            .map_err(|e| PipelineError::Ingestion(e.to_string()))?;
        data_loader::save_csv(&mut test, &self.config.test_data_path)
            .map_err(|e| PipelineError::Ingestion(e.to_string()))?;

        info!(
            train_rows = train.height(),
            test_rows = test.height(),
            "ingestion complete"
        );

        Ok((
            self.config.train_data_path.clone(),
            self.config.test_data_path.clone(),
        ))
    }

    /// The source must carry every schema column; anything else is malformed.
    fn validate_schema(df: &DataFrame) -> Result<()> {
        for col in schema::dataset_columns() {
            if df.column(col).is_err() {
                return Err(PipelineError::Ingestion(format!(
                    "source dataset is missing column '{col}'"
                )));
            }
        }
        if df.height() < 2 {
            return Err(PipelineError::Ingestion(format!(
                "source dataset has {} rows, need at least 2 to split",
                df.height()
            )));
        }
        Ok(())
    }

    /// Disjoint row split: shuffle indices with the configured seed, hold
    /// out `test_fraction` of rows.
    fn split(&self, df: &DataFrame) -> Result<(DataFrame, DataFrame)> {
        let n = df.height();
        let n_test = ((n as f64) * self.config.test_fraction).round() as usize;
        let n_test = n_test.clamp(1, n.saturating_sub(1));

        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        indices.shuffle(&mut rng);

        let test_idx: Vec<IdxSize> = indices[..n_test].iter().map(|&i| i as IdxSize).collect();
        let train_idx: Vec<IdxSize> = indices[n_test..].iter().map(|&i| i as IdxSize).collect();

        let train = df.take(&IdxCa::from_vec("idx".into(), train_idx))?;
        let test = df.take(&IdxCa::from_vec("idx".into(), test_idx))?;
        Ok((train, test))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_source(dir: &std::path::Path, rows: usize) -> PathBuf {
        let path = dir.join("stud.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "gender,race_ethnicity,parental_level_of_education,lunch,test_preparation_course,reading_score,writing_score,math_score"
        )
        .unwrap();
        for i in 0..rows {
            let gender = if i % 2 == 0 { "female" } else { "male" };
            writeln!(
                file,
                "{gender},group A,some college,standard,none,{},{},{}",
                50 + i % 40,
                52 + i % 35,
                55 + i % 30
            )
            .unwrap();
        }
        path
    }

    fn config_for(dir: &std::path::Path, source: PathBuf) -> PipelineConfig {
        PipelineConfig::new(source).with_artifacts_dir(dir.join("artifacts"))
    }

    #[test]
    fn test_split_counts_and_disjointness() {
        let dir = tempdir().unwrap();
        let source = write_source(dir.path(), 100);
        let config = config_for(dir.path(), source);

        let (train_path, test_path) = DataIngestion::new(config).run().unwrap();

        let train = data_loader::load_csv(&train_path).unwrap();
        let test = data_loader::load_csv(&test_path).unwrap();
        assert_eq!(train.height() + test.height(), 100);
        assert_eq!(test.height(), 20);

        // Rows were generated with distinct score triples per index cycle,
        // so count multiset overlap via the raw csv lines instead.
        let train_lines = std::fs::read_to_string(&train_path).unwrap();
        let test_lines = std::fs::read_to_string(&test_path).unwrap();
        let train_set: std::collections::HashSet<&str> =
            train_lines.lines().skip(1).collect();
        for line in test_lines.lines().skip(1) {
            assert!(!train_set.contains(line), "row in both splits: {line}");
        }
    }

    #[test]
    fn test_split_is_seeded() {
        let dir = tempdir().unwrap();
        let source = write_source(dir.path(), 60);

        let config = config_for(dir.path(), source.clone());
        DataIngestion::new(config.clone()).run().unwrap();
        let first = std::fs::read_to_string(&config.train_data_path).unwrap();

        DataIngestion::new(config.clone()).run().unwrap();
        let second = std::fs::read_to_string(&config.train_data_path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_column_is_ingestion_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "gender,lunch").unwrap();
        writeln!(file, "female,standard").unwrap();

        let config = config_for(dir.path(), path);
        let err = DataIngestion::new(config).run().unwrap_err();
        assert!(matches!(err, PipelineError::Ingestion(_)));
    }

    #[test]
    fn test_unreadable_source_is_ingestion_error() {
        let dir = tempdir().unwrap();
        let config = config_for(dir.path(), dir.path().join("absent.csv"));
        let err = DataIngestion::new(config).run().unwrap_err();
        assert!(matches!(err, PipelineError::Ingestion(_)));
    }
}
