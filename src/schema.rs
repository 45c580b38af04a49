//! Dataset schema and the inference-time record type
//!
//! The pipeline is built around one fixed tabular schema: five categorical
//! attributes, two numeric scores, and the numeric target. The column
//! transformer maps columns by name, so names and order here must match
//! the training data exactly.

use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Target column, present only in training/evaluation data
pub const TARGET_COLUMN: &str = "math_score";

/// Numeric feature columns, in pipeline order
pub const NUMERIC_COLUMNS: [&str; 2] = ["writing_score", "reading_score"];

/// Categorical feature columns, in pipeline order
pub const CATEGORICAL_COLUMNS: [&str; 5] = [
    "gender",
    "race_ethnicity",
    "parental_level_of_education",
    "lunch",
    "test_preparation_course",
];

/// All columns a source dataset must carry.
pub fn dataset_columns() -> Vec<&'static str> {
    let mut cols: Vec<&'static str> = CATEGORICAL_COLUMNS.to_vec();
    cols.extend(NUMERIC_COLUMNS);
    cols.push(TARGET_COLUMN);
    cols
}

/// A single inference request: the feature columns of the schema, no target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentRecord {
    pub gender: String,
    pub race_ethnicity: String,
    pub parental_level_of_education: String,
    pub lunch: String,
    pub test_preparation_course: String,
    pub reading_score: f64,
    pub writing_score: f64,
}

impl StudentRecord {
    /// Build a single-row DataFrame with the training schema's feature
    /// columns, exact names and order. The preprocessor selects columns
    /// by name, so a mismatch here would mis-map features.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let df = df!(
            "gender" => &[self.gender.as_str()],
            "race_ethnicity" => &[self.race_ethnicity.as_str()],
            "parental_level_of_education" => &[self.parental_level_of_education.as_str()],
            "lunch" => &[self.lunch.as_str()],
            "test_preparation_course" => &[self.test_preparation_course.as_str()],
            "reading_score" => &[self.reading_score],
            "writing_score" => &[self.writing_score],
        )?;
        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> StudentRecord {
        StudentRecord {
            gender: "female".to_string(),
            race_ethnicity: "group B".to_string(),
            parental_level_of_education: "bachelor's degree".to_string(),
            lunch: "standard".to_string(),
            test_preparation_course: "none".to_string(),
            reading_score: 72.0,
            writing_score: 74.0,
        }
    }

    #[test]
    fn test_record_to_dataframe() {
        let df = sample_record().to_dataframe().unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(df.width(), 7);

        // Every feature column of the schema is present, target is not
        for &col in CATEGORICAL_COLUMNS.iter().chain(NUMERIC_COLUMNS.iter()) {
            assert!(df.column(col).is_ok(), "missing column {col}");
        }
        assert!(df.column(TARGET_COLUMN).is_err());
    }

    #[test]
    fn test_dataset_columns_cover_schema() {
        let cols = dataset_columns();
        assert_eq!(cols.len(), 8);
        assert_eq!(cols.last(), Some(&TARGET_COLUMN));
    }
}
