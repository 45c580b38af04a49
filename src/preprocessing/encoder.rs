//! One-hot encoding of categorical columns

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// One-hot encoder over a learned per-column vocabulary.
///
/// Fit collects each column's distinct values and sorts them, so the
/// indicator column order is deterministic across runs. A value unseen at
/// fit time encodes as an all-zero block at transform time; inference
/// input must not be able to crash the encoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotEncoder {
    columns: Vec<String>,
    vocabularies: HashMap<String, Vec<String>>,
    is_fitted: bool,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            vocabularies: HashMap::new(),
            is_fitted: false,
        }
    }

    /// Learn the sorted vocabulary of each column.
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        self.columns = columns.iter().map(|s| s.to_string()).collect();
        self.vocabularies.clear();

        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| PipelineError::ColumnNotFound(col_name.to_string()))?;
            let ca = column
                .as_materialized_series()
                .str()
                .map_err(|e| PipelineError::Data(e.to_string()))?;

            let values: BTreeSet<String> = ca
                .into_iter()
                .flatten()
                .map(|s| s.to_string())
                .collect();

            if values.is_empty() {
                return Err(PipelineError::Data(format!(
                    "column '{col_name}' has no categories to encode"
                )));
            }

            self.vocabularies
                .insert(col_name.to_string(), values.into_iter().collect());
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Replace each fitted column with its indicator columns.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PipelineError::NotFitted);
        }

        let mut encoded: Vec<Column> = Vec::new();
        for col_name in &self.columns {
            let column = df
                .column(col_name)
                .map_err(|_| PipelineError::ColumnNotFound(col_name.clone()))?;
            let ca = column
                .as_materialized_series()
                .str()
                .map_err(|e| PipelineError::Data(e.to_string()))?;

            let vocabulary = &self.vocabularies[col_name];
            for value in vocabulary {
                let indicator: Vec<f64> = ca
                    .into_iter()
                    .map(|opt| match opt {
                        Some(v) if v == value => 1.0,
                        _ => 0.0,
                    })
                    .collect();
                encoded.push(Column::new(
                    Self::indicator_name(col_name, value).into(),
                    indicator,
                ));
            }
        }

        DataFrame::new(encoded).map_err(|e| PipelineError::Data(e.to_string()))
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// Output column names, in the deterministic encoding order.
    pub fn feature_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .flat_map(|col| {
                self.vocabularies[col]
                    .iter()
                    .map(move |value| Self::indicator_name(col, value))
            })
            .collect()
    }

    fn indicator_name(column: &str, value: &str) -> String {
        format!("{column}={value}")
    }
}

impl Default for OneHotEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city_frame(values: &[&str]) -> DataFrame {
        DataFrame::new(vec![Column::new("city".into(), values)]).unwrap()
    }

    #[test]
    fn test_vocabulary_is_sorted() {
        let df = city_frame(&["NYC", "LA", "NYC", "SF"]);
        let mut encoder = OneHotEncoder::new();
        encoder.fit(&df, &["city"]).unwrap();

        assert_eq!(
            encoder.feature_names(),
            vec!["city=LA", "city=NYC", "city=SF"]
        );
    }

    #[test]
    fn test_transform_one_hot() {
        let df = city_frame(&["NYC", "LA"]);
        let mut encoder = OneHotEncoder::new();
        let encoded = encoder.fit_transform(&df, &["city"]).unwrap();

        assert_eq!(encoded.width(), 2);
        let nyc = encoded.column("city=NYC").unwrap().f64().unwrap();
        assert_eq!(nyc.get(0).unwrap(), 1.0);
        assert_eq!(nyc.get(1).unwrap(), 0.0);
    }

    #[test]
    fn test_unseen_category_encodes_as_zero_row() {
        let train = city_frame(&["NYC", "LA"]);
        let mut encoder = OneHotEncoder::new();
        encoder.fit(&train, &["city"]).unwrap();

        let unseen = city_frame(&["Tokyo"]);
        let encoded = encoder.transform(&unseen).unwrap();

        for name in encoder.feature_names() {
            let col = encoded.column(&name).unwrap().f64().unwrap();
            assert_eq!(col.get(0).unwrap(), 0.0, "{name} should be zero");
        }
    }

    #[test]
    fn test_transform_before_fit_fails() {
        let df = city_frame(&["NYC"]);
        let encoder = OneHotEncoder::new();
        assert!(matches!(
            encoder.transform(&df).unwrap_err(),
            PipelineError::NotFitted
        ));
    }

    #[test]
    fn test_missing_column_fails() {
        let train = city_frame(&["NYC"]);
        let mut encoder = OneHotEncoder::new();
        encoder.fit(&train, &["city"]).unwrap();

        let other = DataFrame::new(vec![Column::new("town".into(), &["NYC"])]).unwrap();
        assert!(matches!(
            encoder.transform(&other).unwrap_err(),
            PipelineError::ColumnNotFound(_)
        ));
    }
}
