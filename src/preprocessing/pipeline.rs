//! Column-wise preprocessing pipeline
//!
//! Two parallel branches over a fixed column split:
//!
//! - numeric: median impute, then standardize (center + scale);
//! - categorical: most-frequent impute, one-hot encode, then scale
//!   WITHOUT centering.
//!
//! Fit learns every parameter from the training partition only. Transform
//! applies learned parameters and never refits, so test and inference data
//! see exactly the statistics the model was trained against.

use crate::error::{PipelineError, Result};
use super::encoder::OneHotEncoder;
use super::imputer::{ImputeStrategy, Imputer};
use super::scaler::Scaler;
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Stateful preprocessor over a declared numeric/categorical column split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnPreprocessor {
    numeric_columns: Vec<String>,
    categorical_columns: Vec<String>,
    numeric_imputer: Option<Imputer>,
    categorical_imputer: Option<Imputer>,
    numeric_scaler: Option<Scaler>,
    encoder: Option<OneHotEncoder>,
    encoded_scaler: Option<Scaler>,
    is_fitted: bool,
}

impl ColumnPreprocessor {
    /// Build an unfit preprocessor over the given column split.
    pub fn new(
        numeric_columns: impl IntoIterator<Item = impl Into<String>>,
        categorical_columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            numeric_columns: numeric_columns.into_iter().map(Into::into).collect(),
            categorical_columns: categorical_columns.into_iter().map(Into::into).collect(),
            numeric_imputer: None,
            categorical_imputer: None,
            numeric_scaler: None,
            encoder: None,
            encoded_scaler: None,
            is_fitted: false,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Fit both branches on `df` (features only, no target column).
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        // Numeric branch
        let numeric = self.numeric_frame(df)?;
        let numeric_cols = Self::as_str_refs(&self.numeric_columns);

        let mut numeric_imputer = Imputer::new(ImputeStrategy::Median);
        let imputed = numeric_imputer.fit_transform(&numeric, &numeric_cols)?;

        let mut numeric_scaler = Scaler::standard();
        numeric_scaler.fit(&imputed, &numeric_cols)?;

        // Categorical branch
        let categorical = self.categorical_frame(df)?;
        let categorical_cols = Self::as_str_refs(&self.categorical_columns);

        let mut categorical_imputer = Imputer::new(ImputeStrategy::MostFrequent);
        let imputed = categorical_imputer.fit_transform(&categorical, &categorical_cols)?;

        let mut encoder = OneHotEncoder::new();
        let encoded = encoder.fit_transform(&imputed, &categorical_cols)?;

        let encoded_names = encoder.feature_names();
        let encoded_refs = Self::as_str_refs(&encoded_names);
        let mut encoded_scaler = Scaler::standard_no_center();
        encoded_scaler.fit(&encoded, &encoded_refs)?;

        self.numeric_imputer = Some(numeric_imputer);
        self.categorical_imputer = Some(categorical_imputer);
        self.numeric_scaler = Some(numeric_scaler);
        self.encoder = Some(encoder);
        self.encoded_scaler = Some(encoded_scaler);
        self.is_fitted = true;
        Ok(self)
    }

    /// Transform `df` with the learned parameters. Fails with `NotFitted`
    /// before [`fit`](Self::fit).
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(PipelineError::NotFitted);
        }

        let numeric = self.numeric_frame(df)?;
        let numeric = self.numeric_imputer.as_ref().unwrap().transform(&numeric)?;
        let numeric = self.numeric_scaler.as_ref().unwrap().transform(&numeric)?;

        let categorical = self.categorical_frame(df)?;
        let categorical = self
            .categorical_imputer
            .as_ref()
            .unwrap()
            .transform(&categorical)?;
        let encoder = self.encoder.as_ref().unwrap();
        let encoded = encoder.transform(&categorical)?;
        let encoded = self.encoded_scaler.as_ref().unwrap().transform(&encoded)?;

        // Assemble the matrix: numeric columns first, then the one-hot
        // block, both in declared order.
        let mut columns: Vec<Vec<f64>> = Vec::new();
        for name in &self.numeric_columns {
            columns.push(Self::column_values(&numeric, name)?);
        }
        for name in encoder.feature_names() {
            columns.push(Self::column_values(&encoded, &name)?);
        }

        let n_rows = df.height();
        let n_cols = columns.len();
        Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| {
            columns[c][r]
        }))
    }

    /// Fit on `df`, then transform it.
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<Array2<f64>> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Output column names in matrix order. Empty before fit.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = self.numeric_columns.clone();
        if let Some(encoder) = &self.encoder {
            names.extend(encoder.feature_names());
        }
        names
    }

    /// Persist the fitted preprocessor.
    pub fn save(&self, path: &Path) -> Result<()> {
        crate::artifact::save(path, self)
    }

    /// Load a previously persisted preprocessor.
    pub fn load(path: &Path) -> Result<Self> {
        crate::artifact::load(path)
    }

    /// Select the numeric columns, cast to f64. Missing columns fail
    /// with `ColumnNotFound`; the schema match is exact by design.
    fn numeric_frame(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(self.numeric_columns.len());
        for name in &self.numeric_columns {
            let column = df
                .column(name)
                .map_err(|_| PipelineError::ColumnNotFound(name.clone()))?;
            let casted = column
                .as_materialized_series()
                .cast(&DataType::Float64)
                .map_err(|e| PipelineError::Data(e.to_string()))?;
            columns.push(casted.into_column());
        }
        DataFrame::new(columns).map_err(|e| PipelineError::Data(e.to_string()))
    }

    fn categorical_frame(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(self.categorical_columns.len());
        for name in &self.categorical_columns {
            let column = df
                .column(name)
                .map_err(|_| PipelineError::ColumnNotFound(name.clone()))?;
            columns.push(column.as_materialized_series().clone().into_column());
        }
        DataFrame::new(columns).map_err(|e| PipelineError::Data(e.to_string()))
    }

    fn column_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
        let ca = df
            .column(name)
            .map_err(|_| PipelineError::ColumnNotFound(name.to_string()))?
            .as_materialized_series()
            .f64()
            .map_err(|e| PipelineError::Data(e.to_string()))?
            .clone();
        Ok(ca.into_iter().map(|v| v.unwrap_or(0.0)).collect())
    }

    fn as_str_refs(names: &[String]) -> Vec<&str> {
        names.iter().map(|s| s.as_str()).collect()
    }
}
