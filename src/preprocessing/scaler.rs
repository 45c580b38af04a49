//! Feature standardization

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Learned parameters for one column
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScalerParams {
    mean: f64,
    std: f64,
}

/// Standard scaler: `(x - mean) / std`, or `x / std` when centering is
/// disabled. The categorical branch scales its one-hot block without
/// centering; centering would turn the sparse indicator columns dense.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    with_mean: bool,
    params: HashMap<String, ScalerParams>,
    is_fitted: bool,
}

impl Scaler {
    /// Standardize with centering (zero mean, unit variance).
    pub fn standard() -> Self {
        Self {
            with_mean: true,
            params: HashMap::new(),
            is_fitted: false,
        }
    }

    /// Scale to unit variance without centering.
    pub fn standard_no_center() -> Self {
        Self {
            with_mean: false,
            params: HashMap::new(),
            is_fitted: false,
        }
    }

    /// Learn per-column mean and std from `df`.
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| PipelineError::ColumnNotFound(col_name.to_string()))?;
            let ca = column
                .as_materialized_series()
                .f64()
                .map_err(|e| PipelineError::Data(e.to_string()))?
                .clone();

            let mean = ca.mean().unwrap_or(0.0);
            let std = ca.std(1).unwrap_or(1.0);
            self.params.insert(
                col_name.to_string(),
                ScalerParams {
                    mean,
                    // Constant columns scale by 1.0 instead of dividing by zero
                    std: if std == 0.0 { 1.0 } else { std },
                },
            );
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Apply the learned parameters to every fitted column present in `df`.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PipelineError::NotFitted);
        }

        let replacements: Vec<Series> = self
            .params
            .iter()
            .filter_map(|(col_name, params)| {
                df.column(col_name).ok().map(|column| {
                    let series = column.as_materialized_series();
                    self.scale_series(series, params)
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut result = df.clone();
        for scaled in replacements {
            result = result
                .with_column(scaled)
                .map_err(|e| PipelineError::Data(e.to_string()))?
                .clone();
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    fn scale_series(&self, series: &Series, params: &ScalerParams) -> Result<Series> {
        let ca = series
            .f64()
            .map_err(|e| PipelineError::Data(e.to_string()))?;

        let center = if self.with_mean { params.mean } else { 0.0 };
        let scaled: Float64Chunked = ca
            .into_iter()
            .map(|opt| opt.map(|v| (v - center) / params.std))
            .collect();

        Ok(scaled.with_name(series.name().clone()).into_series())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(values: &[f64]) -> DataFrame {
        DataFrame::new(vec![Column::new("a".into(), values)]).unwrap()
    }

    #[test]
    fn test_standard_scaler_centers() {
        let df = frame(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let mut scaler = Scaler::standard();
        let result = scaler.fit_transform(&df, &["a"]).unwrap();

        let col = result.column("a").unwrap().f64().unwrap();
        assert!(col.mean().unwrap().abs() < 1e-10);
    }

    #[test]
    fn test_no_center_preserves_zeros() {
        let df = frame(&[0.0, 0.0, 1.0, 1.0]);
        let mut scaler = Scaler::standard_no_center();
        let result = scaler.fit_transform(&df, &["a"]).unwrap();

        let col = result.column("a").unwrap().f64().unwrap();
        // Zeros stay exactly zero when centering is off
        assert_eq!(col.get(0).unwrap(), 0.0);
        assert!(col.get(2).unwrap() > 0.0);
    }

    #[test]
    fn test_constant_column_scales_by_one() {
        let df = frame(&[7.0, 7.0, 7.0]);
        let mut scaler = Scaler::standard_no_center();
        let result = scaler.fit_transform(&df, &["a"]).unwrap();

        let col = result.column("a").unwrap().f64().unwrap();
        assert!((col.get(0).unwrap() - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_transform_before_fit_fails() {
        let df = frame(&[1.0]);
        let scaler = Scaler::standard();
        assert!(matches!(
            scaler.transform(&df).unwrap_err(),
            PipelineError::NotFitted
        ));
    }

    #[test]
    fn test_transform_uses_fit_statistics() {
        let fit_df = frame(&[0.0, 10.0]);
        let other = frame(&[5.0]);

        let mut scaler = Scaler::standard();
        scaler.fit(&fit_df, &["a"]).unwrap();
        let result = scaler.transform(&other).unwrap();

        // 5.0 is the fit mean, so it maps to zero
        let col = result.column("a").unwrap().f64().unwrap();
        assert!(col.get(0).unwrap().abs() < 1e-12);
    }
}
