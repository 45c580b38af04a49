//! Missing-value imputation

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Imputation strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Fill numeric nulls with the column median
    Median,
    /// Fill categorical nulls with the most frequent value
    MostFrequent,
}

/// Learned fill value for one column
#[derive(Debug, Clone, Serialize, Deserialize)]
enum FillValue {
    Number(f64),
    Category(String),
}

/// Column imputer. Fit learns one fill value per column from the training
/// data; transform applies those values without relearning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Imputer {
    strategy: ImputeStrategy,
    fill_values: HashMap<String, FillValue>,
    is_fitted: bool,
}

impl Imputer {
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self {
            strategy,
            fill_values: HashMap::new(),
            is_fitted: false,
        }
    }

    /// Learn fill values for `columns` from `df`.
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| PipelineError::ColumnNotFound(col_name.to_string()))?;
            let series = column.as_materialized_series();

            let fill = match self.strategy {
                ImputeStrategy::Median => {
                    let ca = series
                        .cast(&DataType::Float64)
                        .map_err(|e| PipelineError::Data(e.to_string()))?;
                    let median = ca
                        .f64()
                        .map_err(|e| PipelineError::Data(e.to_string()))?
                        .median()
                        .unwrap_or(0.0);
                    FillValue::Number(median)
                }
                ImputeStrategy::MostFrequent => {
                    FillValue::Category(Self::most_frequent(series)?)
                }
            };

            self.fill_values.insert(col_name.to_string(), fill);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Fill nulls in every fitted column of `df`.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PipelineError::NotFitted);
        }

        let mut result = df.clone();
        for (col_name, fill) in &self.fill_values {
            let Ok(column) = df.column(col_name) else {
                continue;
            };
            let series = column.as_materialized_series();

            let filled = match fill {
                FillValue::Number(value) => {
                    let ca = series
                        .cast(&DataType::Float64)
                        .map_err(|e| PipelineError::Data(e.to_string()))?;
                    let filled: Float64Chunked = ca
                        .f64()
                        .map_err(|e| PipelineError::Data(e.to_string()))?
                        .into_iter()
                        .map(|opt| Some(opt.unwrap_or(*value)))
                        .collect();
                    filled.with_name(series.name().clone()).into_series()
                }
                FillValue::Category(value) => {
                    let ca = series
                        .str()
                        .map_err(|e| PipelineError::Data(e.to_string()))?;
                    let filled: StringChunked = ca
                        .into_iter()
                        .map(|opt| Some(opt.unwrap_or(value.as_str())))
                        .collect();
                    filled.with_name(series.name().clone()).into_series()
                }
            };

            result = result
                .with_column(filled)
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

    /// Most frequent non-null value; lexicographically smallest on ties so
    /// the learned fill is deterministic.
    fn most_frequent(series: &Series) -> Result<String> {
        let ca = series
            .str()
            .map_err(|e| PipelineError::Data(e.to_string()))?;

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for value in ca.into_iter().flatten() {
            *counts.entry(value).or_insert(0) += 1;
        }

        counts
            .into_iter()
            .max_by(|(a_val, a_count), (b_val, b_count)| {
                a_count.cmp(b_count).then(b_val.cmp(a_val))
            })
            .map(|(value, _)| value.to_string())
            .ok_or_else(|| {
                PipelineError::Data(format!("column '{}' has no values to impute from", series.name()))
            })
    }
}
