//! scorecast - exam score regression pipeline
//!
//! An end-to-end machine-learning pipeline over the student performance
//! dataset:
//!
//! - [`ingestion`] - dataset loading and the seeded train/test split
//! - [`preprocessing`] - imputation, one-hot encoding, scaling
//! - [`transformation`] - fitting the preprocessor and producing matrices
//! - [`training`] - native regression models, grid search, model selection
//! - [`pipeline`] - the train and predict entry points
//! - [`server`] - the minimal prediction web form
//!
//! The offline path (`TrainPipeline`) runs ingestion, transformation, and
//! training to completion and persists the winning model plus the fitted
//! preprocessor. The online path (`PredictPipeline`) loads those artifacts
//! read-only and serves single-row predictions.

pub mod artifact;
pub mod cli;
pub mod config;
pub mod data_loader;
pub mod error;
pub mod ingestion;
pub mod pipeline;
pub mod preprocessing;
pub mod schema;
pub mod server;
pub mod training;
pub mod transformation;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use pipeline::{PredictPipeline, TrainPipeline};
pub use schema::StudentRecord;
