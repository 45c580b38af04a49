//! Data preprocessing module
//!
//! Provides the column-wise preprocessing pipeline applied before training
//! and inference:
//! - Missing value imputation (median / most frequent)
//! - One-hot encoding over learned vocabularies
//! - Standardization (with and without centering)

mod encoder;
mod imputer;
mod pipeline;
mod scaler;

pub use encoder::OneHotEncoder;
pub use imputer::{ImputeStrategy, Imputer};
pub use pipeline::ColumnPreprocessor;
pub use scaler::Scaler;
