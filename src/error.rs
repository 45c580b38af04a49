//! Error types for the scorecast pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Main error type for the pipeline.
///
/// Each stage converts the library errors it encounters into one of these
/// kinds at its boundary, keeping the underlying message as context.
/// Domain errors (`NotFitted`, `ArtifactNotFound`, `NoAcceptableModel`)
/// pass through stage boundaries unwrapped so callers can branch on kind.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("ingestion error: {0}")]
    Ingestion(String),

    #[error("data error: {0}")]
    Data(String),

    #[error("transform used before fit")]
    NotFitted,

    #[error("artifact not found or unreadable at {path}: {reason}")]
    ArtifactNotFound { path: String, reason: String },

    #[error("no model reached the quality floor {floor}: best test r2 = {best_score:.4}")]
    NoAcceptableModel { best_score: f64, floor: f64 },

    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("invalid shape: expected {expected}, got {actual}")]
    Shape { expected: String, actual: String },

    #[error("training error: {0}")]
    Training(String),

    #[error("computation error: {0}")]
    Computation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("{stage} stage failed: {message}")]
    Stage { stage: &'static str, message: String },
}

impl PipelineError {
    /// Wrap an arbitrary error with the stage it originated from.
    pub fn stage(stage: &'static str, err: impl std::fmt::Display) -> Self {
        PipelineError::Stage {
            stage,
            message: err.to_string(),
        }
    }
}

impl From<polars::error::PolarsError> for PipelineError {
    fn from(err: polars::error::PolarsError) -> Self {
        PipelineError::Data(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}

impl From<ndarray::ShapeError> for PipelineError {
    fn from(err: ndarray::ShapeError) -> Self {
        PipelineError::Shape {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::Ingestion("bad source".to_string());
        assert_eq!(err.to_string(), "ingestion error: bad source");
    }

    #[test]
    fn test_no_acceptable_model_display() {
        let err = PipelineError::NoAcceptableModel {
            best_score: 0.31415,
            floor: 0.6,
        };
        assert!(err.to_string().contains("0.3142"));
        assert!(err.to_string().contains("0.6"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PipelineError = io_err.into();
        assert!(matches!(err, PipelineError::Io(_)));
    }

    #[test]
    fn test_stage_wrapping() {
        let err = PipelineError::stage("transformation", "ran out of columns");
        assert_eq!(
            err.to_string(),
            "transformation stage failed: ran out of columns"
        );
    }
}
