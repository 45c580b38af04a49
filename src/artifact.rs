//! Artifact persistence
//!
//! Fitted models and preprocessors are serialized as pretty JSON blobs at
//! configured paths. Blobs are opaque to callers; the only contract is that
//! save-then-load within one build reproduces behavior exactly.

use crate::error::{PipelineError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Persist a serializable value at `path`, creating parent directories.
pub fn save<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Load a value persisted by [`save`]. A missing or corrupt blob fails
/// with `ArtifactNotFound` carrying the path and the underlying reason.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = std::fs::read_to_string(path).map_err(|e| PipelineError::ArtifactNotFound {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    serde_json::from_str(&json).map_err(|e| PipelineError::ArtifactNotFound {
        path: path.display().to_string(),
        reason: format!("corrupt artifact: {e}"),
    })
}
