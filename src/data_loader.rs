//! CSV loading and saving helpers

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Load a headered CSV into a DataFrame.
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .map_err(|e| PipelineError::Data(format!("cannot open {}: {e}", path.display())))?;

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(|e| PipelineError::Data(format!("cannot parse {}: {e}", path.display())))
}

/// Save a DataFrame as a headered CSV, creating parent directories.
pub fn save_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)
        .map_err(|e| PipelineError::Data(format!("cannot create {}: {e}", path.display())))?;

    CsvWriter::new(&mut file)
        .finish(df)
        .map_err(|e| PipelineError::Data(format!("cannot write {}: {e}", path.display())))
}
