//! Model file loading.

use std::path::Path;

use crate::{ModelDescription, ModelError};

/// Reads and parses a model description from a JSON file.
pub fn load_model(path: impl AsRef<Path>) -> Result<ModelDescription, ModelError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| ModelError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ModelError::ParseError {
        path: path.to_path_buf(),
        source,
    })
}

// ============================================================================
// Tests
// ============================================================================
