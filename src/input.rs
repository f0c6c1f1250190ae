use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Reads a JSON document of any shape.
pub fn read_json(path: &Path) -> Result<Value, InputError> {
    read_as(path)
}

/// Reads a JSON document into `T`.
pub fn read_as<T: DeserializeOwned>(path: &Path) -> Result<T, InputError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| InputError::ReadError(path.to_path_buf(), e))?;
    serde_json::from_str(&contents).map_err(|e| InputError::ParseError(path.to_path_buf(), e))
}

#[derive(Debug)]
pub enum InputError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_json::Error),
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputError::ReadError(path, e) => {
                write!(f, "Failed to read '{}': {}", path.display(), e)
            }
            InputError::ParseError(path, e) => {
                write!(f, "Failed to parse '{}' as JSON: {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for InputError {}
