// Preset manager error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PresetError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed container: {0}")]
    Format(String),

    #[error("Legacy pair '{base}' is missing its .{missing} sibling")]
    MissingPair { base: String, missing: &'static str },

    #[error("Preset not found: {0}")]
    NotFound(i64),

    #[error("Export directory unusable: {0}")]
    Directory(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, PresetError>;
