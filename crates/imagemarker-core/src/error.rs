//! Error types for editor operations.

use thiserror::Error;

/// Contract faults raised by the editor.
///
/// These indicate a host/integration bug (bad shape name, duplicate key, ...)
/// and are returned to the immediate caller. Racing gestures are not errors
/// and never show up here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    #[error("Invalid shape: {0:?}")]
    InvalidShape(String),
    #[error("Mark key already exists: {0}")]
    DuplicateKey(String),
    #[error("Unknown mark key: {0}")]
    UnknownKey(String),
    #[error("Invalid zoom level: {0} (must be a positive number)")]
    InvalidScale(f64),
    #[error("Mark of shape {shape} requires field {field:?}")]
    MissingField {
        shape: &'static str,
        field: &'static str,
    },
    #[error("Failed to load image {source_path}: {reason}")]
    ImageLoad { source_path: String, reason: String },
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;
