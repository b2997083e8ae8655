//! Error types for stepgrid

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StepgridError {
    #[error("Snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Snapshot payload is not an object")]
    NotAnObject,
}

pub type Result<T> = std::result::Result<T, StepgridError>;
