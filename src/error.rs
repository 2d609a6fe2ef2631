use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Produced by the slot decoder. `ReportStore::load` recovers from it.
    #[error("Storage corruption: {0}")]
    StorageCorruption(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Image error ({}): {reason}", .path.display())]
    Image { path: PathBuf, reason: String },

    #[error("Cancelled by user")]
    Cancelled,
}

impl ReportError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ReportError::Validation(msg.into())
    }

    pub fn not_found(id: &str) -> Self {
        ReportError::NotFound(format!("report {}", id))
    }

    pub fn image(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ReportError::Image {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Errors the user can fix by changing the input.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ReportError::Validation(_) | ReportError::NotFound(_) | ReportError::Image { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
