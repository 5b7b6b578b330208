//! Error types for the editor

use quire_model::ModelError;
use thiserror::Error;

pub type EditorResult<T> = Result<T, EditorError>;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    MeasurementUnavailable(#[from] MeasurementUnavailable),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Transaction was built against version {built}, current version is {current}")]
    StaleTransaction { built: u64, current: u64 },

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The layout oracle could not report a height, e.g. for a detached page.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Measurement unavailable for page {page}: {reason}")]
pub struct MeasurementUnavailable {
    pub page: usize,
    pub reason: String,
}

impl MeasurementUnavailable {
    pub fn new(page: usize, reason: impl Into<String>) -> Self {
        Self {
            page,
            reason: reason.into(),
        }
    }
}
