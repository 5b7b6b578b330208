use crate::schema::NodeKind;
use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Schema violation in {kind}: {reason}")]
    SchemaViolation { kind: NodeKind, reason: String },

    #[error("Position {pos} is outside the document (size {size})")]
    OutOfRange { pos: usize, size: usize },

    #[error("Invalid range {from}..{to}: {reason}")]
    InvalidRange {
        from: usize,
        to: usize,
        reason: String,
    },
}

impl ModelError {
    pub fn schema(kind: NodeKind, reason: impl Into<String>) -> Self {
        Self::SchemaViolation {
            kind,
            reason: reason.into(),
        }
    }

    pub fn out_of_range(pos: usize, size: usize) -> Self {
        Self::OutOfRange { pos, size }
    }

    pub fn invalid_range(from: usize, to: usize, reason: impl Into<String>) -> Self {
        Self::InvalidRange {
            from,
            to,
            reason: reason.into(),
        }
    }
}
