//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Broad classification of a [`DomainError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A reference does not resolve to exactly one entity.
    Integrity,
    /// Following parent references never reaches a root.
    Cycle,
    /// Input could not be interpreted as an entity or tree node.
    Format,
}

/// Domain errors represent structurally invalid input.
///
/// Ids are carried in their `Debug` rendering so the error type stays
/// independent of the entity's id type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("integrity error: entity {id} references missing parent {parent}")]
    DanglingParent { id: String, parent: String },

    #[error("integrity error: duplicate id {0}")]
    DuplicateId(String),

    #[error("cycle detected in hierarchy at entity {0}")]
    CycleDetected(String),

    #[error("invalid record at position {index}: {message}")]
    InvalidRecord { index: usize, message: String },
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::DanglingParent { .. } | DomainError::DuplicateId(_) => {
                ErrorKind::Integrity
            }
            DomainError::CycleDetected(_) => ErrorKind::Cycle,
            DomainError::InvalidRecord { .. } => ErrorKind::Format,
        }
    }

    pub fn is_integrity(&self) -> bool {
        self.kind() == ErrorKind::Integrity
    }

    pub fn is_cycle(&self) -> bool {
        self.kind() == ErrorKind::Cycle
    }

    pub(crate) fn invalid_record(index: usize, message: impl Into<String>) -> Self {
        DomainError::InvalidRecord {
            index,
            message: message.into(),
        }
    }
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;
