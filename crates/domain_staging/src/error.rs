//! Staging domain errors

use core_kernel::{CoreError, MoneyError, PortError};
use domain_ledger::LedgerError;
use thiserror::Error;

/// Errors that can occur while importing or deciding staging records
///
/// Only [`StagingError::StoreUnavailable`] aborts a batch; every other
/// variant is reported against the row or id that caused it.
#[derive(Debug, Error)]
pub enum StagingError {
    /// Malformed or missing input field
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced client or staging record is absent
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Transition attempted on an already-decided record
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The operation conflicts with existing ledger data
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unparseable or overflowing monetary value
    #[error("Arithmetic error: {0}")]
    Arithmetic(#[from] MoneyError),

    /// The store rejected an individual operation
    #[error("Storage error: {0}")]
    Storage(#[source] PortError),

    /// The store could not be reached at all
    #[error("Ledger store unavailable: {0}")]
    StoreUnavailable(String),
}

impl StagingError {
    pub fn validation(message: impl Into<String>) -> Self {
        StagingError::Validation(message.into())
    }

    pub fn not_found(entity: impl Into<String>, id: impl std::fmt::Display) -> Self {
        StagingError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        StagingError::InvalidState(message.into())
    }

    /// Returns true if the error must abort the whole batch
    pub fn is_fatal(&self) -> bool {
        matches!(self, StagingError::StoreUnavailable(_))
    }
}

impl From<PortError> for StagingError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { entity_type, id } => StagingError::NotFound {
                entity: entity_type,
                id,
            },
            PortError::Conflict { message } => StagingError::Conflict(message),
            PortError::Connection { message, .. } => StagingError::StoreUnavailable(message),
            other => StagingError::Storage(other),
        }
    }
}

impl From<CoreError> for StagingError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Money(e) => StagingError::Arithmetic(e),
            CoreError::Validation(msg) => StagingError::Validation(msg),
            CoreError::InvalidStateTransition(msg) => StagingError::InvalidState(msg),
            CoreError::NotFound(msg) => StagingError::NotFound {
                entity: "Entity".to_string(),
                id: msg,
            },
        }
    }
}

impl From<LedgerError> for StagingError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::ClientNotFound(id) => StagingError::not_found("Client", id),
            LedgerError::InvalidClient(e) => e.into(),
            LedgerError::Calculation(e) => StagingError::Arithmetic(e),
            other @ LedgerError::ForeignPosting { .. } => {
                StagingError::Storage(PortError::internal(other.to_string()))
            }
        }
    }
}
