//! Ledger domain errors

use core_kernel::{ClientId, CoreError, MoneyError};
use thiserror::Error;

/// Errors that can occur in the ledger domain
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Client not found
    #[error("Client not found: {0}")]
    ClientNotFound(ClientId),

    /// A posting was handed to a statement for a different client
    #[error("Posting belongs to client {found}, expected {expected}")]
    ForeignPosting {
        expected: ClientId,
        found: ClientId,
    },

    /// Invalid client data
    #[error(transparent)]
    InvalidClient(#[from] CoreError),

    /// Arithmetic overflow while aggregating
    #[error("Calculation error: {0}")]
    Calculation(#[from] MoneyError),
}
