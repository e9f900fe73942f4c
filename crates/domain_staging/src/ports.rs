//! Ledger Storage Port
//!
//! `LedgerStore` is everything the staging workflow needs from persistence.
//! Reads and registry maintenance go straight through the store; each
//! approval or rejection runs inside a [`LedgerTransaction`] so that its
//! mutations land together or not at all.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut tx = store.begin().await?;
//! let record = tx.get_staging_record(id).await?;
//! // ...
//! tx.mark_staging_status(id, StagingStatus::Approved, now).await?;
//! tx.commit().await?;
//! ```
//!
//! Dropping a transaction without committing discards its changes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use core_kernel::{Cents, ClientId, DomainPort, HealthCheckable, PortError, StagingId};
use domain_ledger::{Client, Posting, PostingKind, UpsertOutcome};

use crate::account::Account;
use crate::record::{StagingKind, StagingRecord, StagingStatus};

/// Filter for listing postings
#[derive(Debug, Clone, Default)]
pub struct PostingFilter {
    pub client_id: Option<ClientId>,
    pub kind: Option<PostingKind>,
}

impl PostingFilter {
    pub fn for_client(client_id: ClientId) -> Self {
        Self {
            client_id: Some(client_id),
            ..Default::default()
        }
    }

    pub fn matches(&self, posting: &Posting) -> bool {
        self.client_id.map_or(true, |id| posting.client_id == id)
            && self.kind.map_or(true, |kind| posting.kind == kind)
    }
}

/// Filter for listing staging records
#[derive(Debug, Clone, Default)]
pub struct StagingFilter {
    pub kind: Option<StagingKind>,
    pub status: Option<StagingStatus>,
}

impl StagingFilter {
    /// Pending records of one kind
    pub fn pending(kind: StagingKind) -> Self {
        Self {
            kind: Some(kind),
            status: Some(StagingStatus::Pending),
        }
    }

    pub fn matches(&self, record: &StagingRecord) -> bool {
        self.kind.map_or(true, |kind| record.kind == kind)
            && self.status.map_or(true, |status| record.status == status)
    }
}

/// Registry values for clients created during approval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClientDefaults {
    pub credit_limit: Cents,
    pub has_payment_term: bool,
}

/// The storage port for the client ledger
#[async_trait]
pub trait LedgerStore: DomainPort + HealthCheckable {
    // ========================================================================
    // Client registry
    // ========================================================================

    /// Retrieves a client by ID
    ///
    /// # Returns
    ///
    /// The client if found, or `PortError::NotFound`
    async fn get_client(&self, id: ClientId) -> Result<Client, PortError>;

    /// Finds a client by exact (case-insensitive) name
    async fn find_client_by_name(&self, name: &str) -> Result<Option<Client>, PortError>;

    /// Lists all clients ordered by name
    async fn list_clients(&self) -> Result<Vec<Client>, PortError>;

    /// Registers a client
    ///
    /// # Returns
    ///
    /// The stored client, or `PortError::Conflict` if the id is taken
    async fn create_client(&self, client: Client) -> Result<Client, PortError>;

    /// Replaces a client's registry data; the open balance is not touched
    async fn update_client(&self, client: Client) -> Result<Client, PortError>;

    /// Deletes a client
    ///
    /// # Returns
    ///
    /// `PortError::NotFound` if absent, `PortError::Conflict` while postings
    /// reference the client
    async fn delete_client(&self, id: ClientId) -> Result<(), PortError>;

    // ========================================================================
    // Ledger and staging reads
    // ========================================================================

    /// Lists postings matching the filter, oldest first
    async fn list_postings(&self, filter: PostingFilter) -> Result<Vec<Posting>, PortError>;

    /// Stores freshly parsed records
    async fn insert_staging_records(
        &self,
        records: Vec<StagingRecord>,
    ) -> Result<Vec<StagingRecord>, PortError>;

    /// Lists staging records matching the filter, oldest first
    async fn list_staging(&self, filter: StagingFilter) -> Result<Vec<StagingRecord>, PortError>;

    /// Lists the payment account registry
    async fn list_accounts(&self) -> Result<Vec<Account>, PortError>;

    // ========================================================================
    // Transactions
    // ========================================================================

    /// Opens a transaction for one approval or rejection
    ///
    /// A `PortError::Connection` here means the store is unreachable.
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, PortError>;
}

/// A unit of work against the ledger
///
/// Nothing is visible to other readers until [`LedgerTransaction::commit`].
#[async_trait]
pub trait LedgerTransaction: Send {
    /// Reads a client inside the transaction
    async fn get_client(&mut self, id: ClientId) -> Result<Option<Client>, PortError>;

    /// Creates the client if absent, otherwise refreshes its stored name
    ///
    /// Credit limit, payment term and balance of an existing client are kept.
    async fn upsert_client(
        &mut self,
        id: ClientId,
        name: &str,
        defaults: ClientDefaults,
    ) -> Result<UpsertOutcome, PortError>;

    /// Adds a signed delta to the client's cached open balance
    async fn adjust_balance(&mut self, id: ClientId, delta: Cents) -> Result<Client, PortError>;

    /// Writes a posting
    async fn insert_posting(&mut self, posting: &Posting) -> Result<(), PortError>;

    /// Reads a staging record, locking it for the rest of the transaction
    ///
    /// # Returns
    ///
    /// The record, or `PortError::NotFound`
    async fn get_staging_record(&mut self, id: StagingId) -> Result<StagingRecord, PortError>;

    /// Records the decision on a staging record
    async fn mark_staging_status(
        &mut self,
        id: StagingId,
        status: StagingStatus,
        decided_at: DateTime<Utc>,
    ) -> Result<(), PortError>;

    /// Makes every change in this transaction visible
    async fn commit(self: Box<Self>) -> Result<(), PortError>;

    /// Discards every change in this transaction
    async fn rollback(self: Box<Self>) -> Result<(), PortError>;
}
