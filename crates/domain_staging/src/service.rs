//! Ledger service
//!
//! `LedgerService` is the application-facing entry point. It owns no state
//! of its own: every call goes through the injected [`LedgerStore`].
//!
//! # Batch semantics
//!
//! `approve_batch` and `reject_batch` decide each id in its own store
//! transaction. A failing id is rolled back and reported; the batch carries
//! on with the next id. Only an unreachable store aborts the batch, and ids
//! decided before that point stay decided.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use core_kernel::{Cents, ClientId, HealthCheckResult, PortError, PostingId, StagingId};
use domain_ledger::{due_date, Client, ClientUpdate, NewClient, Posting, Statement};

use crate::account::Account;
use crate::error::StagingError;
use crate::import::{
    parse_invoice_row, parse_payment_text, ClientRef, InvoiceRow, UNKNOWN_CLIENT_NAME,
};
use crate::ports::{ClientDefaults, LedgerStore, LedgerTransaction, PostingFilter, StagingFilter};
use crate::record::{NewStagingRecord, StagingKind, StagingRecord};

/// How approvals treat clients that are not registered yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalPolicy {
    /// Register unknown clients on first approval
    pub auto_create_clients: bool,
    /// Payment term flag given to auto-created clients
    pub default_has_payment_term: bool,
    /// Credit limit given to auto-created clients
    pub default_credit_limit: Cents,
}

impl Default for ApprovalPolicy {
    fn default() -> Self {
        Self {
            auto_create_clients: true,
            default_has_payment_term: false,
            default_credit_limit: Cents::ZERO,
        }
    }
}

impl ApprovalPolicy {
    fn client_defaults(&self) -> ClientDefaults {
        ClientDefaults {
            credit_limit: self.default_credit_limit,
            has_payment_term: self.default_has_payment_term,
        }
    }
}

/// What happened to one staging id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Approved {
        posting_id: PostingId,
        client_id: ClientId,
        client_created: bool,
        due_date: Option<NaiveDate>,
    },
    Rejected,
}

/// Result for one id in a batch
#[derive(Debug)]
pub struct BatchItem {
    pub id: StagingId,
    pub result: Result<Decision, StagingError>,
}

/// Outcome of an approve or reject batch
#[derive(Debug, Default)]
pub struct BatchReport {
    pub successes: usize,
    pub errors: usize,
    pub items: Vec<BatchItem>,
}

impl BatchReport {
    fn record(&mut self, id: StagingId, result: Result<Decision, StagingError>) {
        match &result {
            Ok(_) => self.successes += 1,
            Err(err) => {
                debug!(staging_id = %id, error = %err, "Staging record not decided");
                self.errors += 1;
            }
        }
        self.items.push(BatchItem { id, result });
    }
}

/// A row or line that could not be staged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestError {
    /// 1-based row or line number
    pub line: usize,
    pub reason: String,
}

/// Outcome of an import
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestReport {
    pub staged: Vec<StagingRecord>,
    pub errors: Vec<IngestError>,
}

impl IngestReport {
    fn reject(&mut self, line: usize, err: StagingError) {
        debug!(line, error = %err, "Import line refused");
        self.errors.push(IngestError {
            line,
            reason: err.to_string(),
        });
    }
}

/// Application service for the client ledger
#[derive(Clone)]
pub struct LedgerService {
    store: Arc<dyn LedgerStore>,
    policy: ApprovalPolicy,
}

impl LedgerService {
    /// Creates a service over a store
    pub fn new(store: Arc<dyn LedgerStore>, policy: ApprovalPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &ApprovalPolicy {
        &self.policy
    }

    /// Checks the underlying store
    pub async fn health(&self) -> HealthCheckResult {
        self.store.health_check().await
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// Builds a client's statement from its approved postings
    ///
    /// # Errors
    ///
    /// `StagingError::NotFound` if the client does not exist
    #[instrument(skip(self), fields(client_id = %client_id))]
    pub async fn compute_statement(&self, client_id: ClientId) -> Result<Statement, StagingError> {
        let client = self.store.get_client(client_id).await?;
        let postings = self
            .store
            .list_postings(PostingFilter::for_client(client_id))
            .await?;

        let statement = Statement::assemble(client, postings)?;
        if let Some(drift) = statement.cached_balance_drift() {
            warn!(
                client_id = %client_id,
                cached = %statement.client.open_balance,
                recomputed = %statement.open_balance,
                drift = %drift,
                "Cached open balance differs from posted ledger"
            );
        }
        Ok(statement)
    }

    // ========================================================================
    // Approval workflow
    // ========================================================================

    /// Approves each pending record, one transaction per id
    ///
    /// # Arguments
    ///
    /// * `ids` - Staging records to approve, processed in order
    ///
    /// # Errors
    ///
    /// `StagingError::StoreUnavailable` if a transaction cannot be opened;
    /// all other failures are reported per id in the [`BatchReport`]
    pub async fn approve_batch(&self, ids: &[StagingId]) -> Result<BatchReport, StagingError> {
        self.approve_records(None, ids).await
    }

    /// Approves records of one kind; an id of the other kind is reported
    /// as a validation error and left pending
    pub async fn approve_batch_of(
        &self,
        kind: StagingKind,
        ids: &[StagingId],
    ) -> Result<BatchReport, StagingError> {
        self.approve_records(Some(kind), ids).await
    }

    /// Rejects each pending record, one transaction per id
    ///
    /// Rejection touches neither clients nor postings.
    ///
    /// # Errors
    ///
    /// `StagingError::StoreUnavailable` if a transaction cannot be opened
    pub async fn reject_batch(&self, ids: &[StagingId]) -> Result<BatchReport, StagingError> {
        self.reject_records(None, ids).await
    }

    /// Rejects records of one kind; an id of the other kind is reported
    /// as a validation error and left pending
    pub async fn reject_batch_of(
        &self,
        kind: StagingKind,
        ids: &[StagingId],
    ) -> Result<BatchReport, StagingError> {
        self.reject_records(Some(kind), ids).await
    }

    #[instrument(skip(self, ids), fields(count = ids.len(), kind = ?kind))]
    async fn approve_records(
        &self,
        kind: Option<StagingKind>,
        ids: &[StagingId],
    ) -> Result<BatchReport, StagingError> {
        let mut report = BatchReport::default();
        for &id in ids {
            let mut tx = match self.begin(id).await {
                Ok(tx) => tx,
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    report.record(id, Err(err));
                    continue;
                }
            };
            let result = self.apply_approval(tx.as_mut(), id, kind).await;
            report.record(id, finish(tx, result).await);
        }
        info!(
            approved = report.successes,
            failed = report.errors,
            "Approval batch finished"
        );
        Ok(report)
    }

    #[instrument(skip(self, ids), fields(count = ids.len(), kind = ?kind))]
    async fn reject_records(
        &self,
        kind: Option<StagingKind>,
        ids: &[StagingId],
    ) -> Result<BatchReport, StagingError> {
        let mut report = BatchReport::default();
        for &id in ids {
            let mut tx = match self.begin(id).await {
                Ok(tx) => tx,
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    report.record(id, Err(err));
                    continue;
                }
            };
            let result = apply_rejection(tx.as_mut(), id, kind).await;
            report.record(id, finish(tx, result).await);
        }
        info!(
            rejected = report.successes,
            failed = report.errors,
            "Rejection batch finished"
        );
        Ok(report)
    }

    async fn begin(&self, id: StagingId) -> Result<Box<dyn LedgerTransaction>, StagingError> {
        self.store.begin().await.map_err(|err| {
            if err.is_unavailable() {
                error!(staging_id = %id, error = %err, "Ledger store unavailable, aborting batch");
            }
            StagingError::from(err)
        })
    }

    async fn apply_approval(
        &self,
        tx: &mut dyn LedgerTransaction,
        id: StagingId,
        kind: Option<StagingKind>,
    ) -> Result<Decision, StagingError> {
        let now = Utc::now();
        let mut record = tx.get_staging_record(id).await?;
        ensure_kind(&record, kind)?;
        record.approve(now)?;

        if !self.policy.auto_create_clients && tx.get_client(record.client_id).await?.is_none() {
            return Err(StagingError::not_found("Client", record.client_id));
        }
        let defaults = self.policy.client_defaults();
        let outcome = tx
            .upsert_client(record.client_id, &record.client_name, defaults)
            .await?;
        let client_created = outcome.was_created();
        if client_created {
            info!(client_id = %record.client_id, name = %record.client_name, "Client registered on approval");
        }
        let client = outcome.into_client();

        let due = match record.kind {
            StagingKind::Invoice => due_date(record.occurred_on, client.has_payment_term),
            StagingKind::Payment => None,
        };
        let posting = record.to_posting(due, now);

        tx.insert_posting(&posting).await?;
        tx.adjust_balance(client.id, posting.signed_amount()).await?;
        tx.mark_staging_status(id, record.status, now).await?;

        Ok(Decision::Approved {
            posting_id: posting.id,
            client_id: client.id,
            client_created,
            due_date: due,
        })
    }

    // ========================================================================
    // Ingestion
    // ========================================================================

    /// Stages invoice rows as pending records
    ///
    /// Rows naming a client only by name must match a registered client.
    /// Rows naming an unknown id are staged under the row's name unless
    /// client auto-creation is disabled.
    ///
    /// # Errors
    ///
    /// A store failure while looking up clients or saving the records
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub async fn ingest_invoice_rows(
        &self,
        rows: &[InvoiceRow],
    ) -> Result<IngestReport, StagingError> {
        let now = Utc::now();
        let mut report = IngestReport::default();
        let mut records = Vec::new();

        for (idx, row) in rows.iter().enumerate() {
            let line = idx + 1;
            let candidate = match parse_invoice_row(row) {
                Ok(candidate) => candidate,
                Err(err) => {
                    report.reject(line, err);
                    continue;
                }
            };

            let resolved = match &candidate.client {
                ClientRef::Id { id, name } => self
                    .lookup_client(*id)
                    .await?
                    .map(|client| (client.id, client.name))
                    .or_else(|| self.unregistered(*id, name.as_deref())),
                ClientRef::Name(name) => self
                    .store
                    .find_client_by_name(name)
                    .await?
                    .map(|client| (client.id, client.name)),
            };
            let Some((client_id, client_name)) = resolved else {
                report.reject(line, unknown_client(&candidate.client));
                continue;
            };

            records.push(
                NewStagingRecord {
                    kind: StagingKind::Invoice,
                    client_id,
                    client_name,
                    amount: candidate.amount,
                    reference: Some(candidate.reference.clone()),
                    account_code: None,
                    description: candidate.reference,
                    occurred_on: candidate.issued_on,
                }
                .into_record(now),
            );
        }

        report.staged = self.store.insert_staging_records(records).await?;
        info!(
            staged = report.staged.len(),
            refused = report.errors.len(),
            "Invoice rows imported"
        );
        Ok(report)
    }

    /// Stages pasted payment text as pending records
    ///
    /// The registry name replaces the name derived from the bank description
    /// when the client is already registered.
    ///
    /// # Errors
    ///
    /// A store failure while looking up clients or saving the records
    #[instrument(skip(self, text))]
    pub async fn ingest_payment_text(&self, text: &str) -> Result<IngestReport, StagingError> {
        let now = Utc::now();
        let mut report = IngestReport::default();
        let mut records = Vec::new();

        for (line, parsed) in parse_payment_text(text) {
            let candidate = match parsed {
                Ok(candidate) => candidate,
                Err(err) => {
                    report.reject(line, err);
                    continue;
                }
            };

            let resolved = match self.lookup_client(candidate.client_id).await? {
                Some(client) => Some(client.name),
                None => self
                    .unregistered(candidate.client_id, Some(&candidate.client_name))
                    .map(|(_, name)| name),
            };
            let Some(client_name) = resolved else {
                report.reject(line, StagingError::not_found("Client", candidate.client_id));
                continue;
            };

            records.push(
                NewStagingRecord {
                    kind: StagingKind::Payment,
                    client_id: candidate.client_id,
                    client_name,
                    amount: candidate.amount,
                    reference: None,
                    account_code: Some(candidate.account_code),
                    description: candidate.description,
                    occurred_on: candidate.paid_on,
                }
                .into_record(now),
            );
        }

        report.staged = self.store.insert_staging_records(records).await?;
        info!(
            staged = report.staged.len(),
            refused = report.errors.len(),
            "Payment text imported"
        );
        Ok(report)
    }

    async fn lookup_client(&self, id: ClientId) -> Result<Option<Client>, StagingError> {
        match self.store.get_client(id).await {
            Ok(client) => Ok(Some(client)),
            Err(PortError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Name to stage an unregistered client under, if approval may create it
    fn unregistered(&self, id: ClientId, name: Option<&str>) -> Option<(ClientId, String)> {
        self.policy.auto_create_clients.then(|| {
            let name = name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .unwrap_or(UNKNOWN_CLIENT_NAME);
            (id, name.to_string())
        })
    }

    // ========================================================================
    // Registry and listings
    // ========================================================================

    /// Registers a client explicitly
    #[instrument(skip(self, new_client), fields(client_id = %new_client.id))]
    pub async fn register_client(&self, new_client: NewClient) -> Result<Client, StagingError> {
        new_client.validate()?;
        let client = self.store.create_client(new_client.into_client(Utc::now())).await?;
        info!("Client registered");
        Ok(client)
    }

    /// Updates a client's registry data
    #[instrument(skip(self, update), fields(client_id = %id))]
    pub async fn update_client(
        &self,
        id: ClientId,
        update: ClientUpdate,
    ) -> Result<Client, StagingError> {
        update.validate()?;
        let mut client = self.store.get_client(id).await?;
        update.apply(&mut client, Utc::now());
        Ok(self.store.update_client(client).await?)
    }

    pub async fn get_client(&self, id: ClientId) -> Result<Client, StagingError> {
        Ok(self.store.get_client(id).await?)
    }

    pub async fn list_clients(&self) -> Result<Vec<Client>, StagingError> {
        Ok(self.store.list_clients().await?)
    }

    /// Deletes a client that has no postings
    ///
    /// # Errors
    ///
    /// `StagingError::Conflict` while postings reference the client
    #[instrument(skip(self), fields(client_id = %id))]
    pub async fn delete_client(&self, id: ClientId) -> Result<(), StagingError> {
        self.store.delete_client(id).await?;
        info!("Client deleted");
        Ok(())
    }

    /// Pending staging records of one kind, oldest first
    pub async fn list_pending(&self, kind: StagingKind) -> Result<Vec<StagingRecord>, StagingError> {
        Ok(self.store.list_staging(StagingFilter::pending(kind)).await?)
    }

    pub async fn list_postings(&self, filter: PostingFilter) -> Result<Vec<Posting>, StagingError> {
        Ok(self.store.list_postings(filter).await?)
    }

    pub async fn list_accounts(&self) -> Result<Vec<Account>, StagingError> {
        Ok(self.store.list_accounts().await?)
    }
}

async fn apply_rejection(
    tx: &mut dyn LedgerTransaction,
    id: StagingId,
    kind: Option<StagingKind>,
) -> Result<Decision, StagingError> {
    let now = Utc::now();
    let mut record = tx.get_staging_record(id).await?;
    ensure_kind(&record, kind)?;
    record.reject(now)?;
    tx.mark_staging_status(id, record.status, now).await?;
    Ok(Decision::Rejected)
}

fn ensure_kind(record: &StagingRecord, expected: Option<StagingKind>) -> Result<(), StagingError> {
    match expected {
        Some(kind) if kind != record.kind => Err(StagingError::validation(format!(
            "staging record {} is a {}, not a {}",
            record.id,
            record.kind.as_str(),
            kind.as_str()
        ))),
        _ => Ok(()),
    }
}

/// Commits on success, rolls back on failure
async fn finish(
    tx: Box<dyn LedgerTransaction>,
    result: Result<Decision, StagingError>,
) -> Result<Decision, StagingError> {
    match result {
        Ok(decision) => {
            tx.commit().await?;
            Ok(decision)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

fn unknown_client(client: &ClientRef) -> StagingError {
    match client {
        ClientRef::Id { id, .. } => StagingError::not_found("Client", id),
        ClientRef::Name(name) => StagingError::not_found("Client", name),
    }
}
