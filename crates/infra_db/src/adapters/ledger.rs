//! PostgreSQL Ledger Store
//!
//! Implements the `LedgerStore` port on top of the repositories. Each
//! approval or rejection gets its own `sqlx::Transaction`; the staging row
//! is locked with `SELECT ... FOR UPDATE` and the client balance moves by an
//! in-place increment, so concurrent approvals for one client are serialized
//! by PostgreSQL.
//!
//! # Error Handling
//!
//! Database errors are translated to `PortError` variants:
//! - `DatabaseError::NotFound` -> `PortError::NotFound`
//! - `DatabaseError::DuplicateEntry` / `ForeignKeyViolation` -> `PortError::Conflict`
//! - `DatabaseError::ConnectionFailed` / `PoolExhausted` -> `PortError::Connection`
//! - Other errors -> `PortError::Internal`

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};

use core_kernel::{
    AdapterHealth, Cents, ClientId, DomainPort, HealthCheckResult, HealthCheckable, PortError,
    PostingId, StagingId,
};
use domain_ledger::{Client, Posting, UpsertOutcome};
use domain_staging::{
    Account, ClientDefaults, LedgerStore, LedgerTransaction, PostingFilter, StagingFilter,
    StagingRecord,
};

use crate::repositories::{
    AccountRepository, AccountRow, ClientRepository, ClientRow, NewClientRow, PostingRepository,
    PostingRow, StagingRepository, StagingRow,
};
use crate::repositories::postings::PostingKind as DbPostingKind;
use crate::repositories::staging::{StagingKind as DbStagingKind, StagingStatus as DbStagingStatus};

const ADAPTER_ID: &str = "postgres-ledger-store";

/// PostgreSQL-backed implementation of the `LedgerStore` port
#[derive(Debug, Clone)]
pub struct PostgresLedgerStore {
    pool: PgPool,
    clients: ClientRepository,
    postings: PostingRepository,
    staging: StagingRepository,
    accounts: AccountRepository,
}

impl PostgresLedgerStore {
    /// Creates a new store over a connection pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            clients: ClientRepository::new(pool.clone()),
            postings: PostingRepository::new(pool.clone()),
            staging: StagingRepository::new(pool.clone()),
            accounts: AccountRepository::new(pool.clone()),
            pool,
        }
    }

    /// Returns the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl DomainPort for PostgresLedgerStore {}

#[async_trait]
impl HealthCheckable for PostgresLedgerStore {
    /// Performs a `SELECT 1` to verify the pool can reach the database
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        let (status, message) = match result {
            Ok(_) => (AdapterHealth::Healthy, None),
            Err(e) => (AdapterHealth::Unhealthy, Some(format!("Database error: {}", e))),
        };
        HealthCheckResult {
            adapter_id: ADAPTER_ID.to_string(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    #[instrument(skip(self), fields(client_id = %id))]
    async fn get_client(&self, id: ClientId) -> Result<Client, PortError> {
        let row = self.clients.get(id.value()).await?;
        Ok(row_to_client(row))
    }

    #[instrument(skip(self))]
    async fn find_client_by_name(&self, name: &str) -> Result<Option<Client>, PortError> {
        Ok(self.clients.find_by_name(name).await?.map(row_to_client))
    }

    async fn list_clients(&self) -> Result<Vec<Client>, PortError> {
        let rows = self.clients.list().await?;
        Ok(rows.into_iter().map(row_to_client).collect())
    }

    #[instrument(skip(self, client), fields(client_id = %client.id))]
    async fn create_client(&self, client: Client) -> Result<Client, PortError> {
        debug!("Inserting client");
        let row = self
            .clients
            .insert(NewClientRow {
                id: client.id.value(),
                name: client.name,
                document: client.document,
                credit_limit_cents: client.credit_limit.value(),
                has_payment_term: client.has_payment_term,
                created_at: client.created_at,
            })
            .await?;
        Ok(row_to_client(row))
    }

    #[instrument(skip(self, client), fields(client_id = %client.id))]
    async fn update_client(&self, client: Client) -> Result<Client, PortError> {
        let row = self.clients.update(&client_to_row(&client)).await?;
        Ok(row_to_client(row))
    }

    #[instrument(skip(self), fields(client_id = %id))]
    async fn delete_client(&self, id: ClientId) -> Result<(), PortError> {
        Ok(self.clients.delete(id.value()).await?)
    }

    async fn list_postings(&self, filter: PostingFilter) -> Result<Vec<Posting>, PortError> {
        let rows = self
            .postings
            .list(
                filter.client_id.map(|id| id.value()),
                filter.kind.map(posting_kind_to_db),
            )
            .await?;
        Ok(rows.into_iter().map(row_to_posting).collect())
    }

    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn insert_staging_records(
        &self,
        records: Vec<StagingRecord>,
    ) -> Result<Vec<StagingRecord>, PortError> {
        let rows: Vec<_> = records.iter().map(staging_to_row).collect();
        self.staging.insert_many(&rows).await?;
        Ok(records)
    }

    async fn list_staging(&self, filter: StagingFilter) -> Result<Vec<StagingRecord>, PortError> {
        let rows = self
            .staging
            .list(
                filter.kind.map(staging_kind_to_db),
                filter.status.map(staging_status_to_db),
            )
            .await?;
        Ok(rows.into_iter().map(row_to_staging).collect())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, PortError> {
        let rows = self.accounts.list().await?;
        Ok(rows.into_iter().map(row_to_account).collect())
    }

    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, PortError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(crate::error::DatabaseError::from)?;
        Ok(Box::new(PgLedgerTransaction { tx }))
    }
}

/// One approval or rejection in flight
struct PgLedgerTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LedgerTransaction for PgLedgerTransaction {
    async fn get_client(&mut self, id: ClientId) -> Result<Option<Client>, PortError> {
        let row = ClientRepository::find(&mut *self.tx, id.value()).await?;
        Ok(row.map(row_to_client))
    }

    async fn upsert_client(
        &mut self,
        id: ClientId,
        name: &str,
        defaults: ClientDefaults,
    ) -> Result<UpsertOutcome, PortError> {
        let row = ClientRepository::upsert(
            &mut *self.tx,
            id.value(),
            name,
            defaults.credit_limit.value(),
            defaults.has_payment_term,
        )
        .await?;
        let client = row_to_client(row.client);
        Ok(if row.inserted {
            UpsertOutcome::Created(client)
        } else {
            UpsertOutcome::Updated(client)
        })
    }

    async fn adjust_balance(&mut self, id: ClientId, delta: Cents) -> Result<Client, PortError> {
        let row = ClientRepository::adjust_balance(&mut *self.tx, id.value(), delta.value()).await?;
        Ok(row_to_client(row))
    }

    async fn insert_posting(&mut self, posting: &Posting) -> Result<(), PortError> {
        PostingRepository::insert(&mut *self.tx, &posting_to_row(posting)).await?;
        Ok(())
    }

    async fn get_staging_record(&mut self, id: StagingId) -> Result<StagingRecord, PortError> {
        StagingRepository::find_for_update(&mut *self.tx, *id.as_uuid())
            .await?
            .map(row_to_staging)
            .ok_or_else(|| PortError::not_found("StagingRecord", id))
    }

    async fn mark_staging_status(
        &mut self,
        id: StagingId,
        status: domain_staging::StagingStatus,
        decided_at: DateTime<Utc>,
    ) -> Result<(), PortError> {
        StagingRepository::set_status(
            &mut *self.tx,
            *id.as_uuid(),
            staging_status_to_db(status),
            decided_at,
        )
        .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), PortError> {
        self.tx
            .commit()
            .await
            .map_err(crate::error::DatabaseError::from)?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), PortError> {
        self.tx
            .rollback()
            .await
            .map_err(crate::error::DatabaseError::from)?;
        Ok(())
    }
}

// ============================================================================
// Row conversions
// ============================================================================

fn row_to_client(row: ClientRow) -> Client {
    Client {
        id: ClientId::new(row.id),
        name: row.name,
        document: row.document,
        credit_limit: Cents::new(row.credit_limit_cents),
        has_payment_term: row.has_payment_term,
        open_balance: Cents::new(row.open_balance_cents),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn client_to_row(client: &Client) -> ClientRow {
    ClientRow {
        id: client.id.value(),
        name: client.name.clone(),
        document: client.document.clone(),
        credit_limit_cents: client.credit_limit.value(),
        has_payment_term: client.has_payment_term,
        open_balance_cents: client.open_balance.value(),
        created_at: client.created_at,
        updated_at: client.updated_at,
    }
}

fn posting_kind_to_db(kind: domain_ledger::PostingKind) -> DbPostingKind {
    match kind {
        domain_ledger::PostingKind::Invoice => DbPostingKind::Invoice,
        domain_ledger::PostingKind::Payment => DbPostingKind::Payment,
    }
}

fn posting_kind_from_db(kind: DbPostingKind) -> domain_ledger::PostingKind {
    match kind {
        DbPostingKind::Invoice => domain_ledger::PostingKind::Invoice,
        DbPostingKind::Payment => domain_ledger::PostingKind::Payment,
    }
}

fn row_to_posting(row: PostingRow) -> Posting {
    Posting {
        id: PostingId::from_uuid(row.id),
        client_id: ClientId::new(row.client_id),
        kind: posting_kind_from_db(row.kind),
        amount: Cents::new(row.amount_cents),
        occurred_on: row.occurred_on,
        due_date: row.due_date,
        description: row.description,
        account_code: row.account_code,
        source_staging_id: row.source_staging_id.map(StagingId::from_uuid),
        created_at: row.created_at,
    }
}

fn posting_to_row(posting: &Posting) -> PostingRow {
    PostingRow {
        id: *posting.id.as_uuid(),
        client_id: posting.client_id.value(),
        kind: posting_kind_to_db(posting.kind),
        amount_cents: posting.amount.abs().value(),
        occurred_on: posting.occurred_on,
        due_date: posting.due_date,
        description: posting.description.clone(),
        account_code: posting.account_code.clone(),
        source_staging_id: posting.source_staging_id.map(|id| *id.as_uuid()),
        created_at: posting.created_at,
    }
}

fn staging_kind_to_db(kind: domain_staging::StagingKind) -> DbStagingKind {
    match kind {
        domain_staging::StagingKind::Invoice => DbStagingKind::Invoice,
        domain_staging::StagingKind::Payment => DbStagingKind::Payment,
    }
}

fn staging_status_to_db(status: domain_staging::StagingStatus) -> DbStagingStatus {
    match status {
        domain_staging::StagingStatus::Pending => DbStagingStatus::Pending,
        domain_staging::StagingStatus::Approved => DbStagingStatus::Approved,
        domain_staging::StagingStatus::Rejected => DbStagingStatus::Rejected,
    }
}

fn row_to_staging(row: StagingRow) -> StagingRecord {
    StagingRecord {
        id: StagingId::from_uuid(row.id),
        kind: match row.kind {
            DbStagingKind::Invoice => domain_staging::StagingKind::Invoice,
            DbStagingKind::Payment => domain_staging::StagingKind::Payment,
        },
        client_id: ClientId::new(row.client_id),
        client_name: row.client_name,
        amount: Cents::new(row.amount_cents),
        reference: row.reference,
        account_code: row.account_code,
        description: row.description,
        occurred_on: row.occurred_on,
        status: match row.status {
            DbStagingStatus::Pending => domain_staging::StagingStatus::Pending,
            DbStagingStatus::Approved => domain_staging::StagingStatus::Approved,
            DbStagingStatus::Rejected => domain_staging::StagingStatus::Rejected,
        },
        created_at: row.created_at,
        decided_at: row.decided_at,
    }
}

fn staging_to_row(record: &StagingRecord) -> StagingRow {
    StagingRow {
        id: *record.id.as_uuid(),
        kind: staging_kind_to_db(record.kind),
        client_id: record.client_id.value(),
        client_name: record.client_name.clone(),
        amount_cents: record.amount.value(),
        reference: record.reference.clone(),
        account_code: record.account_code.clone(),
        description: record.description.clone(),
        occurred_on: record.occurred_on,
        status: staging_status_to_db(record.status),
        created_at: record.created_at,
        decided_at: record.decided_at,
    }
}

fn row_to_account(row: AccountRow) -> Account {
    Account {
        code: row.code,
        name: row.name,
        active: row.active,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use domain_staging::NewStagingRecord;

    #[test]
    fn test_staging_row_conversion_keeps_fields() {
        let record = NewStagingRecord {
            kind: domain_staging::StagingKind::Payment,
            client_id: ClientId::new(199),
            client_name: "Bettio".to_string(),
            amount: Cents::new(100_000),
            reference: None,
            account_code: Some("G1".to_string()),
            description: "Pagamentos Bettio/Gprime [199]".to_string(),
            occurred_on: NaiveDate::from_ymd_opt(2025, 10, 17).unwrap(),
        }
        .into_record(Utc::now());

        let back = row_to_staging(staging_to_row(&record));
        assert_eq!(back, record);
    }

    #[test]
    fn test_posting_row_stores_magnitude() {
        let posting = Posting {
            id: PostingId::new_v7(),
            client_id: ClientId::new(1),
            kind: domain_ledger::PostingKind::Payment,
            amount: Cents::new(-500),
            occurred_on: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            due_date: None,
            description: "x".to_string(),
            account_code: None,
            source_staging_id: None,
            created_at: Utc::now(),
        };
        let row = posting_to_row(&posting);
        assert_eq!(row.amount_cents, 500);
        assert_eq!(row.kind, DbPostingKind::Payment);
    }
}
