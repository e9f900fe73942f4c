//! Staging record repository

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::error::DatabaseError;

/// Repository for the `staging_records` table
#[derive(Debug, Clone)]
pub struct StagingRepository {
    pool: PgPool,
}

/// Staging kind as stored in PostgreSQL
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "staging_kind", rename_all = "snake_case")]
pub enum StagingKind {
    Invoice,
    Payment,
}

/// Staging status as stored in PostgreSQL
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "staging_status", rename_all = "snake_case")]
pub enum StagingStatus {
    Pending,
    Approved,
    Rejected,
}

/// Database row for a staging record
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StagingRow {
    pub id: Uuid,
    pub kind: StagingKind,
    pub client_id: i64,
    pub client_name: String,
    pub amount_cents: i64,
    pub reference: Option<String>,
    pub account_code: Option<String>,
    pub description: String,
    pub occurred_on: NaiveDate,
    pub status: StagingStatus,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

const STAGING_COLUMNS: &str = "id, kind, client_id, client_name, amount_cents, reference, \
     account_code, description, occurred_on, status, created_at, decided_at";

impl StagingRepository {
    /// Creates a new StagingRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts freshly parsed records in one transaction
    pub async fn insert_many(&self, rows: &[StagingRow]) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO staging_records (
                    id, kind, client_id, client_name, amount_cents, reference,
                    account_code, description, occurred_on, status, created_at, decided_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                "#,
            )
            .bind(row.id)
            .bind(row.kind)
            .bind(row.client_id)
            .bind(&row.client_name)
            .bind(row.amount_cents)
            .bind(&row.reference)
            .bind(&row.account_code)
            .bind(&row.description)
            .bind(row.occurred_on)
            .bind(row.status)
            .bind(row.created_at)
            .bind(row.decided_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Lists records, optionally filtered by kind and status, oldest first
    pub async fn list(
        &self,
        kind: Option<StagingKind>,
        status: Option<StagingStatus>,
    ) -> Result<Vec<StagingRow>, DatabaseError> {
        let sql = format!(
            "SELECT {STAGING_COLUMNS} FROM staging_records \
             WHERE ($1::staging_kind IS NULL OR kind = $1) \
               AND ($2::staging_status IS NULL OR status = $2) \
             ORDER BY created_at, id"
        );
        Ok(sqlx::query_as::<_, StagingRow>(&sql)
            .bind(kind)
            .bind(status)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Reads a record and locks its row until the transaction ends
    pub async fn find_for_update<'e, E>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<StagingRow>, DatabaseError>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!("SELECT {STAGING_COLUMNS} FROM staging_records WHERE id = $1 FOR UPDATE");
        Ok(sqlx::query_as::<_, StagingRow>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?)
    }

    /// Records the decision on a record
    pub async fn set_status<'e, E>(
        executor: E,
        id: Uuid,
        status: StagingStatus,
        decided_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE staging_records SET status = $2, decided_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .bind(decided_at)
        .execute(executor)
        .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("StagingRecord", id));
        }
        Ok(())
    }
}
