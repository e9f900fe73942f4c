//! Posting repository

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::error::DatabaseError;

/// Repository for the append-only `postings` table
#[derive(Debug, Clone)]
pub struct PostingRepository {
    pool: PgPool,
}

/// Posting kind as stored in PostgreSQL
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "posting_kind", rename_all = "snake_case")]
pub enum PostingKind {
    Invoice,
    Payment,
}

/// Database row for a posting
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostingRow {
    pub id: Uuid,
    pub client_id: i64,
    pub kind: PostingKind,
    pub amount_cents: i64,
    pub occurred_on: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub description: String,
    pub account_code: Option<String>,
    pub source_staging_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl PostingRepository {
    /// Creates a new PostingRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists postings, optionally for one client and/or kind
    ///
    /// Ordered by occurrence date, then creation time.
    pub async fn list(
        &self,
        client_id: Option<i64>,
        kind: Option<PostingKind>,
    ) -> Result<Vec<PostingRow>, DatabaseError> {
        Ok(sqlx::query_as::<_, PostingRow>(
            r#"
            SELECT id, client_id, kind, amount_cents, occurred_on, due_date,
                   description, account_code, source_staging_id, created_at
            FROM postings
            WHERE ($1::BIGINT IS NULL OR client_id = $1)
              AND ($2::posting_kind IS NULL OR kind = $2)
            ORDER BY occurred_on, created_at
            "#,
        )
        .bind(client_id)
        .bind(kind)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Inserts a posting
    pub async fn insert<'e, E>(executor: E, row: &PostingRow) -> Result<(), DatabaseError>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query(
            r#"
            INSERT INTO postings (
                id, client_id, kind, amount_cents, occurred_on, due_date,
                description, account_code, source_staging_id, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(row.id)
        .bind(row.client_id)
        .bind(row.kind)
        .bind(row.amount_cents)
        .bind(row.occurred_on)
        .bind(row.due_date)
        .bind(&row.description)
        .bind(&row.account_code)
        .bind(row.source_staging_id)
        .bind(row.created_at)
        .execute(executor)
        .await?;
        Ok(())
    }
}
