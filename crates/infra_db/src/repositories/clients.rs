//! Client registry repository

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use crate::error::DatabaseError;

/// Repository for the `clients` table
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

/// Database row for a client
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClientRow {
    pub id: i64,
    pub name: String,
    pub document: Option<String>,
    pub credit_limit_cents: i64,
    pub has_payment_term: bool,
    pub open_balance_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client row returned by an upsert, flagged with whether it was inserted
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UpsertedClientRow {
    #[sqlx(flatten)]
    pub client: ClientRow,
    pub inserted: bool,
}

/// Data for inserting a client
#[derive(Debug, Clone)]
pub struct NewClientRow {
    pub id: i64,
    pub name: String,
    pub document: Option<String>,
    pub credit_limit_cents: i64,
    pub has_payment_term: bool,
    pub created_at: DateTime<Utc>,
}

const CLIENT_COLUMNS: &str = "id, name, document, credit_limit_cents, has_payment_term, \
     open_balance_cents, created_at, updated_at";

impl ClientRepository {
    /// Creates a new ClientRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Fetches a client by ID
    pub async fn find<'e, E>(executor: E, id: i64) -> Result<Option<ClientRow>, DatabaseError>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1");
        Ok(sqlx::query_as::<_, ClientRow>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?)
    }

    /// Fetches a client by ID, failing with `NotFound` when absent
    pub async fn get(&self, id: i64) -> Result<ClientRow, DatabaseError> {
        Self::find(&self.pool, id)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Client", id))
    }

    /// Finds a client by name, ignoring case and surrounding whitespace
    pub async fn find_by_name(&self, name: &str) -> Result<Option<ClientRow>, DatabaseError> {
        let sql = format!(
            "SELECT {CLIENT_COLUMNS} FROM clients \
             WHERE lower(name) = lower(trim($1)) ORDER BY id LIMIT 1"
        );
        Ok(sqlx::query_as::<_, ClientRow>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Lists all clients ordered by name
    pub async fn list(&self) -> Result<Vec<ClientRow>, DatabaseError> {
        let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients ORDER BY name, id");
        Ok(sqlx::query_as::<_, ClientRow>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Inserts a client with a zero balance
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::DuplicateEntry` if the ID is taken
    pub async fn insert(&self, client: NewClientRow) -> Result<ClientRow, DatabaseError> {
        let sql = format!(
            "INSERT INTO clients (id, name, document, credit_limit_cents, has_payment_term, \
             open_balance_cents, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, 0, $6, $6) \
             RETURNING {CLIENT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, ClientRow>(&sql)
            .bind(client.id)
            .bind(&client.name)
            .bind(&client.document)
            .bind(client.credit_limit_cents)
            .bind(client.has_payment_term)
            .bind(client.created_at)
            .fetch_one(&self.pool)
            .await?)
    }

    /// Updates registry fields; the open balance is left untouched
    pub async fn update(&self, row: &ClientRow) -> Result<ClientRow, DatabaseError> {
        let sql = format!(
            "UPDATE clients SET name = $2, document = $3, credit_limit_cents = $4, \
             has_payment_term = $5, updated_at = $6 \
             WHERE id = $1 RETURNING {CLIENT_COLUMNS}"
        );
        sqlx::query_as::<_, ClientRow>(&sql)
            .bind(row.id)
            .bind(&row.name)
            .bind(&row.document)
            .bind(row.credit_limit_cents)
            .bind(row.has_payment_term)
            .bind(row.updated_at)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Client", row.id))
    }

    /// Deletes a client that has no postings
    ///
    /// # Errors
    ///
    /// * `DatabaseError::NotFound` - No such client
    /// * `DatabaseError::ForeignKeyViolation` - Postings still reference it
    pub async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let has_postings: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM postings WHERE client_id = $1)")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if has_postings {
            return Err(DatabaseError::ForeignKeyViolation(format!(
                "client {} has postings and cannot be deleted",
                id
            )));
        }

        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Client", id));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Inserts the client if absent, otherwise refreshes its name
    ///
    /// Limit, payment term and balance of an existing row are kept. The row
    /// stays locked for the rest of the transaction.
    pub async fn upsert<'e, E>(
        executor: E,
        id: i64,
        name: &str,
        credit_limit_cents: i64,
        has_payment_term: bool,
    ) -> Result<UpsertedClientRow, DatabaseError>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            "INSERT INTO clients (id, name, credit_limit_cents, has_payment_term, \
             open_balance_cents, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, 0, now(), now()) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, updated_at = now() \
             RETURNING {CLIENT_COLUMNS}, (xmax = 0) AS inserted"
        );
        Ok(sqlx::query_as::<_, UpsertedClientRow>(&sql)
            .bind(id)
            .bind(name)
            .bind(credit_limit_cents)
            .bind(has_payment_term)
            .fetch_one(executor)
            .await?)
    }

    /// Adds a signed delta to the cached open balance
    pub async fn adjust_balance<'e, E>(
        executor: E,
        id: i64,
        delta_cents: i64,
    ) -> Result<ClientRow, DatabaseError>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            "UPDATE clients SET open_balance_cents = open_balance_cents + $2, updated_at = now() \
             WHERE id = $1 RETURNING {CLIENT_COLUMNS}"
        );
        sqlx::query_as::<_, ClientRow>(&sql)
            .bind(id)
            .bind(delta_cents)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Client", id))
    }
}
