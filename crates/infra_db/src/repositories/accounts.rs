//! Payment account repository

use sqlx::PgPool;

use crate::error::DatabaseError;

/// Repository for the `accounts` table
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

/// Database row for a payment account
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountRow {
    pub code: String,
    pub name: String,
    pub active: bool,
}

impl AccountRepository {
    /// Creates a new AccountRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists all accounts ordered by code
    pub async fn list(&self) -> Result<Vec<AccountRow>, DatabaseError> {
        Ok(sqlx::query_as::<_, AccountRow>(
            "SELECT code, name, active FROM accounts ORDER BY code",
        )
        .fetch_all(&self.pool)
        .await?)
    }
}
