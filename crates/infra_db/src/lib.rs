//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the client ledger using SQLx.
//!
//! # Architecture
//!
//! Repositories hold the SQL for one table each and return plain row types.
//! [`PostgresLedgerStore`] adapts them to the `LedgerStore` port, converting
//! rows to domain types and database errors to `PortError`.
//!
//! Every repository query is generic over the executor, so the same SQL runs
//! against the pool for reads and against an open transaction for approvals.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresLedgerStore};
//!
//! let pool = create_pool(&DatabaseConfig::new("postgres://localhost/credit_ledger")).await?;
//! run_migrations(&pool).await?;
//! let store = PostgresLedgerStore::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod migrate;
pub mod repositories;
pub mod adapters;

pub use pool::{create_pool, DatabaseConfig};
pub use error::DatabaseError;
pub use migrate::run_migrations;
pub use adapters::PostgresLedgerStore;
