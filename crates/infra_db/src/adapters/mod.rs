//! Domain Adapters
//!
//! Adapter implementations connecting domain ports to PostgreSQL. The
//! adapter implements the port trait, translates between domain models and
//! row types, and uses the repository layer for all SQL.
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresLedgerStore;
//! use domain_staging::LedgerStore;
//!
//! let store: Arc<dyn LedgerStore> = Arc::new(PostgresLedgerStore::new(pool));
//! let client = store.get_client(ClientId::new(199)).await?;
//! ```

pub mod ledger;

pub use ledger::PostgresLedgerStore;
