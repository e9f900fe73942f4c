//! Repository implementations for the ledger tables
//!
//! Each repository owns the SQL for one table and maps rows to plain row
//! structs. Queries are checked at runtime (`query_as` + `FromRow`) and take
//! any `PgExecutor`, so they run equally against the pool or inside an open
//! transaction.

pub mod clients;
pub mod postings;
pub mod staging;
pub mod accounts;

pub use clients::{ClientRepository, ClientRow, NewClientRow};
pub use postings::{PostingKind, PostingRepository, PostingRow};
pub use staging::{StagingKind, StagingRepository, StagingRow, StagingStatus};
pub use accounts::{AccountRepository, AccountRow};
