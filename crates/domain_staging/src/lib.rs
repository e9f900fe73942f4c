//! Staging Domain - Import and Approval Workflow
//!
//! External input never reaches the ledger directly. It is first parsed into
//! pending staging records, which an operator then approves or rejects:
//!
//! ```text
//!  spreadsheet rows ─┐                     ┌─▶ approve ─▶ posting + balance
//!                    ├─▶ import ─▶ pending ┤
//!  pasted bank text ─┘                     └─▶ reject
//! ```
//!
//! - [`import`]: pure parsers for invoice rows and payment text
//! - [`record`]: staging records and their status transitions
//! - [`ports`]: the `LedgerStore` port and its per-id transaction
//! - [`memory`]: an in-memory `LedgerStore` for tests and local runs
//! - [`service`]: `LedgerService`, which drives ingestion and approval

pub mod account;
pub mod error;
pub mod import;
pub mod memory;
pub mod ports;
pub mod record;
pub mod service;

pub use account::Account;
pub use error::StagingError;
pub use memory::InMemoryLedgerStore;
pub use ports::{ClientDefaults, LedgerStore, LedgerTransaction, PostingFilter, StagingFilter};
pub use record::{NewStagingRecord, StagingKind, StagingRecord, StagingStatus};
pub use service::{
    ApprovalPolicy, BatchItem, BatchReport, Decision, IngestError, IngestReport, LedgerService,
};
