//! Ledger Domain - Client Credit Statements
//!
//! This crate holds the pure calculations behind a client's running
//! statement:
//!
//! - **Due-date rule**: maps an invoice issue date and the client's payment
//!   term flag to a due date, or to "due immediately"
//! - **Open balance**: invoices add, payments subtract
//! - **Available credit**: credit limit minus open balance (may go negative)
//! - **Payment periods**: postings grouped by due date, immediate bucket first
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use domain_ledger::due_date;
//!
//! let issued = NaiveDate::from_ymd_opt(2025, 3, 20).unwrap();
//! assert_eq!(due_date(issued, true), NaiveDate::from_ymd_opt(2025, 4, 15));
//! assert_eq!(due_date(issued, false), None);
//! ```

pub mod client;
pub mod posting;
pub mod due_date;
pub mod ledger;
pub mod error;

pub use client::{Client, ClientUpdate, NewClient, UpsertOutcome};
pub use posting::{Posting, PostingKind};
pub use due_date::due_date;
pub use ledger::{
    open_balance, available_credit, group_by_period, order_periods,
    PaymentPeriod, PeriodKey, Statement,
};
pub use error::LedgerError;
