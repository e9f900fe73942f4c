//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! credit ledger test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built clients, dates and import input
//! - `builders`: Builder patterns for test data construction
//! - `database`: PostgreSQL test container management
//! - `assertions`: Assertion helpers for statements and batch reports

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
