//! Request and response data transfer objects
//!
//! Monetary fields travel as integer cents.

pub mod clients;
pub mod staging;
pub mod ledger;
