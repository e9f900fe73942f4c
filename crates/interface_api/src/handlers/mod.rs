//! Request handlers

pub mod health;
pub mod clients;
pub mod staging;
pub mod ledger;
