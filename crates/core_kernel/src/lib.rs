//! Core Kernel - Foundational types for the credit ledger
//!
//! This crate provides the building blocks shared by every other crate:
//! - `Cents`, an integer minor-unit money type with decimal conversions
//! - Strongly-typed identifiers for clients, postings and staging records
//! - Port marker traits and the common `PortError`

pub mod money;
pub mod identifiers;
pub mod error;
pub mod ports;

pub use money::{Cents, MoneyError};
pub use identifiers::{ClientId, PostingId, StagingId};
pub use error::CoreError;
pub use ports::{
    DomainPort, PortError, HealthCheckable, HealthCheckResult, AdapterHealth,
};
