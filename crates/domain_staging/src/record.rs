//! Staging records
//!
//! A staging record is a candidate posting. It starts `Pending` and moves
//! exactly once, to `Approved` or `Rejected`:
//!
//! ```text
//! Pending ──approve──▶ Approved
//!    │
//!    └────reject───▶ Rejected
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Cents, ClientId, PostingId, StagingId};
use domain_ledger::{Posting, PostingKind};

use crate::error::StagingError;

/// What the record will become once approved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StagingKind {
    Invoice,
    Payment,
}

impl StagingKind {
    pub fn posting_kind(&self) -> PostingKind {
        match self {
            StagingKind::Invoice => PostingKind::Invoice,
            StagingKind::Payment => PostingKind::Payment,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StagingKind::Invoice => "invoice",
            StagingKind::Payment => "payment",
        }
    }
}

/// Review status of a staging record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StagingStatus {
    Pending,
    Approved,
    Rejected,
}

impl StagingStatus {
    /// Approved and rejected records never change again
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StagingStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StagingStatus::Pending => "pending",
            StagingStatus::Approved => "approved",
            StagingStatus::Rejected => "rejected",
        }
    }
}

/// A candidate posting awaiting review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingRecord {
    pub id: StagingId,
    pub kind: StagingKind,
    /// Client referenced by the source document
    pub client_id: ClientId,
    /// Display name captured at ingestion
    pub client_name: String,
    /// Magnitude in cents
    pub amount: Cents,
    /// Invoice or order number
    pub reference: Option<String>,
    /// Account the payment was received in
    pub account_code: Option<String>,
    /// Text carried onto the posting
    pub description: String,
    /// Issue date or payment date
    pub occurred_on: NaiveDate,
    pub status: StagingStatus,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl StagingRecord {
    /// Checks that the record can still be decided
    ///
    /// # Errors
    ///
    /// Returns `StagingError::InvalidState` if the record is approved or rejected
    pub fn ensure_pending(&self) -> Result<(), StagingError> {
        if self.status.is_terminal() {
            return Err(StagingError::invalid_state(format!(
                "staging record {} is already {}",
                self.id,
                self.status.as_str()
            )));
        }
        Ok(())
    }

    /// Moves the record to `Approved`
    pub fn approve(&mut self, now: DateTime<Utc>) -> Result<(), StagingError> {
        self.decide(StagingStatus::Approved, now)
    }

    /// Moves the record to `Rejected`
    pub fn reject(&mut self, now: DateTime<Utc>) -> Result<(), StagingError> {
        self.decide(StagingStatus::Rejected, now)
    }

    fn decide(&mut self, status: StagingStatus, now: DateTime<Utc>) -> Result<(), StagingError> {
        self.ensure_pending()?;
        self.status = status;
        self.decided_at = Some(now);
        Ok(())
    }

    /// Builds the posting this record produces on approval
    ///
    /// # Arguments
    ///
    /// * `due_date` - Already computed due date (`None` = immediately)
    /// * `now` - Posting creation time
    pub fn to_posting(&self, due_date: Option<NaiveDate>, now: DateTime<Utc>) -> Posting {
        Posting {
            id: PostingId::new_v7(),
            client_id: self.client_id,
            kind: self.kind.posting_kind(),
            amount: self.amount.abs(),
            occurred_on: self.occurred_on,
            due_date,
            description: self.description.clone(),
            account_code: self.account_code.clone(),
            source_staging_id: Some(self.id),
            created_at: now,
        }
    }
}

/// A parsed candidate that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStagingRecord {
    pub kind: StagingKind,
    pub client_id: ClientId,
    pub client_name: String,
    pub amount: Cents,
    pub reference: Option<String>,
    pub account_code: Option<String>,
    pub description: String,
    pub occurred_on: NaiveDate,
}

impl NewStagingRecord {
    /// Materializes a pending record
    pub fn into_record(self, now: DateTime<Utc>) -> StagingRecord {
        StagingRecord {
            id: StagingId::new_v7(),
            kind: self.kind,
            client_id: self.client_id,
            client_name: self.client_name,
            amount: self.amount,
            reference: self.reference,
            account_code: self.account_code,
            description: self.description,
            occurred_on: self.occurred_on,
            status: StagingStatus::Pending,
            created_at: now,
            decided_at: None,
        }
    }
}
