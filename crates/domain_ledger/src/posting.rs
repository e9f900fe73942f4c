//! Ledger postings
//!
//! A posting is the immutable result of an approved staging record. Amounts
//! are stored as magnitudes; the kind decides the sign.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Cents, ClientId, PostingId, StagingId};

/// Kind of ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostingKind {
    /// Increases the open balance
    Invoice,
    /// Decreases the open balance
    Payment,
}

impl PostingKind {
    /// Applies this kind's sign to an amount
    ///
    /// The magnitude is taken first so a negative amount can never flip a
    /// payment into a charge.
    pub fn signed(&self, amount: Cents) -> Cents {
        match self {
            PostingKind::Invoice => amount.abs(),
            PostingKind::Payment => -amount.abs(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PostingKind::Invoice => "invoice",
            PostingKind::Payment => "payment",
        }
    }
}

/// An immutable ledger entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub id: PostingId,
    pub client_id: ClientId,
    pub kind: PostingKind,
    /// Magnitude in cents
    pub amount: Cents,
    /// Issue date (invoice) or payment date
    pub occurred_on: NaiveDate,
    /// `None` means due immediately
    pub due_date: Option<NaiveDate>,
    /// Invoice number or bank description
    pub description: String,
    /// Account code the payment was received in
    pub account_code: Option<String>,
    /// Staging record that produced this posting
    pub source_staging_id: Option<StagingId>,
    pub created_at: DateTime<Utc>,
}

impl Posting {
    /// Contribution of this posting to the open balance
    pub fn signed_amount(&self) -> Cents {
        self.kind.signed(self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_amounts() {
        assert_eq!(PostingKind::Invoice.signed(Cents::new(100)), Cents::new(100));
        assert_eq!(PostingKind::Payment.signed(Cents::new(100)), Cents::new(-100));
        assert_eq!(PostingKind::Payment.signed(Cents::new(-100)), Cents::new(-100));
        assert_eq!(PostingKind::Invoice.signed(Cents::new(-100)), Cents::new(100));
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&PostingKind::Payment).unwrap(), "\"payment\"");
    }
}
