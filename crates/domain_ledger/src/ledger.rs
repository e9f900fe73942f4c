//! Statement aggregation
//!
//! Open balance, available credit and payment periods are all recomputed
//! from the posted ledger. The cached balance on [`Client`] is only compared
//! against the recomputed figure.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{Cents, MoneyError};

use crate::client::Client;
use crate::error::LedgerError;
use crate::posting::Posting;

/// Signed sum of postings: invoices add, payments subtract
///
/// # Errors
///
/// Returns `MoneyError::Overflow` if the sum leaves the `i64` range
pub fn open_balance<'a, I>(postings: I) -> Result<Cents, MoneyError>
where
    I: IntoIterator<Item = &'a Posting>,
{
    postings
        .into_iter()
        .try_fold(Cents::ZERO, |total, posting| total.checked_add(posting.signed_amount()))
}

/// Credit limit minus open balance; negative when the client is over limit
pub fn available_credit(credit_limit: Cents, open_balance: Cents) -> Cents {
    credit_limit - open_balance
}

/// Bucket key for a payment period
///
/// `Immediate` is declared first so it sorts before every dated period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "date", rename_all = "snake_case")]
pub enum PeriodKey {
    /// Postings without a due date
    Immediate,
    /// Postings due on the given date
    Due(NaiveDate),
}

impl PeriodKey {
    pub fn for_due_date(due_date: Option<NaiveDate>) -> Self {
        match due_date {
            Some(date) => PeriodKey::Due(date),
            None => PeriodKey::Immediate,
        }
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        match self {
            PeriodKey::Immediate => None,
            PeriodKey::Due(date) => Some(*date),
        }
    }
}

/// Postings sharing a due date, with their signed subtotal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentPeriod {
    pub key: PeriodKey,
    pub postings: Vec<Posting>,
    pub subtotal: Cents,
}

/// Groups postings by their stored due date
///
/// Periods come back in key order; postings keep their input order until
/// [`order_periods`] is applied.
pub fn group_by_period<I>(postings: I) -> Result<Vec<PaymentPeriod>, MoneyError>
where
    I: IntoIterator<Item = Posting>,
{
    let mut buckets: BTreeMap<PeriodKey, Vec<Posting>> = BTreeMap::new();
    for posting in postings {
        buckets
            .entry(PeriodKey::for_due_date(posting.due_date))
            .or_default()
            .push(posting);
    }

    buckets
        .into_iter()
        .map(|(key, postings)| {
            let subtotal = open_balance(&postings)?;
            Ok(PaymentPeriod { key, postings, subtotal })
        })
        .collect()
}

/// Orders periods (immediate first, then ascending due date) and the
/// postings inside each period (occurrence date, then creation time)
pub fn order_periods(periods: &mut [PaymentPeriod]) {
    periods.sort_by_key(|period| period.key);
    for period in periods.iter_mut() {
        period
            .postings
            .sort_by(|a, b| (a.occurred_on, a.created_at).cmp(&(b.occurred_on, b.created_at)));
    }
}

/// Read-only statement for one client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub client: Client,
    /// Recomputed from postings
    pub open_balance: Cents,
    pub available_credit: Cents,
    pub periods: Vec<PaymentPeriod>,
}

impl Statement {
    /// Builds a statement from a client and its approved postings
    ///
    /// # Arguments
    ///
    /// * `client` - Client whose statement is being built
    /// * `postings` - All approved postings for that client
    ///
    /// # Errors
    ///
    /// * `LedgerError::ForeignPosting` - A posting belongs to another client
    /// * `LedgerError::Calculation` - A sum overflowed
    pub fn assemble(client: Client, postings: Vec<Posting>) -> Result<Self, LedgerError> {
        if let Some(foreign) = postings.iter().find(|p| p.client_id != client.id) {
            return Err(LedgerError::ForeignPosting {
                expected: client.id,
                found: foreign.client_id,
            });
        }

        let open_balance = open_balance(&postings)?;
        let mut periods = group_by_period(postings)?;
        order_periods(&mut periods);

        Ok(Self {
            available_credit: available_credit(client.credit_limit, open_balance),
            client,
            open_balance,
            periods,
        })
    }

    /// Difference between the client's cached balance and the recomputed one
    ///
    /// Returns `None` when they agree.
    pub fn cached_balance_drift(&self) -> Option<Cents> {
        let drift = self.client.open_balance - self.open_balance;
        (!drift.is_zero()).then_some(drift)
    }

    /// Number of postings across all periods
    pub fn posting_count(&self) -> usize {
        self.periods.iter().map(|p| p.postings.len()).sum()
    }
}
