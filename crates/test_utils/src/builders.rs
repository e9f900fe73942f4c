//! Test Data Builders
//!
//! Fluent builders for domain values with sensible defaults, so tests only
//! spell out the fields they care about.

use chrono::{NaiveDate, Utc};
use core_kernel::{Cents, ClientId};
use domain_ledger::{Client, NewClient};
use domain_staging::{NewStagingRecord, StagingKind, StagingRecord, StagingStatus};

fn default_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap_or_default()
}

// ============================================================================
// Client Builder
// ============================================================================

/// Builder for registered clients
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    id: ClientId,
    name: String,
    credit_limit: Cents,
    has_payment_term: bool,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            id: ClientId::new(1),
            name: "Test Client".to_string(),
            credit_limit: Cents::new(100_000),
            has_payment_term: false,
        }
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = ClientId::new(id);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_credit_limit(mut self, cents: i64) -> Self {
        self.credit_limit = Cents::new(cents);
        self
    }

    pub fn with_payment_term(mut self) -> Self {
        self.has_payment_term = true;
        self
    }

    pub fn build(self) -> Client {
        NewClient::new(self.id, self.name)
            .with_credit_limit(self.credit_limit)
            .with_payment_term(self.has_payment_term)
            .into_client(Utc::now())
    }
}

// ============================================================================
// Staging Record Builder
// ============================================================================

/// Builder for staged import records
#[derive(Debug, Clone)]
pub struct StagingRecordBuilder {
    inner: NewStagingRecord,
    status: StagingStatus,
}

impl StagingRecordBuilder {
    pub fn invoice(client_id: i64, cents: i64) -> Self {
        Self {
            inner: NewStagingRecord {
                kind: StagingKind::Invoice,
                client_id: ClientId::new(client_id),
                client_name: format!("Client {}", client_id),
                amount: Cents::new(cents),
                reference: Some(format!("PED-{}", client_id)),
                account_code: None,
                description: format!("Invoice PED-{}", client_id),
                occurred_on: default_date(),
            },
            status: StagingStatus::Pending,
        }
    }

    pub fn payment(client_id: i64, cents: i64) -> Self {
        Self {
            inner: NewStagingRecord {
                kind: StagingKind::Payment,
                client_id: ClientId::new(client_id),
                client_name: format!("Client {}", client_id),
                amount: Cents::new(cents),
                reference: None,
                account_code: Some("G1".to_string()),
                description: format!("Pagamentos Client {} [{}]", client_id, client_id),
                occurred_on: default_date(),
            },
            status: StagingStatus::Pending,
        }
    }

    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.inner.client_name = name.into();
        self
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.inner.occurred_on = date;
        self
    }

    pub fn with_status(mut self, status: StagingStatus) -> Self {
        self.status = status;
        self
    }

    pub fn build(self) -> StagingRecord {
        let now = Utc::now();
        let mut record = self.inner.into_record(now);
        record.status = self.status;
        if self.status.is_terminal() {
            record.decided_at = Some(now);
        }
        record
    }
}
