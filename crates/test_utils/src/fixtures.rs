//! Pre-built Test Fixtures
//!
//! Consistent, predictable test data for clients, dates and import input.

use chrono::NaiveDate;
use core_kernel::{Cents, ClientId};
use domain_ledger::{Client, NewClient};
use domain_staging::import::InvoiceRow;

/// Fixture for registered clients
pub struct ClientFixtures;

impl ClientFixtures {
    /// Client 199 with a payment term and a R$ 5.000,00 limit
    pub fn bettio() -> Client {
        NewClient::new(ClientId::new(199), "Bettio")
            .with_credit_limit(Cents::new(500_000))
            .with_payment_term(true)
            .into_client(chrono::Utc::now())
    }
}

/// Fixture for dates that exercise the due-date rule
pub struct DateFixtures;

impl DateFixtures {
    /// Mid-March, first half of the month
    pub fn first_half() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap_or_default()
    }
}

/// Fixture for raw import input
pub struct ImportFixtures;

impl ImportFixtures {
    /// A bank line for client 199, R$ 1.000,00, account G1
    pub fn payment_line() -> &'static str {
        "17/10/2025\tR$ 1.000,00\tPagamentos Bettio/Gprime [199]\tG1"
    }

    /// Two well-formed invoice rows for client 199
    pub fn invoice_rows() -> Vec<InvoiceRow> {
        vec![
            InvoiceRow {
                client_id: Some("199".to_string()),
                client_name: Some("Bettio".to_string()),
                amount: "1.000,00".to_string(),
                reference: "PED-1001".to_string(),
                issue_date: "10/03/2025".to_string(),
            },
            InvoiceRow {
                client_id: Some("199".to_string()),
                client_name: Some("Bettio".to_string()),
                amount: "500,00".to_string(),
                reference: "PED-1002".to_string(),
                issue_date: "2025-03-20".to_string(),
            },
        ]
    }
}
