//! Invoice row parser
//!
//! Rows come from a spreadsheet export with the columns client id, client
//! name, amount, reference (order or invoice number) and issue date. A row
//! must name its client by id, by name, or both.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{Cents, ClientId};

use super::{non_blank, parse_date};
use crate::error::StagingError;

/// A raw spreadsheet row, every cell as text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceRow {
    pub client_id: Option<String>,
    pub client_name: Option<String>,
    pub amount: String,
    pub reference: String,
    pub issue_date: String,
}

/// How a row identifies its client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientRef {
    /// Numeric id, with the name printed next to it when present
    Id { id: ClientId, name: Option<String> },
    /// Name only; resolved against the registry at ingestion
    Name(String),
}

/// A validated invoice row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceCandidate {
    pub client: ClientRef,
    pub amount: Cents,
    pub reference: String,
    pub issued_on: NaiveDate,
}

/// Validates one invoice row
///
/// # Errors
///
/// * `StagingError::Validation` - Missing client, reference or date, a
///   non-numeric client id, or a non-positive amount
/// * `StagingError::Arithmetic` - The amount cannot be read as money
pub fn parse_invoice_row(row: &InvoiceRow) -> Result<InvoiceCandidate, StagingError> {
    let name = non_blank(row.client_name.as_deref()).map(str::to_string);
    let client = match non_blank(row.client_id.as_deref()) {
        Some(raw) => {
            let id = raw
                .parse::<ClientId>()
                .map_err(|_| StagingError::validation(format!("invalid client id: {:?}", raw)))?;
            ClientRef::Id { id, name }
        }
        None => match name {
            Some(name) => ClientRef::Name(name),
            None => return Err(StagingError::validation("client id or name is required")),
        },
    };

    let amount = Cents::parse(&row.amount)?;
    if !amount.is_positive() {
        return Err(StagingError::validation(format!(
            "amount must be positive: {:?}",
            row.amount
        )));
    }

    let reference = non_blank(Some(&row.reference))
        .ok_or_else(|| StagingError::validation("reference is required"))?
        .to_string();

    if row.issue_date.trim().is_empty() {
        return Err(StagingError::validation("issue date is required"));
    }
    let issued_on = parse_date(&row.issue_date)?;

    Ok(InvoiceCandidate {
        client,
        amount,
        reference,
        issued_on,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: Option<&str>, name: Option<&str>, amount: &str) -> InvoiceRow {
        InvoiceRow {
            client_id: id.map(str::to_string),
            client_name: name.map(str::to_string),
            amount: amount.to_string(),
            reference: "PED-1042".to_string(),
            issue_date: "20/03/2025".to_string(),
        }
    }

    #[test]
    fn test_row_with_id_and_name() {
        let candidate = parse_invoice_row(&row(Some("199"), Some("Bettio"), "1.234,56")).unwrap();
        assert_eq!(
            candidate.client,
            ClientRef::Id {
                id: ClientId::new(199),
                name: Some("Bettio".to_string())
            }
        );
        assert_eq!(candidate.amount, Cents::new(123_456));
        assert_eq!(candidate.reference, "PED-1042");
        assert_eq!(candidate.issued_on, NaiveDate::from_ymd_opt(2025, 3, 20).unwrap());
    }

    #[test]
    fn test_row_with_name_only() {
        let candidate = parse_invoice_row(&row(None, Some(" Bettio "), "10")).unwrap();
        assert_eq!(candidate.client, ClientRef::Name("Bettio".to_string()));
    }

    #[test]
    fn test_row_without_client() {
        let err = parse_invoice_row(&row(Some(" "), None, "10")).unwrap_err();
        assert!(matches!(err, StagingError::Validation(_)));
    }

    #[test]
    fn test_bad_client_id() {
        assert!(matches!(
            parse_invoice_row(&row(Some("abc"), None, "10")),
            Err(StagingError::Validation(_))
        ));
    }

    #[test]
    fn test_amount_errors() {
        assert!(matches!(
            parse_invoice_row(&row(Some("1"), None, "abc")),
            Err(StagingError::Arithmetic(_))
        ));
        assert!(matches!(
            parse_invoice_row(&row(Some("1"), None, "0,00")),
            Err(StagingError::Validation(_))
        ));
        assert!(matches!(
            parse_invoice_row(&row(Some("1"), None, "-5")),
            Err(StagingError::Validation(_))
        ));
    }

    #[test]
    fn test_missing_reference_and_date() {
        let mut no_reference = row(Some("1"), None, "10");
        no_reference.reference = String::new();
        assert!(parse_invoice_row(&no_reference).is_err());

        let mut no_date = row(Some("1"), None, "10");
        no_date.issue_date = "  ".to_string();
        assert!(parse_invoice_row(&no_date).is_err());
    }
}
