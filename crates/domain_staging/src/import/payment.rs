//! Payment text parser
//!
//! Operators paste bank statement lines such as:
//!
//! ```text
//! 17/10/2025	R$ 1.000,00	Pagamentos Bettio/Gprime [199]	G1
//! ```
//!
//! Columns are date, amount, description and account code. The client id is
//! the bracketed number inside the description.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use core_kernel::{Cents, ClientId};

use super::parse_date;
use crate::error::StagingError;

/// Display name used when the description carries no name
pub const UNKNOWN_CLIENT_NAME: &str = "Unknown client";

const EXPECTED_COLUMNS: usize = 4;

static BRACKETED_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(\d+)\]").expect("hardcoded regex should be valid"));
static PAYMENT_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^pagamentos?\s+").expect("hardcoded regex should be valid"));
static GPRIME_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)/\s*g\s*prime$").expect("hardcoded regex should be valid"));
static WIDE_GAP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s{2,}").expect("hardcoded regex should be valid"));

/// A validated payment line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentCandidate {
    pub client_id: ClientId,
    /// Name derived from the description
    pub client_name: String,
    pub amount: Cents,
    /// Full bank description
    pub description: String,
    pub account_code: String,
    pub paid_on: NaiveDate,
}

/// Parses one payment line
///
/// # Errors
///
/// * `StagingError::Validation` - Wrong column count, bad date, missing
///   bracketed id or account code, or a non-positive amount
/// * `StagingError::Arithmetic` - The amount cannot be read as money
pub fn parse_payment_line(line: &str) -> Result<PaymentCandidate, StagingError> {
    let columns = split_columns(line);
    if columns.len() < EXPECTED_COLUMNS {
        return Err(StagingError::validation(format!(
            "expected {} columns, found {}",
            EXPECTED_COLUMNS,
            columns.len()
        )));
    }

    let paid_on = parse_date(columns[0])?;

    let amount = Cents::parse(columns[1])?;
    if !amount.is_positive() {
        return Err(StagingError::validation(format!(
            "amount must be positive: {:?}",
            columns[1]
        )));
    }

    let description = columns[2];
    let client_id = BRACKETED_ID
        .captures(description)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<ClientId>().ok())
        .ok_or_else(|| {
            StagingError::validation(format!("no bracketed client id in {:?}", description))
        })?;

    let account_code = columns[3];
    if account_code.is_empty() {
        return Err(StagingError::validation("account code is required"));
    }

    Ok(PaymentCandidate {
        client_id,
        client_name: display_name(description),
        amount,
        description: description.to_string(),
        account_code: account_code.to_string(),
        paid_on,
    })
}

/// Parses pasted payment text, one line per payment
///
/// Blank lines are ignored. Each result carries its 1-based line number.
pub fn parse_payment_text(text: &str) -> Vec<(usize, Result<PaymentCandidate, StagingError>)> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| (idx + 1, parse_payment_line(line)))
        .collect()
}

fn split_columns(line: &str) -> Vec<&str> {
    let line = line.trim_end_matches(['\r', '\n']);
    let columns: Vec<&str> = if line.contains('\t') {
        line.split('\t').collect()
    } else {
        WIDE_GAP.split(line.trim()).collect()
    };
    columns.into_iter().map(str::trim).collect()
}

/// Name shown for a client that is not in the registry yet
fn display_name(description: &str) -> String {
    let before_bracket = description
        .split_once('[')
        .map_or(description, |(head, _)| head)
        .trim();
    let without_prefix = PAYMENT_PREFIX.replace(before_bracket, "");
    let name = GPRIME_SUFFIX.replace(without_prefix.trim(), "");
    let name = name.trim();

    if name.is_empty() {
        UNKNOWN_CLIENT_NAME.to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_line() {
        let candidate =
            parse_payment_line("17/10/2025\tR$ 1.000,00\tPagamentos Bettio/Gprime [199]\tG1")
                .unwrap();

        assert_eq!(candidate.client_id, ClientId::new(199));
        assert_eq!(candidate.amount, Cents::new(100_000));
        assert_eq!(candidate.account_code, "G1");
        assert_eq!(candidate.client_name, "Bettio");
        assert_eq!(candidate.description, "Pagamentos Bettio/Gprime [199]");
        assert_eq!(candidate.paid_on, NaiveDate::from_ymd_opt(2025, 10, 17).unwrap());
    }

    #[test]
    fn test_space_separated_fallback() {
        let candidate =
            parse_payment_line("17/10/2025   R$ 250,50   Pagamento Acme Ltda [42]   B2").unwrap();
        assert_eq!(candidate.client_id, ClientId::new(42));
        assert_eq!(candidate.amount, Cents::new(25_050));
        assert_eq!(candidate.client_name, "Acme Ltda");
        assert_eq!(candidate.account_code, "B2");
    }

    #[test]
    fn test_display_name_variants() {
        assert_eq!(display_name("PAGAMENTOS Foo / G prime [1]"), "Foo");
        assert_eq!(display_name("Pagamentos [1]"), "Pagamentos");
        assert_eq!(display_name("[1]"), UNKNOWN_CLIENT_NAME);
        assert_eq!(display_name("Transfer Foo"), "Transfer Foo");
    }

    #[test]
    fn test_missing_bracketed_id() {
        let err = parse_payment_line("17/10/2025\t100,00\tPagamentos Bettio\tG1").unwrap_err();
        assert!(matches!(err, StagingError::Validation(_)));
    }

    #[test]
    fn test_wrong_column_count() {
        assert!(parse_payment_line("17/10/2025\t100,00\tPagamentos Bettio [1]").is_err());
    }

    #[test]
    fn test_text_skips_blank_lines() {
        let text = "\n17/10/2025\t10,00\tA [1]\tG1\n   \n18/10/2025\tabc\tB [2]\tG1\n";
        let results = parse_payment_text(text);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, 2);
        assert!(results[0].1.is_ok());
        assert_eq!(results[1].0, 4);
        assert!(matches!(results[1].1, Err(StagingError::Arithmetic(_))));
    }
}
