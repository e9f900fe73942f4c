//! Import parsers
//!
//! Both parsers are pure: they turn one external row or line into a
//! candidate, or into a reason the input was refused. Resolving clients and
//! storing records is left to [`crate::service::LedgerService`].

pub mod invoice;
pub mod payment;

pub use invoice::{parse_invoice_row, ClientRef, InvoiceCandidate, InvoiceRow};
pub use payment::{parse_payment_line, parse_payment_text, PaymentCandidate, UNKNOWN_CLIENT_NAME};

use chrono::NaiveDate;

use crate::error::StagingError;

/// Parses an import date
///
/// Accepts `YYYY-MM-DD` and slash dates. Slash dates are read day-first
/// (`DD/MM/YYYY`) unless the second segment cannot be a month, in which
/// case they are read month-first (`MM/DD/YYYY`). The year always has four
/// digits.
pub fn parse_date(input: &str) -> Result<NaiveDate, StagingError> {
    let trimmed = input.trim();
    let invalid = || StagingError::validation(format!("invalid date: {:?}", input));

    if trimmed.contains('-') {
        if !trimmed.split('-').next().is_some_and(is_full_year) {
            return Err(invalid());
        }
        return NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| invalid());
    }

    let parts: Vec<&str> = trimmed.split('/').collect();
    let [first, second, year] = parts.as_slice() else {
        return Err(invalid());
    };
    if !is_full_year(year.trim()) {
        return Err(invalid());
    }
    let first: u32 = first.trim().parse().map_err(|_| invalid())?;
    let second: u32 = second.trim().parse().map_err(|_| invalid())?;
    let year: i32 = year.trim().parse().map_err(|_| invalid())?;

    let (day, month) = if second > 12 { (second, first) } else { (first, second) };
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

fn is_full_year(segment: &str) -> bool {
    segment.len() == 4 && segment.chars().all(|c| c.is_ascii_digit())
}

/// Returns the trimmed value, or `None` when it is blank
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_iso_dates() {
        assert_eq!(parse_date("2025-03-20").unwrap(), date(2025, 3, 20));
        assert!(parse_date("2025-13-01").is_err());
    }

    #[test]
    fn test_slash_dates_default_to_day_first() {
        assert_eq!(parse_date("05/03/2025").unwrap(), date(2025, 3, 5));
        assert_eq!(parse_date("17/10/2025").unwrap(), date(2025, 10, 17));
    }

    #[test]
    fn test_slash_dates_month_first_when_unambiguous() {
        assert_eq!(parse_date("03/25/2025").unwrap(), date(2025, 3, 25));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_date("").is_err());
        assert!(parse_date("yesterday").is_err());
        assert!(parse_date("31/02/2025").is_err());
        assert!(parse_date("1/2").is_err());
    }

    #[test]
    fn test_two_digit_years_are_rejected() {
        assert!(matches!(parse_date("20/03/25"), Err(StagingError::Validation(_))));
        assert!(parse_date("03/25/25").is_err());
        assert!(parse_date("25-03-20").is_err());
        assert!(parse_date("20/03/02025").is_err());
    }
}
