//! Invoice due-date rule
//!
//! - No payment term: due immediately (`None`)
//! - Issued on days 1 to 15: due on day 30 of the same month
//! - Issued on day 16 or later: due on day 15 of the next month
//!
//! Months shorter than 30 days (February) clamp the day-30 due date to the
//! last day of the month.

use chrono::{Datelike, Months, NaiveDate};

/// Day of the month that splits the two halves of the rule
const FIRST_HALF_LAST_DAY: u32 = 15;
/// Due day for invoices issued in the first half
const FIRST_HALF_DUE_DAY: u32 = 30;
/// Due day (next month) for invoices issued in the second half
const SECOND_HALF_DUE_DAY: u32 = 15;

/// Computes the due date for an invoice
///
/// # Arguments
///
/// * `issued_on` - Invoice issue date
/// * `has_payment_term` - The client's payment term flag at approval time
///
/// # Returns
///
/// The due date, or `None` when the invoice is due immediately
pub fn due_date(issued_on: NaiveDate, has_payment_term: bool) -> Option<NaiveDate> {
    if !has_payment_term {
        return None;
    }

    if issued_on.day() <= FIRST_HALF_LAST_DAY {
        let day = FIRST_HALF_DUE_DAY.min(last_day_of_month(issued_on));
        issued_on.with_day(day)
    } else {
        issued_on
            .with_day(1)
            .and_then(|first| first.checked_add_months(Months::new(1)))
            .and_then(|next| next.with_day(SECOND_HALF_DUE_DAY))
    }
}

fn last_day_of_month(date: NaiveDate) -> u32 {
    date.with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_first_half_due_day_30() {
        assert_eq!(due_date(date(2025, 3, 10), true), Some(date(2025, 3, 30)));
        assert_eq!(due_date(date(2025, 3, 1), true), Some(date(2025, 3, 30)));
        assert_eq!(due_date(date(2025, 3, 15), true), Some(date(2025, 3, 30)));
    }

    #[test]
    fn test_second_half_due_next_month() {
        assert_eq!(due_date(date(2025, 3, 20), true), Some(date(2025, 4, 15)));
        assert_eq!(due_date(date(2025, 3, 16), true), Some(date(2025, 4, 15)));
        assert_eq!(due_date(date(2025, 1, 31), true), Some(date(2025, 2, 15)));
    }

    #[test]
    fn test_december_rolls_into_next_year() {
        assert_eq!(due_date(date(2025, 12, 20), true), Some(date(2026, 1, 15)));
    }

    #[test]
    fn test_february_clamps_to_month_end() {
        assert_eq!(due_date(date(2025, 2, 10), true), Some(date(2025, 2, 28)));
        assert_eq!(due_date(date(2024, 2, 10), true), Some(date(2024, 2, 29)));
    }

    #[test]
    fn test_thirty_one_day_month_keeps_day_30() {
        assert_eq!(due_date(date(2025, 1, 5), true), Some(date(2025, 1, 30)));
    }

    #[test]
    fn test_no_payment_term_is_immediate() {
        assert_eq!(due_date(date(2025, 3, 10), false), None);
        assert_eq!(due_date(date(2025, 3, 20), false), None);
    }
}
