//! Custom Test Assertions
//!
//! Assertion helpers for ledger types that print the figures involved
//! instead of a bare `assertion failed`.

use core_kernel::{Cents, StagingId};
use domain_ledger::{open_balance, Statement};
use domain_staging::{BatchReport, Decision, StagingError};

/// Asserts that a statement agrees with its own postings
///
/// Checks that the period subtotals add up to the open balance, that the
/// open balance is the signed sum of every posting, and that the available
/// credit is the limit minus the open balance.
///
/// # Panics
///
/// Panics with the mismatching figures when any check fails
pub fn assert_statement_consistent(statement: &Statement) {
    let subtotal_sum: Cents = statement.periods.iter().map(|p| p.subtotal).sum();
    assert_eq!(
        subtotal_sum, statement.open_balance,
        "Period subtotals ({}) do not add up to the open balance ({})",
        subtotal_sum, statement.open_balance
    );

    let recomputed = open_balance(statement.periods.iter().flat_map(|p| p.postings.iter()))
        .unwrap_or_else(|e| panic!("Open balance overflowed: {}", e));
    assert_eq!(
        recomputed, statement.open_balance,
        "Open balance ({}) differs from the posting sum ({})",
        statement.open_balance, recomputed
    );

    let expected_available = statement.client.credit_limit - statement.open_balance;
    assert_eq!(
        statement.available_credit, expected_available,
        "Available credit ({}) should be limit ({}) minus open balance ({})",
        statement.available_credit, statement.client.credit_limit, statement.open_balance
    );

    let keys: Vec<_> = statement.periods.iter().map(|p| p.key).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted, "Periods are not in chronological order");
}

/// Asserts the success and error counts of a batch report
///
/// # Panics
///
/// Panics when the counts differ or do not match the per-item results
pub fn assert_batch_counts(report: &BatchReport, successes: usize, errors: usize) {
    assert_eq!(
        (report.successes, report.errors),
        (successes, errors),
        "Expected {} successes and {} errors, got {} and {}: {:?}",
        successes,
        errors,
        report.successes,
        report.errors,
        report.items
    );
    assert_eq!(
        report.items.len(),
        successes + errors,
        "Batch report lists {} items for {} decisions",
        report.items.len(),
        successes + errors
    );
}

/// Returns the outcome recorded for a staging id, panicking if it is absent
pub fn batch_result<'a>(
    report: &'a BatchReport,
    id: StagingId,
) -> &'a Result<Decision, StagingError> {
    report
        .items
        .iter()
        .find(|item| item.id == id)
        .map(|item| &item.result)
        .unwrap_or_else(|| panic!("No batch item for staging id {}", id))
}
