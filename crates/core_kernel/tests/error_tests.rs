//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::money::MoneyError;

#[test]
fn test_core_error_validation() {
    let error = CoreError::validation("Client name is required");

    match error {
        CoreError::Validation(msg) => assert_eq!(msg, "Client name is required"),
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_core_error_invalid_state() {
    let error = CoreError::invalid_state("Cannot approve a rejected record");

    match error {
        CoreError::InvalidStateTransition(msg) => assert!(msg.contains("rejected")),
        _ => panic!("Expected InvalidStateTransition error"),
    }
}

#[test]
fn test_core_error_not_found() {
    let error = CoreError::not_found("Client 42");
    assert!(matches!(error, CoreError::NotFound(ref msg) if msg == "Client 42"));
}

#[test]
fn test_core_error_from_money_error() {
    let money_error = MoneyError::Unparseable("R$ abc".to_string());
    let core_error: CoreError = money_error.into();

    assert!(matches!(core_error, CoreError::Money(_)));
    assert!(core_error.to_string().contains("R$ abc"));
}
