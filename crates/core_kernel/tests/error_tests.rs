//! Tests for core_kernel error types

use core_kernel::{CoreError, MoneyError};
use rust_decimal_macros::dec;

#[test]
fn test_core_error_validation() {
    let error = CoreError::validation("Invalid input");

    match error {
        CoreError::Validation(msg) => assert_eq!(msg, "Invalid input"),
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_core_error_not_found() {
    let error = CoreError::not_found("Bill not found");

    match error {
        CoreError::NotFound(msg) => assert!(msg.contains("Bill")),
        _ => panic!("Expected NotFound error"),
    }
}

#[test]
fn test_only_conflicts_are_retryable() {
    assert!(CoreError::conflict("invoice number collision").is_retryable());
    assert!(!CoreError::validation("bad amount").is_retryable());
    assert!(!CoreError::not_found("missing").is_retryable());
    assert!(!CoreError::TransactionFailure("rollback".to_string()).is_retryable());
}

#[test]
fn test_money_error_converts_to_core_error() {
    let money_error = MoneyError::NegativeAmount(dec!(-5));
    let error: CoreError = money_error.into();

    assert!(matches!(error, CoreError::Money(_)));
    assert!(error.to_string().contains("-5"));
}
