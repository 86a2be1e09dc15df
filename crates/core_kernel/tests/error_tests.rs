//! Tests for core_kernel error types

use std::error::Error;

use core_kernel::money::MoneyError;
use core_kernel::PortError;

#[test]
fn test_currency_mismatch_names_both_currencies() {
    let error = MoneyError::CurrencyMismatch("USD".to_string(), "TZS".to_string());
    let message = error.to_string();

    assert!(message.contains("USD"));
    assert!(message.contains("TZS"));
}

#[test]
fn test_port_error_validation_has_no_field_by_default() {
    match PortError::validation("amount must be positive") {
        PortError::Validation { message, field } => {
            assert_eq!(message, "amount must be positive");
            assert!(field.is_none());
        }
        other => panic!("Expected Validation error, got {other:?}"),
    }
}

#[test]
fn test_port_error_conflict() {
    let error = PortError::conflict("journal entry JE-000001 is already posted");

    assert!(error.is_conflict());
    assert!(!error.is_not_found());
    assert!(error.to_string().starts_with("Conflict"));
}

#[test]
fn test_port_error_keeps_source() {
    let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
    let error = PortError::Connection {
        message: "database unreachable".to_string(),
        source: Some(Box::new(io)),
    };

    assert!(error.is_transient());
    assert!(error.source().is_some());
}

#[test]
fn test_internal_error_is_not_transient() {
    let error = PortError::internal("row decode failed");

    assert!(!error.is_transient());
    assert!(error.to_string().contains("row decode failed"));
}
