//! Tests for core_kernel error types

use chrono::NaiveDate;
use core_kernel::error::CoreError;
use core_kernel::money::MoneyError;
use core_kernel::temporal::{DateRange, TemporalError};

#[test]
fn test_core_error_validation() {
    let error = CoreError::validation("daily rate must be positive");

    match error {
        CoreError::Validation(msg) => assert_eq!(msg, "daily rate must be positive"),
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_core_error_configuration() {
    let error = CoreError::configuration("missing rate for bus");
    assert!(error.to_string().contains("Configuration error"));
    assert!(error.to_string().contains("bus"));
}

#[test]
fn test_core_error_from_money_error() {
    let money_error = MoneyError::CurrencyMismatch("INR".to_string(), "USD".to_string());
    let core_error: CoreError = money_error.into();

    assert!(matches!(core_error, CoreError::Money(_)));
    assert!(core_error.to_string().contains("INR"));
}

#[test]
fn test_core_error_from_temporal_error() {
    let start = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let temporal: TemporalError = DateRange::new(start, end).unwrap_err();
    let core_error: CoreError = temporal.into();

    assert!(matches!(core_error, CoreError::Temporal(TemporalError::InvalidPeriod { .. })));
    assert!(core_error.to_string().contains("2024-03-02"));
}
