//! Unit tests for the Money module
//!
//! Covers creation, checked arithmetic, summation and formatting.

use core_kernel::{Currency, Money, MoneyError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

mod creation {
    use super::*;

    #[test]
    fn test_new_creates_money_with_correct_amount() {
        let m = Money::new(dec!(1000.50), Currency::INR);
        assert_eq!(m.amount(), dec!(1000.50));
        assert_eq!(m.currency(), Currency::INR);
    }

    #[test]
    fn test_zero_creates_zero_amount() {
        let m = Money::zero(Currency::EUR);
        assert!(m.is_zero());
        assert!(!m.is_negative());
        assert_eq!(m.currency(), Currency::EUR);
    }

    #[test]
    fn test_default_currency_is_inr() {
        assert_eq!(Currency::default(), Currency::INR);
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_checked_sub_same_currency() {
        let a = Money::new(dec!(4500), Currency::INR);
        let b = Money::new(dec!(1500), Currency::INR);
        assert_eq!(a.checked_sub(&b).unwrap().amount(), dec!(3000));
    }

    #[test]
    fn test_checked_sub_can_go_negative() {
        let a = Money::new(dec!(10), Currency::INR);
        let b = Money::new(dec!(25), Currency::INR);
        assert!(a.checked_sub(&b).unwrap().is_negative());
    }

    #[test]
    fn test_checked_mul_fractional_distance() {
        let per_km = Money::new(dec!(12), Currency::INR);
        assert_eq!(per_km.checked_mul(dec!(12.5)).unwrap().amount(), dec!(150));
    }

    #[test]
    fn test_sum_rejects_mixed_currencies() {
        let items = [
            Money::new(dec!(1), Currency::INR),
            Money::new(dec!(1), Currency::USD),
        ];
        let result = Money::sum(Currency::INR, items.iter());
        assert!(matches!(result, Err(MoneyError::CurrencyMismatch(_, _))));
    }

    #[test]
    fn test_sum_of_amounts() {
        let items = [
            Money::new(dec!(3000), Currency::INR),
            Money::new(dec!(1500), Currency::INR),
            Money::new(dec!(0.25), Currency::INR),
        ];
        assert_eq!(Money::sum(Currency::INR, items.iter()).unwrap().amount(), dec!(4500.25));
    }
}

mod rounding {
    use super::*;

    #[test]
    fn test_round_to_currency_two_places() {
        let m = Money::new(dec!(10.005), Currency::INR);
        assert_eq!(m.round_to_currency().amount(), Decimal::new(1000, 2));
    }

    #[test]
    fn test_round_to_currency_jpy_whole_units() {
        let m = Money::new(dec!(1234.6), Currency::JPY);
        assert_eq!(m.round_to_currency().amount(), dec!(1235));
    }
}

mod serialization {
    use super::*;

    #[test]
    fn test_currency_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Currency::INR).unwrap(), "\"INR\"");
    }

    #[test]
    fn test_money_json_shape() {
        let m = Money::new(dec!(4500), Currency::INR);
        let json = serde_json::to_value(m).unwrap();
        assert_eq!(json["currency"], "INR");
        let back: Money = serde_json::from_value(json).unwrap();
        assert_eq!(back, m);
    }
}
