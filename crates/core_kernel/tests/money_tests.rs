//! Unit tests for the Cents money type
//!
//! Covers parsing of imported values, rounding, arithmetic and decimal
//! conversion.

use core_kernel::{Cents, MoneyError};
use rust_decimal_macros::dec;

mod parsing {
    use super::*;

    #[test]
    fn test_parse_currency_symbol_and_thousands() {
        assert_eq!(Cents::parse("R$ 1.000,00").unwrap(), Cents::new(100_000));
        assert_eq!(Cents::parse("R$1.234.567,89").unwrap(), Cents::new(123_456_789));
    }

    #[test]
    fn test_parse_plain_integer() {
        assert_eq!(Cents::parse("150").unwrap(), Cents::new(15_000));
    }

    #[test]
    fn test_parse_single_separator_as_decimal() {
        assert_eq!(Cents::parse("10,5").unwrap(), Cents::new(1050));
        assert_eq!(Cents::parse("10.55").unwrap(), Cents::new(1055));
        assert_eq!(Cents::parse("0,125").unwrap(), Cents::new(13));
    }

    #[test]
    fn test_parse_single_separator_as_thousands() {
        assert_eq!(Cents::parse("1.000").unwrap(), Cents::new(100_000));
        assert_eq!(Cents::parse("2,500").unwrap(), Cents::new(250_000));
        assert_eq!(Cents::parse("1.000.000").unwrap(), Cents::new(100_000_000));
    }

    #[test]
    fn test_parse_negative_values() {
        assert_eq!(Cents::parse("-R$ 5,00").unwrap(), Cents::new(-500));
        assert_eq!(Cents::parse("R$ -5,00").unwrap(), Cents::new(-500));
    }

    #[test]
    fn test_parse_trailing_currency_code() {
        assert_eq!(Cents::parse("1.234,56 BRL").unwrap(), Cents::new(123_456));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Cents::parse(""), Err(MoneyError::Empty));
        assert!(matches!(Cents::parse("R$"), Err(MoneyError::Unparseable(_))));
        assert!(matches!(Cents::parse("1 2"), Err(MoneyError::Unparseable(_))));
    }

    #[test]
    fn test_parse_rejects_stray_text_and_bad_grouping() {
        for input in ["abc5", "x1.000,00", "10 reais", "1.000.5", "12.34.567", "1.0000,00"] {
            assert!(
                matches!(Cents::parse(input), Err(MoneyError::Unparseable(_))),
                "{input} should not parse"
            );
        }
        assert_eq!(Cents::parse("R$ 1.000,00").unwrap(), Cents::new(100_000));
        assert_eq!(Cents::parse("1.000.000").unwrap(), Cents::new(100_000_000));
        assert_eq!(Cents::parse("BRL 10,00").unwrap(), Cents::new(1_000));
    }

    #[test]
    fn test_from_str() {
        let value: Cents = "99,99".parse().unwrap();
        assert_eq!(value, Cents::new(9999));
    }
}

mod rounding {
    use super::*;

    #[test]
    fn test_half_cent_rounds_away_from_zero() {
        assert_eq!(Cents::from_decimal(dec!(0.005)).unwrap(), Cents::new(1));
        assert_eq!(Cents::from_decimal(dec!(0.025)).unwrap(), Cents::new(3));
        assert_eq!(Cents::from_decimal(dec!(-0.025)).unwrap(), Cents::new(-3));
    }

    #[test]
    fn test_below_half_rounds_down() {
        assert_eq!(Cents::from_decimal(dec!(1.004)).unwrap(), Cents::new(100));
    }
}

mod conversion {
    use super::*;

    #[test]
    fn test_round_trip_two_decimal_places() {
        for value in [dec!(1234.56), dec!(0.01), dec!(1000), dec!(-42.10)] {
            let cents = Cents::from_decimal(value).unwrap();
            assert_eq!(cents.to_decimal(), value);
        }
    }

    #[test]
    fn test_display_uses_major_units() {
        assert_eq!(Cents::new(123_456).to_string(), "1234.56");
    }

    #[test]
    fn test_serde_is_transparent() {
        let json = serde_json::to_string(&Cents::new(1050)).unwrap();
        assert_eq!(json, "1050");
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_add_sub_neg() {
        let a = Cents::new(1000);
        let b = Cents::new(250);
        assert_eq!(a + b, Cents::new(1250));
        assert_eq!(a - b, Cents::new(750));
        assert_eq!(-a, Cents::new(-1000));
    }

    #[test]
    fn test_sum() {
        let total: Cents = [Cents::new(1), Cents::new(2), Cents::new(3)].iter().sum();
        assert_eq!(total, Cents::new(6));
    }

    #[test]
    fn test_checked_overflow() {
        assert_eq!(Cents::new(i64::MAX).checked_add(Cents::new(1)), Err(MoneyError::Overflow));
        assert_eq!(Cents::new(i64::MIN).checked_sub(Cents::new(1)), Err(MoneyError::Overflow));
    }
}
