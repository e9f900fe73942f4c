//! Integer minor-unit money
//!
//! Every amount in the ledger is held as a whole number of cents. Decimal
//! values only appear at the edges: when parsing user or import input and when
//! handing a value to a presentation layer. Parsing goes through
//! `rust_decimal` so that no floating-point drift can leak into the stored
//! integers.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while converting monetary values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Empty monetary value")]
    Empty,

    #[error("Unparseable monetary value: {0}")]
    Unparseable(String),

    #[error("Overflow during calculation")]
    Overflow,
}

/// An amount of money in cents (1/100 of the major currency unit)
///
/// `Cents` is a plain signed integer so sums and differences are exact. The
/// ledger stores posting amounts as non-negative magnitudes and applies the
/// sign once, during aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cents(i64);

impl Cents {
    pub const ZERO: Cents = Cents(0);

    /// Creates an amount from a raw number of cents
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw number of cents
    pub const fn value(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the magnitude of the amount
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Checked addition, returning `MoneyError::Overflow` instead of wrapping
    pub fn checked_add(&self, other: Cents) -> Result<Cents, MoneyError> {
        self.0.checked_add(other.0).map(Cents).ok_or(MoneyError::Overflow)
    }

    /// Checked subtraction, returning `MoneyError::Overflow` instead of wrapping
    pub fn checked_sub(&self, other: Cents) -> Result<Cents, MoneyError> {
        self.0.checked_sub(other.0).map(Cents).ok_or(MoneyError::Overflow)
    }

    /// Converts an exact decimal amount in major units to cents
    ///
    /// Fractions of a cent are rounded half away from zero, so `0.005`
    /// becomes one cent and `-0.005` becomes minus one cent.
    pub fn from_decimal(amount: Decimal) -> Result<Self, MoneyError> {
        let scaled = amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(MoneyError::Overflow)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

        scaled.to_i64().map(Cents).ok_or(MoneyError::Overflow)
    }

    /// Converts the amount to a decimal in major units (`cents / 100`)
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Parses a human-entered monetary value into cents
    ///
    /// Accepts a leading or trailing currency marker (`R$`, `$`, `€`, `£`,
    /// `BRL`, `USD`, `EUR`), either `.` or `,` as decimal separator, and the
    /// other one as thousands separator. Any other letter is rejected.
    ///
    /// # Separator detection
    ///
    /// - Both `.` and `,` present: the right-most one is the decimal separator
    /// - One kind present more than once: it is a thousands separator and
    ///   every group after the first has three digits
    /// - One kind present once: decimal separator, unless exactly three
    ///   digits follow it and the integer part is non-zero (`1.000`)
    ///
    /// # Example
    ///
    /// ```rust
    /// use core_kernel::Cents;
    ///
    /// assert_eq!(Cents::parse("R$ 1.234,56").unwrap(), Cents::new(123456));
    /// assert_eq!(Cents::parse("1,234.56").unwrap(), Cents::new(123456));
    /// assert_eq!(Cents::parse("10,5").unwrap(), Cents::new(1050));
    /// ```
    pub fn parse(input: &str) -> Result<Self, MoneyError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(MoneyError::Empty);
        }

        let unparseable = || MoneyError::Unparseable(input.to_string());

        let (negative, body) = strip_symbols(trimmed).ok_or_else(unparseable)?;
        if !body.chars().any(|c| c.is_ascii_digit()) {
            return Err(unparseable());
        }
        if !body.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
            return Err(unparseable());
        }

        let decimal_separator = detect_decimal_separator(body).ok_or_else(unparseable)?;

        let mut normalized = String::with_capacity(body.len() + 2);
        if negative {
            normalized.push('-');
        }
        for ch in body.chars() {
            match ch {
                '0'..='9' => normalized.push(ch),
                sep if Some(sep) == decimal_separator => normalized.push('.'),
                _ => {}
            }
        }
        if normalized.ends_with('.') {
            normalized.push('0');
        }
        let normalized = normalized.replace("-.", "-0.");
        let normalized = if normalized.starts_with('.') {
            format!("0{normalized}")
        } else {
            normalized
        };

        let amount = Decimal::from_str(&normalized).map_err(|_| unparseable())?;
        Self::from_decimal(amount)
    }
}

/// Currency markers accepted around an amount, matched case-insensitively
const CURRENCY_MARKERS: [&str; 7] = ["R$", "BRL", "USD", "EUR", "$", "€", "£"];

/// Splits the input into its sign and numeric core.
///
/// Returns `None` when anything other than whitespace, a leading `-` or a
/// known currency marker surrounds the number.
fn strip_symbols(input: &str) -> Option<(bool, &str)> {
    let is_numeric = |c: char| c.is_ascii_digit() || c == '.' || c == ',';

    let start = input.find(is_numeric)?;
    let end = input
        .char_indices()
        .rev()
        .find(|(_, c)| is_numeric(*c))
        .map(|(idx, c)| idx + c.len_utf8())?;

    let negative = only_markers(&input[..start], true)?;
    only_markers(&input[end..], false)?;
    Some((negative, &input[start..end]))
}

/// Consumes markers, whitespace and (when allowed) minus signs, reporting
/// whether a minus sign was seen.
fn only_markers(mut rest: &str, allow_sign: bool) -> Option<bool> {
    let mut negative = false;
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            return Some(negative);
        }
        if allow_sign {
            if let Some(after) = rest.strip_prefix('-') {
                negative = true;
                rest = after;
                continue;
            }
        }
        let marker = CURRENCY_MARKERS.iter().find(|marker| {
            rest.get(..marker.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(marker))
        })?;
        rest = &rest[marker.len()..];
    }
}

/// Returns `Some(Some(sep))` for a decimal separator, `Some(None)` for a
/// whole number, and `None` when the separators are inconsistent.
fn detect_decimal_separator(body: &str) -> Option<Option<char>> {
    let dots = body.matches('.').count();
    let commas = body.matches(',').count();

    match (dots, commas) {
        (0, 0) => Some(None),
        (_, 0) => single_kind_separator(body, '.', dots),
        (0, _) => single_kind_separator(body, ',', commas),
        _ => {
            let last_dot = body.rfind('.')?;
            let last_comma = body.rfind(',')?;
            let (decimal, thousands, count, at) = if last_dot > last_comma {
                ('.', ',', dots, last_dot)
            } else {
                (',', '.', commas, last_comma)
            };
            // The decimal separator may appear only once
            if count != 1 || !is_grouped(&body[..at], thousands) {
                return None;
            }
            Some(Some(decimal))
        }
    }
}

fn single_kind_separator(body: &str, sep: char, count: usize) -> Option<Option<char>> {
    if count > 1 {
        return is_grouped(body, sep).then_some(None);
    }
    let (integer, fraction) = body.split_once(sep)?;
    let integer_is_zero = integer.trim_start_matches('0').is_empty();
    if fraction.len() == 3 && !integer_is_zero {
        Some(None)
    } else {
        Some(Some(sep))
    }
}

/// Thousands grouping: a leading group of one to three digits, then groups
/// of exactly three.
fn is_grouped(integer: &str, sep: char) -> bool {
    let mut groups = integer.split(sep);
    let leading_ok = groups
        .next()
        .is_some_and(|first| (1..=3).contains(&first.len()));
    leading_ok && groups.all(|group| group.len() == 3)
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl FromStr for Cents {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<i64> for Cents {
    fn from(cents: i64) -> Self {
        Self(cents)
    }
}

impl From<Cents> for i64 {
    fn from(cents: Cents) -> i64 {
        cents.0
    }
}

impl Add for Cents {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl Sub for Cents {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl AddAssign for Cents {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl SubAssign for Cents {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Cents {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Sum for Cents {
    fn sum<I: Iterator<Item = Cents>>(iter: I) -> Self {
        iter.fold(Cents::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Cents> for Cents {
    fn sum<I: Iterator<Item = &'a Cents>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_brazilian_format() {
        assert_eq!(Cents::parse("1.234,56").unwrap(), Cents::new(123456));
        assert_eq!(Cents::parse("R$ 1.000,00").unwrap(), Cents::new(100000));
    }

    #[test]
    fn test_parse_us_format() {
        assert_eq!(Cents::parse("$1,234.56").unwrap(), Cents::new(123456));
        assert_eq!(Cents::parse("12.5").unwrap(), Cents::new(1250));
    }

    #[test]
    fn test_parse_rounds_half_away_from_zero() {
        assert_eq!(Cents::parse("0,005").unwrap(), Cents::new(1));
        assert_eq!(Cents::parse("0.015").unwrap(), Cents::new(2));
        assert_eq!(Cents::parse("-0,005").unwrap(), Cents::new(-1));
        assert_eq!(Cents::parse("0,004").unwrap(), Cents::new(0));
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!(Cents::new(123456).to_decimal(), dec!(1234.56));
        assert_eq!(Cents::new(-5).to_decimal(), dec!(-0.05));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Cents::parse("   "), Err(MoneyError::Empty));
        assert!(matches!(Cents::parse("abc"), Err(MoneyError::Unparseable(_))));
        assert!(matches!(Cents::parse("12a34"), Err(MoneyError::Unparseable(_))));
        assert!(matches!(Cents::parse("1,2,3.4.5"), Err(MoneyError::Unparseable(_))));
        assert!(matches!(Cents::parse("12,34.56"), Err(MoneyError::Unparseable(_))));
    }

    #[test]
    fn test_only_known_markers_are_stripped() {
        assert_eq!(Cents::parse("brl 10,00").unwrap(), Cents::new(1_000));
        assert_eq!(Cents::parse("€5").unwrap(), Cents::new(500));
        assert_eq!(Cents::parse("5 USD").unwrap(), Cents::new(500));
        assert!(strip_symbols("abc5").is_none());
        assert!(strip_symbols("5 -").is_none());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn decimal_round_trip_is_exact(cents in -1_000_000_000i64..1_000_000_000i64) {
            let original = Cents::new(cents);
            prop_assert_eq!(Cents::from_decimal(original.to_decimal()).unwrap(), original);
        }

        #[test]
        fn display_parses_back(cents in 0i64..1_000_000_000i64) {
            let original = Cents::new(cents);
            let rendered = format!("{:.2}", original.to_decimal());
            prop_assert_eq!(Cents::parse(&rendered).unwrap(), original);
        }
    }
}
