//! Monetary amounts for the balance engine
//!
//! `Money` wraps a `rust_decimal::Decimal` and guarantees the wrapped value is
//! never negative. All arithmetic is exact; there is no rounding anywhere in
//! the engine.

use super::error::BalanceError;
use rust_decimal::Decimal;
use std::fmt;

/// Exact, non-negative decimal amount
///
/// Balances and operation amounts are both `Money`. Operation amounts are
/// additionally required to be strictly positive, see [`Money::positive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(Decimal);

impl Money {
    /// Zero amount
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Create a balance amount
    ///
    /// Zero is accepted, negative values are rejected with `InvalidRequest`.
    pub fn new(value: Decimal) -> Result<Self, BalanceError> {
        if value < Decimal::ZERO {
            return Err(BalanceError::invalid_request(format!(
                "amount must not be negative, got {}",
                value
            )));
        }
        Ok(Money(value))
    }

    /// Create an operation amount
    ///
    /// Deposits, withdrawals and transfers move a strictly positive amount;
    /// zero and negative values are rejected with `InvalidRequest`.
    pub fn positive(value: Decimal, operation: &str) -> Result<Self, BalanceError> {
        if value <= Decimal::ZERO {
            return Err(BalanceError::invalid_request(format!(
                "{} amount must be a positive number, got {}",
                operation, value
            )));
        }
        Ok(Money(value))
    }

    /// The underlying decimal value
    pub fn value(self) -> Decimal {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Add two amounts, `None` on decimal overflow
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Subtract `other`, `None` if the result would be negative
    pub fn checked_sub(self, other: Money) -> Option<Money> {
        if other.0 > self.0 {
            return None;
        }
        self.0.checked_sub(other.0).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = BalanceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Money::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorKind;
    use rstest::rstest;

    fn money(units: i64, scale: u32) -> Money {
        Money::new(Decimal::new(units, scale)).unwrap()
    }

    #[rstest]
    #[case::zero(Decimal::ZERO)]
    #[case::whole(Decimal::new(1000, 0))]
    #[case::fraction(Decimal::new(1, 4))]
    fn test_new_accepts_non_negative(#[case] value: Decimal) {
        assert_eq!(Money::new(value).unwrap().value(), value);
    }

    #[test]
    fn test_new_rejects_negative() {
        let err = Money::new(Decimal::new(-1, 2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }

    #[rstest]
    #[case::zero(Decimal::ZERO)]
    #[case::negative(Decimal::new(-500, 0))]
    fn test_positive_rejects_non_positive(#[case] value: Decimal) {
        let err = Money::positive(value, "deposit").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert!(err.to_string().contains("deposit amount must be a positive number"));
    }

    #[test]
    fn test_positive_accepts_smallest_unit() {
        let amount = Money::positive(Decimal::new(1, 28), "transfer").unwrap();
        assert_eq!(amount.value(), Decimal::new(1, 28));
    }

    #[test]
    fn test_checked_add_is_exact() {
        // 0.1 + 0.2 must be exactly 0.3, no float drift
        let sum = money(1, 1).checked_add(money(2, 1)).unwrap();
        assert_eq!(sum, money(3, 1));
    }

    #[test]
    fn test_checked_add_overflow() {
        let max = Money::new(Decimal::MAX).unwrap();
        assert!(max.checked_add(money(1, 0)).is_none());
    }

    #[rstest]
    #[case::leaves_remainder(money(1000, 0), money(100, 0), Some(money(900, 0)))]
    #[case::to_zero(money(100, 0), money(100, 0), Some(Money::ZERO))]
    #[case::would_go_negative(money(100, 0), money(200, 0), None)]
    #[case::by_smallest_unit(money(100, 0), money(1000001, 4), None)]
    fn test_checked_sub(
        #[case] balance: Money,
        #[case] amount: Money,
        #[case] expected: Option<Money>,
    ) {
        assert_eq!(balance.checked_sub(amount), expected);
    }

    #[test]
    fn test_ordering_ignores_scale() {
        assert_eq!(money(100, 0), money(10000, 2));
        assert!(money(1, 0) < money(101, 2));
    }

    #[test]
    fn test_display_keeps_scale() {
        assert_eq!(money(120000, 2).to_string(), "1200.00");
    }
}
