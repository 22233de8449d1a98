use crate::error::{Result, WorkZenError};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// A monetary value.
///
/// Wraps `rust_decimal::Decimal` so payroll arithmetic never goes through
/// floating point. Intermediate results keep full precision; [`Money::rounded`]
/// is applied only when a figure is reported on a payslip.
///
/// All arithmetic is checked: an amount outside the range of `Decimal` is a
/// validation error, never a panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Money(pub Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// `rate` percent of this amount.
    pub fn percent(&self, rate: Decimal) -> Result<Self> {
        self.scale(rate / HUNDRED)
    }

    /// This amount multiplied by a ratio (e.g. the attendance ratio).
    pub fn scale(&self, ratio: Decimal) -> Result<Self> {
        self.0
            .checked_mul(ratio)
            .map(Self)
            .ok_or_else(|| overflow(format!("{} x {}", self.0, ratio)))
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or_else(|| overflow(format!("{} + {}", self.0, rhs.0)))
    }

    pub fn checked_sub(self, rhs: Self) -> Result<Self> {
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .ok_or_else(|| overflow(format!("{} - {}", self.0, rhs.0)))
    }

    pub fn checked_sum<'a>(amounts: impl IntoIterator<Item = &'a Money>) -> Result<Self> {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, |total, amount| total.checked_add(*amount))
    }

    /// Rounded to two decimal places, midpoint away from zero, without
    /// trailing zeros.
    pub fn rounded(&self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
                .normalize(),
        )
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

fn overflow(operation: String) -> WorkZenError {
    WorkZenError::validation(format!("amount out of range: {operation}"))
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_arithmetic() {
        let a = Money::new(dec!(10.0));
        let b = Money::new(dec!(5.0));
        assert_eq!(a.checked_add(b).unwrap(), Money::new(dec!(15.0)));
        assert_eq!(a.checked_sub(b).unwrap(), Money::new(dec!(5.0)));

        let total = Money::checked_sum(&[a, b, b]).unwrap();
        assert_eq!(total, Money::new(dec!(20)));
    }

    #[test]
    fn test_percent_and_scale() {
        let wage = Money::new(dec!(50000));
        assert_eq!(wage.percent(dec!(50)).unwrap(), Money::new(dec!(25000)));
        assert_eq!(wage.percent(dec!(8.33)).unwrap(), Money::new(dec!(4165)));
        assert_eq!(wage.scale(dec!(0.95)).unwrap(), Money::new(dec!(47500)));
    }

    #[test]
    fn test_overflow_is_an_error() {
        let huge = Money::new(Decimal::MAX);
        assert!(matches!(huge.percent(dec!(150)), Err(WorkZenError::ValidationError(_))));
        assert!(huge.scale(dec!(2)).is_err());
        assert!(huge.checked_add(Money::new(dec!(1))).is_err());
        assert!(Money::new(Decimal::MIN).checked_sub(Money::new(dec!(1))).is_err());
        assert!(Money::checked_sum(&[huge, huge]).is_err());
        // Shrinking a huge amount is fine.
        assert!(huge.percent(dec!(50)).is_ok());
        assert_eq!(huge.scale(dec!(0)).unwrap(), Money::ZERO);
    }

    #[test]
    fn test_rounding_is_half_away_from_zero() {
        assert_eq!(Money::new(dec!(10.005)).rounded(), Money::new(dec!(10.01)));
        assert_eq!(Money::new(dec!(10.004)).rounded(), Money::new(dec!(10.00)));
        assert_eq!(Money::new(dec!(-10.005)).rounded(), Money::new(dec!(-10.01)));
        assert_eq!(Money::new(dec!(40375.00)).rounded().to_string(), "40375");
    }

    #[test]
    fn test_is_negative() {
        assert!(Money::new(dec!(-0.01)).is_negative());
        assert!(!Money::ZERO.is_negative());
        assert!(!Money::new(dec!(1)).is_negative());
    }
}
