//! Value Objects for the marketplace

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rounds a money amount to cents, half away from zero.
pub fn to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Quantity of a cart or order line. Always at least one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: i64) -> Result<Self, QuantityError> {
        if value < 1 { return Err(QuantityError::NotPositive(value)); }
        u32::try_from(value).map(Self).map_err(|_| QuantityError::TooLarge(value))
    }
    pub fn one() -> Self { Self(1) }
    pub fn value(self) -> u32 { self.0 }
    pub fn checked_add(self, other: Quantity) -> Option<Self> { self.0.checked_add(other.0).map(Self) }
    /// Line total for `unit` price.
    pub fn times(self, unit: Decimal) -> Decimal { unit * Decimal::from(self.0) }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;
    fn try_from(value: i64) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Quantity> for u32 {
    fn from(q: Quantity) -> Self { q.0 }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum QuantityError { NotPositive(i64), TooLarge(i64) }
impl std::error::Error for QuantityError {}
impl fmt::Display for QuantityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPositive(v) => write!(f, "quantity must be at least 1, got {v}"),
            Self::TooLarge(v) => write!(f, "quantity {v} is too large"),
        }
    }
}

impl From<QuantityError> for crate::MarketError {
    fn from(err: QuantityError) -> Self {
        match err { QuantityError::NotPositive(v) | QuantityError::TooLarge(v) => Self::InvalidQuantity(v) }
    }
}

/// Percentage in the closed range 0..=100.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Percent(Decimal);

impl Percent {
    pub fn new(value: Decimal) -> Result<Self, PercentError> {
        if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED { return Err(PercentError(value)); }
        Ok(Self(value))
    }
    pub fn zero() -> Self { Self(Decimal::ZERO) }
    pub fn value(self) -> Decimal { self.0 }
    pub fn is_zero(self) -> bool { self.0.is_zero() }
    /// `amount` reduced by this percentage.
    pub fn reduce(self, amount: Decimal) -> Decimal { amount - amount * self.0 / Decimal::ONE_HUNDRED }
}

impl Default for Percent { fn default() -> Self { Self::zero() } }

impl TryFrom<Decimal> for Percent {
    type Error = PercentError;
    fn try_from(value: Decimal) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Percent> for Decimal {
    fn from(p: Percent) -> Self { p.0 }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub struct PercentError(pub Decimal);
impl std::error::Error for PercentError {}
impl fmt::Display for PercentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "percentage {} is outside 0-100", self.0) }
}

impl From<PercentError> for crate::MarketError {
    fn from(err: PercentError) -> Self { Self::Validation(err.to_string()) }
}
