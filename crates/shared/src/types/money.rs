//! Point amounts in integer minor units.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Balances and accruals are stored as hundredths of a point in an `i64`;
//! `rust_decimal::Decimal` is only used at the wire boundary.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of minor units in one point.
const MINOR_PER_MAJOR: i64 = 100;

/// Decimal places carried by the minor unit.
const SCALE: u32 = 2;

/// Errors converting a decimal into an [`Amount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmountError {
    /// The value is below zero.
    #[error("amount must not be negative")]
    Negative,
    /// The value has more than two decimal places.
    #[error("amount has more than two decimal places")]
    TooPrecise,
    /// The value does not fit into the minor-unit range.
    #[error("amount is out of range")]
    Overflow,
}

/// A non-fractional count of point minor units (1 point = 100 minor units).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    /// Zero points.
    pub const ZERO: Self = Self(0);

    /// Wraps a minor-unit count.
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the minor-unit count.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Returns true if the amount is strictly greater than zero.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns true if the amount is below zero.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Converts a decimal point value into minor units.
    ///
    /// Trailing zeros are ignored, so `10.500` is accepted as `10.50`.
    /// Values with a nonzero third decimal are rejected rather than rounded.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError`] for negative, over-precise or out-of-range values.
    pub fn from_major(value: Decimal) -> Result<Self, AmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative);
        }
        if value.normalize().scale() > SCALE {
            return Err(AmountError::TooPrecise);
        }
        value
            .checked_mul(Decimal::from(MINOR_PER_MAJOR))
            .and_then(|minor| minor.to_i64())
            .map(Self)
            .ok_or(AmountError::Overflow)
    }

    /// Converts to a decimal point value with two decimal places.
    #[must_use]
    pub fn to_major(self) -> Decimal {
        Decimal::new(self.0, SCALE)
    }

    /// Adds two amounts, returning `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(sum) => Some(Self(sum)),
            None => None,
        }
    }

    /// Subtracts two amounts, returning `None` on overflow.
    #[must_use]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(diff) => Some(Self(diff)),
            None => None,
        }
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_major())
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}
