//! Exact currency amounts.

use std::{fmt, iter::Sum, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Number of fractional digits stored for every amount.
pub const AMOUNT_SCALE: u32 = 2;

/// Largest digit count an amount may carry (integer plus fractional digits).
pub const AMOUNT_PRECISION: u32 = 10;

/// A non-negative currency value with exactly two fractional digits.
///
/// Construction validates sign, scale and magnitude, so every `Amount` in the
/// system is safe to sum without rounding. Differences that may turn negative
/// (e.g. remaining budget) are carried as plain [`Decimal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative(value));
        }
        if value.normalize().scale() > AMOUNT_SCALE {
            return Err(AmountError::TooPrecise(value));
        }
        if value >= max_exclusive() {
            return Err(AmountError::TooLarge(value));
        }
        let mut stored = value.abs();
        stored.rescale(AMOUNT_SCALE);
        Ok(Self(stored))
    }

    /// Parses a decimal string such as `"12.50"`.
    pub fn parse(raw: &str) -> Result<Self, AmountError> {
        let trimmed = raw.trim();
        let value =
            Decimal::from_str(trimmed).map_err(|_| AmountError::NotNumeric(trimmed.to_string()))?;
        Self::new(value)
    }

    pub fn value(self) -> Decimal {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }
}

fn max_exclusive() -> Decimal {
    Decimal::from_i128_with_scale(10_i128.pow(AMOUNT_PRECISION - AMOUNT_SCALE), 0)
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Amount::parse(raw)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Sum<Amount> for Decimal {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Decimal {
        iter.fold(Decimal::ZERO, |acc, amount| acc + amount.0)
    }
}

impl<'a> Sum<&'a Amount> for Decimal {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Decimal {
        iter.fold(Decimal::ZERO, |acc, amount| acc + amount.0)
    }
}

/// Reasons a value cannot be stored as an [`Amount`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    NotNumeric(String),
    Negative(Decimal),
    TooPrecise(Decimal),
    TooLarge(Decimal),
}

impl fmt::Display for AmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::NotNumeric(raw) => write!(f, "amount `{raw}` is not a number"),
            AmountError::Negative(value) => write!(f, "amount {value} must not be negative"),
            AmountError::TooPrecise(value) => write!(
                f,
                "amount {value} has more than {AMOUNT_SCALE} decimal places"
            ),
            AmountError::TooLarge(value) => write!(
                f,
                "amount {value} exceeds {} integer digits",
                AMOUNT_PRECISION - AMOUNT_SCALE
            ),
        }
    }
}

impl std::error::Error for AmountError {}
