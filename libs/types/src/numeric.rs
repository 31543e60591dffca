//! Exact integer currency amounts
//!
//! All monetary values are whole cents held in an `i128`. There is no
//! floating-point representation anywhere on the aggregation path, and every
//! arithmetic step is checked so that a result can never silently wrap.

use crate::errors::{ArithmeticError, ParseError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An amount of money in integer cents
///
/// Signed so that liquidity (supply minus borrow) can go negative when
/// upstream data has borrow exceeding supply. Serializes as a bare JSON
/// integer with every digit preserved.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Cents(i128);

impl Cents {
    pub const ZERO: Cents = Cents(0);

    pub const fn new(value: i128) -> Self {
        Self(value)
    }

    /// Get the raw integer value
    pub const fn value(self) -> i128 {
        self.0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, rhs: Cents) -> Result<Cents, ArithmeticError> {
        self.0
            .checked_add(rhs.0)
            .map(Cents)
            .ok_or(ArithmeticError::Overflow { op: "addition" })
    }

    pub fn checked_sub(self, rhs: Cents) -> Result<Cents, ArithmeticError> {
        self.0
            .checked_sub(rhs.0)
            .map(Cents)
            .ok_or(ArithmeticError::Overflow { op: "subtraction" })
    }
}

impl From<i64> for Cents {
    fn from(value: i64) -> Self {
        Self(i128::from(value))
    }
}

impl FromStr for Cents {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i128>()
            .map(Cents)
            .map_err(|_| ParseError::InvalidCents(s.to_string()))
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
