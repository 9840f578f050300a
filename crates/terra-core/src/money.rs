//! Compile-time-light wrapper for monetary quantities.
//!
//! Keeps ARR/ATR/pipeline values from being silently summed against plain
//! counts, and centralises the "parse-or-default-zero" coercion the domain
//! model requires: non-finite inputs become zero rather than propagating
//! NaN into the optimizer.

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, Sub};

/// A monetary amount (currency left to the caller; the source data is USD).
///
/// `#[repr(transparent)]` so the wrapper costs nothing at runtime.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Money(pub f64);

impl Money {
    /// Construct from a raw value, coercing non-finite input to zero.
    ///
    /// This is the one place the "never mix strings and numbers, treat
    /// non-finite as 0" coercion rule lives for monetary fields.
    #[inline]
    pub fn coerce(value: f64) -> Self {
        if value.is_finite() {
            Self(value)
        } else {
            Self(0.0)
        }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self(0.0)
    }

    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn max(self, other: Self) -> Self {
        Self(self.0.max(other.0))
    }

    #[inline]
    pub fn floor_at_zero(self) -> Self {
        Self(self.0.max(0.0))
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|m| m.0).sum())
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        Self(iter.map(|m| m.0).sum())
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_keeps_finite_values() {
        assert_eq!(Money::coerce(150.0).value(), 150.0);
    }

    #[test]
    fn coerce_zeroes_non_finite() {
        assert_eq!(Money::coerce(f64::NAN).value(), 0.0);
        assert_eq!(Money::coerce(f64::INFINITY).value(), 0.0);
        assert_eq!(Money::coerce(f64::NEG_INFINITY).value(), 0.0);
    }

    #[test]
    fn arithmetic() {
        let a = Money(100.0);
        let b = Money(50.0);
        assert_eq!((a + b).value(), 150.0);
        assert_eq!((a - b).value(), 50.0);
        assert_eq!(a.max(b).value(), 100.0);
    }

    #[test]
    fn floor_at_zero_clamps_negative() {
        assert_eq!(Money(-5.0).floor_at_zero().value(), 0.0);
        assert_eq!(Money(5.0).floor_at_zero().value(), 5.0);
    }

    #[test]
    fn sum_over_iterator() {
        let values = vec![Money(10.0), Money(20.0), Money(30.0)];
        let total: Money = values.into_iter().sum();
        assert_eq!(total.value(), 60.0);
    }

    #[test]
    fn display_format() {
        assert_eq!(format!("{}", Money(1234.5)), "$1234.50");
    }
}
