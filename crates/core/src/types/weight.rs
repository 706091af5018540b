//! Shipment weight arithmetic.
//!
//! Shopify reports line item weight in grams; the courier expects kilograms.
//! Weights are summed as integers and converted with decimal arithmetic so
//! 1300 g becomes exactly 1.3 kg.

use std::iter::Sum;
use std::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A weight in whole grams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grams(u64);

impl Grams {
    #[must_use]
    pub const fn new(grams: u64) -> Self {
        Self(grams)
    }

    /// Total weight of `quantity` units weighing `self` each.
    #[must_use]
    pub const fn times(self, quantity: u64) -> Self {
        Self(self.0.saturating_mul(quantity))
    }

    /// Convert to kilograms.
    #[must_use]
    pub fn to_kilograms(self) -> Decimal {
        (Decimal::from(self.0) / Decimal::from(1000_u64)).normalize()
    }
}

impl Add for Grams {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Grams {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}
