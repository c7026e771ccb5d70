//! Integer token quantities.

use std::ops::{Add, Sub};

use ed::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A non-negative quantity of tokens of a single denomination.
///
/// Arithmetic is checked: results that would underflow below zero or
/// overflow `u64::MAX` are errors, never wrapped values.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Default, Clone, Copy)]
#[serde(transparent)]
pub struct Amount(pub(crate) u64);

impl Amount {
    /// Creates a new `Amount` of the given number of tokens.
    pub fn new(value: u64) -> Self {
        Amount(value)
    }

    /// Returns the raw integer value.
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Returns true if the amount is zero tokens.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialOrd for Amount {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.0.cmp(&other.0))
    }
}

impl Ord for Amount {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl Eq for Amount {}

impl<I: Into<Amount> + Copy> PartialEq<I> for Amount {
    fn eq(&self, other: &I) -> bool {
        self.0 == (*other).into().0
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount::new(value)
    }
}

impl<I: Into<Self>> Add<I> for Amount {
    type Output = Result<Self>;

    fn add(self, other: I) -> Result<Self> {
        let other = other.into();
        self.0
            .checked_add(other.0)
            .map(Amount::new)
            .ok_or(Error::Overflow)
    }
}

impl<I: Into<Self>> Sub<I> for Amount {
    type Output = Result<Self>;

    fn sub(self, other: I) -> Result<Self> {
        let other = other.into();
        self.0
            .checked_sub(other.0)
            .map(Amount::new)
            .ok_or_else(|| Error::Coins("Amounts may not be negative".into()))
    }
}
