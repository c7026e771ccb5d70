//! Safe decimal amounts.

use std::ops::{Add, Div, Mul, Sub};
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal as NumDecimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::Amount;
use crate::{Error, Result};

/// Fractional digits carried by share and token arithmetic.
pub const DECIMAL_PLACES: u32 = 18;

/// A fixed-precision decimal for deterministic financial calculations.
///
/// Multiplication and division quantize to [DECIMAL_PLACES] fractional
/// digits with round-half-to-even, and conversion to an integer [Amount]
/// truncates toward zero, so every replica computing the same transition
/// produces the same bits.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Decimal {
    pub(crate) value: NumDecimal,
}

impl Decimal {
    /// Returns a new `Decimal` with value zero.
    pub fn zero() -> Self {
        Decimal {
            value: NumDecimal::ZERO,
        }
    }

    /// Returns a new `Decimal` with value one.
    pub fn one() -> Self {
        Decimal {
            value: NumDecimal::ONE,
        }
    }

    /// Returns true if the value is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Converts the decimal to an [Amount], truncating any fractional part
    /// toward zero. Returns an error if the value is negative or exceeds
    /// `u64::MAX`.
    pub fn amount(&self) -> Result<Amount> {
        if self.value.is_sign_negative() && !self.value.is_zero() {
            return Err(Error::Coins("Amounts may not be negative".into()));
        }
        match self.value.trunc().to_u64() {
            Some(value) => Ok(value.into()),
            None => Err(Error::Coins(
                "Amounts may not be greater than u64::MAX".into(),
            )),
        }
    }
}

impl std::fmt::Display for Decimal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.value.fmt(f)
    }
}

impl From<NumDecimal> for Decimal {
    fn from(value: NumDecimal) -> Self {
        Decimal { value }
    }
}

impl From<u64> for Decimal {
    fn from(value: u64) -> Self {
        Decimal {
            value: value.into(),
        }
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        Self {
            value: amount.0.into(),
        }
    }
}

impl FromStr for Decimal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self {
            value: NumDecimal::from_str(s)?,
        })
    }
}

impl Add for Decimal {
    type Output = Result<Self>;

    fn add(self, other: Self) -> Result<Self> {
        self.value
            .checked_add(other.value)
            .map(Self::from)
            .ok_or(Error::Overflow)
    }
}

impl Sub for Decimal {
    type Output = Result<Self>;

    fn sub(self, other: Self) -> Result<Self> {
        self.value
            .checked_sub(other.value)
            .map(Self::from)
            .ok_or(Error::Overflow)
    }
}

impl Mul for Decimal {
    type Output = Result<Self>;

    fn mul(self, other: Self) -> Result<Self> {
        self.value
            .checked_mul(other.value)
            .map(|value| {
                Self::from(value.round_dp_with_strategy(
                    DECIMAL_PLACES,
                    RoundingStrategy::MidpointNearestEven,
                ))
            })
            .ok_or(Error::Overflow)
    }
}

impl Div for Decimal {
    type Output = Result<Self>;

    fn div(self, other: Self) -> Result<Self> {
        if other.is_zero() {
            return Err(Error::Coins("Division by zero".into()));
        }
        self.value
            .checked_div(other.value)
            .map(|value| {
                Self::from(value.round_dp_with_strategy(
                    DECIMAL_PLACES,
                    RoundingStrategy::MidpointNearestEven,
                ))
            })
            .ok_or(Error::Overflow)
    }
}

impl ed::Encode for Decimal {
    fn encode_into<W: std::io::Write>(&self, dest: &mut W) -> ed::Result<()> {
        dest.write_all(&self.value.serialize())?;
        Ok(())
    }

    fn encoding_length(&self) -> ed::Result<usize> {
        Ok(16)
    }
}

impl ed::Decode for Decimal {
    fn decode<R: std::io::Read>(mut source: R) -> ed::Result<Self> {
        let mut bytes = [0u8; 16];
        source.read_exact(&mut bytes)?;
        Ok(Decimal {
            value: NumDecimal::deserialize(bytes),
        })
    }
}

impl ed::Terminated for Decimal {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{Decode, Encode};
    use rust_decimal_macros::dec;

    #[test]
    fn format() {
        let formatted: Decimal = dec!(1.23).into();
        assert_eq!(format!("{}", formatted), "1.23");
    }

    #[test]
    fn mul_div_round_half_to_even() -> Result<()> {
        // 1 / 3 * 3 quantizes at 18 places rather than returning to 1
        let third = (Decimal::one() / Decimal::from(3))?;
        assert_eq!(third, dec!(0.333333333333333333).into());
        let back = (third * Decimal::from(3))?;
        assert_eq!(back, dec!(0.999999999999999999).into());

        // ties round to the even neighbor at the 18th place
        let tie: Decimal = dec!(0.0000000000000000015).into();
        assert_eq!(
            (tie * Decimal::one())?,
            dec!(0.000000000000000002).into()
        );
        let tie: Decimal = dec!(0.0000000000000000025).into();
        assert_eq!(
            (tie * Decimal::one())?,
            dec!(0.000000000000000002).into()
        );
        Ok(())
    }

    #[test]
    fn amount_truncates_toward_zero() -> Result<()> {
        let value: Decimal = dec!(399.999999999999999999).into();
        assert_eq!(value.amount()?, 399);

        let value: Decimal = dec!(400.0).into();
        assert_eq!(value.amount()?, 400);

        let negative: Decimal = dec!(-1.5).into();
        assert!(negative.amount().is_err());
        Ok(())
    }

    #[test]
    fn encoding_round_trip() {
        let value: Decimal = dec!(12.345678901234567890).into();
        let bytes = value.encode().unwrap();
        assert_eq!(bytes.len(), 16);
        assert_eq!(Decimal::decode(bytes.as_slice()).unwrap(), value);
    }
}
