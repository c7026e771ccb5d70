//! Denominated token amounts.

use serde::{Deserialize, Serialize};

use super::Amount;

/// An [Amount] of a single named denomination.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct Coin {
    /// The token denomination.
    pub denom: String,
    /// The number of tokens.
    pub amount: Amount,
}

impl Coin {
    /// Creates a new coin of the given denomination and amount.
    pub fn new<D: Into<String>, A: Into<Amount>>(denom: D, amount: A) -> Self {
        Coin {
            denom: denom.into(),
            amount: amount.into(),
        }
    }
}

impl std::fmt::Display for Coin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

// The encoding is a one-byte length prefix, the denomination's UTF-8 bytes,
// then the fixed-width amount. Length-prefixing keeps the encoding bijective
// and self-delimiting so coins may appear in any field position.
impl ed::Encode for Coin {
    fn encode_into<W: std::io::Write>(&self, dest: &mut W) -> ed::Result<()> {
        let len: u8 = self
            .denom
            .len()
            .try_into()
            .map_err(|_| ed::Error::UnexpectedByte(0))?;
        dest.write_all(&[len])?;
        dest.write_all(self.denom.as_bytes())?;
        self.amount.encode_into(dest)?;
        Ok(())
    }

    fn encoding_length(&self) -> ed::Result<usize> {
        Ok(1 + self.denom.len() + self.amount.encoding_length()?)
    }
}

impl ed::Decode for Coin {
    fn decode<R: std::io::Read>(mut source: R) -> ed::Result<Self> {
        let mut len = [0u8; 1];
        source.read_exact(&mut len)?;

        let mut denom = vec![0u8; len[0] as usize];
        source.read_exact(&mut denom)?;
        let denom = String::from_utf8(denom).map_err(|_| ed::Error::UnexpectedByte(4))?;

        let amount = Amount::decode(&mut source)?;
        Ok(Coin { denom, amount })
    }
}

impl ed::Terminated for Coin {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{Decode, Encode};

    #[test]
    fn display() {
        assert_eq!(Coin::new("atom", 400u64).to_string(), "400atom");
    }

    #[test]
    fn encoding_round_trip() {
        let coin = Coin::new("atom", 1000u64);
        let bytes = coin.encode().unwrap();
        assert_eq!(bytes.len(), coin.encoding_length().unwrap());
        assert_eq!(Coin::decode(bytes.as_slice()).unwrap(), coin);
    }

    #[test]
    fn encoding_is_length_prefixed() {
        let bytes = Coin::new("atom", 1u64).encode().unwrap();
        assert_eq!(bytes[0], 4);
        assert_eq!(&bytes[1..5], b"atom");
        assert_eq!(bytes.len(), 13);
    }
}
