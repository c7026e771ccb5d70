//! Financial primitives.

pub mod amount;
pub use amount::Amount;

pub mod coin;
pub use coin::Coin;

pub mod decimal;
pub use decimal::Decimal;

use std::fmt::Display;
use std::str::FromStr;

use bech32::{encode_to_fmt, FromBase32, ToBase32, Variant};
use ripemd::{Digest as _, Ripemd160};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

/// Human-readable part of the bech32 address encoding.
const BECH32_HRP: &str = "stake";

/// 20-byte `ripemd160(sha256(pubkey))` account address.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Address {
    bytes: [u8; Address::LENGTH],
}

impl Address {
    /// Address length in bytes. Fixed width, so concatenated addresses in
    /// store keys parse unambiguously.
    pub const LENGTH: usize = 20;

    /// Creates an address from a compressed secp256k1 pubkey.
    pub fn from_pubkey(bytes: [u8; 33]) -> Self {
        let mut sha = Sha256::new();
        sha.update(bytes);
        let hash = sha.finalize();

        let mut ripemd = Ripemd160::new();
        ripemd.update(hash);
        let hash = ripemd.finalize();

        let mut bytes = [0; Address::LENGTH];
        bytes.copy_from_slice(hash.as_slice());

        Self { bytes }
    }

    /// Returns the bytes of the address.
    pub fn bytes(&self) -> [u8; Address::LENGTH] {
        self.bytes
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        encode_to_fmt(f, BECH32_HRP, self.bytes.to_base32(), Variant::Bech32).unwrap()
    }
}

impl FromStr for Address {
    type Err = bech32::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hrp, data, variant) = bech32::decode(s)?;
        if hrp != BECH32_HRP {
            return Err(bech32::Error::MissingSeparator);
        }
        if variant != Variant::Bech32 {
            return Err(bech32::Error::InvalidData(0));
        }
        let data: Vec<u8> = FromBase32::from_base32(&data)?;

        if data.len() != Address::LENGTH {
            return Err(bech32::Error::InvalidData(1));
        }
        let mut bytes = [0u8; Address::LENGTH];
        bytes.copy_from_slice(&data);

        Ok(Address { bytes })
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct AddressVisitor;

        impl<'de> serde::de::Visitor<'de> for AddressVisitor {
            type Value = Address;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a bech32-encoded string")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                value.parse().map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_str(AddressVisitor)
    }
}

impl From<[u8; Address::LENGTH]> for Address {
    fn from(bytes: [u8; Address::LENGTH]) -> Self {
        Address { bytes }
    }
}

impl From<Address> for [u8; Address::LENGTH] {
    fn from(addr: Address) -> Self {
        addr.bytes()
    }
}

impl ed::Encode for Address {
    fn encode_into<W: std::io::Write>(&self, dest: &mut W) -> ed::Result<()> {
        dest.write_all(&self.bytes)?;
        Ok(())
    }

    fn encoding_length(&self) -> ed::Result<usize> {
        Ok(Address::LENGTH)
    }
}

impl ed::Decode for Address {
    fn decode<R: std::io::Read>(mut source: R) -> ed::Result<Self> {
        let mut bytes = [0u8; Address::LENGTH];
        source.read_exact(&mut bytes)?;
        Ok(Address { bytes })
    }
}

impl ed::Terminated for Address {}
