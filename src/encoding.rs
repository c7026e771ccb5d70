//! Deterministic binary encoding for persisted records.
//!
//! Record types implement [Encode] and [Decode] (length-prefixed where a
//! field is variable-width), so encoding a record and decoding it yields the
//! original bits. Decoding is only ever applied to bytes this crate wrote,
//! so a failure means the store itself is corrupt.

pub use ed::{Decode, Encode, Terminated};

use crate::{Error, Result};

/// Decodes a persisted record, mapping any failure to the fatal
/// [Error::StoreCorruption]. Transitions must abort the enclosing block on
/// this error rather than treating it as a rejected transaction.
pub fn decode<T: Decode>(bytes: &[u8]) -> Result<T> {
    T::decode(bytes).map_err(|err| Error::StoreCorruption(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_failure_is_corruption() {
        let err = decode::<u64>(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, Error::StoreCorruption(_)));
    }

    #[test]
    fn decode_round_trip() {
        let bytes = 42u64.encode().unwrap();
        assert_eq!(decode::<u64>(&bytes).unwrap(), 42);
    }
}
