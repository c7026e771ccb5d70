//! Byte-level key schema for staking state.
//!
//! Each logical table gets a one-byte prefix, and addresses are fixed-width,
//! so a scan over `prefix | addr` is a well-defined lexicographic range.
//! This layout is consensus-visible: two replicas applying the same
//! transitions must produce byte-identical store contents.

use crate::coins::Address;

/// Key of the global staking pool record.
pub const POOL_KEY: &[u8] = &[0x01];

/// Table prefix for validator records, keyed by operator address.
pub const VALIDATORS_KEY: u8 = 0x21;
/// Table prefix for the validators-by-power index.
pub const VALIDATORS_BY_POWER_KEY: u8 = 0x23;
/// Table prefix for delegation records.
pub const DELEGATION_KEY: u8 = 0x31;
/// Table prefix for unbonding delegation records.
pub const UNBONDING_DELEGATION_KEY: u8 = 0x32;
/// Table prefix for the unbonding-delegations-by-validator index.
pub const UNBONDING_DELEGATION_BY_VAL_KEY: u8 = 0x33;
/// Table prefix for redelegation records.
pub const REDELEGATION_KEY: u8 = 0x34;
/// Table prefix for the redelegations-by-source-validator index.
pub const REDELEGATION_BY_VAL_SRC_KEY: u8 = 0x35;
/// Table prefix for the redelegations-by-destination-validator index.
pub const REDELEGATION_BY_VAL_DST_KEY: u8 = 0x36;

fn concat(prefix: u8, parts: &[&[u8]]) -> Vec<u8> {
    let len = 1 + parts.iter().map(|part| part.len()).sum::<usize>();
    let mut key = Vec::with_capacity(len);
    key.push(prefix);
    for part in parts {
        key.extend_from_slice(part);
    }
    key
}

/// `0x21 | operator` → Validator
pub fn validator_key(operator: Address) -> Vec<u8> {
    concat(VALIDATORS_KEY, &[&operator.bytes()])
}

/// `0x23 | power_be | operator` → operator bytes
///
/// Power is big-endian so ascending key order is ascending power.
pub fn validator_by_power_key(power: u64, operator: Address) -> Vec<u8> {
    concat(
        VALIDATORS_BY_POWER_KEY,
        &[&power.to_be_bytes(), &operator.bytes()],
    )
}

/// `0x31 | delegator | validator` → Delegation
pub fn delegation_key(delegator: Address, validator: Address) -> Vec<u8> {
    concat(DELEGATION_KEY, &[&delegator.bytes(), &validator.bytes()])
}

/// Prefix of all delegation keys for one delegator.
pub fn delegations_key(delegator: Address) -> Vec<u8> {
    concat(DELEGATION_KEY, &[&delegator.bytes()])
}

/// `0x32 | delegator | validator` → UnbondingDelegation
pub fn ubd_key(delegator: Address, validator: Address) -> Vec<u8> {
    concat(
        UNBONDING_DELEGATION_KEY,
        &[&delegator.bytes(), &validator.bytes()],
    )
}

/// Prefix of all unbonding delegation keys for one delegator.
pub fn ubds_key(delegator: Address) -> Vec<u8> {
    concat(UNBONDING_DELEGATION_KEY, &[&delegator.bytes()])
}

/// `0x33 | validator | delegator` → ∅ (index marker)
pub fn ubd_by_val_index_key(delegator: Address, validator: Address) -> Vec<u8> {
    concat(
        UNBONDING_DELEGATION_BY_VAL_KEY,
        &[&validator.bytes(), &delegator.bytes()],
    )
}

/// Prefix of the by-validator index for one validator.
pub fn ubds_by_val_index_key(validator: Address) -> Vec<u8> {
    concat(UNBONDING_DELEGATION_BY_VAL_KEY, &[&validator.bytes()])
}

/// Recovers the primary unbonding delegation key from a by-validator index
/// key, or `None` if the index key is malformed.
pub fn ubd_key_from_val_index_key(index_key: &[u8]) -> Option<Vec<u8>> {
    let (validator, delegator) = split_pair(index_key)?;
    Some(ubd_key(delegator, validator))
}

/// `0x34 | delegator | src | dst` → Redelegation
pub fn red_key(delegator: Address, src: Address, dst: Address) -> Vec<u8> {
    concat(
        REDELEGATION_KEY,
        &[&delegator.bytes(), &src.bytes(), &dst.bytes()],
    )
}

/// Prefix of all redelegation keys for one delegator.
pub fn reds_key(delegator: Address) -> Vec<u8> {
    concat(REDELEGATION_KEY, &[&delegator.bytes()])
}

/// `0x35 | src | delegator | dst` → ∅ (index marker)
pub fn red_by_val_src_index_key(delegator: Address, src: Address, dst: Address) -> Vec<u8> {
    concat(
        REDELEGATION_BY_VAL_SRC_KEY,
        &[&src.bytes(), &delegator.bytes(), &dst.bytes()],
    )
}

/// Prefix of the by-source index for one source validator.
pub fn reds_from_val_src_index_key(src: Address) -> Vec<u8> {
    concat(REDELEGATION_BY_VAL_SRC_KEY, &[&src.bytes()])
}

/// Recovers the primary redelegation key from a by-source index key, or
/// `None` if the index key is malformed.
pub fn red_key_from_val_src_index_key(index_key: &[u8]) -> Option<Vec<u8>> {
    let (src, delegator, dst) = split_triple(index_key)?;
    Some(red_key(delegator, src, dst))
}

/// `0x36 | dst | delegator | src` → ∅ (index marker)
pub fn red_by_val_dst_index_key(delegator: Address, src: Address, dst: Address) -> Vec<u8> {
    concat(
        REDELEGATION_BY_VAL_DST_KEY,
        &[&dst.bytes(), &delegator.bytes(), &src.bytes()],
    )
}

/// Prefix of the by-destination index entries for one `(delegator,
/// destination)` pair. Scanned by the transitive-redelegation guard.
pub fn reds_by_del_to_val_dst_index_key(delegator: Address, dst: Address) -> Vec<u8> {
    concat(
        REDELEGATION_BY_VAL_DST_KEY,
        &[&dst.bytes(), &delegator.bytes()],
    )
}

/// Recovers the primary redelegation key from a by-destination index key, or
/// `None` if the index key is malformed.
pub fn red_key_from_val_dst_index_key(index_key: &[u8]) -> Option<Vec<u8>> {
    let (dst, delegator, src) = split_triple(index_key)?;
    Some(red_key(delegator, src, dst))
}

fn split_pair(key: &[u8]) -> Option<(Address, Address)> {
    if key.len() != 1 + 2 * Address::LENGTH {
        return None;
    }
    Some((address_at(key, 1), address_at(key, 1 + Address::LENGTH)))
}

fn split_triple(key: &[u8]) -> Option<(Address, Address, Address)> {
    if key.len() != 1 + 3 * Address::LENGTH {
        return None;
    }
    Some((
        address_at(key, 1),
        address_at(key, 1 + Address::LENGTH),
        address_at(key, 1 + 2 * Address::LENGTH),
    ))
}

fn address_at(key: &[u8], offset: usize) -> Address {
    let mut bytes = [0u8; Address::LENGTH];
    bytes.copy_from_slice(&key[offset..offset + Address::LENGTH]);
    Address::from(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::from([byte; 20])
    }

    #[test]
    fn delegation_key_layout() {
        let key = delegation_key(addr(0xaa), addr(0xbb));
        assert_eq!(
            hex::encode(key),
            format!("31{}{}", "aa".repeat(20), "bb".repeat(20)),
        );
    }

    #[test]
    fn index_key_layouts() {
        let key = ubd_by_val_index_key(addr(0xaa), addr(0xbb));
        assert_eq!(
            hex::encode(key),
            format!("33{}{}", "bb".repeat(20), "aa".repeat(20)),
        );

        let key = red_by_val_src_index_key(addr(0x0a), addr(0x0b), addr(0x0c));
        assert_eq!(
            hex::encode(key),
            format!("35{}{}{}", "0b".repeat(20), "0a".repeat(20), "0c".repeat(20)),
        );

        let key = red_by_val_dst_index_key(addr(0x0a), addr(0x0b), addr(0x0c));
        assert_eq!(
            hex::encode(key),
            format!("36{}{}{}", "0c".repeat(20), "0a".repeat(20), "0b".repeat(20)),
        );
    }

    #[test]
    fn index_keys_invert_to_primary_keys() {
        let (del, src, dst) = (addr(1), addr(2), addr(3));

        let index = ubd_by_val_index_key(del, src);
        assert_eq!(ubd_key_from_val_index_key(&index), Some(ubd_key(del, src)));

        let index = red_by_val_src_index_key(del, src, dst);
        assert_eq!(
            red_key_from_val_src_index_key(&index),
            Some(red_key(del, src, dst)),
        );

        let index = red_by_val_dst_index_key(del, src, dst);
        assert_eq!(
            red_key_from_val_dst_index_key(&index),
            Some(red_key(del, src, dst)),
        );

        assert_eq!(red_key_from_val_src_index_key(&[0x35, 0x01]), None);
    }

    #[test]
    fn power_index_orders_ascending() {
        let low = validator_by_power_key(5, addr(9));
        let high = validator_by_power_key(1000, addr(1));
        assert!(low < high);
    }
}
