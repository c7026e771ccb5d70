//! Staking record types.
//!
//! These are the value objects persisted by the ledger. Both their binary
//! encoding (see [crate::encoding]) and their JSON field names are
//! consensus-visible and must stay stable.

use ed::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::coins::{Address, Coin, Decimal};

/// A delegator's share position at a single validator.
///
/// A delegation exists only while it holds shares: it is created by the
/// first successful delegate and destroyed when its shares reach zero.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Delegation {
    /// The bonding account.
    pub delegator: Address,
    /// Operator address of the validator the shares are held at.
    pub validator: Address,
    /// The delegator's proportional claim on the validator's tokens.
    pub shares: Decimal,
    /// Height of the block in which the delegation was last modified.
    pub height: i64,
}

impl Delegation {
    /// Creates a zero-share delegation for the pair, ready to absorb newly
    /// issued shares.
    pub fn new(delegator: Address, validator: Address) -> Self {
        Delegation {
            delegator,
            validator,
            shares: Decimal::zero(),
            height: 0,
        }
    }
}

/// Tokens unbonded from a validator, locked until `min_time_seconds`.
///
/// At most one unbonding delegation exists per `(delegator, validator)`
/// pair.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UnbondingDelegation {
    /// The unbonding account.
    pub delegator: Address,
    /// Operator address of the validator unbonded from.
    pub validator: Address,
    /// Balance at the time the unbonding began.
    pub initial_balance: Coin,
    /// Remaining balance to be released at maturity.
    pub balance: Coin,
    /// Unix time at which the balance may be released.
    pub min_time_seconds: i64,
}

/// A record of stake moved between validators, locked until
/// `min_time_seconds` to prevent chained redelegations.
///
/// At most one redelegation exists per `(delegator, src, dst)` triple. The
/// destination validator already holds the stake; completion merely removes
/// the record constraining further redelegations.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Redelegation {
    /// The redelegating account.
    pub delegator: Address,
    /// Operator address of the source validator.
    pub validator_src: Address,
    /// Operator address of the destination validator.
    pub validator_dst: Address,
    /// Balance at the time the redelegation began.
    pub initial_balance: Coin,
    /// Remaining redelegated balance.
    pub balance: Coin,
    /// Shares removed from the source validator.
    pub shares_src: Decimal,
    /// Shares issued by the destination validator.
    pub shares_dst: Decimal,
    /// Unix time at which the record may be released.
    pub min_time_seconds: i64,
}

/// A validator's staking state.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Validator {
    /// Operator address, the validator's identity.
    pub operator: Address,
    /// Tokens bonded to this validator.
    pub tokens: Decimal,
    /// Total shares issued to this validator's delegators.
    pub delegator_shares: Decimal,
    /// Whether the validator has been removed from active duty.
    pub jailed: bool,
    /// Height of the block in which the validator was first bonded.
    pub bond_height: i64,
}

impl Validator {
    /// Creates a new empty validator for the given operator address.
    pub fn new(operator: Address) -> Self {
        Validator {
            operator,
            tokens: Decimal::zero(),
            delegator_shares: Decimal::zero(),
            jailed: false,
            bond_height: 0,
        }
    }
}

/// Global staking accounting: tokens held by validators versus tokens in
/// unbonding escrow.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct Pool {
    /// Tokens currently bonded to validators.
    pub bonded_tokens: Decimal,
    /// Tokens in unbonding escrow awaiting release.
    pub loose_tokens: Decimal,
}
