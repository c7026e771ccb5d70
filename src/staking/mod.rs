//! Cosmos-style staking state machine.
//!
//! Delegators bond tokens to validators in exchange for shares, a
//! proportional claim on the validator's token pool. Shares convert back to
//! tokens through a time-locked unbonding period, or move between
//! validators through redelegation records that block transitive hops.
//!
//! All state lives in an ordered key-value store under the byte layout of
//! [keys]; the [Keeper] applies transitions against any [crate::store::Store]
//! handle it is given, so the caller decides what backs the state and when
//! it is committed.

mod delegation;
pub mod keys;
mod types;
mod validator;

pub use types::{Delegation, Pool, Redelegation, UnbondingDelegation, Validator};

use crate::bank::Accounts;

/// Default unbonding period length in seconds.
pub const UNBONDING_SECONDS: u64 = 60 * 60 * 24 * 14; // 2 weeks

/// Staking parameters, a read-only snapshot for the duration of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Params {
    /// Seconds an unbonding delegation or redelegation stays locked.
    pub unbonding_seconds: u64,
    /// The only coin denomination eligible for staking.
    pub bond_denom: String,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            unbonding_seconds: UNBONDING_SECONDS,
            bond_denom: "stake".into(),
        }
    }
}

/// The staking module's owner of record: applies transitions and gives
/// typed access to the delegation ledger.
///
/// The keeper holds no store of its own; every operation takes the store
/// handle it should read and write through, along with the current
/// [crate::context::BlockContext].
pub struct Keeper<B = Accounts> {
    pub(crate) bank: B,
    pub(crate) params: Params,
}

impl<B> Keeper<B> {
    /// Creates a keeper over the given balance module and parameter
    /// snapshot.
    pub fn new(bank: B, params: Params) -> Self {
        Keeper { bank, params }
    }

    /// The parameter snapshot this keeper was constructed with.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The balance module this keeper debits and credits through.
    pub fn bank(&self) -> &B {
        &self.bank
    }
}
