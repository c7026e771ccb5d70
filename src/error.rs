use thiserror::Error;

use crate::coins::Decimal;

/// Stable numeric namespace for staking failure codes.
pub const CODESPACE: u8 = 4;

/// Errors for all operations in this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// Coin or account failure, including errors propagated verbatim from
    /// the balance module.
    #[error("Coins Error: {0}")]
    Coins(String),
    /// Store access failure.
    #[error("Store Error: {0}")]
    Store(String),
    /// A persisted record failed to decode. Fatal: the store is corrupt and
    /// the enclosing block must abort.
    #[error("Store Corruption: {0}")]
    StoreCorruption(String),
    /// A staking transition was rejected.
    #[error(transparent)]
    Staking(#[from] StakingError),
    /// Encoding failure.
    #[error(transparent)]
    Encoding(#[from] ed::Error),
    /// Decimal parsing failure.
    #[error(transparent)]
    Decimal(#[from] rust_decimal::Error),
    /// Integer overflow.
    #[error("Overflow")]
    Overflow,
}

/// A result with this crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// The closed set of reasons a staking transition can be rejected.
///
/// Each kind carries a stable numeric code under [CODESPACE]; the codes are
/// consensus-visible and must never be renumbered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StakingError {
    /// The delegator holds no shares at this validator.
    #[error("no delegation for this (delegator, validator) pair")]
    NoDelegation,
    /// No validator record exists at this operator address.
    #[error("validator does not exist for that address")]
    NoValidator,
    /// More shares were requested than the delegation holds.
    #[error("insufficient delegation shares: held {held}, requested {requested}")]
    InsufficientShares {
        /// Shares currently held by the delegation.
        held: Decimal,
        /// Shares the transition asked to remove.
        requested: Decimal,
    },
    /// An unbonding delegation already exists for this pair.
    #[error("unbonding delegation already exists for this (delegator, validator) pair")]
    ExistingUnbondingDelegation,
    /// Completion was requested but no unbonding delegation exists.
    #[error("no unbonding delegation found")]
    NoUnbondingDelegation,
    /// The record's time lock has not yet elapsed.
    #[error("not mature: matures at {min_time_seconds}, current time {now_seconds}")]
    NotMature {
        /// Unix time at which the record matures.
        min_time_seconds: i64,
        /// Current block time.
        now_seconds: i64,
    },
    /// The source validator is itself the destination of an active
    /// redelegation, so moving stake off of it again is forbidden.
    #[error("transitive redelegation")]
    TransitiveRedelegation,
    /// The destination validator does not exist.
    #[error("redelegation destination validator not found")]
    BadRedelegationDst,
    /// Completion was requested but no redelegation exists.
    #[error("no redelegation found")]
    NoRedelegation,
}

impl StakingError {
    /// The stable code of this failure within [CODESPACE].
    pub fn code(&self) -> u8 {
        match self {
            StakingError::NoDelegation => 1,
            StakingError::NoValidator => 2,
            StakingError::InsufficientShares { .. } => 3,
            StakingError::ExistingUnbondingDelegation => 4,
            StakingError::NoUnbondingDelegation => 5,
            StakingError::NotMature { .. } => 6,
            StakingError::TransitiveRedelegation => 7,
            StakingError::BadRedelegationDst => 8,
            StakingError::NoRedelegation => 9,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(CODESPACE, 4);
        assert_eq!(StakingError::NoDelegation.code(), 1);
        assert_eq!(StakingError::TransitiveRedelegation.code(), 7);
        assert_eq!(
            StakingError::NotMature {
                min_time_seconds: 110,
                now_seconds: 50
            }
            .code(),
            6
        );
    }

    #[test]
    fn not_mature_reports_both_times() {
        let err = StakingError::NotMature {
            min_time_seconds: 110,
            now_seconds: 50,
        };
        let msg = err.to_string();
        assert!(msg.contains("110"));
        assert!(msg.contains("50"));
    }
}
