//! Proof-of-stake delegation state machine.
//!
//! This crate owns the canonical rules that translate delegation intents
//! (delegate, begin/complete unbonding, begin/complete redelegation) into
//! deterministic mutations of an ordered key-value store, while preserving
//! the accounting invariants of a share-based staking pool.
//!
//! [staking::Keeper] is the entry point: every transition takes a mutable
//! store handle and a [context::BlockContext], runs inside a store
//! transaction, and either commits all of its writes or none of them.

pub mod bank;
pub mod coins;
pub mod context;
pub mod encoding;
mod error;
pub mod staking;
pub mod store;

pub use error::{Error, Result, StakingError, CODESPACE};
