//! Delegation ledger and state transitions.
//!
//! The ledger half gives typed access to the three record families and
//! their secondary indices. The transition half implements delegate,
//! begin/complete unbonding, and begin/complete redelegation on top of it;
//! every public transition runs inside a store transaction via
//! [step_atomic], so a rejected transition leaves the store untouched.

use log::debug;

use crate::bank::Bank;
use crate::coins::{Address, Coin, Decimal};
use crate::context::BlockContext;
use crate::encoding::{self, Decode, Encode};
use crate::staking::keys;
use crate::staking::types::{Delegation, Redelegation, UnbondingDelegation, Validator};
use crate::staking::Keeper;
use crate::store::{prefix_bounds, step_atomic, Read, Store, Write};
use crate::{Error, Result, StakingError};

/// Decodes every record under the given key prefix, in ascending key order,
/// bounded by `cap` when given.
fn scan<S: Read, T: Decode>(store: &S, prefix: Vec<u8>, cap: Option<u16>) -> Result<Vec<T>> {
    let cap = cap.map(usize::from).unwrap_or(usize::MAX);
    let mut records = Vec::new();
    for entry in store.into_iter(prefix_bounds(&prefix)) {
        if records.len() >= cap {
            break;
        }
        let (_, value) = entry?;
        records.push(encoding::decode(&value)?);
    }
    Ok(records)
}

impl<B> Keeper<B> {
    /// Loads the delegation for the given pair.
    pub fn get_delegation<S: Read>(
        &self,
        store: &S,
        delegator: Address,
        validator: Address,
    ) -> Result<Option<Delegation>> {
        match store.get(&keys::delegation_key(delegator, validator))? {
            Some(bytes) => Ok(Some(encoding::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Persists a delegation record.
    pub fn set_delegation<S: Write>(&self, store: &mut S, delegation: &Delegation) -> Result<()> {
        store.put(
            keys::delegation_key(delegation.delegator, delegation.validator),
            delegation.encode()?,
        )
    }

    /// Deletes a delegation record.
    pub fn remove_delegation<S: Write>(
        &self,
        store: &mut S,
        delegation: &Delegation,
    ) -> Result<()> {
        store.delete(&keys::delegation_key(
            delegation.delegator,
            delegation.validator,
        ))
    }

    /// All delegations held by one delegator, bounded by `cap` when given.
    pub fn delegator_delegations<S: Read>(
        &self,
        store: &S,
        delegator: Address,
        cap: Option<u16>,
    ) -> Result<Vec<Delegation>> {
        scan(store, keys::delegations_key(delegator), cap)
    }

    /// Every delegation in the store, for genesis export.
    pub fn all_delegations<S: Read>(&self, store: &S) -> Result<Vec<Delegation>> {
        scan(store, vec![keys::DELEGATION_KEY], None)
    }

    /// The validators one delegator is bonded to, bounded by `cap` when
    /// given. A delegation pointing at a missing validator is fatal.
    pub fn delegator_validators<S: Read>(
        &self,
        store: &S,
        delegator: Address,
        cap: Option<u16>,
    ) -> Result<Vec<Validator>> {
        let delegations = self.delegator_delegations(store, delegator, cap)?;
        let mut validators = Vec::with_capacity(delegations.len());
        for delegation in delegations {
            let validator = self
                .get_validator(store, delegation.validator)?
                .ok_or(StakingError::NoValidator)?;
            validators.push(validator);
        }
        Ok(validators)
    }

    /// The validator behind one specific delegation.
    pub fn delegator_validator<S: Read>(
        &self,
        store: &S,
        delegator: Address,
        validator: Address,
    ) -> Result<Validator> {
        let delegation = self
            .get_delegation(store, delegator, validator)?
            .ok_or(StakingError::NoDelegation)?;
        self.get_validator(store, delegation.validator)?
            .ok_or_else(|| StakingError::NoValidator.into())
    }

    /// Loads the unbonding delegation for the given pair.
    pub fn get_unbonding_delegation<S: Read>(
        &self,
        store: &S,
        delegator: Address,
        validator: Address,
    ) -> Result<Option<UnbondingDelegation>> {
        match store.get(&keys::ubd_key(delegator, validator))? {
            Some(bytes) => Ok(Some(encoding::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Persists an unbonding delegation and its by-validator index marker.
    pub fn set_unbonding_delegation<S: Write>(
        &self,
        store: &mut S,
        ubd: &UnbondingDelegation,
    ) -> Result<()> {
        store.put(keys::ubd_key(ubd.delegator, ubd.validator), ubd.encode()?)?;
        store.put(
            keys::ubd_by_val_index_key(ubd.delegator, ubd.validator),
            vec![],
        )
    }

    /// Deletes an unbonding delegation and its index marker.
    pub fn remove_unbonding_delegation<S: Write>(
        &self,
        store: &mut S,
        ubd: &UnbondingDelegation,
    ) -> Result<()> {
        store.delete(&keys::ubd_key(ubd.delegator, ubd.validator))?;
        store.delete(&keys::ubd_by_val_index_key(ubd.delegator, ubd.validator))
    }

    /// All unbonding delegations of one delegator, bounded by `cap` when
    /// given.
    pub fn delegator_unbonding_delegations<S: Read>(
        &self,
        store: &S,
        delegator: Address,
        cap: Option<u16>,
    ) -> Result<Vec<UnbondingDelegation>> {
        scan(store, keys::ubds_key(delegator), cap)
    }

    /// All unbonding delegations away from one validator, resolved through
    /// the by-validator index.
    pub fn unbonding_delegations_from_validator<S: Read>(
        &self,
        store: &S,
        validator: Address,
    ) -> Result<Vec<UnbondingDelegation>> {
        let prefix = keys::ubds_by_val_index_key(validator);
        let mut ubds = Vec::new();
        for entry in store.into_iter(prefix_bounds(&prefix)) {
            let (index_key, _) = entry?;
            let key = keys::ubd_key_from_val_index_key(&index_key)
                .ok_or_else(|| Error::StoreCorruption("malformed unbonding index key".into()))?;
            let bytes = store.get(&key)?.ok_or_else(|| {
                Error::StoreCorruption("unbonding index entry without record".into())
            })?;
            ubds.push(encoding::decode(&bytes)?);
        }
        Ok(ubds)
    }

    /// Every unbonding delegation in the store, for genesis export.
    pub fn all_unbonding_delegations<S: Read>(
        &self,
        store: &S,
    ) -> Result<Vec<UnbondingDelegation>> {
        scan(store, vec![keys::UNBONDING_DELEGATION_KEY], None)
    }

    /// Loads the redelegation for the given triple.
    pub fn get_redelegation<S: Read>(
        &self,
        store: &S,
        delegator: Address,
        src: Address,
        dst: Address,
    ) -> Result<Option<Redelegation>> {
        match store.get(&keys::red_key(delegator, src, dst))? {
            Some(bytes) => Ok(Some(encoding::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Persists a redelegation and both of its index markers.
    pub fn set_redelegation<S: Write>(&self, store: &mut S, red: &Redelegation) -> Result<()> {
        store.put(
            keys::red_key(red.delegator, red.validator_src, red.validator_dst),
            red.encode()?,
        )?;
        store.put(
            keys::red_by_val_src_index_key(red.delegator, red.validator_src, red.validator_dst),
            vec![],
        )?;
        store.put(
            keys::red_by_val_dst_index_key(red.delegator, red.validator_src, red.validator_dst),
            vec![],
        )
    }

    /// Deletes a redelegation and both of its index markers.
    pub fn remove_redelegation<S: Write>(&self, store: &mut S, red: &Redelegation) -> Result<()> {
        store.delete(&keys::red_key(
            red.delegator,
            red.validator_src,
            red.validator_dst,
        ))?;
        store.delete(&keys::red_by_val_src_index_key(
            red.delegator,
            red.validator_src,
            red.validator_dst,
        ))?;
        store.delete(&keys::red_by_val_dst_index_key(
            red.delegator,
            red.validator_src,
            red.validator_dst,
        ))
    }

    /// All redelegations of one delegator, bounded by `cap` when given.
    pub fn delegator_redelegations<S: Read>(
        &self,
        store: &S,
        delegator: Address,
        cap: Option<u16>,
    ) -> Result<Vec<Redelegation>> {
        scan(store, keys::reds_key(delegator), cap)
    }

    /// All redelegations away from one source validator, resolved through
    /// the by-source index.
    pub fn redelegations_from_validator<S: Read>(
        &self,
        store: &S,
        src: Address,
    ) -> Result<Vec<Redelegation>> {
        let prefix = keys::reds_from_val_src_index_key(src);
        let mut reds = Vec::new();
        for entry in store.into_iter(prefix_bounds(&prefix)) {
            let (index_key, _) = entry?;
            let key = keys::red_key_from_val_src_index_key(&index_key)
                .ok_or_else(|| Error::StoreCorruption("malformed redelegation index key".into()))?;
            let bytes = store.get(&key)?.ok_or_else(|| {
                Error::StoreCorruption("redelegation index entry without record".into())
            })?;
            reds.push(encoding::decode(&bytes)?);
        }
        Ok(reds)
    }

    /// Every redelegation in the store, for genesis export.
    pub fn all_redelegations<S: Read>(&self, store: &S) -> Result<Vec<Redelegation>> {
        scan(store, vec![keys::REDELEGATION_KEY], None)
    }

    /// True iff any redelegation of this delegator has the given validator
    /// as its destination. Such a validator may not be the source of a
    /// further redelegation until the record matures.
    pub fn has_receiving_redelegation<S: Read>(
        &self,
        store: &S,
        delegator: Address,
        validator: Address,
    ) -> Result<bool> {
        let prefix = keys::reds_by_del_to_val_dst_index_key(delegator, validator);
        let mut iter = store.into_iter(prefix_bounds(&prefix));
        Ok(iter.next().transpose()?.is_some())
    }
}

impl<B: Bank> Keeper<B> {
    /// Bonds tokens to a validator, issuing shares to the delegator.
    ///
    /// When `subtract_account` is set the bond is debited from the
    /// delegator's balance; otherwise the tokens are taken from the pool's
    /// unbonding escrow (the redelegation path). Returns the shares issued.
    pub fn delegate<S: Store>(
        &mut self,
        store: &mut S,
        ctx: &BlockContext,
        delegator: Address,
        bond: Coin,
        validator: Validator,
        subtract_account: bool,
    ) -> Result<Decimal> {
        step_atomic(store, |store| {
            self.delegate_in(store, ctx, delegator, bond, validator, subtract_account)
        })
    }

    /// Begins unbonding the given number of shares into a time-locked
    /// unbonding delegation.
    pub fn begin_unbonding<S: Store>(
        &mut self,
        store: &mut S,
        ctx: &BlockContext,
        delegator: Address,
        validator: Address,
        shares: Decimal,
    ) -> Result<()> {
        step_atomic(store, |store| {
            self.begin_unbonding_in(store, ctx, delegator, validator, shares)
        })
    }

    /// Releases a mature unbonding delegation's balance to the delegator.
    pub fn complete_unbonding<S: Store>(
        &mut self,
        store: &mut S,
        ctx: &BlockContext,
        delegator: Address,
        validator: Address,
    ) -> Result<()> {
        step_atomic(store, |store| {
            self.complete_unbonding_in(store, ctx, delegator, validator)
        })
    }

    /// Moves shares from one validator to another, leaving a time-locked
    /// redelegation record that blocks further hops from the destination.
    pub fn begin_redelegation<S: Store>(
        &mut self,
        store: &mut S,
        ctx: &BlockContext,
        delegator: Address,
        src: Address,
        dst: Address,
        shares: Decimal,
    ) -> Result<()> {
        step_atomic(store, |store| {
            self.begin_redelegation_in(store, ctx, delegator, src, dst, shares)
        })
    }

    /// Releases a mature redelegation record. No tokens move: the
    /// destination validator already holds the stake.
    pub fn complete_redelegation<S: Store>(
        &mut self,
        store: &mut S,
        ctx: &BlockContext,
        delegator: Address,
        src: Address,
        dst: Address,
    ) -> Result<()> {
        step_atomic(store, |store| {
            self.complete_redelegation_in(store, ctx, delegator, src, dst)
        })
    }

    fn delegate_in<S: Store>(
        &mut self,
        store: &mut S,
        ctx: &BlockContext,
        delegator: Address,
        bond: Coin,
        mut validator: Validator,
        subtract_account: bool,
    ) -> Result<Decimal> {
        if bond.denom != self.params.bond_denom {
            return Err(Error::Coins(format!(
                "Invalid denomination: expected {}, got {}",
                self.params.bond_denom, bond.denom,
            )));
        }
        if bond.amount.is_zero() {
            return Err(Error::Coins("Delegation amount must be positive".into()));
        }

        let mut delegation = self
            .get_delegation(store, delegator, validator.operator)?
            .unwrap_or_else(|| Delegation::new(delegator, validator.operator));

        if subtract_account {
            self.bank.subtract(store, delegator, &bond)?;
        }

        let mut pool = self.get_pool(store)?;
        let issued = validator.add_tokens_from_del(&mut pool, bond.amount)?;
        if !subtract_account {
            // tokens re-entering the bonded pool out of unbonding escrow
            pool.loose_tokens = (pool.loose_tokens - bond.amount.into())?;
        }

        delegation.shares = (delegation.shares + issued)?;
        delegation.height = ctx.height;

        self.set_pool(store, &pool)?;
        self.set_delegation(store, &delegation)?;
        self.update_validator(store, &validator)?;

        debug!(
            "delegated {} to {}, issued {} shares",
            bond, validator.operator, issued
        );
        Ok(issued)
    }

    /// Removes shares from a delegation, releasing tokens into unbonding
    /// escrow. Shared by the unbonding and redelegation paths; callers
    /// decide where the released tokens go.
    pub(crate) fn unbond<S: Store>(
        &mut self,
        store: &mut S,
        ctx: &BlockContext,
        delegator: Address,
        validator_addr: Address,
        shares: Decimal,
    ) -> Result<Decimal> {
        let mut delegation = self
            .get_delegation(store, delegator, validator_addr)?
            .ok_or(StakingError::NoDelegation)?;

        if delegation.shares < shares {
            return Err(StakingError::InsufficientShares {
                held: delegation.shares,
                requested: shares,
            }
            .into());
        }

        let mut validator = self
            .get_validator(store, validator_addr)?
            .ok_or(StakingError::NoValidator)?;

        delegation.shares = (delegation.shares - shares)?;

        if delegation.shares.is_zero() {
            // an operator dropping its last self-delegated share is jailed,
            // removing it from active duty
            if delegation.delegator == validator.operator && !validator.jailed {
                validator.jailed = true;
            }
            self.remove_delegation(store, &delegation)?;
        } else {
            delegation.height = ctx.height;
            self.set_delegation(store, &delegation)?;
        }

        let mut pool = self.get_pool(store)?;
        let released = validator.remove_del_shares(&mut pool, shares)?;
        self.set_pool(store, &pool)?;

        self.update_validator(store, &validator)?;
        if validator.delegator_shares.is_zero() {
            self.remove_validator(store, validator.operator)?;
        }

        Ok(released)
    }

    fn begin_unbonding_in<S: Store>(
        &mut self,
        store: &mut S,
        ctx: &BlockContext,
        delegator: Address,
        validator: Address,
        shares: Decimal,
    ) -> Result<()> {
        if self
            .get_unbonding_delegation(store, delegator, validator)?
            .is_some()
        {
            return Err(StakingError::ExistingUnbondingDelegation.into());
        }

        let released = self.unbond(store, ctx, delegator, validator, shares)?;

        let min_time_seconds = ctx.time_seconds + self.params.unbonding_seconds as i64;
        let balance = Coin::new(self.params.bond_denom.clone(), released.amount()?);

        let ubd = UnbondingDelegation {
            delegator,
            validator,
            initial_balance: balance.clone(),
            balance,
            min_time_seconds,
        };
        self.set_unbonding_delegation(store, &ubd)?;

        debug!(
            "unbonding {} from {}, matures at {}",
            ubd.balance, validator, min_time_seconds
        );
        Ok(())
    }

    fn complete_unbonding_in<S: Store>(
        &mut self,
        store: &mut S,
        ctx: &BlockContext,
        delegator: Address,
        validator: Address,
    ) -> Result<()> {
        let ubd = self
            .get_unbonding_delegation(store, delegator, validator)?
            .ok_or(StakingError::NoUnbondingDelegation)?;

        if ubd.min_time_seconds > ctx.time_seconds {
            return Err(StakingError::NotMature {
                min_time_seconds: ubd.min_time_seconds,
                now_seconds: ctx.time_seconds,
            }
            .into());
        }

        self.bank.add(store, ubd.delegator, &ubd.balance)?;

        let mut pool = self.get_pool(store)?;
        pool.loose_tokens = (pool.loose_tokens - ubd.balance.amount.into())?;
        self.set_pool(store, &pool)?;

        self.remove_unbonding_delegation(store, &ubd)?;

        debug!("released {} to {}", ubd.balance, ubd.delegator);
        Ok(())
    }

    fn begin_redelegation_in<S: Store>(
        &mut self,
        store: &mut S,
        ctx: &BlockContext,
        delegator: Address,
        src: Address,
        dst: Address,
        shares: Decimal,
    ) -> Result<()> {
        // `src` still being the destination of an active redelegation would
        // let stake hop validators indefinitely without ever waiting out the
        // unbonding period
        if self.has_receiving_redelegation(store, delegator, src)? {
            return Err(StakingError::TransitiveRedelegation.into());
        }

        let released = self.unbond(store, ctx, delegator, src, shares)?;
        let returned_coin = Coin::new(self.params.bond_denom.clone(), released.amount()?);

        let dst_validator = self
            .get_validator(store, dst)?
            .ok_or(StakingError::BadRedelegationDst)?;

        // the released tokens never touch the delegator's account
        let shares_dst = self.delegate_in(
            store,
            ctx,
            delegator,
            returned_coin.clone(),
            dst_validator,
            false,
        )?;

        let min_time_seconds = ctx.time_seconds + self.params.unbonding_seconds as i64;
        let red = Redelegation {
            delegator,
            validator_src: src,
            validator_dst: dst,
            initial_balance: returned_coin.clone(),
            balance: returned_coin,
            shares_src: shares,
            shares_dst,
            min_time_seconds,
        };
        self.set_redelegation(store, &red)?;

        debug!(
            "redelegated {} from {} to {}, matures at {}",
            red.balance, src, dst, min_time_seconds
        );
        Ok(())
    }

    fn complete_redelegation_in<S: Store>(
        &mut self,
        store: &mut S,
        ctx: &BlockContext,
        delegator: Address,
        src: Address,
        dst: Address,
    ) -> Result<()> {
        let red = self
            .get_redelegation(store, delegator, src, dst)?
            .ok_or(StakingError::NoRedelegation)?;

        if red.min_time_seconds > ctx.time_seconds {
            return Err(StakingError::NotMature {
                min_time_seconds: red.min_time_seconds,
                now_seconds: ctx.time_seconds,
            }
            .into());
        }

        self.remove_redelegation(store, &red)?;

        debug!("redelegation of {} to {} released", red.balance, dst);
        Ok(())
    }
}
