//! Validator token/share exchange and validator store accessors.

use crate::coins::{Amount, Decimal};
use crate::encoding::{self, Encode};
use crate::staking::keys;
use crate::staking::types::{Pool, Validator};
use crate::staking::Keeper;
use crate::store::{Read, Store, Write};
use crate::{coins::Address, Result};

impl Validator {
    /// Absorbs newly bonded tokens, issuing shares at the current
    /// share-per-token exchange rate.
    ///
    /// The first delegation bootstraps the rate at one share per token;
    /// afterwards `issued = amount * delegator_shares / tokens`, quantized
    /// with round-half-to-even. Bonded tokens are added to the pool.
    pub fn add_tokens_from_del(&mut self, pool: &mut Pool, amount: Amount) -> Result<Decimal> {
        let issued = if self.delegator_shares.is_zero() {
            Decimal::from(amount)
        } else {
            ((Decimal::from(amount) * self.delegator_shares)? / self.tokens)?
        };

        self.tokens = (self.tokens + amount.into())?;
        self.delegator_shares = (self.delegator_shares + issued)?;
        pool.bonded_tokens = (pool.bonded_tokens + amount.into())?;

        Ok(issued)
    }

    /// Removes shares, releasing tokens at the current exchange rate into
    /// the pool's unbonding escrow. Returns the token amount released.
    ///
    /// Removing the last shares releases the validator's entire remaining
    /// token balance, and the result never exceeds the tokens held.
    pub fn remove_del_shares(&mut self, pool: &mut Pool, shares: Decimal) -> Result<Decimal> {
        let remaining = (self.delegator_shares - shares)?;

        let released = if remaining.is_zero() {
            self.tokens
        } else {
            let released = ((shares * self.tokens)? / self.delegator_shares)?;
            if released > self.tokens {
                self.tokens
            } else {
                released
            }
        };

        self.delegator_shares = remaining;
        self.tokens = (self.tokens - released)?;
        pool.bonded_tokens = (pool.bonded_tokens - released)?;
        pool.loose_tokens = (pool.loose_tokens + released)?;

        Ok(released)
    }

    /// The validator's ranking weight: whole bonded tokens.
    pub fn potential_power(&self) -> Result<u64> {
        Ok(self.tokens.amount()?.value())
    }
}

impl<B> Keeper<B> {
    /// Loads the validator record at the given operator address.
    pub fn get_validator<S: Read>(
        &self,
        store: &S,
        operator: Address,
    ) -> Result<Option<Validator>> {
        match store.get(&keys::validator_key(operator))? {
            Some(bytes) => Ok(Some(encoding::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Rewrites the validator record and refreshes its entry in the
    /// by-power index. Jailed validators carry no index entry.
    pub fn update_validator<S: Store>(&self, store: &mut S, validator: &Validator) -> Result<()> {
        if let Some(old) = self.get_validator(store, validator.operator)? {
            store.delete(&keys::validator_by_power_key(
                old.potential_power()?,
                old.operator,
            ))?;
        }

        store.put(keys::validator_key(validator.operator), validator.encode()?)?;

        if !validator.jailed {
            store.put(
                keys::validator_by_power_key(validator.potential_power()?, validator.operator),
                validator.operator.bytes().to_vec(),
            )?;
        }

        Ok(())
    }

    /// Deletes the validator record and its by-power index entry.
    pub fn remove_validator<S: Store>(&self, store: &mut S, operator: Address) -> Result<()> {
        let validator = match self.get_validator(store, operator)? {
            Some(validator) => validator,
            None => return Ok(()),
        };

        store.delete(&keys::validator_key(operator))?;
        store.delete(&keys::validator_by_power_key(
            validator.potential_power()?,
            operator,
        ))?;

        Ok(())
    }

    /// Loads the global pool record, or the zero pool if none has been
    /// written yet.
    pub fn get_pool<S: Read>(&self, store: &S) -> Result<Pool> {
        match store.get(keys::POOL_KEY)? {
            Some(bytes) => encoding::decode(&bytes),
            None => Ok(Pool::default()),
        }
    }

    /// Persists the global pool record.
    pub fn set_pool<S: Write>(&self, store: &mut S, pool: &Pool) -> Result<()> {
        store.put(keys::POOL_KEY.to_vec(), pool.encode()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn addr(byte: u8) -> Address {
        Address::from([byte; 20])
    }

    #[test]
    fn bootstrap_issues_one_share_per_token() -> Result<()> {
        let mut validator = Validator::new(addr(1));
        let mut pool = Pool::default();

        let issued = validator.add_tokens_from_del(&mut pool, 1000.into())?;
        assert_eq!(issued, dec!(1000).into());
        assert_eq!(validator.tokens, dec!(1000).into());
        assert_eq!(validator.delegator_shares, dec!(1000).into());
        assert_eq!(pool.bonded_tokens, dec!(1000).into());
        Ok(())
    }

    #[test]
    fn issuance_tracks_exchange_rate() -> Result<()> {
        let mut validator = Validator::new(addr(1));
        let mut pool = Pool::default();

        validator.add_tokens_from_del(&mut pool, 1000.into())?;
        // halve the exchange rate: same shares, fewer tokens
        validator.tokens = dec!(500).into();

        let issued = validator.add_tokens_from_del(&mut pool, 100.into())?;
        assert_eq!(issued, dec!(200).into());
        Ok(())
    }

    #[test]
    fn removing_last_shares_releases_all_tokens() -> Result<()> {
        let mut validator = Validator::new(addr(1));
        let mut pool = Pool::default();

        let issued = validator.add_tokens_from_del(&mut pool, 1000.into())?;
        let released = validator.remove_del_shares(&mut pool, issued)?;

        assert_eq!(released, dec!(1000).into());
        assert!(validator.tokens.is_zero());
        assert!(validator.delegator_shares.is_zero());
        assert!(pool.bonded_tokens.is_zero());
        assert_eq!(pool.loose_tokens, dec!(1000).into());
        Ok(())
    }

    #[test]
    fn partial_removal_is_proportional() -> Result<()> {
        let mut validator = Validator::new(addr(1));
        let mut pool = Pool::default();

        validator.add_tokens_from_del(&mut pool, 1000.into())?;
        let released = validator.remove_del_shares(&mut pool, dec!(400).into())?;

        assert_eq!(released, dec!(400).into());
        assert_eq!(validator.tokens, dec!(600).into());
        assert_eq!(validator.delegator_shares, dec!(600).into());
        Ok(())
    }

    #[test]
    fn release_caps_at_held_tokens() {
        let mut validator = Validator::new(addr(1));
        let mut pool = Pool::default();

        validator
            .add_tokens_from_del(&mut pool, 100.into())
            .unwrap();
        let released = validator
            .remove_del_shares(&mut pool, dec!(150).into())
            .unwrap();
        assert_eq!(released, dec!(100).into());
    }
}
