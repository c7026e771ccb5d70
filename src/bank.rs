//! Account balance collaborator.
//!
//! The staking core never holds account balances itself: it debits and
//! credits them through the [Bank] trait. [Accounts] is the store-backed
//! implementation; because it writes through the same store handle as the
//! calling transition, a rolled-back transition also rolls back its balance
//! movements.

use crate::coins::{Address, Amount, Coin};
use crate::encoding::{self, Encode};
use crate::store::{Read, Write};
use crate::{Error, Result};

/// Table prefix for account balance records.
const BALANCE_KEY: u8 = 0x11;

/// Movement of coins into and out of accounts.
pub trait Bank {
    /// Debits the given coin from the address's balance.
    fn subtract<S: Write>(&mut self, store: &mut S, address: Address, coin: &Coin) -> Result<()>;

    /// Credits the given coin to the address's balance.
    fn add<S: Write>(&mut self, store: &mut S, address: Address, coin: &Coin) -> Result<()>;
}

/// Store-backed account balances, one record per `(address, denom)`.
#[derive(Default, Clone, Copy)]
pub struct Accounts;

impl Accounts {
    /// Returns the balance of the given denomination held by the address.
    pub fn balance<S: Read>(&self, store: &S, address: Address, denom: &str) -> Result<Amount> {
        match store.get(&balance_key(address, denom))? {
            Some(bytes) => encoding::decode(&bytes),
            None => Ok(Amount::new(0)),
        }
    }

    fn set_balance<S: Write>(
        &mut self,
        store: &mut S,
        address: Address,
        denom: &str,
        amount: Amount,
    ) -> Result<()> {
        let key = balance_key(address, denom);
        if amount.is_zero() {
            store.delete(&key)
        } else {
            store.put(key, amount.encode()?)
        }
    }
}

impl Bank for Accounts {
    fn subtract<S: Write>(&mut self, store: &mut S, address: Address, coin: &Coin) -> Result<()> {
        let held = self.balance(store, address, &coin.denom)?;
        if held < coin.amount {
            return Err(Error::Coins("Insufficient funds".into()));
        }
        self.set_balance(store, address, &coin.denom, (held - coin.amount)?)
    }

    fn add<S: Write>(&mut self, store: &mut S, address: Address, coin: &Coin) -> Result<()> {
        let held = self.balance(store, address, &coin.denom)?;
        self.set_balance(store, address, &coin.denom, (held + coin.amount)?)
    }
}

fn balance_key(address: Address, denom: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + Address::LENGTH + denom.len());
    key.push(BALANCE_KEY);
    key.extend_from_slice(&address.bytes());
    key.extend_from_slice(denom.as_bytes());
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MapStore;

    #[test]
    fn add_then_subtract() -> Result<()> {
        let mut store = MapStore::new();
        let mut bank = Accounts;
        let addr = Address::from([1; 20]);

        bank.add(&mut store, addr, &Coin::new("atom", 1000u64))?;
        assert_eq!(bank.balance(&store, addr, "atom")?, 1000);

        bank.subtract(&mut store, addr, &Coin::new("atom", 400u64))?;
        assert_eq!(bank.balance(&store, addr, "atom")?, 600);
        Ok(())
    }

    #[test]
    fn insufficient_funds() {
        let mut store = MapStore::new();
        let mut bank = Accounts;
        let addr = Address::from([1; 20]);

        let err = bank
            .subtract(&mut store, addr, &Coin::new("atom", 1u64))
            .unwrap_err();
        assert!(matches!(err, Error::Coins(_)));
    }

    #[test]
    fn balances_are_per_denom() -> Result<()> {
        let mut store = MapStore::new();
        let mut bank = Accounts;
        let addr = Address::from([1; 20]);

        bank.add(&mut store, addr, &Coin::new("atom", 5u64))?;
        assert_eq!(bank.balance(&store, addr, "photon")?, 0);
        Ok(())
    }
}
