//! In-memory [`Ledger`] implementation.
//!
//! [`MemoryLedger`] keeps balances and allowances in hash maps. While a
//! checkpoint is open it records the previous value of every slot it
//! overwrites; reverting replays that journal backwards, which gives the
//! all-or-nothing call semantics the engine relies on. The journal is dropped
//! once the outermost checkpoint commits.

use std::collections::HashMap;

use crate::error::LedgerError;
use crate::traits::Ledger;
use crate::types::{Address, Amount};

/// One overwritten slot, kept so it can be restored.
#[derive(Clone, Debug)]
enum JournalEntry {
    Balance {
        asset: Address,
        holder: Address,
        previous: Amount,
    },
    Allowance {
        asset: Address,
        owner: Address,
        spender: Address,
        previous: Amount,
    },
}

/// Balances and allowances held in memory.
///
/// Assets must be registered with their decimals before use.
#[derive(Clone, Debug, Default)]
pub struct MemoryLedger {
    decimals: HashMap<Address, u8>,
    balances: HashMap<(Address, Address), Amount>,
    allowances: HashMap<(Address, Address, Address), Amount>,
    journal: Vec<JournalEntry>,
    /// Number of open checkpoints.
    depth: usize,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an asset with its native decimal precision.
    pub fn register_asset(&mut self, asset: Address, decimals: u8) {
        self.decimals.insert(asset, decimals);
    }

    /// Create `amount` of `asset` out of thin air for `to`.
    pub fn mint(&mut self, asset: Address, to: Address, amount: Amount) -> Result<(), LedgerError> {
        self.ensure_known(asset)?;
        let balance = self.balance_of(asset, to);
        let updated = balance
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow)?;
        self.write_balance(asset, to, updated);
        Ok(())
    }

    /// Total supply of `asset` across all holders.
    pub fn total_supply(&self, asset: Address) -> Amount {
        self.balances
            .iter()
            .filter(|((a, _), _)| *a == asset)
            .map(|(_, v)| *v)
            .sum()
    }

    /// Number of journal entries held for open checkpoints.
    pub fn journal_len(&self) -> usize {
        self.journal.len()
    }

    fn ensure_known(&self, asset: Address) -> Result<(), LedgerError> {
        if self.decimals.contains_key(&asset) {
            Ok(())
        } else {
            Err(LedgerError::UnknownAsset(asset))
        }
    }

    fn write_balance(&mut self, asset: Address, holder: Address, value: Amount) {
        if self.depth > 0 {
            let previous = self.balance_of(asset, holder);
            self.journal.push(JournalEntry::Balance {
                asset,
                holder,
                previous,
            });
        }
        self.balances.insert((asset, holder), value);
    }

    fn write_allowance(&mut self, asset: Address, owner: Address, spender: Address, value: Amount) {
        if self.depth > 0 {
            let previous = self.allowance(asset, owner, spender);
            self.journal.push(JournalEntry::Allowance {
                asset,
                owner,
                spender,
                previous,
            });
        }
        self.allowances.insert((asset, owner, spender), value);
    }
}

impl Ledger for MemoryLedger {
    fn decimals(&self, asset: Address) -> Result<u8, LedgerError> {
        self.decimals
            .get(&asset)
            .copied()
            .ok_or(LedgerError::UnknownAsset(asset))
    }

    fn balance_of(&self, asset: Address, holder: Address) -> Amount {
        self.balances.get(&(asset, holder)).copied().unwrap_or(0)
    }

    fn allowance(&self, asset: Address, owner: Address, spender: Address) -> Amount {
        self.allowances
            .get(&(asset, owner, spender))
            .copied()
            .unwrap_or(0)
    }

    fn approve(&mut self, asset: Address, owner: Address, spender: Address, amount: Amount) {
        self.write_allowance(asset, owner, spender, amount);
    }

    fn transfer(
        &mut self,
        asset: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.ensure_known(asset)?;
        let have = self.balance_of(asset, from);
        if have < amount {
            return Err(LedgerError::InsufficientBalance { have, need: amount });
        }
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance_of(asset, to)
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow)?;
        self.write_balance(asset, from, have - amount);
        self.write_balance(asset, to, credited);
        Ok(())
    }

    fn transfer_from(
        &mut self,
        asset: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let allowed = self.allowance(asset, from, spender);
        if allowed < amount {
            return Err(LedgerError::InsufficientAllowance {
                have: allowed,
                need: amount,
            });
        }
        self.transfer(asset, from, to, amount)?;
        if allowed != Amount::MAX {
            self.write_allowance(asset, from, spender, allowed - amount);
        }
        Ok(())
    }

    fn checkpoint(&mut self) -> usize {
        self.depth += 1;
        self.journal.len()
    }

    fn revert_to(&mut self, checkpoint: usize) {
        while self.journal.len() > checkpoint {
            let Some(entry) = self.journal.pop() else {
                break;
            };
            match entry {
                JournalEntry::Balance {
                    asset,
                    holder,
                    previous,
                } => {
                    self.balances.insert((asset, holder), previous);
                }
                JournalEntry::Allowance {
                    asset,
                    owner,
                    spender,
                    previous,
                } => {
                    self.allowances.insert((asset, owner, spender), previous);
                }
            }
        }
        self.depth = self.depth.saturating_sub(1);
    }

    fn commit(&mut self, _checkpoint: usize) {
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 {
            self.journal.clear();
        }
    }
}
