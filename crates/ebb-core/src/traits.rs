//! Trait interfaces for Ebb auctions.
//!
//! These traits define the contracts between crates and the host:
//! - [`Ledger`] — token balances and transfers (the host implements)
//! - [`Clock`] — wall-clock time (the host implements)
//! - [`PriceCurve`] — decay pricing (ebb-pricing implements)

use crate::error::{LedgerError, PricingError};
use crate::types::{Address, Amount, DecayParams, Timestamp};

/// Token balances, allowances and transfers for every asset an engine touches.
///
/// Calls are all-or-nothing: the engine opens a [`checkpoint`](Ledger::checkpoint)
/// before a multi-transfer operation, then either [`commit`](Ledger::commit)s
/// it or [`revert_to`](Ledger::revert_to)s it. Checkpoints nest; every one
/// opened is closed exactly once, innermost first.
pub trait Ledger {
    /// Native decimal precision of `asset`.
    fn decimals(&self, asset: Address) -> Result<u8, LedgerError>;

    /// Balance of `asset` held by `holder`. Unknown holders hold zero.
    fn balance_of(&self, asset: Address, holder: Address) -> Amount;

    /// Amount of `asset` that `spender` may move out of `owner`.
    fn allowance(&self, asset: Address, owner: Address, spender: Address) -> Amount;

    /// Set the allowance of `spender` over `owner`'s `asset`.
    fn approve(&mut self, asset: Address, owner: Address, spender: Address, amount: Amount);

    /// Move `amount` of `asset` from `from` to `to`.
    fn transfer(
        &mut self,
        asset: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), LedgerError>;

    /// Move `amount` of `asset` from `from` to `to`, spending `spender`'s allowance.
    fn transfer_from(
        &mut self,
        asset: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), LedgerError>;

    /// Open a checkpoint and return its marker.
    fn checkpoint(&mut self) -> usize;

    /// Undo every change made since `checkpoint` was opened, and close it.
    fn revert_to(&mut self, checkpoint: usize);

    /// Keep every change made since `checkpoint` was opened, and close it.
    ///
    /// An enclosing checkpoint can still undo them.
    fn commit(&mut self, checkpoint: usize);
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current Unix time in seconds.
    fn now(&self) -> Timestamp;
}

/// Pure unit-price computation for a decaying auction.
///
/// Implemented by the exponential decay curve (ebb-pricing).
pub trait PriceCurve: Send + Sync {
    /// WAD-scaled unit price after `elapsed` seconds of an epoch.
    ///
    /// Never below `params.minimum_price`. Epoch expiry is the caller's concern.
    fn unit_price(&self, params: &DecayParams, elapsed: u64) -> Result<u128, PricingError>;

    /// Number of whole steps completed after `elapsed` seconds.
    ///
    /// Default implementation: `elapsed / step_duration`, zero for a zero step.
    fn steps(&self, params: &DecayParams, elapsed: u64) -> u64 {
        elapsed.checked_div(params.step_duration).unwrap_or(0)
    }
}
