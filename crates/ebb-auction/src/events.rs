//! Audit events emitted by engine mutations.
//!
//! Every successful mutation appends one [`EventRecord`]. A call that fails
//! leaves the log exactly as it found it.

use serde::{Deserialize, Serialize};

use ebb_core::types::{Address, Amount, Timestamp};

/// A governed parameter and its new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterChange {
    StartingPrice(u128),
    MinimumPrice(u128),
    StepDuration(u64),
    StepDecayRate(u64),
    Receiver(Address),
    KickRestricted(bool),
    KickCooldown(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionEvent {
    Enabled {
        asset: Address,
        scaler: u128,
        receiver: Option<Address>,
    },
    Disabled {
        asset: Address,
    },
    Kicked {
        asset: Address,
        available: Amount,
        forced: bool,
    },
    Taken {
        asset: Address,
        taker: Address,
        amount_taken: Amount,
        amount_needed: Amount,
        amount_left: Amount,
    },
    Settled {
        asset: Address,
    },
    Swept {
        asset: Address,
        amount: Amount,
    },
    ParameterUpdated(ParameterChange),
    GovernanceTransferStarted {
        current: Address,
        pending: Address,
    },
    GovernanceTransferred {
        previous: Address,
        new: Address,
    },
}

/// An event stamped with the engine time at which it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub timestamp: Timestamp,
    pub event: AuctionEvent,
}
