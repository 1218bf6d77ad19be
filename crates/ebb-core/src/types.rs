//! Core auction types.
//!
//! Amounts are in an asset's smallest native unit. Prices are WAD-scaled
//! settlement units per whole sellable unit. Timestamps are Unix seconds.

use serde::{Deserialize, Serialize};

use crate::constants::{
    BPS_PRECISION, MAX_STARTING_PRICE, MAX_STEP_DECAY_RATE_BPS, MAX_STEP_DURATION,
    MIN_STEP_DECAY_RATE_BPS, WAD,
};
use crate::error::ConfigError;

pub use alloy_primitives::{Address, U256};

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// Native-precision token amount.
pub type Amount = u128;

/// Parameters of the per-step compounding price curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecayParams {
    /// Unit price at the start of an epoch, in whole settlement units.
    pub starting_price: u128,
    /// Multiplicative reduction applied once per step, in basis points.
    pub step_decay_rate_bps: u64,
    /// Seconds per step.
    pub step_duration: u64,
    /// WAD-scaled price the curve never drops below.
    pub minimum_price: u128,
}

impl DecayParams {
    /// Check the parameters against the accepted bounds.
    ///
    /// Nothing is clamped: an out-of-range value is an error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.starting_price == 0 {
            return Err(ConfigError::ZeroStartingPrice);
        }
        if self.starting_price > MAX_STARTING_PRICE {
            return Err(ConfigError::StartingPriceTooLarge(self.starting_price));
        }
        if !(MIN_STEP_DECAY_RATE_BPS..=MAX_STEP_DECAY_RATE_BPS).contains(&self.step_decay_rate_bps)
        {
            return Err(ConfigError::InvalidDecayRate(self.step_decay_rate_bps));
        }
        if self.step_duration == 0 || self.step_duration > MAX_STEP_DURATION {
            return Err(ConfigError::InvalidStepDuration(self.step_duration));
        }
        if self.minimum_price > self.starting_price_wad() {
            return Err(ConfigError::MinimumAboveStart {
                minimum: self.minimum_price,
                start: self.starting_price_wad(),
            });
        }
        Ok(())
    }

    /// Starting price in WAD fixed point. Saturates for unvalidated input.
    pub fn starting_price_wad(&self) -> u128 {
        self.starting_price.saturating_mul(WAD)
    }

    /// Per-step retention factor `(1 - rate)` in WAD fixed point.
    pub fn retention_wad(&self) -> u128 {
        let rate = self.step_decay_rate_bps.min(BPS_PRECISION) as u128;
        WAD - rate * WAD / BPS_PRECISION as u128
    }
}
