//! Engine and factory configuration.
//!
//! [`EngineConfig`] holds everything one engine needs. [`FactoryDefaults`]
//! supplies the values an engine gets when its creator does not override
//! them. Both serialize with serde so operators can keep them in JSON.

use serde::{Deserialize, Serialize};

use ebb_core::constants::{
    DEFAULT_AUCTION_LENGTH, DEFAULT_STARTING_PRICE, DEFAULT_STEP_DECAY_RATE_BPS,
    DEFAULT_STEP_DURATION, MAX_AUCTION_LENGTH,
};
use ebb_core::error::ConfigError;
use ebb_core::types::{Address, DecayParams};

/// Configuration for a single engine instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Settlement asset every lot is sold for.
    pub want: Address,
    /// Default recipient of settlement proceeds.
    pub receiver: Address,
    /// Initial controlling principal.
    pub governance: Address,
    /// Seconds after a kick during which the lot can be taken.
    pub auction_length: u64,
    /// Seconds per price step.
    pub step_duration: u64,
    /// Per-step multiplicative decay, in basis points.
    pub step_decay_rate_bps: u64,
    /// Starting unit price in whole settlement units per whole sellable unit.
    pub starting_price: u128,
    /// WAD-scaled price floor.
    pub minimum_price: u128,
    /// Whether only governance may call `kick`.
    pub kick_restricted: bool,
    /// Minimum seconds between two kicks of the same asset.
    pub kick_cooldown: u64,
}

impl EngineConfig {
    /// Configuration with the built-in defaults for every tunable.
    pub fn new(want: Address, receiver: Address, governance: Address) -> Self {
        FactoryDefaults::default().engine_config(want, receiver, governance)
    }

    /// Pricing parameters for the decay curve.
    pub fn decay_params(&self) -> DecayParams {
        DecayParams {
            starting_price: self.starting_price,
            step_decay_rate_bps: self.step_decay_rate_bps,
            step_duration: self.step_duration,
            minimum_price: self.minimum_price,
        }
    }

    /// Check every field. Out-of-range values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.want.is_zero() {
            return Err(ConfigError::ZeroAddress("want"));
        }
        if self.receiver.is_zero() {
            return Err(ConfigError::ZeroAddress("receiver"));
        }
        if self.governance.is_zero() {
            return Err(ConfigError::ZeroAddress("governance"));
        }
        self.decay_params().validate()?;
        if self.auction_length < self.step_duration || self.auction_length > MAX_AUCTION_LENGTH {
            return Err(ConfigError::InvalidAuctionLength {
                length: self.auction_length,
                step_duration: self.step_duration,
            });
        }
        Ok(())
    }
}

/// Values applied to engines whose creator leaves them unspecified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryDefaults {
    pub auction_length: u64,
    pub step_duration: u64,
    pub step_decay_rate_bps: u64,
    pub starting_price: u128,
    pub minimum_price: u128,
    pub kick_restricted: bool,
    pub kick_cooldown: u64,
}

impl Default for FactoryDefaults {
    fn default() -> Self {
        Self {
            auction_length: DEFAULT_AUCTION_LENGTH,
            step_duration: DEFAULT_STEP_DURATION,
            step_decay_rate_bps: DEFAULT_STEP_DECAY_RATE_BPS,
            starting_price: DEFAULT_STARTING_PRICE,
            minimum_price: 0,
            kick_restricted: false,
            kick_cooldown: 0,
        }
    }
}

impl FactoryDefaults {
    /// Build an engine configuration from these defaults.
    pub fn engine_config(
        &self,
        want: Address,
        receiver: Address,
        governance: Address,
    ) -> EngineConfig {
        EngineConfig {
            want,
            receiver,
            governance,
            auction_length: self.auction_length,
            step_duration: self.step_duration,
            step_decay_rate_bps: self.step_decay_rate_bps,
            starting_price: self.starting_price,
            minimum_price: self.minimum_price,
            kick_restricted: self.kick_restricted,
            kick_cooldown: self.kick_cooldown,
        }
    }

    /// Check the defaults by validating a placeholder engine built from them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let placeholder = Address::repeat_byte(0x01);
        self.engine_config(placeholder, placeholder, placeholder)
            .validate()
    }
}
