//! Shared fixtures for integration tests.

use std::sync::Arc;

use ebb_auction::{Engine, EngineConfig, EngineFactory, FactoryDefaults};
use ebb_auction::factory::default_implementation;
use ebb_core::clock::ManualClock;
use ebb_core::ledger::MemoryLedger;
use ebb_core::traits::Ledger;
use ebb_core::types::{Address, Amount, Timestamp};

/// Fixed start time for every harness.
pub const T0: Timestamp = 1_700_000_000;

/// Simple address from a seed byte.
pub fn addr(seed: u8) -> Address {
    Address::repeat_byte(seed)
}

pub fn want() -> Address {
    addr(0xEE)
}

pub fn reward() -> Address {
    addr(0xAA)
}

pub fn other_reward() -> Address {
    addr(0xAB)
}

pub fn governance() -> Address {
    addr(0x60)
}

pub fn receiver() -> Address {
    addr(0x0F)
}

pub fn strategy() -> Address {
    addr(0x51)
}

pub fn taker() -> Address {
    addr(0x7A)
}

pub fn second_taker() -> Address {
    addr(0x7B)
}

/// An engine wired to an in-memory ledger and a manual clock.
pub struct Harness {
    pub engine: Engine,
    pub ledger: MemoryLedger,
    pub clock: ManualClock,
}

impl Harness {
    /// Default engine selling 18-decimal assets for an 18-decimal settlement asset.
    pub fn new() -> Self {
        Self::with_decimals(18, 18)
    }

    /// Engine whose reward assets use `from_decimals` and settlement uses `want_decimals`.
    pub fn with_decimals(from_decimals: u8, want_decimals: u8) -> Self {
        Self::with_config(
            EngineConfig::new(want(), receiver(), governance()),
            from_decimals,
            want_decimals,
        )
    }

    pub fn with_config(config: EngineConfig, from_decimals: u8, want_decimals: u8) -> Self {
        let clock = ManualClock::new(T0);
        let mut factory = EngineFactory::new(default_implementation(), FactoryDefaults::default())
            .unwrap()
            .with_clock(Arc::new(clock.clone()));
        let engine = factory
            .create_new_engine_with_config(strategy(), config)
            .unwrap();

        let mut ledger = MemoryLedger::new();
        ledger.register_asset(want(), want_decimals);
        ledger.register_asset(reward(), from_decimals);
        ledger.register_asset(other_reward(), from_decimals);

        Self {
            engine,
            ledger,
            clock,
        }
    }

    /// Enable `asset` with the engine default receiver.
    pub fn enable(&mut self, asset: Address) {
        self.engine
            .enable(&self.ledger, governance(), asset, None)
            .unwrap();
    }

    /// Give the engine `amount` more of `asset`.
    pub fn fund_engine(&mut self, asset: Address, amount: Amount) {
        let id = self.engine.id();
        self.ledger.mint(asset, id, amount).unwrap();
    }

    /// Mint settlement funds to `who` and approve the engine for all of it.
    pub fn fund_taker(&mut self, who: Address, amount: Amount) {
        self.ledger.mint(want(), who, amount).unwrap();
        self.ledger
            .approve(want(), who, self.engine.id(), Amount::MAX);
    }

    /// Enable, fund and kick `asset` with a lot of `lot`.
    pub fn start(&mut self, asset: Address, lot: Amount) -> Amount {
        self.enable(asset);
        self.fund_engine(asset, lot);
        self.engine.kick(&self.ledger, strategy(), asset).unwrap()
    }

    pub fn balance(&self, asset: Address, holder: Address) -> Amount {
        self.ledger.balance_of(asset, holder)
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
