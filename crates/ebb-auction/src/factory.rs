//! Deterministic engine factory.
//!
//! An engine's address is derived from the factory's implementation id, the
//! engine's settlement asset, receiver and governance, and the address of the
//! caller asking for it. The same tuple always maps to the same address, so
//! it can be predicted off-chain and a repeated request collides instead of
//! silently creating a twin.
//!
//! Derivation: `BLAKE3(domain || implementation || want || receiver ||
//! governance || caller)`, keeping the last 20 bytes.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use ebb_core::clock::SystemClock;
use ebb_core::error::{EbbError, FactoryError};
use ebb_core::traits::Clock;
use ebb_core::types::Address;

use crate::config::{EngineConfig, FactoryDefaults};
use crate::engine::Engine;

/// Domain separator for engine address derivation.
const ENGINE_DOMAIN: &[u8] = b"ebb/engine/v1";

/// Identifier of this crate's engine implementation.
pub fn default_implementation() -> Address {
    let hash = blake3::hash(concat!("ebb-auction/", env!("CARGO_PKG_VERSION")).as_bytes());
    Address::from_slice(&hash.as_bytes()[12..])
}

/// Address an engine gets for a given configuration and creator.
pub fn derive_engine_address(
    implementation: Address,
    want: Address,
    receiver: Address,
    governance: Address,
    caller: Address,
) -> Address {
    let mut hasher = blake3::Hasher::new();
    hasher.update(ENGINE_DOMAIN);
    hasher.update(implementation.as_slice());
    hasher.update(want.as_slice());
    hasher.update(receiver.as_slice());
    hasher.update(governance.as_slice());
    hasher.update(caller.as_slice());
    let hash = hasher.finalize();
    Address::from_slice(&hash.as_bytes()[12..])
}

/// Creates engines with deterministic addresses and shared defaults.
pub struct EngineFactory {
    implementation: Address,
    defaults: FactoryDefaults,
    clock: Arc<dyn Clock>,
    deployed: HashSet<Address>,
    engines: Vec<Address>,
}

impl EngineFactory {
    /// Factory for `implementation` with validated `defaults`.
    pub fn new(implementation: Address, defaults: FactoryDefaults) -> Result<Self, EbbError> {
        defaults.validate()?;
        Ok(Self {
            implementation,
            defaults,
            clock: Arc::new(SystemClock),
            deployed: HashSet::new(),
            engines: Vec::new(),
        })
    }

    /// Clock handed to every engine this factory creates.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn implementation(&self) -> Address {
        self.implementation
    }

    pub fn defaults(&self) -> &FactoryDefaults {
        &self.defaults
    }

    /// Addresses of every engine created, in creation order.
    pub fn engines(&self) -> &[Address] {
        &self.engines
    }

    pub fn is_deployed(&self, engine: Address) -> bool {
        self.deployed.contains(&engine)
    }

    /// Address `caller` would get for these parameters.
    pub fn predict_address(
        &self,
        caller: Address,
        want: Address,
        receiver: Address,
        governance: Address,
    ) -> Address {
        derive_engine_address(self.implementation, want, receiver, governance, caller)
    }

    /// Create an engine with the factory defaults for every tunable.
    pub fn create_new_engine_with_defaults(
        &mut self,
        caller: Address,
        want: Address,
        receiver: Address,
        governance: Address,
    ) -> Result<Engine, EbbError> {
        let config = self.defaults.engine_config(want, receiver, governance);
        self.create_new_engine_with_config(caller, config)
    }

    /// Create an engine with a custom starting price.
    pub fn create_new_engine(
        &mut self,
        caller: Address,
        want: Address,
        receiver: Address,
        governance: Address,
        starting_price: u128,
    ) -> Result<Engine, EbbError> {
        let config = EngineConfig {
            starting_price,
            ..self.defaults.engine_config(want, receiver, governance)
        };
        self.create_new_engine_with_config(caller, config)
    }

    /// Create an engine from a full configuration.
    ///
    /// The address only depends on want, receiver, governance and caller;
    /// two configurations that differ only in pricing collide.
    pub fn create_new_engine_with_config(
        &mut self,
        caller: Address,
        config: EngineConfig,
    ) -> Result<Engine, EbbError> {
        config.validate()?;
        let id = self.predict_address(caller, config.want, config.receiver, config.governance);
        if self.deployed.contains(&id) {
            return Err(FactoryError::AlreadyDeployed(id).into());
        }

        let engine = Engine::new(id, config)?.with_clock(self.clock.clone());
        self.deployed.insert(id);
        self.engines.push(id);

        info!(
            engine = %id,
            %caller,
            want = %engine.want(),
            governance = %engine.governance(),
            "engine created"
        );
        Ok(engine)
    }
}
