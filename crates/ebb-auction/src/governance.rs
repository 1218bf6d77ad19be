//! Controlling principal of an engine, with two-step hand-over.

use serde::{Deserialize, Serialize};

use ebb_core::error::{AuthError, ConfigError, EbbError};
use ebb_core::types::Address;

/// The address allowed to call governed operations.
///
/// Hand-over is two-step: the current governance nominates a successor, and
/// the successor must accept before anything changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Governance {
    governance: Address,
    pending: Option<Address>,
}

impl Governance {
    pub fn new(governance: Address) -> Self {
        Self {
            governance,
            pending: None,
        }
    }

    pub fn governance(&self) -> Address {
        self.governance
    }

    pub fn pending(&self) -> Option<Address> {
        self.pending
    }

    /// Reject any caller that is not the current governance.
    pub fn ensure(&self, caller: Address) -> Result<(), AuthError> {
        if caller == self.governance {
            Ok(())
        } else {
            Err(AuthError::Unauthorized(caller))
        }
    }

    /// Nominate `new_governance`. Replaces any earlier nomination.
    pub fn transfer(&mut self, caller: Address, new_governance: Address) -> Result<(), EbbError> {
        self.ensure(caller)?;
        if new_governance.is_zero() {
            return Err(ConfigError::ZeroAddress("governance").into());
        }
        self.pending = Some(new_governance);
        Ok(())
    }

    /// Complete a hand-over. Returns the previous governance.
    pub fn accept(&mut self, caller: Address) -> Result<Address, AuthError> {
        if self.pending != Some(caller) {
            return Err(AuthError::NotPendingGovernance(caller));
        }
        let previous = self.governance;
        self.governance = caller;
        self.pending = None;
        Ok(previous)
    }
}
