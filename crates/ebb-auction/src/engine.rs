//! Auction engine: per-asset epochs sold against one settlement asset.
//!
//! Each enabled asset moves through `Inactive → Active → Inactive` as it is
//! kicked, taken and expired. Price and availability are never stored; they
//! are derived from the epoch record and the clock at query time, so an
//! epoch expires without anything having to run.
//!
//! A take is all-or-nothing. The engine snapshots its own state and the
//! ledger before the first effect and restores both when any later step
//! fails, including a failure inside the taker's callback.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use ebb_core::clock::SystemClock;
use ebb_core::error::{ConfigError, EbbError, PricingError, SettlementError, StateError, TakeError};
use ebb_core::traits::{Clock, Ledger, PriceCurve};
use ebb_core::types::{Address, Amount, Timestamp};
use ebb_pricing::{amount_needed, compute_scaler, ExponentialDecay};

use crate::callback::{TakeCallback, TakeRequest};
use crate::config::EngineConfig;
use crate::events::{AuctionEvent, EventRecord, ParameterChange};
use crate::governance::Governance;

/// Persisted epoch record for one sellable asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionInfo {
    /// Start of the current epoch; 0 if there is none.
    pub kicked: Timestamp,
    /// Time of the most recent kick, kept across `settle`; 0 if never kicked.
    pub last_kicked: Timestamp,
    /// Decimal scaler fixed at enable time.
    pub scaler: u128,
    /// Lot size snapshotted at kick.
    pub initial_available: Amount,
    /// Cumulative amount taken in the current epoch.
    pub taken: Amount,
    /// Per-asset proceeds receiver, overriding the engine default.
    pub receiver: Option<Address>,
}

impl AuctionInfo {
    fn remaining(&self) -> Amount {
        self.initial_available.saturating_sub(self.taken)
    }
}

/// Parameters of a single take.
///
/// Defaults: the whole available lot, delivered to the caller, no callback.
#[derive(Default)]
pub struct TakeOrder<'a> {
    pub amount: Option<Amount>,
    pub recipient: Option<Address>,
    pub callback: Option<(&'a mut dyn TakeCallback, &'a [u8])>,
}

impl<'a> TakeOrder<'a> {
    /// Take everything currently available.
    pub fn all() -> Self {
        Self::default()
    }

    /// Take exactly `amount`.
    pub fn amount(amount: Amount) -> Self {
        Self {
            amount: Some(amount),
            ..Self::default()
        }
    }

    /// Deliver the lot to `recipient` instead of the caller.
    pub fn to(mut self, recipient: Address) -> Self {
        self.recipient = Some(recipient);
        self
    }

    /// Invoke `callback` with `data` after the lot is delivered.
    pub fn with_callback(mut self, callback: &'a mut dyn TakeCallback, data: &'a [u8]) -> Self {
        self.callback = Some((callback, data));
        self
    }
}

/// Result of a successful take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakeOutcome {
    pub amount_taken: Amount,
    pub amount_needed: Amount,
    pub amount_left: Amount,
}

/// Engine state restored when an atomic operation fails.
enum Snapshot {
    /// Everything; needed when a callback may re-enter the engine.
    Full {
        config: EngineConfig,
        governance: Governance,
        auctions: HashMap<Address, AuctionInfo>,
        enabled: Vec<Address>,
        events_len: usize,
    },
    /// One asset's record and the event log length.
    Asset {
        asset: Address,
        info: Option<AuctionInfo>,
        events_len: usize,
    },
}

/// A decaying-price auction engine for one settlement asset.
pub struct Engine {
    id: Address,
    config: EngineConfig,
    governance: Governance,
    auctions: HashMap<Address, AuctionInfo>,
    enabled: Vec<Address>,
    events: Vec<EventRecord>,
    clock: Arc<dyn Clock>,
    curve: Arc<dyn PriceCurve>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("governance", &self.governance)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Create an engine at `id`, holding balances under that address.
    ///
    /// Uses the system clock and the exponential decay curve.
    pub fn new(id: Address, config: EngineConfig) -> Result<Self, EbbError> {
        if id.is_zero() {
            return Err(ConfigError::ZeroAddress("engine").into());
        }
        config.validate()?;
        Ok(Self {
            id,
            governance: Governance::new(config.governance),
            config,
            auctions: HashMap::new(),
            enabled: Vec::new(),
            events: Vec::new(),
            clock: Arc::new(SystemClock),
            curve: Arc::new(ExponentialDecay::new()),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_curve(mut self, curve: Arc<dyn PriceCurve>) -> Self {
        self.curve = curve;
        self
    }

    // --- accessors ---

    /// Address under which the engine holds lots.
    pub fn id(&self) -> Address {
        self.id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn want(&self) -> Address {
        self.config.want
    }

    pub fn receiver(&self) -> Address {
        self.config.receiver
    }

    pub fn governance(&self) -> Address {
        self.governance.governance()
    }

    pub fn pending_governance(&self) -> Option<Address> {
        self.governance.pending()
    }

    /// Enabled assets in the order they were enabled.
    pub fn enabled_assets(&self) -> &[Address] {
        &self.enabled
    }

    pub fn is_enabled(&self, asset: Address) -> bool {
        self.auctions.contains_key(&asset)
    }

    pub fn auction_info(&self, asset: Address) -> Option<AuctionInfo> {
        self.auctions.get(&asset).copied()
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    // --- queries ---

    /// Current WAD-scaled unit price of `asset`.
    pub fn price(&self, asset: Address) -> Result<u128, EbbError> {
        self.price_at(asset, self.clock.now())
    }

    /// WAD-scaled unit price of `asset` at time `t`.
    ///
    /// Zero for unknown assets, before the first kick and once the epoch has
    /// run past the auction length. A price at the floor is still biddable.
    pub fn price_at(&self, asset: Address, t: Timestamp) -> Result<u128, EbbError> {
        match self.auctions.get(&asset) {
            Some(info) => Ok(self.price_for(info, t)?),
            None => Ok(0),
        }
    }

    /// Settlement needed to take `amount` of `asset` now.
    pub fn amount_needed(&self, asset: Address, amount: Amount) -> Result<Amount, EbbError> {
        self.amount_needed_at(asset, amount, self.clock.now())
    }

    /// Settlement needed to take `amount` of `asset` at time `t`, rounded up.
    pub fn amount_needed_at(
        &self,
        asset: Address,
        amount: Amount,
        t: Timestamp,
    ) -> Result<Amount, EbbError> {
        let Some(info) = self.auctions.get(&asset) else {
            return Ok(0);
        };
        let price = self.price_for(info, t)?;
        Ok(amount_needed(amount, price, info.scaler)?)
    }

    /// Amount of `asset` that can be taken now.
    pub fn available(&self, asset: Address) -> Amount {
        self.available_at(asset, self.clock.now())
    }

    /// Amount of `asset` that can be taken at time `t`.
    pub fn available_at(&self, asset: Address, t: Timestamp) -> Amount {
        match self.auctions.get(&asset) {
            Some(info) if self.elapsed(info, t).is_some() => info.remaining(),
            _ => 0,
        }
    }

    pub fn is_active(&self, asset: Address) -> Result<bool, EbbError> {
        self.is_active_at(asset, self.clock.now())
    }

    /// Whether `asset` has a started, unexpired, unexhausted epoch with a
    /// non-zero price at time `t`.
    pub fn is_active_at(&self, asset: Address, t: Timestamp) -> Result<bool, EbbError> {
        match self.auctions.get(&asset) {
            Some(info) => Ok(self.is_live(info, t)?),
            None => Ok(false),
        }
    }

    /// Whether any enabled asset is active at time `t`.
    pub fn any_active_at(&self, t: Timestamp) -> Result<bool, EbbError> {
        for info in self.auctions.values() {
            if self.is_live(info, t)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn elapsed(&self, info: &AuctionInfo, t: Timestamp) -> Option<u64> {
        if info.kicked == 0 || t < info.kicked {
            return None;
        }
        let elapsed = t - info.kicked;
        (elapsed <= self.config.auction_length).then_some(elapsed)
    }

    fn price_for(&self, info: &AuctionInfo, t: Timestamp) -> Result<u128, PricingError> {
        match self.elapsed(info, t) {
            Some(elapsed) => self.curve.unit_price(&self.config.decay_params(), elapsed),
            None => Ok(0),
        }
    }

    fn is_live(&self, info: &AuctionInfo, t: Timestamp) -> Result<bool, PricingError> {
        if self.elapsed(info, t).is_none() || info.remaining() == 0 {
            return Ok(false);
        }
        Ok(self.price_for(info, t)? > 0)
    }

    // --- asset registry ---

    /// Start selling `asset`. Returns the decimal scaler fixed for it.
    pub fn enable(
        &mut self,
        ledger: &dyn Ledger,
        caller: Address,
        asset: Address,
        receiver: Option<Address>,
    ) -> Result<u128, EbbError> {
        self.governance.ensure(caller)?;
        if asset.is_zero() {
            return Err(ConfigError::ZeroAddress("asset").into());
        }
        if asset == self.config.want {
            return Err(ConfigError::SettlementAssetNotSellable(asset).into());
        }
        if receiver.is_some_and(|r| r.is_zero()) {
            return Err(ConfigError::ZeroAddress("receiver").into());
        }
        if self.auctions.contains_key(&asset) {
            return Err(StateError::AlreadyEnabled(asset).into());
        }

        let scaler = compute_scaler(ledger.decimals(asset)?, ledger.decimals(self.config.want)?)?;
        self.auctions.insert(
            asset,
            AuctionInfo {
                kicked: 0,
                last_kicked: 0,
                scaler,
                initial_available: 0,
                taken: 0,
                receiver,
            },
        );
        self.enabled.push(asset);

        info!(engine = %self.id, %asset, scaler, "auction enabled");
        self.emit(AuctionEvent::Enabled {
            asset,
            scaler,
            receiver,
        });
        Ok(scaler)
    }

    /// Stop selling `asset`. Any balance the engine holds stays where it is.
    pub fn disable(&mut self, caller: Address, asset: Address) -> Result<(), EbbError> {
        self.governance.ensure(caller)?;
        if self.auctions.remove(&asset).is_none() {
            return Err(StateError::NotEnabled(asset).into());
        }
        self.enabled.retain(|a| *a != asset);

        info!(engine = %self.id, %asset, "auction disabled");
        self.emit(AuctionEvent::Disabled { asset });
        Ok(())
    }

    // --- epochs ---

    /// Start a new epoch for `asset` with the engine's whole balance of it.
    ///
    /// Allowed once the previous epoch has expired or been exhausted and the
    /// kick cooldown has passed since the last kick, settled or not. An epoch
    /// sitting at its price floor with lot remaining is still active and
    /// cannot be re-kicked.
    pub fn kick(
        &mut self,
        ledger: &dyn Ledger,
        caller: Address,
        asset: Address,
    ) -> Result<Amount, EbbError> {
        if self.config.kick_restricted {
            self.governance.ensure(caller)?;
        }
        let info = *self
            .auctions
            .get(&asset)
            .ok_or(StateError::NotEnabled(asset))?;
        let now = self.clock.now();

        if self.is_live(&info, now)? {
            return Err(StateError::TooSoon(asset).into());
        }
        if info.last_kicked != 0
            && now < info.last_kicked.saturating_add(self.config.kick_cooldown)
        {
            return Err(StateError::TooSoon(asset).into());
        }

        let balance = ledger.balance_of(asset, self.id);
        if balance == 0 {
            return Err(StateError::NothingToKick(asset).into());
        }
        Ok(self.start_epoch(asset, balance, now, false))
    }

    /// Restart the epoch for `asset` regardless of its current state.
    pub fn force_kick(
        &mut self,
        ledger: &dyn Ledger,
        caller: Address,
        asset: Address,
    ) -> Result<Amount, EbbError> {
        self.governance.ensure(caller)?;
        if !self.auctions.contains_key(&asset) {
            return Err(StateError::NotEnabled(asset).into());
        }
        let balance = ledger.balance_of(asset, self.id);
        if balance == 0 {
            return Err(StateError::NothingToKick(asset).into());
        }
        let now = self.clock.now();
        if self.is_active_at(asset, now)? {
            warn!(engine = %self.id, %asset, "force-kicking a live auction");
        }
        Ok(self.start_epoch(asset, balance, now, true))
    }

    fn start_epoch(&mut self, asset: Address, balance: Amount, now: Timestamp, forced: bool) -> Amount {
        if let Some(info) = self.auctions.get_mut(&asset) {
            info.kicked = now;
            info.last_kicked = now;
            info.initial_available = balance;
            info.taken = 0;
        }
        info!(engine = %self.id, %asset, available = balance, forced, "auction kicked");
        self.emit(AuctionEvent::Kicked {
            asset,
            available: balance,
            forced,
        });
        balance
    }

    /// Close an epoch whose lot is gone, returning the asset to inactive.
    pub fn settle(&mut self, asset: Address) -> Result<(), EbbError> {
        let info = *self
            .auctions
            .get(&asset)
            .ok_or(StateError::NotEnabled(asset))?;
        if info.kicked == 0 {
            return Err(StateError::NotKicked(asset).into());
        }
        let available = self.available_at(asset, self.clock.now());
        if available > 0 {
            return Err(StateError::StillAvailable { asset, available }.into());
        }
        if let Some(info) = self.auctions.get_mut(&asset) {
            info.kicked = 0;
            info.initial_available = 0;
            info.taken = 0;
        }
        debug!(engine = %self.id, %asset, "auction settled");
        self.emit(AuctionEvent::Settled { asset });
        Ok(())
    }

    /// Move the engine's whole balance of `asset` to governance.
    pub fn sweep(
        &mut self,
        ledger: &mut dyn Ledger,
        caller: Address,
        asset: Address,
    ) -> Result<Amount, EbbError> {
        self.governance.ensure(caller)?;
        if self.is_active_at(asset, self.clock.now())? {
            return Err(StateError::AuctionActive.into());
        }
        let snapshot = self.snapshot_asset(asset);
        self.atomically(ledger, snapshot, |engine, ledger| {
            let amount = ledger.balance_of(asset, engine.id);
            if amount > 0 {
                ledger.transfer(asset, engine.id, caller, amount)?;
            }
            info!(engine = %engine.id, %asset, amount, "swept");
            engine.emit(AuctionEvent::Swept { asset, amount });
            Ok(amount)
        })
    }

    // --- take ---

    /// Buy `asset` at the current price.
    ///
    /// The lot is delivered and availability reduced before the callback
    /// runs, so a re-entrant take sees the reduced amount. Settlement is then
    /// pulled from `caller` through its allowance to the engine. If anything
    /// fails, every effect of the call is undone.
    pub fn take(
        &mut self,
        ledger: &mut dyn Ledger,
        caller: Address,
        asset: Address,
        order: TakeOrder<'_>,
    ) -> Result<TakeOutcome, EbbError> {
        // Without a callback only this asset's record can change.
        let snapshot = if order.callback.is_some() {
            self.snapshot()
        } else {
            self.snapshot_asset(asset)
        };
        let result = self.atomically(ledger, snapshot, |engine, ledger| {
            engine.execute_take(ledger, caller, asset, order)
        });
        if let Err(e) = &result {
            warn!(engine = %self.id, %asset, %caller, error = %e, "take reverted");
        }
        result
    }

    fn execute_take(
        &mut self,
        ledger: &mut dyn Ledger,
        caller: Address,
        asset: Address,
        order: TakeOrder<'_>,
    ) -> Result<TakeOutcome, EbbError> {
        let info = *self
            .auctions
            .get(&asset)
            .ok_or(StateError::NotEnabled(asset))?;
        let now = self.clock.now();
        if !self.is_live(&info, now)? {
            return Err(StateError::NotActive(asset).into());
        }

        let available = info.remaining();
        let amount = order.amount.unwrap_or(available);
        if amount == 0 {
            return Err(TakeError::ZeroAmount.into());
        }
        if amount > available {
            return Err(TakeError::InsufficientAvailable {
                requested: amount,
                available,
            }
            .into());
        }

        let price = self.price_for(&info, now)?;
        let needed = amount_needed(amount, price, info.scaler)?;
        if needed == 0 {
            return Err(TakeError::ZeroSettlement.into());
        }

        if let Some(state) = self.auctions.get_mut(&asset) {
            state.taken += amount;
        }
        let recipient = order.recipient.unwrap_or(caller);
        ledger.transfer(asset, self.id, recipient, amount)?;

        if let Some((callback, data)) = order.callback {
            let request = TakeRequest {
                asset,
                taker: caller,
                amount_taken: amount,
                amount_needed: needed,
                data,
            };
            callback.auction_take_callback(self, ledger, &request)?;
        }

        let receiver = info.receiver.unwrap_or(self.config.receiver);
        ledger
            .transfer_from(self.config.want, self.id, caller, receiver, needed)
            .map_err(|source| SettlementError::Shortfall { needed, source })?;

        let amount_left = self.available_at(asset, now);
        info!(
            engine = %self.id,
            %asset,
            taker = %caller,
            amount_taken = amount,
            amount_needed = needed,
            amount_left,
            "auction taken"
        );
        self.emit(AuctionEvent::Taken {
            asset,
            taker: caller,
            amount_taken: amount,
            amount_needed: needed,
            amount_left,
        });

        Ok(TakeOutcome {
            amount_taken: amount,
            amount_needed: needed,
            amount_left,
        })
    }

    // --- governed setters ---

    pub fn set_starting_price(&mut self, caller: Address, price: u128) -> Result<(), EbbError> {
        self.update_pricing(caller, ParameterChange::StartingPrice(price), |c| {
            c.starting_price = price
        })
    }

    pub fn set_minimum_price(&mut self, caller: Address, price: u128) -> Result<(), EbbError> {
        self.update_pricing(caller, ParameterChange::MinimumPrice(price), |c| {
            c.minimum_price = price
        })
    }

    pub fn set_step_duration(&mut self, caller: Address, secs: u64) -> Result<(), EbbError> {
        self.update_pricing(caller, ParameterChange::StepDuration(secs), |c| {
            c.step_duration = secs
        })
    }

    pub fn set_step_decay_rate(&mut self, caller: Address, bps: u64) -> Result<(), EbbError> {
        self.update_pricing(caller, ParameterChange::StepDecayRate(bps), |c| {
            c.step_decay_rate_bps = bps
        })
    }

    pub fn set_receiver(&mut self, caller: Address, receiver: Address) -> Result<(), EbbError> {
        self.governance.ensure(caller)?;
        self.update_config(ParameterChange::Receiver(receiver), |c| c.receiver = receiver)
    }

    pub fn set_kick_restricted(&mut self, caller: Address, restricted: bool) -> Result<(), EbbError> {
        self.governance.ensure(caller)?;
        self.update_config(ParameterChange::KickRestricted(restricted), |c| {
            c.kick_restricted = restricted
        })
    }

    pub fn set_kick_cooldown(&mut self, caller: Address, secs: u64) -> Result<(), EbbError> {
        self.governance.ensure(caller)?;
        self.update_config(ParameterChange::KickCooldown(secs), |c| c.kick_cooldown = secs)
    }

    /// Nominate a new governance; takes effect once accepted.
    pub fn transfer_governance(&mut self, caller: Address, new_governance: Address) -> Result<(), EbbError> {
        self.governance.transfer(caller, new_governance)?;
        info!(engine = %self.id, pending = %new_governance, "governance transfer started");
        self.emit(AuctionEvent::GovernanceTransferStarted {
            current: caller,
            pending: new_governance,
        });
        Ok(())
    }

    pub fn accept_governance(&mut self, caller: Address) -> Result<(), EbbError> {
        let previous = self.governance.accept(caller)?;
        info!(engine = %self.id, %previous, new = %caller, "governance transferred");
        self.emit(AuctionEvent::GovernanceTransferred {
            previous,
            new: caller,
        });
        Ok(())
    }

    fn update_pricing(
        &mut self,
        caller: Address,
        change: ParameterChange,
        apply: impl FnOnce(&mut EngineConfig),
    ) -> Result<(), EbbError> {
        self.governance.ensure(caller)?;
        if self.any_active_at(self.clock.now())? {
            return Err(StateError::AuctionActive.into());
        }
        self.update_config(change, apply)
    }

    fn update_config(
        &mut self,
        change: ParameterChange,
        apply: impl FnOnce(&mut EngineConfig),
    ) -> Result<(), EbbError> {
        let mut next = self.config.clone();
        apply(&mut next);
        next.validate()?;
        self.config = next;

        info!(engine = %self.id, ?change, "parameter updated");
        self.emit(AuctionEvent::ParameterUpdated(change));
        Ok(())
    }

    // --- plumbing ---

    fn emit(&mut self, event: AuctionEvent) {
        self.events.push(EventRecord {
            timestamp: self.clock.now(),
            event,
        });
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::Full {
            config: self.config.clone(),
            governance: self.governance.clone(),
            auctions: self.auctions.clone(),
            enabled: self.enabled.clone(),
            events_len: self.events.len(),
        }
    }

    fn snapshot_asset(&self, asset: Address) -> Snapshot {
        Snapshot::Asset {
            asset,
            info: self.auctions.get(&asset).copied(),
            events_len: self.events.len(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        match snapshot {
            Snapshot::Full {
                config,
                governance,
                auctions,
                enabled,
                events_len,
            } => {
                self.config = config;
                self.governance = governance;
                self.auctions = auctions;
                self.enabled = enabled;
                self.events.truncate(events_len);
            }
            Snapshot::Asset {
                asset,
                info,
                events_len,
            } => {
                match info {
                    Some(info) => {
                        self.auctions.insert(asset, info);
                    }
                    None => {
                        self.auctions.remove(&asset);
                    }
                }
                self.events.truncate(events_len);
            }
        }
    }

    /// Run `op` so that either all of its effects land or none do.
    ///
    /// `snapshot` must cover every piece of engine state `op` can touch.
    fn atomically<T>(
        &mut self,
        ledger: &mut dyn Ledger,
        snapshot: Snapshot,
        op: impl FnOnce(&mut Self, &mut dyn Ledger) -> Result<T, EbbError>,
    ) -> Result<T, EbbError> {
        let checkpoint = ledger.checkpoint();
        match op(self, ledger) {
            Ok(value) => {
                ledger.commit(checkpoint);
                Ok(value)
            }
            Err(e) => {
                ledger.revert_to(checkpoint);
                self.restore(snapshot);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ebb_core::clock::ManualClock;
    use ebb_core::constants::WAD;
    use ebb_core::error::AuthError;
    use ebb_core::ledger::MemoryLedger;
    use proptest::prelude::*;

    const START: Timestamp = 1_700_000_000;

    fn addr(seed: u8) -> Address {
        Address::repeat_byte(seed)
    }

    fn want() -> Address {
        addr(0xEE)
    }

    fn reward() -> Address {
        addr(0xAA)
    }

    fn gov() -> Address {
        addr(0x60)
    }

    fn receiver() -> Address {
        addr(0x0F)
    }

    fn taker() -> Address {
        addr(0x7A)
    }

    fn setup() -> (Engine, MemoryLedger, ManualClock) {
        let clock = ManualClock::new(START);
        let engine = Engine::new(addr(0xE1), EngineConfig::new(want(), receiver(), gov()))
            .unwrap()
            .with_clock(Arc::new(clock.clone()));
        let mut ledger = MemoryLedger::new();
        ledger.register_asset(want(), 18);
        ledger.register_asset(reward(), 18);
        (engine, ledger, clock)
    }

    fn kicked(lot: Amount) -> (Engine, MemoryLedger, ManualClock) {
        let (mut engine, mut ledger, clock) = setup();
        engine.enable(&ledger, gov(), reward(), None).unwrap();
        ledger.mint(reward(), engine.id(), lot).unwrap();
        engine.kick(&ledger, taker(), reward()).unwrap();
        (engine, ledger, clock)
    }

    #[test]
    fn new_rejects_invalid_config() {
        let cfg = EngineConfig { step_decay_rate_bps: 0, ..EngineConfig::new(want(), receiver(), gov()) };
        assert_eq!(
            Engine::new(addr(1), cfg).unwrap_err(),
            EbbError::Config(ConfigError::InvalidDecayRate(0))
        );
    }

    #[test]
    fn enable_records_scaler() {
        let (mut engine, ledger, _) = setup();
        let scaler = engine.enable(&ledger, gov(), reward(), None).unwrap();
        assert_eq!(scaler, WAD);
        let info = engine.auction_info(reward()).unwrap();
        assert_eq!(info.kicked, 0);
        assert_eq!(info.scaler, WAD);
        assert_eq!(engine.enabled_assets(), &[reward()]);
    }

    #[test]
    fn enable_twice_rejected() {
        let (mut engine, ledger, _) = setup();
        engine.enable(&ledger, gov(), reward(), None).unwrap();
        assert_eq!(
            engine.enable(&ledger, gov(), reward(), None),
            Err(EbbError::State(StateError::AlreadyEnabled(reward())))
        );
    }

    #[test]
    fn enable_requires_governance() {
        let (mut engine, ledger, _) = setup();
        assert_eq!(
            engine.enable(&ledger, taker(), reward(), None),
            Err(EbbError::Auth(AuthError::Unauthorized(taker())))
        );
        assert!(engine.events().is_empty());
    }

    #[test]
    fn enable_settlement_asset_rejected() {
        let (mut engine, ledger, _) = setup();
        assert_eq!(
            engine.enable(&ledger, gov(), want(), None),
            Err(EbbError::Config(ConfigError::SettlementAssetNotSellable(want())))
        );
    }

    #[test]
    fn disable_unknown_rejected() {
        let (mut engine, _, _) = setup();
        assert_eq!(
            engine.disable(gov(), reward()),
            Err(EbbError::State(StateError::NotEnabled(reward())))
        );
    }

    #[test]
    fn kick_snapshots_balance() {
        let (engine, _, _) = kicked(100 * WAD);
        let info = engine.auction_info(reward()).unwrap();
        assert_eq!(info.kicked, START);
        assert_eq!(info.initial_available, 100 * WAD);
        assert_eq!(engine.available(reward()), 100 * WAD);
        assert!(engine.is_active(reward()).unwrap());
    }

    #[test]
    fn kick_empty_balance_rejected() {
        let (mut engine, ledger, _) = setup();
        engine.enable(&ledger, gov(), reward(), None).unwrap();
        assert_eq!(
            engine.kick(&ledger, taker(), reward()),
            Err(EbbError::State(StateError::NothingToKick(reward())))
        );
    }

    #[test]
    fn restricted_kick_requires_governance() {
        let (mut engine, mut ledger, _) = setup();
        engine.enable(&ledger, gov(), reward(), None).unwrap();
        engine.set_kick_restricted(gov(), true).unwrap();
        ledger.mint(reward(), engine.id(), 10).unwrap();
        assert_eq!(
            engine.kick(&ledger, taker(), reward()),
            Err(EbbError::Auth(AuthError::Unauthorized(taker())))
        );
        assert_eq!(engine.kick(&ledger, gov(), reward()), Ok(10));
    }

    #[test]
    fn price_is_zero_before_kick_and_after_expiry() {
        let (engine, _, _) = kicked(WAD);
        assert_eq!(engine.price_at(reward(), START - 1).unwrap(), 0);
        assert_eq!(engine.price_at(reward(), START).unwrap(), 1_000_000 * WAD);
        assert!(engine.price_at(reward(), START + 86_400).unwrap() > 0);
        assert_eq!(engine.price_at(reward(), START + 86_401).unwrap(), 0);
    }

    #[test]
    fn take_full_lot_by_default() {
        let (mut engine, mut ledger, _) = kicked(10 * WAD);
        ledger.mint(want(), taker(), 20_000_000 * WAD).unwrap();
        ledger.approve(want(), taker(), engine.id(), Amount::MAX);

        let outcome = engine
            .take(&mut ledger, taker(), reward(), TakeOrder::all())
            .unwrap();
        assert_eq!(outcome.amount_taken, 10 * WAD);
        assert_eq!(outcome.amount_needed, 10_000_000 * WAD);
        assert_eq!(outcome.amount_left, 0);
        assert_eq!(ledger.balance_of(reward(), taker()), 10 * WAD);
        assert_eq!(ledger.balance_of(want(), receiver()), 10_000_000 * WAD);
        assert!(!engine.is_active(reward()).unwrap());
    }

    #[test]
    fn take_without_allowance_reverts_everything() {
        let (mut engine, mut ledger, _) = kicked(10 * WAD);
        ledger.mint(want(), taker(), 20_000_000 * WAD).unwrap();
        let events_before = engine.events().len();

        let err = engine
            .take(&mut ledger, taker(), reward(), TakeOrder::amount(WAD))
            .unwrap_err();
        assert!(matches!(err, EbbError::Settlement(SettlementError::Shortfall { .. })));
        assert_eq!(ledger.balance_of(reward(), engine.id()), 10 * WAD);
        assert_eq!(ledger.balance_of(reward(), taker()), 0);
        assert_eq!(engine.available(reward()), 10 * WAD);
        assert_eq!(engine.events().len(), events_before);
    }

    #[test]
    fn pricing_setters_blocked_while_active() {
        let (mut engine, _, clock) = kicked(WAD);
        assert_eq!(
            engine.set_step_decay_rate(gov(), 100),
            Err(EbbError::State(StateError::AuctionActive))
        );
        // Receiver is not a pricing parameter.
        engine.set_receiver(gov(), addr(0x0E)).unwrap();

        clock.advance(86_401);
        engine.set_step_decay_rate(gov(), 100).unwrap();
        assert_eq!(engine.config().step_decay_rate_bps, 100);
    }

    #[test]
    fn settle_requires_exhausted_lot() {
        let (mut engine, _, clock) = kicked(WAD);
        assert_eq!(
            engine.settle(reward()),
            Err(EbbError::State(StateError::StillAvailable { asset: reward(), available: WAD }))
        );
        clock.advance(86_401);
        engine.settle(reward()).unwrap();
        assert_eq!(engine.auction_info(reward()).unwrap().kicked, 0);
        assert_eq!(
            engine.settle(reward()),
            Err(EbbError::State(StateError::NotKicked(reward())))
        );
    }

    #[test]
    fn sweep_blocked_while_active() {
        let (mut engine, mut ledger, clock) = kicked(5 * WAD);
        assert_eq!(
            engine.sweep(&mut ledger, gov(), reward()),
            Err(EbbError::State(StateError::AuctionActive))
        );
        clock.advance(86_401);
        assert_eq!(engine.sweep(&mut ledger, gov(), reward()), Ok(5 * WAD));
        assert_eq!(ledger.balance_of(reward(), gov()), 5 * WAD);
    }

    #[test]
    fn governance_handover_moves_authority() {
        let (mut engine, ledger, _) = setup();
        engine.transfer_governance(gov(), addr(0x61)).unwrap();
        engine.accept_governance(addr(0x61)).unwrap();
        assert_eq!(engine.governance(), addr(0x61));
        assert_eq!(
            engine.enable(&ledger, gov(), reward(), None),
            Err(EbbError::Auth(AuthError::Unauthorized(gov())))
        );
        engine.enable(&ledger, addr(0x61), reward(), None).unwrap();
    }

    #[test]
    fn settle_keeps_last_kick_for_cooldown() {
        let (mut engine, mut ledger, clock) = setup();
        engine.set_kick_cooldown(gov(), 3_600).unwrap();
        engine.enable(&ledger, gov(), reward(), None).unwrap();
        ledger.mint(reward(), engine.id(), WAD).unwrap();
        engine.kick(&ledger, taker(), reward()).unwrap();
        ledger.mint(want(), taker(), 2_000_000 * WAD).unwrap();
        ledger.approve(want(), taker(), engine.id(), Amount::MAX);
        engine
            .take(&mut ledger, taker(), reward(), TakeOrder::all())
            .unwrap();

        clock.advance(10);
        engine.settle(reward()).unwrap();
        let info = engine.auction_info(reward()).unwrap();
        assert_eq!((info.kicked, info.last_kicked), (0, START));

        ledger.mint(reward(), engine.id(), WAD).unwrap();
        assert_eq!(
            engine.kick(&ledger, taker(), reward()),
            Err(EbbError::State(StateError::TooSoon(reward())))
        );
        clock.set(START + 3_600);
        assert_eq!(engine.kick(&ledger, taker(), reward()), Ok(WAD));
    }

    #[test]
    fn failed_plain_take_restores_its_asset_only() {
        let (mut engine, mut ledger, _) = kicked(10 * WAD);
        let other = addr(0xAB);
        ledger.register_asset(other, 18);
        engine.enable(&ledger, gov(), other, None).unwrap();
        let before = engine.auction_info(reward());
        let events_before = engine.events().len();

        assert!(engine
            .take(&mut ledger, taker(), reward(), TakeOrder::amount(WAD))
            .is_err());
        assert_eq!(engine.auction_info(reward()), before);
        assert!(engine.is_enabled(other));
        assert_eq!(engine.enabled_assets(), &[reward(), other]);
        assert_eq!(engine.events().len(), events_before);
        assert_eq!(ledger.journal_len(), 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn takes_account_for_every_unit(
            lot in 1u128..1_000_000u128,
            sizes in prop::collection::vec(1u128..=1_000_000u128, 1..10),
        ) {
            let (mut engine, mut ledger, _) = kicked(lot);
            ledger.mint(want(), taker(), u128::MAX / 2).unwrap();
            ledger.approve(want(), taker(), engine.id(), Amount::MAX);

            for size in sizes {
                let available = engine.available(reward());
                let result = engine.take(&mut ledger, taker(), reward(), TakeOrder::amount(size));
                if size <= available {
                    prop_assert_eq!(result.map(|o| o.amount_left), Ok(available - size));
                } else {
                    prop_assert!(result.is_err());
                    prop_assert_eq!(engine.available(reward()), available);
                }
                prop_assert_eq!(ledger.journal_len(), 0);
            }

            let info = engine.auction_info(reward()).unwrap();
            prop_assert_eq!(info.initial_available, lot);
            prop_assert_eq!(engine.available(reward()) + info.taken, lot);
            prop_assert_eq!(ledger.balance_of(reward(), taker()), info.taken);
        }
    }
}
