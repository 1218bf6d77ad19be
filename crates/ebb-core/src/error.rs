//! Error types for Ebb auctions.
use alloy_primitives::Address;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("decay rate {0} bps outside [1, 9999]")] InvalidDecayRate(u64),
    #[error("step duration {0}s outside (0, 86400]")] InvalidStepDuration(u64),
    #[error("auction length {length}s outside [{step_duration}, 2592000]")] InvalidAuctionLength { length: u64, step_duration: u64 },
    #[error("starting price is zero")] ZeroStartingPrice,
    #[error("starting price {0} overflows WAD scaling")] StartingPriceTooLarge(u128),
    #[error("minimum price {minimum} above starting price {start}")] MinimumAboveStart { minimum: u128, start: u128 },
    #[error("zero address for {0}")] ZeroAddress(&'static str),
    #[error("unsupported decimals: from {from}, want {want}")] UnsupportedDecimals { from: u8, want: u8 },
    #[error("settlement asset {0} cannot be sold against itself")] SettlementAssetNotSellable(Address),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("unauthorized caller: {0}")] Unauthorized(Address),
    #[error("caller {0} is not the pending governance")] NotPendingGovernance(Address),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("asset already enabled: {0}")] AlreadyEnabled(Address),
    #[error("asset not enabled: {0}")] NotEnabled(Address),
    #[error("nothing to kick for {0}")] NothingToKick(Address),
    #[error("too soon to kick {0}")] TooSoon(Address),
    #[error("an auction is active")] AuctionActive,
    #[error("no active auction for {0}")] NotActive(Address),
    #[error("auction for {0} was never kicked")] NotKicked(Address),
    #[error("auction for {asset} still has {available} available")] StillAvailable { asset: Address, available: u128 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TakeError {
    #[error("zero take amount")] ZeroAmount,
    #[error("requested {requested}, only {available} available")] InsufficientAvailable { requested: u128, available: u128 },
    #[error("amount rounds to zero settlement")] ZeroSettlement,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("unknown asset: {0}")] UnknownAsset(Address),
    #[error("insufficient balance: have {have}, need {need}")] InsufficientBalance { have: u128, need: u128 },
    #[error("insufficient allowance: have {have}, need {need}")] InsufficientAllowance { have: u128, need: u128 },
    #[error("balance overflow")] BalanceOverflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettlementError {
    #[error("settlement of {needed} failed: {source}")] Shortfall { needed: u128, source: LedgerError },
    #[error("callback rejected: {0}")] CallbackRejected(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    #[error("arithmetic overflow")] ArithmeticOverflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FactoryError {
    #[error("engine already deployed at {0}")] AlreadyDeployed(Address),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EbbError {
    #[error(transparent)] Config(#[from] ConfigError),
    #[error(transparent)] Auth(#[from] AuthError),
    #[error(transparent)] State(#[from] StateError),
    #[error(transparent)] Take(#[from] TakeError),
    #[error(transparent)] Ledger(#[from] LedgerError),
    #[error(transparent)] Settlement(#[from] SettlementError),
    #[error(transparent)] Pricing(#[from] PricingError),
    #[error(transparent)] Factory(#[from] FactoryError),
}
