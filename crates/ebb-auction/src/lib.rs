//! # ebb-auction — Decaying-price auctions.
//!
//! One [`Engine`] sells any number of enabled assets against a single
//! settlement asset. Each asset runs independent epochs: a `kick` snapshots
//! the engine's balance and starts the price high, the price compounds down
//! every step, and takers buy all or part of the lot at the current price.
//!
//! - [`engine::Engine`] — epoch registry, queries, take, governed setters
//! - [`callback::TakeCallback`] — taker hook invoked mid-take
//! - [`factory::EngineFactory`] — deterministic engine identities
//! - [`config::EngineConfig`] — per-engine parameters
//! - [`governance::Governance`] — controlling principal and hand-over
//! - [`events::AuctionEvent`] — audit record of every mutation

pub mod callback;
pub mod config;
pub mod engine;
pub mod events;
pub mod factory;
pub mod governance;

pub use callback::{TakeCallback, TakeRequest};
pub use config::{EngineConfig, FactoryDefaults};
pub use engine::{AuctionInfo, Engine, TakeOrder, TakeOutcome};
pub use events::{AuctionEvent, EventRecord, ParameterChange};
pub use factory::EngineFactory;
pub use governance::Governance;
