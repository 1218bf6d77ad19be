//! # ebb-pricing — Decay pricing for Ebb auctions.
//!
//! All calculations use integer arithmetic only for determinism.
//!
//! - **Compound decay**: the unit price after `n` steps is
//!   `start * (1 - rate)^n`, computed with fixed-point binary exponentiation
//!   so the cost is logarithmic in the step count.
//! - **Floor**: the price saturates at the configured minimum instead of
//!   reaching zero.
//! - **Decimal scaling**: a per-asset scaler maps sellable-asset amounts and
//!   WAD prices onto the settlement asset's native precision.

pub mod curve;
pub mod scaler;

pub use curve::{fixed_pow, ExponentialDecay};
pub use scaler::{amount_needed, compute_scaler};
