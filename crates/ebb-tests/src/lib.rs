//! Integration and adversarial test suite for Ebb auctions.
//!
//! Tests drive engines through full epoch lifecycles against an in-memory
//! ledger and a manual clock, and try to break the accounting invariants
//! from a taker's perspective.

pub mod helpers;
