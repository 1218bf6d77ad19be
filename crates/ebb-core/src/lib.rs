//! # ebb-core
//! Foundation types, errors and host traits for Ebb auctions.

pub mod clock;
pub mod constants;
pub mod error;
pub mod ledger;
pub mod traits;
pub mod types;
