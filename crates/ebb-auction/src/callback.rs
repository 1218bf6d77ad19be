//! Taker callback invoked in the middle of a take.
//!
//! By the time the callback runs, the lot has already left the engine and the
//! epoch's availability is already reduced. The callback may use the lot to
//! raise settlement funds and may even call back into the engine; when it
//! returns, `amount_needed` of the settlement asset must be pullable from the
//! taker, or the whole take is reverted.

use ebb_core::error::EbbError;
use ebb_core::traits::Ledger;
use ebb_core::types::{Address, Amount};

use crate::engine::Engine;

/// Arguments passed to [`TakeCallback::auction_take_callback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TakeRequest<'a> {
    /// Asset that was sold.
    pub asset: Address,
    /// Caller of `take`, who pays the settlement.
    pub taker: Address,
    pub amount_taken: Amount,
    /// Settlement that will be pulled from the taker after the callback.
    pub amount_needed: Amount,
    /// Opaque bytes the taker passed to `take`.
    pub data: &'a [u8],
}

/// Hook a taker supplies to source settlement funds atomically.
pub trait TakeCallback {
    fn auction_take_callback(
        &mut self,
        engine: &mut Engine,
        ledger: &mut dyn Ledger,
        request: &TakeRequest<'_>,
    ) -> Result<(), EbbError>;
}
