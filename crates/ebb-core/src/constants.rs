//! Auction constants. Prices are WAD-scaled (1.0 = 10^18).

/// Fixed-point base for prices and decay factors.
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// Denominator for basis-point rates (10,000 bps = 100%).
pub const BPS_PRECISION: u64 = 10_000;

/// Decimal precision every scaler normalizes against.
pub const SCALER_BASE_DECIMALS: i32 = 18;

/// Largest power of ten a scaler may hold (`10^38` still fits a `u128`).
pub const MAX_SCALER_EXPONENT: i32 = 38;

/// Smallest accepted per-step decay rate.
///
/// Zero would mean a price that never moves.
pub const MIN_STEP_DECAY_RATE_BPS: u64 = 1;

/// Largest accepted per-step decay rate.
///
/// 10,000 bps would zero the price after the first step.
pub const MAX_STEP_DECAY_RATE_BPS: u64 = BPS_PRECISION - 1;

/// Longest accepted step duration: one day, in seconds.
pub const MAX_STEP_DURATION: u64 = 86_400;

/// Longest accepted epoch: thirty days, in seconds.
pub const MAX_AUCTION_LENGTH: u64 = 30 * 86_400;

/// Default epoch length: one day.
pub const DEFAULT_AUCTION_LENGTH: u64 = 86_400;

/// Default step duration: one minute.
pub const DEFAULT_STEP_DURATION: u64 = 60;

/// Default per-step decay: 0.5%.
pub const DEFAULT_STEP_DECAY_RATE_BPS: u64 = 50;

/// Default starting unit price, in whole settlement units per whole sellable unit.
pub const DEFAULT_STARTING_PRICE: u128 = 1_000_000;

/// Largest starting price whose WAD-scaled form still fits a `u128`.
///
/// # Examples
///
/// ```
/// use ebb_core::constants::{MAX_STARTING_PRICE, WAD};
/// assert!(MAX_STARTING_PRICE.checked_mul(WAD).is_some());
/// assert!((MAX_STARTING_PRICE + 1).checked_mul(WAD).is_none());
/// ```
pub const MAX_STARTING_PRICE: u128 = u128::MAX / WAD;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decay_rate_bounds_exclude_degenerate_rates() {
        assert_eq!(MIN_STEP_DECAY_RATE_BPS, 1);
        assert_eq!(MAX_STEP_DECAY_RATE_BPS, 9_999);
    }

    #[test]
    fn default_step_fits_default_epoch() {
        assert!(DEFAULT_STEP_DURATION <= DEFAULT_AUCTION_LENGTH);
        assert!(DEFAULT_AUCTION_LENGTH <= MAX_AUCTION_LENGTH);
    }

    #[test]
    fn max_scaler_fits_u128() {
        assert!(10u128.checked_pow(MAX_SCALER_EXPONENT as u32).is_some());
        assert!(10u128.checked_pow(MAX_SCALER_EXPONENT as u32 + 1).is_none());
    }

    #[test]
    fn default_starting_price_scales_without_overflow() {
        assert_eq!(
            DEFAULT_STARTING_PRICE * WAD,
            1_000_000_000_000_000_000_000_000
        );
    }
}
