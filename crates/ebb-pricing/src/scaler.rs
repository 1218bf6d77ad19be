//! Decimal normalization between a sellable asset and the settlement asset.
//!
//! The scaler is `10^(18 + want_decimals - from_decimals)`. Multiplying a
//! native sellable amount by a WAD price and by the scaler, then dividing by
//! `WAD^2`, yields the settlement amount in the settlement asset's own
//! precision.

use alloy_primitives::U256;
use ebb_core::constants::{MAX_SCALER_EXPONENT, SCALER_BASE_DECIMALS, WAD};
use ebb_core::error::{ConfigError, PricingError};

/// Compute the scaler for selling an asset with `from_decimals` against a
/// settlement asset with `want_decimals`.
pub fn compute_scaler(from_decimals: u8, want_decimals: u8) -> Result<u128, ConfigError> {
    let exponent = SCALER_BASE_DECIMALS + want_decimals as i32 - from_decimals as i32;
    if !(0..=MAX_SCALER_EXPONENT).contains(&exponent) {
        return Err(ConfigError::UnsupportedDecimals {
            from: from_decimals,
            want: want_decimals,
        });
    }
    // Bounded by MAX_SCALER_EXPONENT, so this never overflows.
    Ok(10u128.pow(exponent as u32))
}

/// Settlement owed for `amount` of a sellable asset at a WAD `price`.
///
/// Rounds up so a taker can never underpay by dust.
pub fn amount_needed(amount: u128, price: u128, scaler: u128) -> Result<u128, PricingError> {
    let product = U256::from(amount)
        .checked_mul(U256::from(price))
        .and_then(|v| v.checked_mul(U256::from(scaler)))
        .ok_or(PricingError::ArithmeticOverflow)?;

    let denominator = U256::from(WAD) * U256::from(WAD);
    let mut needed = product / denominator;
    if !(product % denominator).is_zero() {
        needed += U256::from(1u8);
    }

    u128::try_from(needed).map_err(|_| PricingError::ArithmeticOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn equal_decimals_scaler_is_wad() {
        assert_eq!(compute_scaler(18, 18).unwrap(), WAD);
        assert_eq!(compute_scaler(6, 6).unwrap(), WAD);
    }

    #[test]
    fn scaler_six_to_eighteen() {
        assert_eq!(compute_scaler(6, 18).unwrap(), 10u128.pow(30));
    }

    #[test]
    fn scaler_eighteen_to_six() {
        assert_eq!(compute_scaler(18, 6).unwrap(), 10u128.pow(6));
    }

    #[test]
    fn scaler_eight_to_twelve() {
        assert_eq!(compute_scaler(8, 12).unwrap(), 10u128.pow(22));
    }

    #[test]
    fn scaler_out_of_range() {
        assert_eq!(
            compute_scaler(19, 0),
            Err(ConfigError::UnsupportedDecimals { from: 19, want: 0 })
        );
        assert_eq!(
            compute_scaler(0, 21),
            Err(ConfigError::UnsupportedDecimals { from: 0, want: 21 })
        );
        assert!(compute_scaler(0, 20).is_ok());
        assert!(compute_scaler(18, 0).is_ok());
    }

    #[test]
    fn needed_six_decimal_lot_for_eighteen_decimal_settlement() {
        // 1 USDC-like unit at 2.0 settlement per unit → 2 * 10^18.
        let scaler = compute_scaler(6, 18).unwrap();
        assert_eq!(
            amount_needed(1_000_000, 2 * WAD, scaler).unwrap(),
            2_000_000_000_000_000_000
        );
    }

    #[test]
    fn needed_eighteen_decimal_lot_for_six_decimal_settlement() {
        // 1 whole unit at 1.5 → 1.5 * 10^6.
        let scaler = compute_scaler(18, 6).unwrap();
        assert_eq!(amount_needed(WAD, 3 * WAD / 2, scaler).unwrap(), 1_500_000);
    }

    #[test]
    fn needed_eight_decimal_lot_for_twelve_decimal_settlement() {
        // 1 whole unit at 30,000 → 30,000 * 10^12.
        let scaler = compute_scaler(8, 12).unwrap();
        assert_eq!(
            amount_needed(100_000_000, 30_000 * WAD, scaler).unwrap(),
            30_000_000_000_000_000
        );
    }

    #[test]
    fn needed_rounds_up_dust() {
        let scaler = compute_scaler(18, 6).unwrap();
        // 1 wei at 1.0 is 10^-12 of the settlement unit: still owes 1.
        assert_eq!(amount_needed(1, WAD, scaler).unwrap(), 1);
    }

    #[test]
    fn needed_zero_for_zero_price() {
        assert_eq!(amount_needed(1_000, 0, WAD).unwrap(), 0);
    }

    #[test]
    fn needed_overflow_reported() {
        assert_eq!(
            amount_needed(u128::MAX, u128::MAX, u128::MAX),
            Err(PricingError::ArithmeticOverflow)
        );
    }

    proptest! {
        #[test]
        fn needed_monotonic_in_amount(
            a in 0u128..1_000_000_000_000_000_000_000u128,
            b in 0u128..1_000_000_000_000_000_000_000u128,
            price in 0u128..1_000_000_000_000_000_000_000_000u128,
        ) {
            let scaler = compute_scaler(18, 6).unwrap();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(
                amount_needed(lo, price, scaler).unwrap() <= amount_needed(hi, price, scaler).unwrap()
            );
        }

        #[test]
        fn needed_never_undershoots_exact_value(
            amount in 1u128..1_000_000_000_000u128,
            price in 1u128..1_000_000_000_000_000_000_000u128,
        ) {
            // Equal decimals: needed = ceil(amount * price / WAD).
            let needed = amount_needed(amount, price, WAD).unwrap();
            let exact_floor = amount * price / WAD;
            prop_assert!(needed == exact_floor || needed == exact_floor + 1);
            prop_assert!(needed * WAD >= amount * price);
        }
    }
}
