//! Exponential decay curve implementing the [`PriceCurve`] trait.
//!
//! The unit price compounds down once per completed step. All arithmetic is
//! integer-only with u128 intermediates; a retention factor never exceeds
//! WAD, so every product stays below `WAD^2 < u128::MAX`.

use ebb_core::constants::{BPS_PRECISION, WAD};
use ebb_core::error::PricingError;
use ebb_core::traits::PriceCurve;
use ebb_core::types::DecayParams;

/// The production price curve: per-step compounding decay with a floor.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExponentialDecay;

impl ExponentialDecay {
    pub fn new() -> Self {
        Self
    }
}

/// Fixed-point exponentiation: computes `(base/precision)^exp` in fixed-point.
///
/// Uses binary exponentiation for O(log n) multiplications.
/// `base` and the return value use `precision` as denominator. Intermediate
/// products round down, so the result never exceeds the exact value.
pub fn fixed_pow(base: u128, exp: u64, precision: u128) -> Result<u128, PricingError> {
    if exp == 0 {
        return Ok(precision);
    }

    let mut result: u128 = precision;
    let mut b: u128 = base;
    let mut e = exp;

    while e > 0 {
        if e & 1 == 1 {
            result = result
                .checked_mul(b)
                .ok_or(PricingError::ArithmeticOverflow)?
                / precision;
        }
        e >>= 1;
        if e > 0 {
            b = b.checked_mul(b).ok_or(PricingError::ArithmeticOverflow)? / precision;
        }
        // Once either factor hits zero the product stays zero.
        if result == 0 || (b == 0 && e > 0) {
            return Ok(0);
        }
    }

    Ok(result)
}

impl PriceCurve for ExponentialDecay {
    fn unit_price(&self, params: &DecayParams, elapsed: u64) -> Result<u128, PricingError> {
        let steps = self.steps(params, elapsed);

        if params.step_decay_rate_bps >= BPS_PRECISION && steps > 0 {
            return Ok(params.minimum_price);
        }

        let retention_total = fixed_pow(params.retention_wad(), steps, WAD)?;

        // start (whole units) * factor (WAD) is already WAD-scaled.
        let raw = params
            .starting_price
            .checked_mul(retention_total)
            .ok_or(PricingError::ArithmeticOverflow)?;

        Ok(raw.max(params.minimum_price))
    }
}
