//! U256 / fixed-point helpers for sqrt-price and liquidity arithmetic.
//!
//! Sizing estimates are computed in exact integer arithmetic; the f64
//! conversions here exist for the Newton refinement and for logging.

use alloy::primitives::{U256, U512};

/// Q96 resolution: sqrt prices carry 96 fractional bits.
pub const Q96_RESOLUTION: usize = 96;

/// 2^96 as U256
pub const Q96: U256 = U256::from_limbs([0, 1 << 32, 0, 0]);

/// 2^96 as f64
pub const Q96_F64: f64 = 79_228_162_514_264_337_593_543_950_336.0;

/// WAD constant: 1e18 for 18-decimal fixed-point arithmetic
pub const WAD: U256 = U256::from_limbs([1_000_000_000_000_000_000u64, 0, 0, 0]);

/// Fast power of 10 (up to 10^38 from u128, beyond via pow)
#[inline(always)]
pub fn pow10(exp: u8) -> U256 {
    if exp < 39 {
        U256::from(10u128.pow(exp as u32))
    } else {
        U256::from(10u64).pow(U256::from(exp))
    }
}

/// `liquidity * delta_sqrt_price_x96 / 2^96`, truncating.
///
/// The product needs up to 288 bits, so it is formed in 512 bits. The
/// shifted result always fits in 192 bits.
#[inline]
pub fn liquidity_delta_amount(liquidity: u128, delta_sqrt_price_x96: U256) -> U256 {
    let product = U512::from(liquidity) * U512::from(delta_sqrt_price_x96);
    let shifted = product >> Q96_RESOLUTION;
    U256::from_limbs_slice(&shifted.as_limbs()[..4])
}

/// Convert U256 to f64 (nearest-ish, for numerics and display).
#[inline]
pub fn u256_to_f64(value: U256) -> f64 {
    value
        .as_limbs()
        .iter()
        .rev()
        .fold(0.0, |acc, &limb| acc * 18_446_744_073_709_551_616.0 + limb as f64)
}

/// Convert f64 to U256, truncating toward zero.
///
/// Negative, NaN and sub-unit values map to zero; values beyond 2^256
/// saturate.
pub fn f64_to_u256(value: f64) -> U256 {
    if !value.is_finite() || value < 1.0 {
        return if value == f64::INFINITY { U256::MAX } else { U256::ZERO };
    }

    let bits = value.to_bits();
    let exponent = ((bits >> 52) & 0x7ff) as i32 - 1075;
    let mantissa = (bits & ((1u64 << 52) - 1)) | (1u64 << 52);

    if exponent >= 0 {
        if exponent > 256 - 53 {
            return U256::MAX;
        }
        U256::from(mantissa) << exponent as usize
    } else {
        U256::from(mantissa >> (-exponent) as u32)
    }
}

/// Convert WAD (18 decimals) to f64.
#[inline(always)]
pub fn wad_to_f64(wad: U256) -> f64 {
    u256_to_f64(wad) / 1e18
}

/// Price of token0 in token1 encoded by a sqrt price: `(sqrt / 2^96)^2`.
#[inline]
pub fn price_from_sqrt_price_x96(sqrt_price_x96: U256) -> f64 {
    let sqrt_price = u256_to_f64(sqrt_price_x96) / Q96_F64;
    sqrt_price * sqrt_price
}

/// `sqrt(price) * 2^96` (price of token0 in token1).
#[inline]
pub fn sqrt_price_x96_from_price(price: f64) -> U256 {
    if price <= 0.0 {
        return U256::ZERO;
    }
    f64_to_u256(price.sqrt() * Q96_F64)
}

/// Sqrt price (token0 in token1) matching an external price of the risky
/// asset quoted in the stable asset.
///
/// If the stable asset is token1 the pool price is the risky price itself,
/// otherwise it is its reciprocal.
pub fn target_sqrt_price_x96(risky_price_in_stable: f64, stable_is_token1: bool) -> U256 {
    if risky_price_in_stable <= 0.0 {
        return U256::ZERO;
    }
    if stable_is_token1 {
        sqrt_price_x96_from_price(risky_price_in_stable)
    } else {
        sqrt_price_x96_from_price(1.0 / risky_price_in_stable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_q96_constant() {
        assert_eq!(Q96, U256::from(1u64) << 96);
        assert_eq!(u256_to_f64(Q96), Q96_F64);
    }

    #[test]
    fn test_pow10_lookup() {
        assert_eq!(pow10(0), U256::from(1u64));
        assert_eq!(pow10(6), U256::from(1_000_000u64));
        assert_eq!(pow10(18), WAD);
        assert_eq!(pow10(40), U256::from(10u64).pow(U256::from(40u64)));
    }

    #[test]
    fn test_liquidity_delta_amount() {
        // 1e20 liquidity across a full 2^96 sqrt-price move
        let liquidity = 100_000_000_000_000_000_000u128;
        assert_eq!(liquidity_delta_amount(liquidity, Q96), U256::from(liquidity));

        // Product exceeds 256 bits without overflowing
        let big = liquidity_delta_amount(u128::MAX, U256::from(1u64) << 159);
        assert_eq!(big, U256::from(u128::MAX) << 63);

        assert_eq!(liquidity_delta_amount(0, Q96), U256::ZERO);
    }

    #[test]
    fn test_f64_to_u256_truncates() {
        assert_eq!(f64_to_u256(0.0), U256::ZERO);
        assert_eq!(f64_to_u256(-5.0), U256::ZERO);
        assert_eq!(f64_to_u256(f64::NAN), U256::ZERO);
        assert_eq!(f64_to_u256(0.99), U256::ZERO);
        assert_eq!(f64_to_u256(1.0), U256::from(1u64));
        assert_eq!(f64_to_u256(12345.9), U256::from(12345u64));
        assert_eq!(f64_to_u256(1e18), U256::from(1_000_000_000_000_000_000u64));
        assert_eq!(f64_to_u256(Q96_F64), Q96);
        assert_eq!(f64_to_u256(f64::INFINITY), U256::MAX);
    }

    #[test]
    fn test_price_conversions() {
        assert_eq!(sqrt_price_x96_from_price(1.0), Q96);
        assert_eq!(sqrt_price_x96_from_price(4.0), Q96 * U256::from(2u64));
        assert!((price_from_sqrt_price_x96(Q96 * U256::from(3u64)) - 9.0).abs() < 1e-12);
        assert_eq!(sqrt_price_x96_from_price(0.0), U256::ZERO);
    }

    #[test]
    fn test_target_orientation() {
        // Risky asset at 4 stable units
        assert_eq!(target_sqrt_price_x96(4.0, true), Q96 * U256::from(2u64));
        assert_eq!(target_sqrt_price_x96(4.0, false), Q96 / U256::from(2u64));
    }

    #[test]
    fn test_wad_to_f64() {
        assert_eq!(wad_to_f64(WAD), 1.0);
        assert_eq!(wad_to_f64(WAD * U256::from(3u64) / U256::from(2u64)), 1.5);
    }
}
