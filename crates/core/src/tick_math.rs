//! Tick helpers for concentrated-liquidity pools.
//!
//! Only used for diagnostics: the closed-form sizing estimate assumes
//! constant liquidity, which stops holding once a trade crosses an
//! initialized tick.

use alloy::primitives::U256;

use crate::u256_math::{u256_to_f64, Q96_F64};

/// Price ratio between adjacent ticks.
pub const TICK_BASE: f64 = 1.0001;

pub const MIN_TICK: i32 = -887_272;
pub const MAX_TICK: i32 = 887_272;

/// Tick spacing for a standard fee tier (hundredths of a bip).
pub fn tick_spacing(fee: u32) -> Option<i32> {
    match fee {
        100 => Some(1),
        500 => Some(10),
        3000 => Some(60),
        10_000 => Some(200),
        _ => None,
    }
}

/// Tick whose price is closest below the given sqrt price, clamped to
/// the pool's tick range.
pub fn tick_from_sqrt_price_x96(sqrt_price_x96: U256) -> i32 {
    let sqrt_price = u256_to_f64(sqrt_price_x96) / Q96_F64;
    if sqrt_price <= 0.0 {
        return MIN_TICK;
    }
    // price = base^tick, sqrt_price = base^(tick/2)
    let tick = (2.0 * sqrt_price.ln() / TICK_BASE.ln()).floor();
    tick.clamp(MIN_TICK as f64, MAX_TICK as f64) as i32
}

/// Sqrt price (Q96) at a tick.
pub fn sqrt_price_x96_at_tick(tick: i32) -> f64 {
    TICK_BASE.powf(tick as f64 / 2.0) * Q96_F64
}

/// Lowest initializable tick at or below `tick`.
pub fn spacing_floor(tick: i32, spacing: i32) -> i32 {
    tick.div_euclid(spacing) * spacing
}

/// Whether moving from `current` to `target` crosses a multiple of the
/// pool's tick spacing, i.e. a tick that could hold a liquidity change.
///
/// Unknown fee tiers report `true` so callers err toward caution.
pub fn crosses_spacing_boundary(current: U256, target: U256, fee: u32) -> bool {
    let Some(spacing) = tick_spacing(fee) else {
        return true;
    };
    let from = tick_from_sqrt_price_x96(current);
    let to = tick_from_sqrt_price_x96(target);
    spacing_floor(from, spacing) != spacing_floor(to, spacing)
}
