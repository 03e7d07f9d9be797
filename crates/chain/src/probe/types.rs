//! Probe request and response shapes.
//!
//! These mirror the external contract layouts field-for-field; only the
//! fields the engines consume are documented as such.

use alloy::primitives::{Address, LogData, U256};
use serde::{Deserialize, Serialize};

/// One swap hop through a single pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapLeg {
    /// Token sent into the pool
    pub token_in: Address,
    /// Token received from the pool
    pub token_out: Address,
    /// Fee tier in hundredths of a basis point (3000 = 0.3%)
    pub fee: u32,
}

impl SwapLeg {
    pub fn new(token_in: Address, token_out: Address, fee: u32) -> Self {
        Self {
            token_in,
            token_out,
            fee,
        }
    }

    /// Same pool, opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            token_in: self.token_out,
            token_out: self.token_in,
            fee: self.fee,
        }
    }
}

/// Token pair of a Uniswap V3 pool (token0 < token1 by address).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolPair {
    pub token0: Address,
    pub token1: Address,
    pub fee: u32,
}

impl PoolPair {
    /// Leg that pays token1 and receives token0 (raises the token0 price).
    pub fn buy_leg(&self) -> SwapLeg {
        SwapLeg::new(self.token1, self.token0, self.fee)
    }

    /// Leg that pays token0 and receives token1 (lowers the token0 price).
    pub fn sell_leg(&self) -> SwapLeg {
        SwapLeg::new(self.token0, self.token1, self.fee)
    }
}

/// Observed pool state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    /// `slot0.sqrtPriceX96` (price of token0 in token1)
    pub sqrt_price_x96: U256,
    /// `slot0.tick`
    pub tick: i32,
    /// Active liquidity in the current range
    pub liquidity: u128,
}

/// `quoteExactInputSingle` return values, in ABI order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactInputQuote {
    pub amount_out: U256,
    pub sqrt_price_x96_after: U256,
    pub initialized_ticks_crossed: u32,
    pub gas_estimate: U256,
}

/// `quoteExactOutputSingle` return values, in ABI order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactOutputQuote {
    pub amount_in: U256,
    pub sqrt_price_x96_after: U256,
    pub initialized_ticks_crossed: u32,
    pub gas_estimate: U256,
}

/// Arguments of `Pool.liquidationCall`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationCallParams {
    pub collateral_asset: Address,
    pub debt_asset: Address,
    pub user: Address,
    pub debt_to_cover: U256,
    pub receive_a_token: bool,
}

/// Result of a simulated liquidation call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewReceipt {
    /// Logs emitted by the simulated call, in emission order
    pub logs: Vec<LogData>,
    /// Gas used by the simulation
    pub gas_used: u64,
}

impl PreviewReceipt {
    pub fn new(logs: Vec<LogData>, gas_used: u64) -> Self {
        Self { logs, gas_used }
    }

    /// Last emitted log, if any.
    pub fn last_log(&self) -> Option<&LogData> {
        self.logs.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_pair_legs() {
        let pair = PoolPair {
            token0: Address::repeat_byte(1),
            token1: Address::repeat_byte(2),
            fee: 500,
        };

        let buy = pair.buy_leg();
        assert_eq!(buy.token_in, pair.token1);
        assert_eq!(buy.token_out, pair.token0);

        let sell = pair.sell_leg();
        assert_eq!(sell, buy.reversed());
        assert_eq!(sell.fee, 500);
    }

    #[test]
    fn test_last_log() {
        let receipt = PreviewReceipt::default();
        assert!(receipt.last_log().is_none());

        let first = LogData::new_unchecked(vec![], vec![1u8].into());
        let second = LogData::new_unchecked(vec![], vec![2u8].into());
        let receipt = PreviewReceipt::new(vec![first, second.clone()], 21_000);
        assert_eq!(receipt.last_log(), Some(&second));
    }
}
