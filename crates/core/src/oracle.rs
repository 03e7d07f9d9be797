//! Quote oracle: the sqrt price a pool would settle at after a
//! hypothetical trade.
//!
//! Probes are read-only. Nothing here ever submits a swap.

use alloy::primitives::U256;
use async_trait::async_trait;
use liqsim_chain::{PoolPair, ProbeError, SwapQuoter};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::debug;

/// Direction of a price-matching trade, in terms of the pool's quote
/// asset (token1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeDirection {
    /// Spend token1 for token0; raises the sqrt price.
    Buy,
    /// Receive token1 for token0; lowers the sqrt price.
    Sell,
}

impl TradeDirection {
    /// Direction that moves `current` toward `target`, if they differ.
    pub fn toward(current: U256, target: U256) -> Option<Self> {
        match target.cmp(&current) {
            std::cmp::Ordering::Greater => Some(Self::Buy),
            std::cmp::Ordering::Less => Some(Self::Sell),
            std::cmp::Ordering::Equal => None,
        }
    }
}

#[async_trait]
pub trait QuoteOracle: Send + Sync + Debug {
    /// Sqrt price (Q96) after trading `amount` of token1 in `direction`.
    async fn price_after_trade(
        &self,
        direction: TradeDirection,
        amount: U256,
    ) -> Result<U256, ProbeError>;
}

/// [`QuoteOracle`] backed by a QuoterV2-style swap quoter for one pool.
///
/// Buys are exact-input quotes of token1 → token0; sells are exact-output
/// quotes of token0 → token1 for the requested token1 amount.
#[derive(Debug, Clone)]
pub struct PoolQuoteOracle<Q> {
    quoter: Q,
    pair: PoolPair,
}

impl<Q: SwapQuoter> PoolQuoteOracle<Q> {
    pub fn new(quoter: Q, pair: PoolPair) -> Self {
        Self { quoter, pair }
    }

    pub fn pair(&self) -> &PoolPair {
        &self.pair
    }
}

#[async_trait]
impl<Q: SwapQuoter> QuoteOracle for PoolQuoteOracle<Q> {
    async fn price_after_trade(
        &self,
        direction: TradeDirection,
        amount: U256,
    ) -> Result<U256, ProbeError> {
        let sqrt_price_after = match direction {
            TradeDirection::Buy => {
                self.quoter
                    .quote_exact_input(&self.pair.buy_leg(), amount)
                    .await?
                    .sqrt_price_x96_after
            }
            TradeDirection::Sell => {
                self.quoter
                    .quote_exact_output(&self.pair.sell_leg(), amount)
                    .await?
                    .sqrt_price_x96_after
            }
        };

        debug!(
            ?direction,
            amount = %amount,
            sqrt_price_after = %sqrt_price_after,
            "Quote oracle probe"
        );

        Ok(sqrt_price_after)
    }
}
