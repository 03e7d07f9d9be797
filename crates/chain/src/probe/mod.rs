//! Read-only probe abstractions.
//!
//! A probe reports what an action *would* do against the current chain
//! snapshot without committing any state change. The decision engines in
//! `liqsim-core` only ever talk to the chain through these traits, so the
//! same engines run against a forked EVM, a live RPC endpoint, or an
//! in-memory test double.
//!
//! # Traits
//!
//! - [`SwapQuoter`]: QuoterV2-style exact-input / exact-output quotes
//! - [`LiquidationPreviewer`]: simulated `liquidationCall` returning its logs
//! - [`PoolStateReader`]: `slot0` + active liquidity of a concentrated-liquidity pool
//! - [`BorrowerReader`]: lending-pool account data of a borrower
//!
//! # Example
//!
//! ```rust,ignore
//! use liqsim_chain::{SwapLeg, SwapQuoter};
//!
//! let leg = SwapLeg::new(collateral, debt, 3000);
//! let quote = quoter.quote_exact_output(&leg, debt_amount).await?;
//! println!("collateral needed: {}", quote.amount_in);
//! ```

mod types;

pub use types::{
    ExactInputQuote, ExactOutputQuote, LiquidationCallParams, PoolPair, PoolState,
    PreviewReceipt, SwapLeg,
};

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

use crate::contracts::UserAccountData;

/// Failure reported by a probe.
///
/// `Reverted` and `Infeasible` describe market conditions (the hypothetical
/// action cannot happen right now) and are recovered by the engines.
/// `Malformed` and `Transport` mean the collaborator is broken or out of sync
/// and must be surfaced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The simulated call reverted.
    #[error("probe reverted: {0}")]
    Reverted(String),

    /// The request cannot be expressed (negative size, amount out of range).
    #[error("infeasible probe request: {0}")]
    Infeasible(String),

    /// The response does not match the expected ABI layout.
    #[error("malformed probe response: {0}")]
    Malformed(String),

    /// RPC / transport failure.
    #[error("probe transport failure: {0}")]
    Transport(String),
}

impl ProbeError {
    /// Whether this failure is a market condition that should degrade to
    /// "do nothing this step" rather than abort.
    pub fn is_market_condition(&self) -> bool {
        matches!(self, Self::Reverted(_) | Self::Infeasible(_))
    }
}

/// Swap quoting probe (Uniswap V3 QuoterV2 semantics).
#[async_trait]
pub trait SwapQuoter: Send + Sync + Debug {
    /// Quote swapping exactly `amount_in` of `leg.token_in`.
    async fn quote_exact_input(
        &self,
        leg: &SwapLeg,
        amount_in: U256,
    ) -> Result<ExactInputQuote, ProbeError>;

    /// Quote receiving exactly `amount_out` of `leg.token_out`.
    async fn quote_exact_output(
        &self,
        leg: &SwapLeg,
        amount_out: U256,
    ) -> Result<ExactOutputQuote, ProbeError>;
}

/// Liquidation preview probe.
///
/// Implementations simulate `Pool.liquidationCall` and return the emitted
/// logs. A revert must be reported as [`ProbeError::Reverted`].
#[async_trait]
pub trait LiquidationPreviewer: Send + Sync + Debug {
    async fn preview_liquidation(
        &self,
        params: &LiquidationCallParams,
    ) -> Result<PreviewReceipt, ProbeError>;
}

/// Reader for the observable state of a concentrated-liquidity pool.
#[async_trait]
pub trait PoolStateReader: Send + Sync + Debug {
    /// Token pair and fee tier of the pool.
    async fn pool_pair(&self) -> Result<PoolPair, ProbeError>;

    /// Current `slot0` price/tick and active liquidity.
    async fn pool_state(&self) -> Result<PoolState, ProbeError>;
}

/// Reader for a borrower's position on the lending pool.
#[async_trait]
pub trait BorrowerReader: Send + Sync + Debug {
    /// `getUserAccountData(user)`: 8-decimal base amounts and WAD health factor.
    async fn user_account_data(&self, user: Address) -> Result<UserAccountData, ProbeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_condition_classification() {
        assert!(ProbeError::Reverted("STF".into()).is_market_condition());
        assert!(ProbeError::Infeasible("negative size".into()).is_market_condition());
        assert!(!ProbeError::Malformed("short return data".into()).is_market_condition());
        assert!(!ProbeError::Transport("connection refused".into()).is_market_condition());
    }
}
