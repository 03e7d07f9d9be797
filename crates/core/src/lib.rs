//! Liqsim decision core.
//!
//! This crate provides the read-only decision procedures of a trading /
//! liquidation agent:
//! - Price-matching trade sizing against a concentrated-liquidity pool
//! - Liquidation profitability accounting (preview + cover quote)
//! - Short-cover sizing after a liquidation
//! - Adversarial front-run screening of near-threshold borrowers
//! - Q96 fixed-point and tick helpers
//!
//! All chain access goes through the probe traits of `liqsim-chain`.
//! Nothing here submits a transaction.

pub mod config;
mod cover;
mod error;
mod front_run;
mod liquidation;
mod oracle;
pub mod root_finder;
mod sizing;
pub mod tick_math;
pub mod u256_math;

#[cfg(test)]
mod testing;

pub use config::{config, init_config, AgentConfig, LiquidationConfig, SizingConfig};
pub use cover::{cover_leg, CoverSwap};
pub use error::DecisionError;
pub use front_run::{BorrowerSnapshot, FrontRunPlan, FrontRunScreen, FrontRunTarget};
pub use liquidation::{
    Accounting, LiquidationAccountant, LiquidationOutcome, LiquidationProposal, ProfitVerdict,
    RejectionReason,
};
pub use oracle::{PoolQuoteOracle, QuoteOracle, TradeDirection};
pub use root_finder::{NewtonSolver, Objective, Root, RootFindingError};
pub use sizing::{SizingEngine, SizingOutcome, SizingRequest, TradeIntent};
