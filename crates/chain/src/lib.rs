//! Liqsim chain interaction layer.
//!
//! This crate provides:
//! - ABI bindings for the Aave V3 Pool and Uniswap V3 pool / QuoterV2
//! - Read-only probe traits consumed by the decision engines
//! - `LiquidationCall` log decoding for liquidation previews
//! - RPC-backed probes (QuoterV2 quotes, pool `slot0` / liquidity reads,
//!   Aave account data)
//!
//! Nothing in this crate signs or broadcasts transactions.

pub mod contracts;
mod events;
pub mod probe;
mod quoter;

pub use contracts::{IPool, IQuoterV2, IUniswapV3Pool, UserAccountData};
pub use events::{LiquidationCallLog, LogDecodeError};
pub use probe::{
    BorrowerReader, ExactInputQuote, ExactOutputQuote, LiquidationCallParams,
    LiquidationPreviewer, PoolPair, PoolState, PoolStateReader, PreviewReceipt, ProbeError,
    SwapLeg, SwapQuoter,
};
pub use quoter::{AavePoolClient, QuoterV2Client, UniswapV3PoolClient};
