//! ABI bindings for the external contracts the probes talk to.
//!
//! Only the subset the decision engines consume is declared. Field order in
//! every return tuple and event is fixed by the deployed contracts.

pub mod aave_v3;
pub mod uniswap_v3;

pub use aave_v3::{IPool, UserAccountData};
pub use uniswap_v3::{IQuoterV2, IUniswapV3Pool};
