//! RPC-backed read-only probes for Uniswap V3 and the Aave V3 pool.
//!
//! Quotes go through QuoterV2 via `eth_call`; nothing is ever broadcast.
//! A fresh HTTP provider is built per call, the same way the rest of the
//! chain layer does it.

use alloy::primitives::{Address, Uint, U160, U256};
use alloy::providers::ProviderBuilder;
use async_trait::async_trait;
use tracing::debug;

use crate::contracts::{IPool, IQuoterV2, IUniswapV3Pool, UserAccountData};
use crate::probe::{
    BorrowerReader, ExactInputQuote, ExactOutputQuote, PoolPair, PoolState, PoolStateReader,
    ProbeError, SwapLeg, SwapQuoter,
};

/// Classify a contract call error.
///
/// Anything carrying revert data is a market condition; ABI decoding
/// failures mean the deployed contract does not match our bindings.
fn classify(err: alloy::contract::Error) -> ProbeError {
    if let Some(data) = err.as_revert_data() {
        return ProbeError::Reverted(format!("revert data {data}"));
    }
    match err {
        alloy::contract::Error::AbiError(e) => ProbeError::Malformed(e.to_string()),
        other => ProbeError::Transport(other.to_string()),
    }
}

fn fee_u24(fee: u32) -> Result<Uint<24, 1>, ProbeError> {
    if fee > 0xFF_FFFF {
        return Err(ProbeError::Infeasible(format!("fee {fee} does not fit uint24")));
    }
    Ok(Uint::<24, 1>::from(fee))
}

/// QuoterV2 client.
#[derive(Debug, Clone)]
pub struct QuoterV2Client {
    rpc_url: String,
    quoter: Address,
}

impl QuoterV2Client {
    pub fn new(rpc_url: impl Into<String>, quoter: Address) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            quoter,
        }
    }

    pub fn quoter_address(&self) -> Address {
        self.quoter
    }
}

#[async_trait]
impl SwapQuoter for QuoterV2Client {
    async fn quote_exact_input(
        &self,
        leg: &SwapLeg,
        amount_in: U256,
    ) -> Result<ExactInputQuote, ProbeError> {
        let url = self
            .rpc_url
            .parse()
            .map_err(|e| ProbeError::Transport(format!("invalid RPC url: {e}")))?;
        let provider = ProviderBuilder::new().on_http(url);
        let quoter = IQuoterV2::new(self.quoter, provider);

        let params = IQuoterV2::QuoteExactInputSingleParams {
            tokenIn: leg.token_in,
            tokenOut: leg.token_out,
            amountIn: amount_in,
            fee: fee_u24(leg.fee)?,
            sqrtPriceLimitX96: U160::ZERO,
        };

        let ret = quoter
            .quoteExactInputSingle(params)
            .call()
            .await
            .map_err(classify)?;

        debug!(
            token_in = %leg.token_in,
            token_out = %leg.token_out,
            amount_in = %amount_in,
            amount_out = %ret.amountOut,
            sqrt_price_after = %ret.sqrtPriceX96After,
            "QuoterV2 exact-input quote"
        );

        Ok(ExactInputQuote {
            amount_out: ret.amountOut,
            sqrt_price_x96_after: U256::from(ret.sqrtPriceX96After),
            initialized_ticks_crossed: ret.initializedTicksCrossed,
            gas_estimate: ret.gasEstimate,
        })
    }

    async fn quote_exact_output(
        &self,
        leg: &SwapLeg,
        amount_out: U256,
    ) -> Result<ExactOutputQuote, ProbeError> {
        let url = self
            .rpc_url
            .parse()
            .map_err(|e| ProbeError::Transport(format!("invalid RPC url: {e}")))?;
        let provider = ProviderBuilder::new().on_http(url);
        let quoter = IQuoterV2::new(self.quoter, provider);

        let params = IQuoterV2::QuoteExactOutputSingleParams {
            tokenIn: leg.token_in,
            tokenOut: leg.token_out,
            amount: amount_out,
            fee: fee_u24(leg.fee)?,
            sqrtPriceLimitX96: U160::ZERO,
        };

        let ret = quoter
            .quoteExactOutputSingle(params)
            .call()
            .await
            .map_err(classify)?;

        debug!(
            token_in = %leg.token_in,
            token_out = %leg.token_out,
            amount_out = %amount_out,
            amount_in = %ret.amountIn,
            sqrt_price_after = %ret.sqrtPriceX96After,
            "QuoterV2 exact-output quote"
        );

        Ok(ExactOutputQuote {
            amount_in: ret.amountIn,
            sqrt_price_x96_after: U256::from(ret.sqrtPriceX96After),
            initialized_ticks_crossed: ret.initializedTicksCrossed,
            gas_estimate: ret.gasEstimate,
        })
    }
}

/// Uniswap V3 pool reader.
#[derive(Debug, Clone)]
pub struct UniswapV3PoolClient {
    rpc_url: String,
    pool: Address,
}

impl UniswapV3PoolClient {
    pub fn new(rpc_url: impl Into<String>, pool: Address) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            pool,
        }
    }

    pub fn pool_address(&self) -> Address {
        self.pool
    }
}

#[async_trait]
impl PoolStateReader for UniswapV3PoolClient {
    async fn pool_pair(&self) -> Result<PoolPair, ProbeError> {
        let url = self
            .rpc_url
            .parse()
            .map_err(|e| ProbeError::Transport(format!("invalid RPC url: {e}")))?;
        let provider = ProviderBuilder::new().on_http(url);
        let pool = IUniswapV3Pool::new(self.pool, provider);

        let token0_call = pool.token0();
        let token1_call = pool.token1();
        let fee_call = pool.fee();
        let (token0, token1, fee) =
            tokio::join!(token0_call.call(), token1_call.call(), fee_call.call());

        Ok(PoolPair {
            token0: token0.map_err(classify)?._0,
            token1: token1.map_err(classify)?._0,
            fee: fee.map_err(classify)?._0.to::<u32>(),
        })
    }

    async fn pool_state(&self) -> Result<PoolState, ProbeError> {
        let url = self
            .rpc_url
            .parse()
            .map_err(|e| ProbeError::Transport(format!("invalid RPC url: {e}")))?;
        let provider = ProviderBuilder::new().on_http(url);
        let pool = IUniswapV3Pool::new(self.pool, provider);

        let slot0 = pool.slot0().call().await.map_err(classify)?;
        let liquidity = pool.liquidity().call().await.map_err(classify)?._0;

        let tick = i32::try_from(slot0.tick)
            .map_err(|e| ProbeError::Malformed(format!("slot0 tick: {e}")))?;

        debug!(
            pool = %self.pool,
            sqrt_price_x96 = %slot0.sqrtPriceX96,
            tick,
            liquidity,
            "Pool state read"
        );

        Ok(PoolState {
            sqrt_price_x96: U256::from(slot0.sqrtPriceX96),
            tick,
            liquidity,
        })
    }
}

/// Aave V3 pool account-data reader.
#[derive(Debug, Clone)]
pub struct AavePoolClient {
    rpc_url: String,
    pool: Address,
}

impl AavePoolClient {
    pub fn new(rpc_url: impl Into<String>, pool: Address) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            pool,
        }
    }

    pub fn pool_address(&self) -> Address {
        self.pool
    }
}

#[async_trait]
impl BorrowerReader for AavePoolClient {
    async fn user_account_data(&self, user: Address) -> Result<UserAccountData, ProbeError> {
        let url = self
            .rpc_url
            .parse()
            .map_err(|e| ProbeError::Transport(format!("invalid RPC url: {e}")))?;
        let provider = ProviderBuilder::new().on_http(url);
        let pool = IPool::new(self.pool, provider);

        let account: UserAccountData = pool
            .getUserAccountData(user)
            .call()
            .await
            .map_err(classify)?
            .into();

        debug!(
            user = %user,
            total_debt_base = %account.total_debt_base,
            health_factor = %account.health_factor,
            "Account data read"
        );

        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_u24_bounds() {
        assert_eq!(fee_u24(3000).unwrap(), Uint::<24, 1>::from(3000u32));
        assert!(matches!(fee_u24(1 << 24), Err(ProbeError::Infeasible(_))));
    }

    #[tokio::test]
    async fn test_invalid_rpc_url_is_transport_failure() {
        let client = QuoterV2Client::new("not a url", Address::ZERO);
        let leg = SwapLeg::new(Address::ZERO, Address::repeat_byte(1), 3000);

        let err = client
            .quote_exact_input(&leg, U256::from(1u64))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Transport(_)));
        assert!(!err.is_market_condition());
    }

    #[tokio::test]
    async fn test_account_data_invalid_rpc_url_is_transport_failure() {
        let client = AavePoolClient::new("not a url", Address::ZERO);

        let err = client
            .user_account_data(Address::repeat_byte(0xbe))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Transport(_)));
    }

    #[tokio::test]
    #[ignore] // Requires network
    async fn test_mainnet_pool_state() {
        // USDC/WETH 0.05% on Ethereum mainnet
        let client = UniswapV3PoolClient::new(
            "https://eth.llamarpc.com",
            "0x88e6A0c2dDD26FEEb64F039a2c41296FcB3f5640".parse().unwrap(),
        );

        let pair = client.pool_pair().await.unwrap();
        assert_eq!(pair.fee, 500);

        let state = client.pool_state().await.unwrap();
        assert!(!state.sqrt_price_x96.is_zero());
    }
}
