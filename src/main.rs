//! Liqsim dry run
//!
//! Reads a Uniswap V3 pool, sizes the trade that would move it to a target
//! price and prints the decision as JSON. Optionally prices covering a debt
//! amount through the same pool, buying the debt asset with the collateral
//! asset. Nothing is ever signed or sent.

use alloy::primitives::{Address, U256};
use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use liqsim_chain::{PoolStateReader, QuoterV2Client, SwapQuoter, UniswapV3PoolClient};
use liqsim_core::tick_math::tick_spacing;
use liqsim_core::u256_math::{price_from_sqrt_price_x96, sqrt_price_x96_from_price};
use liqsim_core::{cover_leg, init_config, AgentConfig, PoolQuoteOracle, SizingEngine, SizingRequest};

/// Environment variable names.
mod env {
    pub const RPC_URL: &str = "RPC_URL";
    pub const POOL: &str = "POOL";
    pub const QUOTER: &str = "QUOTER";
    pub const TARGET_PRICE: &str = "TARGET_PRICE";
    pub const PRECISE: &str = "PRECISE";
    pub const COVER_DEBT_AMOUNT: &str = "COVER_DEBT_AMOUNT";
    pub const COLLATERAL_ASSET: &str = "COLLATERAL_ASSET";
    pub const DEBT_ASSET: &str = "DEBT_ASSET";
    pub const AGENT_CONFIG: &str = "AGENT_CONFIG";
}

/// Configuration loaded from environment.
struct Config {
    rpc_url: String,
    pool: Address,
    quoter: Address,
    /// Price of token0 in token1
    target_price: f64,
    precise: Option<bool>,
    cover_debt_amount: Option<U256>,
    /// Defaults to token0 of the pool
    collateral_asset: Option<Address>,
    /// Defaults to token1 of the pool
    debt_asset: Option<Address>,
}

fn load_config() -> Result<Config> {
    let get_env = |name: &str| -> Result<String> {
        std::env::var(name).map_err(|_| anyhow::anyhow!("Missing env var: {}", name))
    };

    let get_address = |name: &str| -> Result<Address> {
        get_env(name)?
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid address for {}: {}", name, e))
    };

    let target_price: f64 = get_env(env::TARGET_PRICE)?
        .parse()
        .context("TARGET_PRICE must be a number")?;
    if !(target_price.is_finite() && target_price > 0.0) {
        anyhow::bail!("TARGET_PRICE must be positive, got {target_price}");
    }

    let precise = match std::env::var(env::PRECISE) {
        Ok(value) => Some(
            value
                .parse::<bool>()
                .context("PRECISE must be true or false")?,
        ),
        Err(_) => None,
    };

    let cover_debt_amount = match std::env::var(env::COVER_DEBT_AMOUNT) {
        Ok(value) => Some(
            value
                .parse::<U256>()
                .context("COVER_DEBT_AMOUNT must be an integer amount")?,
        ),
        Err(_) => None,
    };

    let optional_address = |name: &str| -> Result<Option<Address>> {
        match std::env::var(name) {
            Ok(_) => get_address(name).map(Some),
            Err(_) => Ok(None),
        }
    };

    Ok(Config {
        rpc_url: get_env(env::RPC_URL)?,
        pool: get_address(env::POOL)?,
        quoter: get_address(env::QUOTER)?,
        target_price,
        precise,
        cover_debt_amount,
        collateral_asset: optional_address(env::COLLATERAL_ASSET)?,
        debt_asset: optional_address(env::DEBT_ASSET)?,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,liqsim_core=debug,liqsim_chain=debug")),
        )
        .init();

    // AGENT_CONFIG (TOML path) wins over AGENT_PROFILE
    if let Ok(path) = std::env::var(env::AGENT_CONFIG) {
        init_config(AgentConfig::from_file(&path)?);
    }
    let agent_config = liqsim_core::config();
    agent_config.log_config();

    let config = load_config()?;
    let precise = config.precise.unwrap_or(agent_config.sizing.precise);

    let pool = UniswapV3PoolClient::new(config.rpc_url.clone(), config.pool);
    let pair = pool.pool_pair().await?;
    let state = pool.pool_state().await?;

    info!(
        pool = %config.pool,
        token0 = %pair.token0,
        token1 = %pair.token1,
        fee = pair.fee,
        tick = state.tick,
        liquidity = state.liquidity,
        price = price_from_sqrt_price_x96(state.sqrt_price_x96),
        "Pool state"
    );

    let target = sqrt_price_x96_from_price(config.target_price);
    let request = SizingRequest::from_pool_state(&state, target, precise);

    let quoter = QuoterV2Client::new(config.rpc_url.clone(), config.quoter);
    let oracle = PoolQuoteOracle::new(quoter.clone(), pair);

    let mut engine = SizingEngine::from_config(&agent_config.sizing);
    if tick_spacing(pair.fee).is_some() {
        engine = engine.with_fee_tier(pair.fee);
    }
    let outcome = engine.size(&request, &oracle).await?;

    let cover = match config.cover_debt_amount {
        Some(amount) => {
            let collateral_asset = config.collateral_asset.unwrap_or(pair.token0);
            let debt_asset = config.debt_asset.unwrap_or(pair.token1);
            for asset in [collateral_asset, debt_asset] {
                if asset != pair.token0 && asset != pair.token1 {
                    anyhow::bail!("{asset} is not a token of pool {}", config.pool);
                }
            }
            if collateral_asset == debt_asset {
                anyhow::bail!("collateral and debt asset must differ");
            }

            let leg = cover_leg(collateral_asset, debt_asset, pair.fee);
            let quote = quoter.quote_exact_output(&leg, amount).await?;
            Some(serde_json::json!({
                "collateral_asset": collateral_asset,
                "debt_asset": debt_asset,
                "debt_amount": amount,
                "collateral_cost": quote.amount_in,
                "sqrt_price_x96_after": quote.sqrt_price_x96_after,
                "initialized_ticks_crossed": quote.initialized_ticks_crossed,
            }))
        }
        None => None,
    };

    let report = serde_json::json!({
        "pool": config.pool,
        "pair": pair,
        "state": state,
        "target_sqrt_price_x96": target,
        "precise": precise,
        "sizing": outcome,
        "signed_amount": outcome.trade().and_then(|t| t.signed_amount()).map(|a| a.to_string()),
        "cover": cover,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
