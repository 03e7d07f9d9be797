//! Price-matching trade sizing.
//!
//! Given the pool's current sqrt price and active liquidity, size the
//! token1 trade that would move the pool to a target sqrt price.
//!
//! # Algorithm
//!
//! 1. Closed form: `Δtoken1 = L · |target − current| / 2^96` in exact
//!    integer arithmetic. Zero means the prices already agree at Q96
//!    resolution.
//! 2. Optional refinement: Newton iteration on
//!    `price_after_trade(x) − target`, seeded with the closed form. This
//!    corrects for liquidity changes at initialized ticks, which the
//!    closed form cannot see.

use alloy::primitives::{I256, U256};
use liqsim_chain::{PoolState, ProbeError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::SizingConfig;
use crate::error::DecisionError;
use crate::oracle::{QuoteOracle, TradeDirection};
use crate::root_finder::{NewtonSolver, Objective, RootFindingError};
use crate::tick_math::crosses_spacing_boundary;
use crate::u256_math::{f64_to_u256, liquidity_delta_amount, u256_to_f64};

/// Trade the orchestrator should submit: `amount` of token1, spent
/// (`Buy`) or received (`Sell`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeIntent {
    pub direction: TradeDirection,
    pub amount: U256,
}

impl TradeIntent {
    /// Signed token1 amount: positive buys, negative sells.
    ///
    /// `None` if the amount does not fit in an `I256`.
    pub fn signed_amount(&self) -> Option<I256> {
        let magnitude = I256::try_from(self.amount).ok()?;
        Some(match self.direction {
            TradeDirection::Buy => magnitude,
            TradeDirection::Sell => -magnitude,
        })
    }
}

/// Result of a sizing decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SizingOutcome {
    Trade(TradeIntent),
    NoTrade,
    /// Refinement failed; carries the closed-form estimate it started from.
    Nonconvergent { estimate: TradeIntent },
}

impl SizingOutcome {
    pub fn trade(&self) -> Option<&TradeIntent> {
        match self {
            Self::Trade(intent) => Some(intent),
            Self::NoTrade | Self::Nonconvergent { .. } => None,
        }
    }
}

/// Observation a sizing decision is made from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizingRequest {
    pub current_sqrt_price_x96: U256,
    pub target_sqrt_price_x96: U256,
    pub liquidity: u128,
    pub precise: bool,
}

impl SizingRequest {
    pub fn from_pool_state(state: &PoolState, target_sqrt_price_x96: U256, precise: bool) -> Self {
        Self {
            current_sqrt_price_x96: state.sqrt_price_x96,
            target_sqrt_price_x96,
            liquidity: state.liquidity,
            precise,
        }
    }

    fn validate(&self) -> Result<(), DecisionError> {
        if self.current_sqrt_price_x96.is_zero() || self.target_sqrt_price_x96.is_zero() {
            return Err(DecisionError::InvalidObservation(format!(
                "sqrt prices must be positive (current {}, target {})",
                self.current_sqrt_price_x96, self.target_sqrt_price_x96
            )));
        }
        Ok(())
    }
}

/// `f(x) = price_after_trade(x) − target`
struct PriceGap<'a, O: ?Sized> {
    oracle: &'a O,
    direction: TradeDirection,
    target: f64,
}

#[async_trait::async_trait]
impl<'a, O: QuoteOracle + ?Sized> Objective for PriceGap<'a, O> {
    async fn evaluate(&self, x: f64) -> Result<f64, ProbeError> {
        if !x.is_finite() || x < 0.0 {
            return Err(ProbeError::Infeasible(format!("trade size {x}")));
        }
        let price = self
            .oracle
            .price_after_trade(self.direction, f64_to_u256(x))
            .await?;
        Ok(u256_to_f64(price) - self.target)
    }
}

/// Sizing engine. Stateless apart from its solver settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct SizingEngine {
    solver: NewtonSolver,
    /// Fee tier used to flag estimates that cross a tick-spacing boundary.
    fee: Option<u32>,
}

impl SizingEngine {
    pub fn new(solver: NewtonSolver) -> Self {
        Self { solver, fee: None }
    }

    pub fn from_config(config: &SizingConfig) -> Self {
        Self::new(NewtonSolver::new(
            config.max_iterations,
            config.relative_tolerance,
            config.absolute_tolerance,
        ))
    }

    pub fn with_fee_tier(mut self, fee: u32) -> Self {
        self.fee = Some(fee);
        self
    }

    /// Constant-liquidity estimate, or `None` if it rounds to zero.
    pub fn closed_form_estimate(request: &SizingRequest) -> Option<TradeIntent> {
        let current = request.current_sqrt_price_x96;
        let target = request.target_sqrt_price_x96;
        let direction = TradeDirection::toward(current, target)?;
        let delta = if target > current {
            target - current
        } else {
            current - target
        };

        let amount = liquidity_delta_amount(request.liquidity, delta);
        (!amount.is_zero()).then_some(TradeIntent { direction, amount })
    }

    #[instrument(skip(self, oracle), fields(precise = request.precise))]
    pub async fn size<O>(
        &self,
        request: &SizingRequest,
        oracle: &O,
    ) -> Result<SizingOutcome, DecisionError>
    where
        O: QuoteOracle + ?Sized,
    {
        request.validate()?;

        let Some(estimate) = Self::closed_form_estimate(request) else {
            debug!("Prices agree at Q96 resolution, no trade");
            return Ok(SizingOutcome::NoTrade);
        };

        debug!(
            direction = ?estimate.direction,
            amount = %estimate.amount,
            "Closed-form estimate"
        );

        if !request.precise {
            if let Some(fee) = self.fee {
                if crosses_spacing_boundary(
                    request.current_sqrt_price_x96,
                    request.target_sqrt_price_x96,
                    fee,
                ) {
                    warn!(
                        fee,
                        amount = %estimate.amount,
                        "Estimate crosses a tick-spacing boundary; liquidity may change along the way"
                    );
                }
            }
            info!(direction = ?estimate.direction, amount = %estimate.amount, "Sized trade");
            return Ok(SizingOutcome::Trade(estimate));
        }

        let objective = PriceGap {
            oracle,
            direction: estimate.direction,
            target: u256_to_f64(request.target_sqrt_price_x96),
        };

        match self.solver.solve(&objective, u256_to_f64(estimate.amount)).await {
            Ok(root) if root.is_seed() => {
                info!(
                    direction = ?estimate.direction,
                    amount = %estimate.amount,
                    evaluations = root.evaluations,
                    "Closed-form estimate is exact"
                );
                Ok(SizingOutcome::Trade(estimate))
            }
            Ok(root) => {
                let amount = f64_to_u256(root.value);
                if amount.is_zero() {
                    debug!(root = root.value, "Refined size rounds to zero, no trade");
                    return Ok(SizingOutcome::NoTrade);
                }
                info!(
                    direction = ?estimate.direction,
                    estimate = %estimate.amount,
                    amount = %amount,
                    iterations = root.iterations,
                    evaluations = root.evaluations,
                    "Sized trade"
                );
                Ok(SizingOutcome::Trade(TradeIntent {
                    direction: estimate.direction,
                    amount,
                }))
            }
            Err(RootFindingError::Probe(err)) => match DecisionError::from_probe("quoter", &err) {
                Some(decision_err) => Err(decision_err),
                None => {
                    warn!(error = %err, "Quote probe failed during refinement, no trade");
                    Ok(SizingOutcome::NoTrade)
                }
            },
            Err(err) => {
                warn!(error = %err, "Refinement did not converge");
                Ok(SizingOutcome::Nonconvergent { estimate })
            }
        }
    }
}
