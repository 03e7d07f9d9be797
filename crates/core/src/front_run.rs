//! Adversarial front-run screen.
//!
//! A liquidator can push the pool price against borrowers who are close
//! to, but above, the liquidation threshold: selling collateral for debt
//! moves the price the way that lowers their health factor. A borrower is
//! worth targeting when the price impact of covering half their debt is
//! large enough to drag their health factor below one.
//!
//! With `r = sqrt_price_after / sqrt_price_before` of that cover swap, the
//! health factor a trade of that size can erase is bounded by `1 / r²`
//! when the debt asset is token1 and by `r²` otherwise.

use alloy::primitives::{Address, U256};
use liqsim_chain::{BorrowerReader, PoolPair, SwapLeg, SwapQuoter, UserAccountData};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::cover::cover_leg;
use crate::error::DecisionError;
use crate::u256_math::{pow10, u256_to_f64, wad_to_f64};

/// Borrower position as reported by the lending pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowerSnapshot {
    pub user: Address,
    pub account: UserAccountData,
}

impl BorrowerSnapshot {
    /// Read the account data of every user. Users whose read reverts are
    /// left out.
    pub async fn read_all<R: BorrowerReader + ?Sized>(
        reader: &R,
        users: &[Address],
    ) -> Result<Vec<Self>, DecisionError> {
        let mut snapshots = Vec::with_capacity(users.len());
        for &user in users {
            match reader.user_account_data(user).await {
                Ok(account) => snapshots.push(Self { user, account }),
                Err(err) => {
                    if let Some(decision_err) = DecisionError::from_probe("lending pool", &err) {
                        return Err(decision_err);
                    }
                    debug!(user = %user, error = %err, "Account data read reverted, skipping");
                }
            }
        }
        Ok(snapshots)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrontRunTarget {
    pub user: Address,
    pub health_factor: f64,
    pub health_factor_upper_bound: f64,
    pub debt_to_cover: U256,
}

/// Exact-output swap (collateral → debt) that front-runs all targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontRunPlan {
    pub leg: SwapLeg,
    pub targets: Vec<FrontRunTarget>,
    pub total_debt_to_cover: U256,
}

impl FrontRunPlan {
    pub fn is_empty(&self) -> bool {
        self.total_debt_to_cover.is_zero()
    }
}

#[derive(Debug, Clone)]
pub struct FrontRunScreen<Q> {
    quoter: Q,
    pair: PoolPair,
    collateral_asset: Address,
    debt_asset: Address,
    debt_decimals: u8,
}

impl<Q: SwapQuoter> FrontRunScreen<Q> {
    pub fn new(
        quoter: Q,
        pair: PoolPair,
        collateral_asset: Address,
        debt_asset: Address,
        debt_decimals: u8,
    ) -> Self {
        Self {
            quoter,
            pair,
            collateral_asset,
            debt_asset,
            debt_decimals,
        }
    }

    fn leg(&self) -> SwapLeg {
        cover_leg(self.collateral_asset, self.debt_asset, self.pair.fee)
    }

    /// Half the borrower's debt, in debt-asset units.
    ///
    /// `total_debt_base` and `debt_asset_price` share the pool's base
    /// currency decimals, so only the asset decimals need applying.
    pub fn debt_to_cover(&self, total_debt_base: U256, debt_asset_price: U256) -> U256 {
        total_debt_base * pow10(self.debt_decimals) / (U256::from(2u64) * debt_asset_price)
    }

    /// Health factor below which pushing the price by the cover swap
    /// makes the borrower liquidatable.
    fn upper_bound(&self, sqrt_price_before: U256, sqrt_price_after: U256) -> f64 {
        let before = u256_to_f64(sqrt_price_before);
        let after = u256_to_f64(sqrt_price_after);
        let ratio = if self.debt_asset == self.pair.token1 {
            before / after
        } else {
            after / before
        };
        ratio * ratio
    }

    /// Screen borrowers against the current pool price.
    #[instrument(skip(self, borrowers), fields(borrowers = borrowers.len()))]
    pub async fn screen(
        &self,
        current_sqrt_price_x96: U256,
        debt_asset_price: U256,
        borrowers: &[BorrowerSnapshot],
    ) -> Result<FrontRunPlan, DecisionError> {
        if debt_asset_price.is_zero() || current_sqrt_price_x96.is_zero() {
            return Err(DecisionError::InvalidObservation(
                "debt asset price and pool sqrt price must be positive".to_string(),
            ));
        }

        let leg = self.leg();
        let mut targets = Vec::new();
        let mut total_debt_to_cover = U256::ZERO;

        for borrower in borrowers {
            let debt_to_cover = self.debt_to_cover(borrower.account.total_debt_base, debt_asset_price);
            if debt_to_cover.is_zero() {
                continue;
            }

            let quote = match self.quoter.quote_exact_output(&leg, debt_to_cover).await {
                Ok(quote) => quote,
                Err(err) => {
                    if let Some(decision_err) = DecisionError::from_probe("quoter", &err) {
                        return Err(decision_err);
                    }
                    debug!(user = %borrower.user, error = %err, "Front-run quote reverted, skipping");
                    continue;
                }
            };
            if quote.sqrt_price_x96_after.is_zero() {
                return Err(DecisionError::MalformedProbeResponse {
                    probe: "quoter",
                    reason: "zero sqrtPriceX96After".to_string(),
                });
            }

            let health_factor = wad_to_f64(borrower.account.health_factor);
            let health_factor_upper_bound =
                self.upper_bound(current_sqrt_price_x96, quote.sqrt_price_x96_after);

            debug!(
                user = %borrower.user,
                health_factor,
                health_factor_upper_bound,
                debt_to_cover = %debt_to_cover,
                "Screened borrower"
            );

            if 1.0 < health_factor && health_factor < health_factor_upper_bound {
                total_debt_to_cover += debt_to_cover;
                targets.push(FrontRunTarget {
                    user: borrower.user,
                    health_factor,
                    health_factor_upper_bound,
                    debt_to_cover,
                });
            }
        }

        if !targets.is_empty() {
            info!(
                targets = targets.len(),
                total_debt_to_cover = %total_debt_to_cover,
                "Front-run opportunity"
            );
        }

        Ok(FrontRunPlan {
            leg,
            targets,
            total_debt_to_cover,
        })
    }
}
