//! Liquidation profitability accounting.
//!
//! A candidate liquidation is previewed (simulated, never committed), the
//! `LiquidationCall` log of the preview tells how much debt gets covered
//! and how much collateral is seized, and a swap quote tells how much of
//! that collateral it costs to buy the covered debt back. The liquidation
//! is profitable only if the cover costs strictly less than the seized
//! collateral.
//!
//! ```text
//! Candidate → Previewed → Accounted(profitable | unprofitable)
//!           ↘ Rejected(preview reverted | quote reverted)
//!           ↘ FrontRan (debt balance rose since the last step)
//! ```
//!
//! A liquidator that front-ran the borrower already holds the debt asset
//! it bought with collateral, so there is no cover left to price: the
//! liquidation is taken without previewing.
//!
//! Gas is not part of the comparison.

use alloy::primitives::{Address, U256};
use liqsim_chain::{
    LiquidationCallLog, LiquidationCallParams, LiquidationPreviewer, SwapLeg, SwapQuoter,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::LiquidationConfig;
use crate::cover::cover_leg;
use crate::error::DecisionError;

/// Position and amount the orchestrator proposes to liquidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationProposal {
    pub user: Address,
    pub collateral_asset: Address,
    pub debt_asset: Address,
    pub debt_to_cover: U256,
}

impl LiquidationProposal {
    /// Proposal covering as much debt as the pool allows.
    pub fn maximal(
        user: Address,
        collateral_asset: Address,
        debt_asset: Address,
        max_debt_to_cover: U256,
    ) -> Self {
        Self {
            user,
            collateral_asset,
            debt_asset,
            debt_to_cover: max_debt_to_cover,
        }
    }

    /// Leg that buys back the covered debt with seized collateral.
    pub fn cover_leg(&self, fee: u32) -> SwapLeg {
        cover_leg(self.collateral_asset, self.debt_asset, fee)
    }
}

/// Amounts reported by a liquidation preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationOutcome {
    pub debt_covered: U256,
    pub collateral_received: U256,
}

impl From<&LiquidationCallLog> for LiquidationOutcome {
    fn from(log: &LiquidationCallLog) -> Self {
        Self {
            debt_covered: log.debt_to_cover,
            collateral_received: log.liquidated_collateral_amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitVerdict {
    pub profitable: bool,
    pub debt_covered: U256,
    pub collateral_received: U256,
    pub collateral_cost_to_cover_debt: U256,
}

impl ProfitVerdict {
    pub fn new(outcome: LiquidationOutcome, collateral_cost_to_cover_debt: U256) -> Self {
        Self {
            profitable: collateral_cost_to_cover_debt < outcome.collateral_received,
            debt_covered: outcome.debt_covered,
            collateral_received: outcome.collateral_received,
            collateral_cost_to_cover_debt,
        }
    }

    /// Collateral left over after covering the debt (zero if unprofitable).
    pub fn surplus(&self) -> U256 {
        self.collateral_received
            .saturating_sub(self.collateral_cost_to_cover_debt)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum RejectionReason {
    /// The liquidation itself would revert (healthy position, amount too
    /// large, paused reserve, ...).
    PreviewReverted(String),
    /// No route to buy back the covered debt.
    QuoteReverted(String),
}

/// Terminal state of one accounting pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Accounting {
    Accounted(ProfitVerdict),
    Rejected(RejectionReason),
    /// The debt-asset balance rose since the last step: a front-run swap
    /// already bought the debt. Always profitable; nothing was previewed or
    /// quoted.
    FrontRan {
        previous_debt_balance: U256,
        current_debt_balance: U256,
    },
}

impl Accounting {
    /// Sole gate on submitting the real liquidation.
    pub fn is_profitable(&self) -> bool {
        match self {
            Self::Accounted(verdict) => verdict.profitable,
            Self::FrontRan { .. } => true,
            Self::Rejected(_) => false,
        }
    }

    pub fn verdict(&self) -> Option<&ProfitVerdict> {
        match self {
            Self::Accounted(verdict) => Some(verdict),
            Self::Rejected(_) | Self::FrontRan { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LiquidationAccountant<P, Q> {
    previewer: P,
    quoter: Q,
    fee: u32,
    receive_a_token: bool,
}

impl<P, Q> LiquidationAccountant<P, Q>
where
    P: LiquidationPreviewer,
    Q: SwapQuoter,
{
    pub fn new(previewer: P, quoter: Q, fee: u32) -> Self {
        Self {
            previewer,
            quoter,
            fee,
            receive_a_token: true,
        }
    }

    pub fn from_config(previewer: P, quoter: Q, config: &LiquidationConfig) -> Self {
        Self::new(previewer, quoter, config.uniswap_fee)
            .with_receive_a_token(config.receive_a_token_on_preview)
    }

    pub fn with_receive_a_token(mut self, receive_a_token: bool) -> Self {
        self.receive_a_token = receive_a_token;
        self
    }

    /// Preview the liquidation and price the debt cover.
    #[instrument(skip(self), fields(user = %proposal.user))]
    pub async fn account(
        &self,
        proposal: &LiquidationProposal,
    ) -> Result<Accounting, DecisionError> {
        let params = LiquidationCallParams {
            collateral_asset: proposal.collateral_asset,
            debt_asset: proposal.debt_asset,
            user: proposal.user,
            debt_to_cover: proposal.debt_to_cover,
            receive_a_token: self.receive_a_token,
        };

        let receipt = match self.previewer.preview_liquidation(&params).await {
            Ok(receipt) => receipt,
            Err(err) => {
                if let Some(decision_err) = DecisionError::from_probe("liquidation preview", &err) {
                    return Err(decision_err);
                }
                debug!(error = %err, "Liquidation preview reverted");
                return Ok(Accounting::Rejected(RejectionReason::PreviewReverted(
                    err.to_string(),
                )));
            }
        };

        let log = LiquidationCallLog::from_receipt(&receipt)
            .map_err(|e| DecisionError::from_log("liquidation preview", e))?;
        check_log_matches(&log, proposal)?;
        let outcome = LiquidationOutcome::from(&log);

        debug!(
            debt_covered = %outcome.debt_covered,
            collateral_received = %outcome.collateral_received,
            gas_used = receipt.gas_used,
            "Previewed liquidation"
        );

        let leg = proposal.cover_leg(self.fee);
        let quote = match self.quoter.quote_exact_output(&leg, outcome.debt_covered).await {
            Ok(quote) => quote,
            Err(err) => {
                if let Some(decision_err) = DecisionError::from_probe("quoter", &err) {
                    return Err(decision_err);
                }
                warn!(error = %err, debt_covered = %outcome.debt_covered, "Cover quote reverted");
                return Ok(Accounting::Rejected(RejectionReason::QuoteReverted(
                    err.to_string(),
                )));
            }
        };

        let verdict = ProfitVerdict::new(outcome, quote.amount_in);

        info!(
            profitable = verdict.profitable,
            debt_covered = %verdict.debt_covered,
            collateral_received = %verdict.collateral_received,
            cover_cost = %verdict.collateral_cost_to_cover_debt,
            "Accounted liquidation"
        );

        Ok(Accounting::Accounted(verdict))
    }

    /// Account a liquidation for a liquidator that may have front-run the
    /// borrower.
    ///
    /// If the debt-asset balance rose between the two observations, the
    /// front-run swap is in and the liquidation is taken as profitable
    /// without previewing or quoting. Otherwise this is [`Self::account`].
    #[instrument(skip(self), fields(user = %proposal.user))]
    pub async fn account_after_front_run(
        &self,
        proposal: &LiquidationProposal,
        previous_debt_balance: U256,
        current_debt_balance: U256,
    ) -> Result<Accounting, DecisionError> {
        if previous_debt_balance < current_debt_balance {
            info!(
                previous_debt_balance = %previous_debt_balance,
                current_debt_balance = %current_debt_balance,
                "Holding front-run debt, liquidating without preview"
            );
            return Ok(Accounting::FrontRan {
                previous_debt_balance,
                current_debt_balance,
            });
        }
        self.account(proposal).await
    }
}

fn check_log_matches(
    log: &LiquidationCallLog,
    proposal: &LiquidationProposal,
) -> Result<(), DecisionError> {
    if log.user != proposal.user
        || log.collateral_asset != proposal.collateral_asset
        || log.debt_asset != proposal.debt_asset
    {
        return Err(DecisionError::MalformedProbeResponse {
            probe: "liquidation preview",
            reason: format!(
                "LiquidationCall for {} ({} / {}) does not match proposal",
                log.user, log.collateral_asset, log.debt_asset
            ),
        });
    }
    Ok(())
}
