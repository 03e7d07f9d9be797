//! Closing the short exposure left by a liquidation.
//!
//! Repaying the borrower's debt spends the liquidator's debt-asset
//! balance. The cover swap buys exactly the spent amount back with
//! collateral, capped by the collateral on hand.

use alloy::primitives::{Address, U256};
use liqsim_chain::SwapLeg;
use serde::{Deserialize, Serialize};

/// Leg that buys the debt asset with collateral.
///
/// Every debt cover (accounting quote, post-liquidation cover, front-run
/// swap) trades along this leg as an exact-output swap.
pub fn cover_leg(collateral_asset: Address, debt_asset: Address, fee: u32) -> SwapLeg {
    SwapLeg::new(collateral_asset, debt_asset, fee)
}

/// Exact-output swap of collateral into the debt asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverSwap {
    pub leg: SwapLeg,
    /// Debt asset to receive
    pub amount_out: U256,
    /// Collateral the swap may spend at most
    pub amount_in_maximum: U256,
}

impl CoverSwap {
    /// Size the cover from balances observed before and after the
    /// liquidation. `None` if the debt balance did not fall.
    pub fn from_balances(
        collateral_asset: Address,
        debt_asset: Address,
        fee: u32,
        previous_debt_balance: U256,
        current_debt_balance: U256,
        collateral_balance: U256,
    ) -> Option<Self> {
        let spent = previous_debt_balance.checked_sub(current_debt_balance)?;
        if spent.is_zero() {
            return None;
        }
        Some(Self {
            leg: cover_leg(collateral_asset, debt_asset, fee),
            amount_out: spent,
            amount_in_maximum: collateral_balance,
        })
    }

    /// Whether a quoted input cost fits under the collateral cap.
    pub fn is_affordable(&self, quoted_amount_in: U256) -> bool {
        quoted_amount_in <= self.amount_in_maximum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cover(previous: u64, current: u64, collateral: u64) -> Option<CoverSwap> {
        CoverSwap::from_balances(
            Address::repeat_byte(0x0c),
            Address::repeat_byte(0x0d),
            3000,
            U256::from(previous),
            U256::from(current),
            U256::from(collateral),
        )
    }

    #[test]
    fn test_cover_spent_debt() {
        let swap = cover(5_000, 4_000, 1_100).unwrap();
        assert_eq!(swap.amount_out, U256::from(1_000u64));
        assert_eq!(swap.amount_in_maximum, U256::from(1_100u64));
        assert_eq!(swap.leg.token_in, Address::repeat_byte(0x0c));
        assert_eq!(swap.leg.token_out, Address::repeat_byte(0x0d));
        assert!(swap.is_affordable(U256::from(1_050u64)));
        assert!(!swap.is_affordable(U256::from(1_150u64)));
    }

    #[test]
    fn test_cover_leg_direction_is_independent_of_token_order() {
        let low = Address::repeat_byte(0x01);
        let high = Address::repeat_byte(0xf0);

        // Collateral is token0
        let leg = cover_leg(low, high, 500);
        assert_eq!((leg.token_in, leg.token_out, leg.fee), (low, high, 500));

        // Collateral is token1
        let leg = cover_leg(high, low, 500);
        assert_eq!((leg.token_in, leg.token_out), (high, low));
    }

    #[test]
    fn test_no_cover_without_spend() {
        assert!(cover(4_000, 4_000, 1_100).is_none());
        assert!(cover(4_000, 5_000, 1_100).is_none());
    }
}
