//! AAVE V3 Pool interface (subset used for liquidation accounting).

use alloy::primitives::U256;
use alloy::sol;
use serde::{Deserialize, Serialize};

sol! {
    /// Aave V3 Pool interface (subset for liquidation)
    #[sol(rpc)]
    #[derive(Debug)]
    interface IPool {
        event LiquidationCall(
            address indexed collateralAsset,
            address indexed debtAsset,
            address indexed user,
            uint256 debtToCover,
            uint256 liquidatedCollateralAmount,
            address liquidator,
            bool receiveAToken
        );

        function liquidationCall(
            address collateralAsset,
            address debtAsset,
            address user,
            uint256 debtToCover,
            bool receiveAToken
        ) external;

        function getUserAccountData(address user)
            external
            view
            returns (
                uint256 totalCollateralBase,
                uint256 totalDebtBase,
                uint256 availableBorrowsBase,
                uint256 currentLiquidationThreshold,
                uint256 ltv,
                uint256 healthFactor
            );
    }
}

/// `getUserAccountData` return values.
///
/// Base-currency amounts carry 8 decimals, `health_factor` is a WAD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserAccountData {
    pub total_collateral_base: U256,
    pub total_debt_base: U256,
    pub available_borrows_base: U256,
    pub current_liquidation_threshold: U256,
    pub ltv: U256,
    pub health_factor: U256,
}

impl From<IPool::getUserAccountDataReturn> for UserAccountData {
    fn from(ret: IPool::getUserAccountDataReturn) -> Self {
        Self {
            total_collateral_base: ret.totalCollateralBase,
            total_debt_base: ret.totalDebtBase,
            available_borrows_base: ret.availableBorrowsBase,
            current_liquidation_threshold: ret.currentLiquidationThreshold,
            ltv: ret.ltv,
            health_factor: ret.healthFactor,
        }
    }
}
