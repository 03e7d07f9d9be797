//! Decoding of the `LiquidationCall` log emitted by a liquidation preview.
//!
//! The pool emits several logs during `liquidationCall` (reserve updates,
//! aToken transfers, ...); `LiquidationCall` is always the last one. Its
//! non-indexed fields are, in order:
//! `(debtToCover, liquidatedCollateralAmount, liquidator, receiveAToken)`.

use alloy::primitives::{Address, LogData, U256};
use alloy::sol_types::SolEvent;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::contracts::IPool;
use crate::probe::PreviewReceipt;

/// Decoded `LiquidationCall` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationCallLog {
    pub collateral_asset: Address,
    pub debt_asset: Address,
    pub user: Address,
    pub debt_to_cover: U256,
    pub liquidated_collateral_amount: U256,
    pub liquidator: Address,
    pub receive_a_token: bool,
}

/// Log decoding failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogDecodeError {
    #[error("preview emitted no logs")]
    NoLogs,

    #[error("last log is not LiquidationCall: {0}")]
    NotLiquidationCall(String),
}

impl LiquidationCallLog {
    /// Decode a single log as `LiquidationCall`.
    pub fn decode(log: &LogData) -> Result<Self, LogDecodeError> {
        let event = IPool::LiquidationCall::decode_log_data(log, true)
            .map_err(|e| LogDecodeError::NotLiquidationCall(e.to_string()))?;

        Ok(Self {
            collateral_asset: event.collateralAsset,
            debt_asset: event.debtAsset,
            user: event.user,
            debt_to_cover: event.debtToCover,
            liquidated_collateral_amount: event.liquidatedCollateralAmount,
            liquidator: event.liquidator,
            receive_a_token: event.receiveAToken,
        })
    }

    /// Decode the last log of a preview receipt.
    pub fn from_receipt(receipt: &PreviewReceipt) -> Result<Self, LogDecodeError> {
        let log = receipt.last_log().ok_or(LogDecodeError::NoLogs)?;
        Self::decode(log)
    }

    /// Re-encode as raw log data.
    pub fn to_log_data(&self) -> LogData {
        IPool::LiquidationCall {
            collateralAsset: self.collateral_asset,
            debtAsset: self.debt_asset,
            user: self.user,
            debtToCover: self.debt_to_cover,
            liquidatedCollateralAmount: self.liquidated_collateral_amount,
            liquidator: self.liquidator,
            receiveAToken: self.receive_a_token,
        }
        .encode_log_data()
    }
}
