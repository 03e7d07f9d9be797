//! In-memory probe doubles shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, LogData, B256, U256};
use async_trait::async_trait;
use liqsim_chain::{
    BorrowerReader, ExactInputQuote, ExactOutputQuote, LiquidationCallLog, LiquidationCallParams,
    LiquidationPreviewer, PreviewReceipt, ProbeError, SwapLeg, SwapQuoter, UserAccountData,
};

use crate::front_run::BorrowerSnapshot;

use crate::u256_math::{f64_to_u256, u256_to_f64, Q96_F64};

#[derive(Debug, Clone)]
enum QuoteBehavior {
    /// Concentrated-liquidity curve, optionally with one liquidity step.
    /// Exact-input amounts are token1 paid in, exact-output amounts are
    /// token1 received.
    Curve {
        sqrt_price: f64,
        liquidity: f64,
        step: Option<(f64, f64)>,
    },
    /// Every quote reports the same result.
    Fixed {
        sqrt_price_after: U256,
        amount_in: U256,
    },
    Fail(ProbeError),
}

#[derive(Debug)]
struct QuoterInner {
    behavior: QuoteBehavior,
    exact_input: AtomicUsize,
    exact_output: AtomicUsize,
    last: Mutex<Option<(SwapLeg, U256)>>,
}

/// Swap quoter double with call counters.
#[derive(Debug, Clone)]
pub struct MockQuoter {
    inner: Arc<QuoterInner>,
}

impl MockQuoter {
    fn with_behavior(behavior: QuoteBehavior) -> Self {
        Self {
            inner: Arc::new(QuoterInner {
                behavior,
                exact_input: AtomicUsize::new(0),
                exact_output: AtomicUsize::new(0),
                last: Mutex::new(None),
            }),
        }
    }

    pub fn constant_liquidity(sqrt_price_x96: U256, liquidity: u128) -> Self {
        Self::with_behavior(QuoteBehavior::Curve {
            sqrt_price: u256_to_f64(sqrt_price_x96),
            liquidity: liquidity as f64,
            step: None,
        })
    }

    /// Liquidity changes to `liquidity_beyond` once the price crosses
    /// `boundary` (on whichever side of the current price it lies).
    pub fn with_liquidity_step(
        sqrt_price_x96: U256,
        liquidity: u128,
        boundary: U256,
        liquidity_beyond: u128,
    ) -> Self {
        Self::with_behavior(QuoteBehavior::Curve {
            sqrt_price: u256_to_f64(sqrt_price_x96),
            liquidity: liquidity as f64,
            step: Some((u256_to_f64(boundary), liquidity_beyond as f64)),
        })
    }

    pub fn fixed_price(sqrt_price_after: U256) -> Self {
        Self::with_behavior(QuoteBehavior::Fixed {
            sqrt_price_after,
            amount_in: U256::ZERO,
        })
    }

    pub fn fixed_cost(amount_in: U256) -> Self {
        Self::with_behavior(QuoteBehavior::Fixed {
            sqrt_price_after: crate::u256_math::Q96,
            amount_in,
        })
    }

    pub fn reverting(reason: &str) -> Self {
        Self::failing(ProbeError::Reverted(reason.to_string()))
    }

    pub fn failing(err: ProbeError) -> Self {
        Self::with_behavior(QuoteBehavior::Fail(err))
    }

    pub fn exact_input_calls(&self) -> usize {
        self.inner.exact_input.load(Ordering::SeqCst)
    }

    pub fn exact_output_calls(&self) -> usize {
        self.inner.exact_output.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.exact_input_calls() + self.exact_output_calls()
    }

    pub fn last_leg(&self) -> Option<SwapLeg> {
        self.inner.last.lock().unwrap().map(|(leg, _)| leg)
    }

    pub fn last_amount(&self) -> Option<U256> {
        self.inner.last.lock().unwrap().map(|(_, amount)| amount)
    }

    fn record(&self, leg: &SwapLeg, amount: U256) {
        *self.inner.last.lock().unwrap() = Some((*leg, amount));
    }

    /// Sqrt price after moving `amount` of token1 along the curve.
    fn walk(&self, amount: f64, up: bool) -> Result<(f64, f64), ProbeError> {
        let (start, liquidity, step) = match &self.inner.behavior {
            QuoteBehavior::Curve {
                sqrt_price,
                liquidity,
                step,
            } => (*sqrt_price, *liquidity, *step),
            QuoteBehavior::Fixed { .. } | QuoteBehavior::Fail(_) => unreachable!(),
        };
        if liquidity <= 0.0 {
            return Err(ProbeError::Reverted("no liquidity".into()));
        }

        let sign = if up { 1.0 } else { -1.0 };
        let mut price = start;
        let mut active = liquidity;
        let mut remaining = amount;

        if let Some((boundary, beyond)) = step {
            let ahead = if up { boundary > start } else { boundary < start };
            if ahead {
                let to_boundary = active * (boundary - start).abs() / Q96_F64;
                if remaining > to_boundary {
                    remaining -= to_boundary;
                    price = boundary;
                    active = beyond;
                    if active <= 0.0 {
                        return Err(ProbeError::Reverted("SPL".into()));
                    }
                }
            }
        }

        let after = price + sign * remaining * Q96_F64 / active;
        if after <= 0.0 {
            return Err(ProbeError::Reverted("SPL".into()));
        }
        // token0 leg of the trade, single-range approximation
        let token0 = liquidity * (start - after).abs() * Q96_F64 / (start * after);
        Ok((after, token0))
    }
}

#[async_trait]
impl SwapQuoter for MockQuoter {
    async fn quote_exact_input(
        &self,
        leg: &SwapLeg,
        amount_in: U256,
    ) -> Result<ExactInputQuote, ProbeError> {
        self.inner.exact_input.fetch_add(1, Ordering::SeqCst);
        self.record(leg, amount_in);

        match &self.inner.behavior {
            QuoteBehavior::Fail(err) => Err(err.clone()),
            QuoteBehavior::Fixed {
                sqrt_price_after, ..
            } => Ok(ExactInputQuote {
                amount_out: U256::ZERO,
                sqrt_price_x96_after: *sqrt_price_after,
                initialized_ticks_crossed: 0,
                gas_estimate: U256::from(90_000u64),
            }),
            QuoteBehavior::Curve { .. } => {
                let (after, token0) = self.walk(u256_to_f64(amount_in), true)?;
                Ok(ExactInputQuote {
                    amount_out: f64_to_u256(token0),
                    sqrt_price_x96_after: f64_to_u256(after),
                    initialized_ticks_crossed: 0,
                    gas_estimate: U256::from(90_000u64),
                })
            }
        }
    }

    async fn quote_exact_output(
        &self,
        leg: &SwapLeg,
        amount_out: U256,
    ) -> Result<ExactOutputQuote, ProbeError> {
        self.inner.exact_output.fetch_add(1, Ordering::SeqCst);
        self.record(leg, amount_out);

        match &self.inner.behavior {
            QuoteBehavior::Fail(err) => Err(err.clone()),
            QuoteBehavior::Fixed {
                sqrt_price_after,
                amount_in,
            } => Ok(ExactOutputQuote {
                amount_in: *amount_in,
                sqrt_price_x96_after: *sqrt_price_after,
                initialized_ticks_crossed: 0,
                gas_estimate: U256::from(90_000u64),
            }),
            QuoteBehavior::Curve { .. } => {
                let (after, token0) = self.walk(u256_to_f64(amount_out), false)?;
                Ok(ExactOutputQuote {
                    amount_in: f64_to_u256(token0),
                    sqrt_price_x96_after: f64_to_u256(after),
                    initialized_ticks_crossed: 0,
                    gas_estimate: U256::from(90_000u64),
                })
            }
        }
    }
}

#[derive(Debug)]
enum PreviewBehavior {
    Logs(Vec<LogData>),
    Fail(ProbeError),
}

#[derive(Debug)]
struct PreviewerInner {
    behavior: PreviewBehavior,
    calls: AtomicUsize,
    last: Mutex<Option<LiquidationCallParams>>,
}

/// Liquidation preview double.
#[derive(Debug, Clone)]
pub struct MockPreviewer {
    inner: Arc<PreviewerInner>,
}

impl MockPreviewer {
    fn with_behavior(behavior: PreviewBehavior) -> Self {
        Self {
            inner: Arc::new(PreviewerInner {
                behavior,
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
            }),
        }
    }

    /// Preview whose last log is a `LiquidationCall` with the given
    /// covered debt and collateral, preceded by an unrelated transfer log.
    pub fn liquidating(debt_to_cover: u64, collateral: u64) -> Self {
        Self::with_logs(vec![transfer_log(), liquidation_log(debt_to_cover, collateral)])
    }

    pub fn with_logs(logs: Vec<LogData>) -> Self {
        Self::with_behavior(PreviewBehavior::Logs(logs))
    }

    pub fn reverting(reason: &str) -> Self {
        Self::failing(ProbeError::Reverted(reason.to_string()))
    }

    pub fn failing(err: ProbeError) -> Self {
        Self::with_behavior(PreviewBehavior::Fail(err))
    }

    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    pub fn last_params(&self) -> Option<LiquidationCallParams> {
        *self.inner.last.lock().unwrap()
    }
}

#[async_trait]
impl LiquidationPreviewer for MockPreviewer {
    async fn preview_liquidation(
        &self,
        params: &LiquidationCallParams,
    ) -> Result<PreviewReceipt, ProbeError> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        *self.inner.last.lock().unwrap() = Some(*params);

        match &self.inner.behavior {
            PreviewBehavior::Logs(logs) => Ok(PreviewReceipt::new(logs.clone(), 412_000)),
            PreviewBehavior::Fail(err) => Err(err.clone()),
        }
    }
}

#[derive(Debug)]
struct BorrowerReaderInner {
    accounts: Vec<BorrowerSnapshot>,
    failure: Option<ProbeError>,
    calls: AtomicUsize,
}

/// Lending-pool double. Unknown users revert.
#[derive(Debug, Clone)]
pub struct MockBorrowerReader {
    inner: Arc<BorrowerReaderInner>,
}

impl MockBorrowerReader {
    pub fn new(accounts: Vec<BorrowerSnapshot>) -> Self {
        Self {
            inner: Arc::new(BorrowerReaderInner {
                accounts,
                failure: None,
                calls: AtomicUsize::new(0),
            }),
        }
    }

    pub fn failing(err: ProbeError) -> Self {
        Self {
            inner: Arc::new(BorrowerReaderInner {
                accounts: Vec::new(),
                failure: Some(err),
                calls: AtomicUsize::new(0),
            }),
        }
    }

    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BorrowerReader for MockBorrowerReader {
    async fn user_account_data(&self, user: Address) -> Result<UserAccountData, ProbeError> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.inner.failure {
            return Err(err.clone());
        }
        self.inner
            .accounts
            .iter()
            .find(|snapshot| snapshot.user == user)
            .map(|snapshot| snapshot.account)
            .ok_or_else(|| ProbeError::Reverted(format!("no position for {user}")))
    }
}

pub fn collateral_asset() -> Address {
    Address::repeat_byte(0x0c)
}

pub fn debt_asset() -> Address {
    Address::repeat_byte(0x0d)
}

pub fn borrower() -> Address {
    Address::repeat_byte(0xbe)
}

pub fn liquidation_log(debt_to_cover: u64, collateral: u64) -> LogData {
    LiquidationCallLog {
        collateral_asset: collateral_asset(),
        debt_asset: debt_asset(),
        user: borrower(),
        debt_to_cover: U256::from(debt_to_cover),
        liquidated_collateral_amount: U256::from(collateral),
        liquidator: Address::repeat_byte(0x11),
        receive_a_token: true,
    }
    .to_log_data()
}

/// ERC-20 style `Transfer` log (topic0 only matters for decoding).
pub fn transfer_log() -> LogData {
    LogData::new_unchecked(
        vec![
            B256::repeat_byte(0xdd),
            B256::left_padding_from(borrower().as_slice()),
            B256::left_padding_from(Address::repeat_byte(0x11).as_slice()),
        ],
        U256::from(1000u64).to_be_bytes::<32>().to_vec().into(),
    )
}
