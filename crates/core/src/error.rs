//! Errors surfaced by sizing and liquidation decisions.
//!
//! Market outcomes (a quote that reverts, a trade too small to bother
//! with) are not errors; they are reported through the decision enums.
//! Only broken probes and malformed inputs end up here.

use liqsim_chain::{LogDecodeError, ProbeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecisionError {
    /// A probe answered with something that cannot be interpreted
    #[error("malformed {probe} response: {reason}")]
    MalformedProbeResponse { probe: &'static str, reason: String },

    /// A probe could not be reached at all
    #[error("{probe} transport failure: {reason}")]
    ProbeTransport { probe: &'static str, reason: String },

    /// The caller's observation is unusable (e.g. zero sqrt price)
    #[error("invalid observation: {0}")]
    InvalidObservation(String),
}

impl DecisionError {
    /// Map a non-market probe failure onto a decision error.
    ///
    /// Returns `None` for reverts and infeasible quotes, which callers
    /// treat as market conditions.
    pub fn from_probe(probe: &'static str, err: &ProbeError) -> Option<Self> {
        match err {
            ProbeError::Malformed(reason) => Some(Self::MalformedProbeResponse {
                probe,
                reason: reason.clone(),
            }),
            ProbeError::Transport(reason) => Some(Self::ProbeTransport {
                probe,
                reason: reason.clone(),
            }),
            ProbeError::Reverted(_) | ProbeError::Infeasible(_) => None,
        }
    }

    pub(crate) fn from_log(probe: &'static str, err: LogDecodeError) -> Self {
        Self::MalformedProbeResponse {
            probe,
            reason: err.to_string(),
        }
    }
}
