//! Bounded Newton iteration over an async objective.
//!
//! Every objective evaluation may be a simulated contract call, so the
//! solver counts evaluations and never exceeds its iteration budget. The
//! derivative is a forward finite difference: two evaluations per step.

use async_trait::async_trait;
use liqsim_chain::ProbeError;
use thiserror::Error;
use tracing::debug;

/// Scalar function whose root is sought.
#[async_trait]
pub trait Objective: Send + Sync {
    async fn evaluate(&self, x: f64) -> Result<f64, ProbeError>;
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RootFindingError {
    #[error("no convergence after {iterations} iterations (last x = {last})")]
    Nonconvergent { last: f64, iterations: u32 },

    #[error("degenerate derivative at x = {at}")]
    DegenerateDerivative { at: f64 },

    #[error(transparent)]
    Probe(#[from] ProbeError),
}

/// Converged root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Root {
    pub value: f64,
    /// Newton steps taken; zero when the seed itself was a root.
    pub iterations: u32,
    pub evaluations: u32,
}

impl Root {
    pub fn is_seed(&self) -> bool {
        self.iterations == 0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NewtonSolver {
    pub max_iterations: u32,
    pub relative_tolerance: f64,
    pub absolute_tolerance: f64,
}

impl Default for NewtonSolver {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            relative_tolerance: 1e-9,
            absolute_tolerance: 1.0,
        }
    }
}

impl NewtonSolver {
    pub fn new(max_iterations: u32, relative_tolerance: f64, absolute_tolerance: f64) -> Self {
        Self {
            max_iterations,
            relative_tolerance,
            absolute_tolerance,
        }
    }

    /// Finite-difference step at `x`. Never below one unit, since the
    /// objectives evaluated here take integer token amounts.
    fn difference_step(x: f64) -> f64 {
        (f64::EPSILON.sqrt() * x.abs()).max(1.0)
    }

    fn tolerance(&self, x: f64) -> f64 {
        self.absolute_tolerance.max(self.relative_tolerance * x.abs())
    }

    pub async fn solve<O>(&self, objective: &O, seed: f64) -> Result<Root, RootFindingError>
    where
        O: Objective + ?Sized,
    {
        let mut x = seed;
        let mut evaluations = 0u32;

        for iteration in 0..self.max_iterations {
            let fx = objective.evaluate(x).await?;
            evaluations += 1;

            if fx == 0.0 {
                return Ok(Root {
                    value: x,
                    iterations: iteration,
                    evaluations,
                });
            }

            let h = Self::difference_step(x);
            let fxh = objective.evaluate(x + h).await?;
            evaluations += 1;

            let derivative = (fxh - fx) / h;
            if derivative == 0.0 || !derivative.is_finite() {
                return Err(RootFindingError::DegenerateDerivative { at: x });
            }

            let step = fx / derivative;
            let next = x - step;

            debug!(iteration, x, fx, derivative, next, "Newton step");

            if step.abs() <= self.tolerance(next) {
                return Ok(Root {
                    value: next,
                    iterations: iteration + 1,
                    evaluations,
                });
            }
            x = next;
        }

        Err(RootFindingError::Nonconvergent {
            last: x,
            iterations: self.max_iterations,
        })
    }
}
