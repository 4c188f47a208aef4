//! Internal Rate of Return (IRR)
//!
//! Solves `NPV(rate) = 0` over dated cash flows with Newton-Raphson.
//! Time is measured in years from the earliest flow using an actual/365.25
//! day count, so flows do not need to be evenly spaced.

use crate::error::{AnalyticsError, Result};
use crate::types::CashFlow;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Newton-Raphson solver settings
///
/// The defaults reproduce published IRR test vectors; change them only for
/// experimentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Starting rate
    #[serde(default = "default_initial_guess")]
    pub initial_guess: f64,

    /// Convergence threshold on |NPV|
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Iteration cap
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Smallest usable |dNPV/drate|
    #[serde(default = "default_min_derivative")]
    pub min_derivative: f64,

    /// Days per year in the day count
    #[serde(default = "default_day_count_basis")]
    pub day_count_basis: f64,
}

fn default_initial_guess() -> f64 {
    0.10
}

fn default_tolerance() -> f64 {
    1e-6
}

fn default_max_iterations() -> usize {
    100
}

fn default_min_derivative() -> f64 {
    1e-6
}

fn default_day_count_basis() -> f64 {
    365.25
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            initial_guess: default_initial_guess(),
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
            min_derivative: default_min_derivative(),
            day_count_basis: default_day_count_basis(),
        }
    }
}

/// IRR solver over dated cash flows
#[derive(Debug, Clone, Default)]
pub struct IrrSolver {
    config: SolverConfig,
}

impl IrrSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Calculate the annual IRR of a cash-flow series
    ///
    /// Flows may be supplied in any order. Fails with a calculation error
    /// when fewer than 2 flows are given, when the derivative vanishes, or
    /// when the iteration budget is exhausted.
    pub fn irr(&self, cash_flows: &[CashFlow]) -> Result<f64> {
        if cash_flows.len() < 2 {
            return Err(AnalyticsError::InsufficientCashFlows {
                count: cash_flows.len(),
            });
        }

        let timed = self.year_fractions(cash_flows);
        let mut rate = self.config.initial_guess;
        let mut npv = f64::NAN;

        for iteration in 0..self.config.max_iterations {
            let (value, derivative) = npv_and_derivative(&timed, rate);
            npv = value;

            if npv.abs() < self.config.tolerance {
                debug!(iteration, rate, "IRR converged");
                return Ok(rate);
            }

            if derivative.abs() < self.config.min_derivative {
                return Err(AnalyticsError::DerivativeTooSmall {
                    rate,
                    derivative,
                    iteration,
                });
            }

            rate -= npv / derivative;

            if !rate.is_finite() {
                return Err(AnalyticsError::NoConvergence {
                    iterations: iteration + 1,
                    last_rate: rate,
                    last_npv: npv,
                });
            }
        }

        Err(AnalyticsError::NoConvergence {
            iterations: self.config.max_iterations,
            last_rate: rate,
            last_npv: npv,
        })
    }

    /// Net present value at `rate` using the solver's day count
    pub fn npv(&self, cash_flows: &[CashFlow], rate: f64) -> f64 {
        if cash_flows.is_empty() {
            return 0.0;
        }
        npv_and_derivative(&self.year_fractions(cash_flows), rate).0
    }

    /// (years since earliest flow, amount), sorted by date
    fn year_fractions(&self, cash_flows: &[CashFlow]) -> Vec<(f64, f64)> {
        let mut sorted: Vec<&CashFlow> = cash_flows.iter().collect();
        sorted.sort_by_key(|flow| flow.date);

        let base = sorted[0].date;
        sorted
            .iter()
            .map(|flow| {
                let days = (flow.date - base).num_days() as f64;
                (days / self.config.day_count_basis, flow.amount)
            })
            .collect()
    }
}

/// NPV and its analytic derivative with respect to rate
fn npv_and_derivative(timed: &[(f64, f64)], rate: f64) -> (f64, f64) {
    let growth = 1.0 + rate;
    let mut npv = 0.0;
    let mut derivative = 0.0;

    for &(years, amount) in timed {
        let discount = growth.powf(years);
        npv += amount / discount;
        derivative -= years * amount / (discount * growth);
    }

    (npv, derivative)
}
