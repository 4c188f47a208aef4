//! Portfolio risk metrics from a historical return series
//!
//! Volatility, VaR/CVaR, maximum drawdown and an approximate beta. The
//! return series is an explicit input on the portfolio; nothing here
//! generates or samples returns.

use super::var::VarCalculator;
use crate::error::Result;
use crate::metrics::{mean, sample_std_dev, SharpeCalculator};
use crate::types::{Portfolio, Position};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Beta reported for a portfolio with no positions
const NEUTRAL_BETA: f64 = 1.0;

/// Risk metrics for one portfolio snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    /// Confidence level used for VaR/CVaR
    pub confidence_level: f64,

    /// Portfolio value the VaR figures are scaled by
    pub portfolio_value: f64,

    /// Number of return observations
    pub observations: usize,

    /// Sample standard deviation of period returns
    pub volatility: f64,

    /// Historical VaR (loss magnitude)
    pub var: f64,

    /// Conditional VaR (loss magnitude)
    pub cvar: f64,

    /// Normal-approximation VaR (loss magnitude)
    pub parametric_var: f64,

    /// Largest peak-to-trough decline as a fraction
    pub max_drawdown: f64,

    /// Risk-category beta proxy in [0.5, 2.0]
    pub beta: f64,

    /// Sharpe ratio against the configured risk-free rate (needs 2+ returns)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharpe_ratio: Option<f64>,
}

impl RiskMetrics {
    /// VaR as a fraction of portfolio value (0 when the portfolio has no value)
    pub fn var_ratio(&self) -> f64 {
        if self.portfolio_value > 0.0 {
            self.var / self.portfolio_value
        } else {
            0.0
        }
    }
}

/// Risk metrics calculator
#[derive(Debug, Clone, Default)]
pub struct RiskMetricsCalculator {
    var: VarCalculator,
    sharpe: SharpeCalculator,
}

impl RiskMetricsCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculate all risk metrics for a portfolio
    ///
    /// Fails only when `confidence_level` is outside (0, 1).
    pub fn calculate(
        &self,
        portfolio: &Portfolio,
        confidence_level: f64,
        risk_free_rate: f64,
    ) -> Result<RiskMetrics> {
        VarCalculator::validate_confidence(confidence_level)?;

        let returns = &portfolio.historical_returns;
        let portfolio_value = portfolio.total_value();
        let volatility = self.volatility(returns);

        let metrics = RiskMetrics {
            confidence_level,
            portfolio_value,
            observations: returns.len(),
            volatility,
            var: self.var.historical_var(returns, portfolio_value, confidence_level),
            cvar: self.var.conditional_var(returns, portfolio_value, confidence_level),
            parametric_var: self.var.parametric_var(
                mean(returns),
                volatility,
                portfolio_value,
                confidence_level,
            ),
            max_drawdown: max_drawdown(returns),
            beta: self.approximate_beta(&portfolio.positions),
            sharpe_ratio: (returns.len() >= 2)
                .then(|| self.sharpe.sharpe_ratio(returns, risk_free_rate)),
        };

        debug!(
            portfolio_id = %portfolio.id,
            volatility = metrics.volatility,
            var = metrics.var,
            cvar = metrics.cvar,
            max_drawdown = metrics.max_drawdown,
            "Computed risk metrics"
        );

        Ok(metrics)
    }

    /// Sample standard deviation of period returns (0 for fewer than 2 points)
    pub fn volatility(&self, returns: &[f64]) -> f64 {
        sample_std_dev(returns)
    }

    /// Beta proxy from position risk categories
    ///
    /// Not a market-covariance beta: each position contributes its category
    /// weight (very-low 10 through critical 90), and the average weight is
    /// mapped linearly onto [0.5, 2.0]. Kept for parity with existing reports.
    pub fn approximate_beta(&self, positions: &[Position]) -> f64 {
        if positions.is_empty() {
            return NEUTRAL_BETA;
        }

        let average_weight = positions
            .iter()
            .map(|p| p.risk_category.beta_weight())
            .sum::<f64>()
            / positions.len() as f64;

        0.5 + (average_weight / 100.0) * 1.5
    }
}

/// Maximum drawdown of a compounded return series
///
/// Starts from a value of 1.0 and returns the largest `(peak - value) / peak`
/// observed, as a non-negative fraction.
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut value = 1.0;
    let mut peak = 1.0;
    let mut max_dd: f64 = 0.0;

    for r in returns {
        value *= 1.0 + r;
        if value > peak {
            peak = value;
        }

        let drawdown = (peak - value) / peak;
        max_dd = max_dd.max(drawdown);
    }

    max_dd
}
