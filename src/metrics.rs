//! Performance metrics
//!
//! - `PerformanceMetrics`: the output record for return calculations
//! - `SharpeCalculator`: excess return over the risk-free rate per unit of
//!   volatility
//! - sample statistics shared by the risk calculators

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::warn;

/// Standard deviations at or below this are treated as zero
const ZERO_VOLATILITY: f64 = 1e-12;

/// Performance of a position or portfolio
///
/// Recomputed on demand, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Current value minus principal
    pub absolute_return: f64,

    /// Absolute return as a percentage of principal (0 when principal is 0)
    pub absolute_return_pct: f64,

    /// Compound annual growth rate over the holding period
    pub annualized_return: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub irr: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharpe_ratio: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub volatility: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_drawdown: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark: Option<BenchmarkComparison>,
}

/// Annualized return measured against a benchmark return
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkComparison {
    pub benchmark_return: f64,

    /// Annualized return minus benchmark return
    pub excess_return: f64,

    pub outperformed: bool,
}

impl BenchmarkComparison {
    pub fn new(annualized_return: f64, benchmark_return: f64) -> Self {
        let excess_return = annualized_return - benchmark_return;
        Self {
            benchmark_return,
            excess_return,
            outperformed: excess_return > 0.0,
        }
    }
}

/// Sharpe ratio calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct SharpeCalculator;

impl SharpeCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Calculate the Sharpe ratio of a period-return series
    ///
    /// Sharpe = (Mean Return - Risk-Free Rate) / Sample Standard Deviation
    ///
    /// `risk_free_rate` must be expressed for the same period as `returns`.
    /// A zero standard deviation yields 0 instead of an infinite ratio.
    /// Deviations at or below 1e-12 count as zero, absorbing rounding noise
    /// from constant series.
    pub fn sharpe_ratio(&self, returns: &[f64], risk_free_rate: f64) -> f64 {
        if returns.len() < 2 {
            warn!(
                observations = returns.len(),
                "Sharpe ratio needs at least 2 returns, reporting 0"
            );
            return 0.0;
        }

        let std_dev = sample_std_dev(returns);
        if std_dev <= ZERO_VOLATILITY {
            return 0.0;
        }

        (mean(returns) - risk_free_rate) / std_dev
    }
}

/// Arithmetic mean (0 for an empty slice)
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().mean()
}

/// Sample standard deviation with an `n - 1` denominator (0 for fewer than 2 points)
pub fn sample_std_dev(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    data.iter().std_dev()
}
