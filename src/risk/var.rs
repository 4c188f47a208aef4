//! Value at Risk (VaR) calculations
//!
//! - Historical VaR: empirical percentile of the return series
//! - Conditional VaR: average of the tail up to and including the VaR point
//! - Parametric VaR: normal approximation from mean and volatility
//!
//! All results are non-negative loss magnitudes scaled by portfolio value.

use crate::error::{AnalyticsError, Result};
use statrs::function::erf::erfc_inv;
use std::f64::consts::SQRT_2;

/// Confidence level used when none is configured
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// VaR calculator over a historical return series
#[derive(Debug, Clone, Copy, Default)]
pub struct VarCalculator;

impl VarCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Reject confidence levels outside the open interval (0, 1)
    pub fn validate_confidence(confidence_level: f64) -> Result<()> {
        if confidence_level <= 0.0 || confidence_level >= 1.0 || confidence_level.is_nan() {
            return Err(AnalyticsError::InvalidConfidenceLevel(confidence_level));
        }
        Ok(())
    }

    /// Historical VaR
    ///
    /// Formula: VaR = |sorted(returns)[floor((1 - c) * n)]| * portfolio_value
    pub fn historical_var(&self, returns: &[f64], portfolio_value: f64, confidence_level: f64) -> f64 {
        if returns.is_empty() {
            return 0.0;
        }

        let sorted = sorted_returns(returns);
        let index = tail_index(sorted.len(), confidence_level);

        sorted[index].abs() * portfolio_value.abs()
    }

    /// Conditional VaR (Expected Shortfall)
    ///
    /// Mean of every return at or below the VaR index, as a magnitude.
    pub fn conditional_var(&self, returns: &[f64], portfolio_value: f64, confidence_level: f64) -> f64 {
        if returns.is_empty() {
            return 0.0;
        }

        let sorted = sorted_returns(returns);
        let index = tail_index(sorted.len(), confidence_level);
        let tail = &sorted[..=index];

        let average_tail = tail.iter().sum::<f64>() / tail.len() as f64;
        average_tail.abs() * portfolio_value.abs()
    }

    /// Parametric VaR assuming normally distributed returns
    ///
    /// Formula: VaR = max(0, -(μ + Z_(1-c) * σ)) * portfolio_value
    pub fn parametric_var(
        &self,
        mean_return: f64,
        volatility: f64,
        portfolio_value: f64,
        confidence_level: f64,
    ) -> f64 {
        let z_score = standard_normal_quantile(1.0 - confidence_level);
        let loss = -(mean_return + z_score * volatility);

        loss.max(0.0) * portfolio_value.abs()
    }
}

/// Index of the VaR observation in an ascending series of length `n`
fn tail_index(n: usize, confidence_level: f64) -> usize {
    let raw = ((1.0 - confidence_level) * n as f64).floor();
    if raw <= 0.0 {
        0
    } else {
        (raw as usize).min(n - 1)
    }
}

fn sorted_returns(returns: &[f64]) -> Vec<f64> {
    let mut sorted = returns.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Inverse CDF of the standard normal distribution
fn standard_normal_quantile(p: f64) -> f64 {
    -SQRT_2 * erfc_inv(2.0 * p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn create_test_returns() -> Vec<f64> {
        vec![
            -0.05, -0.03, -0.02, -0.01, 0.00,
            0.01, 0.02, 0.03, 0.04, 0.05,
            -0.04, 0.01, 0.02, -0.01, 0.03,
            0.00, -0.02, 0.01, 0.02, -0.01,
        ]
    }

    #[test]
    fn test_historical_var() {
        let returns = create_test_returns();
        let var = VarCalculator::new().historical_var(&returns, 10000.0, 0.95);

        // floor(0.05 * 20) = 1 -> second-worst return, -0.04
        assert_abs_diff_eq!(var, 400.0, epsilon = 1e-9);
    }

    #[test]
    fn test_cvar() {
        let returns = create_test_returns();
        let calc = VarCalculator::new();

        let cvar = calc.conditional_var(&returns, 10000.0, 0.95);
        let var = calc.historical_var(&returns, 10000.0, 0.95);

        // Tail is [-0.05, -0.04] -> average -0.045
        assert_abs_diff_eq!(cvar, 450.0, epsilon = 1e-9);
        assert!(cvar >= var);
    }

    #[test]
    fn test_small_sample_uses_worst_return() {
        let returns = vec![0.02, -0.03, 0.01];
        let calc = VarCalculator::new();

        // floor(0.05 * 3) = 0
        assert_abs_diff_eq!(calc.historical_var(&returns, 1000.0, 0.95), 30.0, epsilon = 1e-9);
        assert_abs_diff_eq!(calc.conditional_var(&returns, 1000.0, 0.95), 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_series_is_zero() {
        let calc = VarCalculator::new();
        assert_eq!(calc.historical_var(&[], 10000.0, 0.95), 0.0);
        assert_eq!(calc.conditional_var(&[], 10000.0, 0.95), 0.0);
    }

    #[test]
    fn test_parametric_var() {
        let var = VarCalculator::new().parametric_var(0.0, 0.02, 10000.0, 0.95);

        // Z_0.05 ≈ -1.6449
        assert_abs_diff_eq!(var, 1.644854 * 0.02 * 10000.0, epsilon = 1e-2);
    }

    #[test]
    fn test_parametric_var_never_negative() {
        let var = VarCalculator::new().parametric_var(0.5, 0.01, 10000.0, 0.95);
        assert_eq!(var, 0.0);
    }

    #[test]
    fn test_invalid_confidence_level() {
        assert!(VarCalculator::validate_confidence(0.95).is_ok());
        assert!(VarCalculator::validate_confidence(1.0).is_err());
        assert!(VarCalculator::validate_confidence(0.0).is_err());
        assert!(VarCalculator::validate_confidence(-0.1).is_err());
        assert!(VarCalculator::validate_confidence(f64::NAN).is_err());
    }

    #[test]
    fn test_higher_confidence_moves_deeper_into_tail() {
        let returns: Vec<f64> = (0..100).map(|i| (i as f64 - 50.0) / 1000.0).collect();
        let calc = VarCalculator::new();

        let var_95 = calc.historical_var(&returns, 1.0, 0.95);
        let var_99 = calc.historical_var(&returns, 1.0, 0.99);
        assert!(var_99 > var_95);
    }
}
