//! Composite risk score and classification

use super::metrics::RiskMetrics;
use crate::types::RiskLevel;

const VOLATILITY_CAP: f64 = 50.0;
const VAR_CAP: f64 = 30.0;
const DRAWDOWN_CAP: f64 = 20.0;
const MAX_SCORE: f64 = 100.0;

/// Lower bounds of each level, highest first
const LEVEL_THRESHOLDS: [(f64, RiskLevel); 4] = [
    (80.0, RiskLevel::Critical),
    (60.0, RiskLevel::High),
    (40.0, RiskLevel::Medium),
    (20.0, RiskLevel::Low),
];

/// Breakdown of a composite risk score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreComponents {
    pub volatility: f64,
    pub var: f64,
    pub drawdown: f64,
}

impl ScoreComponents {
    pub fn total(&self) -> f64 {
        (self.volatility + self.var + self.drawdown).clamp(0.0, MAX_SCORE)
    }
}

/// Maps risk metrics onto a 0-100 score and a risk level
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskScorer;

impl RiskScorer {
    pub fn new() -> Self {
        Self
    }

    /// Individual capped contributions to the score
    pub fn components(&self, volatility: f64, var_ratio: f64, max_drawdown: f64) -> ScoreComponents {
        ScoreComponents {
            volatility: (volatility * 100.0).min(VOLATILITY_CAP),
            var: (var_ratio * 100.0).min(VAR_CAP),
            drawdown: (max_drawdown * 100.0).min(DRAWDOWN_CAP),
        }
    }

    /// Composite risk score in [0, 100]
    pub fn score(&self, metrics: &RiskMetrics) -> f64 {
        self.components(metrics.volatility, metrics.var_ratio(), metrics.max_drawdown)
            .total()
    }

    /// Risk level for a score; each tier includes its lower bound
    pub fn classify(&self, score: f64) -> RiskLevel {
        LEVEL_THRESHOLDS
            .iter()
            .find(|(threshold, _)| score >= *threshold)
            .map(|(_, level)| *level)
            .unwrap_or(RiskLevel::VeryLow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn metrics(volatility: f64, var: f64, portfolio_value: f64, max_drawdown: f64) -> RiskMetrics {
        RiskMetrics {
            confidence_level: 0.95,
            portfolio_value,
            observations: 10,
            volatility,
            var,
            cvar: var,
            parametric_var: var,
            max_drawdown,
            beta: 1.0,
            sharpe_ratio: None,
        }
    }

    #[test]
    fn test_classification_boundaries() {
        let scorer = RiskScorer::new();

        assert_eq!(scorer.classify(79.9), RiskLevel::High);
        assert_eq!(scorer.classify(80.0), RiskLevel::Critical);
        assert_eq!(scorer.classify(100.0), RiskLevel::Critical);
        assert_eq!(scorer.classify(60.0), RiskLevel::High);
        assert_eq!(scorer.classify(59.99), RiskLevel::Medium);
        assert_eq!(scorer.classify(40.0), RiskLevel::Medium);
        assert_eq!(scorer.classify(20.0), RiskLevel::Low);
        assert_eq!(scorer.classify(19.99), RiskLevel::VeryLow);
        assert_eq!(scorer.classify(0.0), RiskLevel::VeryLow);
    }

    #[test]
    fn test_classification_is_monotonic() {
        let scorer = RiskScorer::new();
        let mut previous = RiskLevel::VeryLow;

        for step in 0..=1000 {
            let level = scorer.classify(step as f64 / 10.0);
            assert!(level >= previous);
            previous = level;
        }
    }

    #[test]
    fn test_score_components() {
        let scorer = RiskScorer::new();

        // 10 + 5 + 8
        let score = scorer.score(&metrics(0.10, 500.0, 10000.0, 0.08));
        assert_relative_eq!(score, 23.0, epsilon = 1e-9);
    }

    #[test]
    fn test_components_are_capped() {
        let scorer = RiskScorer::new();

        let components = scorer.components(0.9, 0.6, 0.7);
        assert_eq!(components.volatility, 50.0);
        assert_eq!(components.var, 30.0);
        assert_eq!(components.drawdown, 20.0);
        assert_eq!(components.total(), 100.0);

        let score = scorer.score(&metrics(5.0, 90000.0, 10000.0, 1.0));
        assert_eq!(score, 100.0);
        assert_eq!(scorer.classify(score), RiskLevel::Critical);
    }

    #[test]
    fn test_zero_value_portfolio_ignores_var() {
        let scorer = RiskScorer::new();
        let score = scorer.score(&metrics(0.0, 100.0, 0.0, 0.0));
        assert_eq!(score, 0.0);
    }
}
