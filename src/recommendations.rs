//! Recommendation text from risk analysis output
//!
//! Rules run in a fixed order and every matching rule contributes its text.

use crate::risk::{RiskFactor, RiskFactorType};
use crate::types::RiskLevel;

pub const REDUCE_RISK: &str =
    "Consider reducing overall portfolio risk exposure by rebalancing toward lower-risk positions";
pub const ADD_STABLE_ASSETS: &str =
    "Consider adding more stable assets to reduce portfolio volatility";
pub const REVIEW_SELECTION: &str =
    "Review investment selection criteria to improve risk-adjusted returns";
pub const DIVERSIFY: &str = "Diversify holdings to reduce concentration risk";
pub const IMPROVE_LIQUIDITY: &str = "Increase allocation to liquid, lower-risk assets";
pub const HEDGE_VOLATILITY: &str = "Implement hedging strategies to manage volatility risk";
pub const NO_ACTION: &str = "Portfolio risk profile is within acceptable parameters";

const VOLATILITY_THRESHOLD: f64 = 0.25;
const SHARPE_THRESHOLD: f64 = 0.5;

/// Inputs consulted by the recommendation rules
#[derive(Debug, Clone, Copy)]
pub struct RecommendationInput<'a> {
    pub risk_level: RiskLevel,
    pub volatility: f64,
    pub sharpe_ratio: Option<f64>,
    pub factors: &'a [RiskFactor],
}

/// Deterministic rule-to-text mapping
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationGenerator;

impl RecommendationGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, input: &RecommendationInput<'_>) -> Vec<String> {
        let mut recommendations = Vec::new();

        if input.risk_level.is_elevated() {
            recommendations.push(REDUCE_RISK.to_string());
        }

        if input.volatility > VOLATILITY_THRESHOLD {
            recommendations.push(ADD_STABLE_ASSETS.to_string());
        }

        if input.sharpe_ratio.is_some_and(|sharpe| sharpe < SHARPE_THRESHOLD) {
            recommendations.push(REVIEW_SELECTION.to_string());
        }

        recommendations.extend(
            input
                .factors
                .iter()
                .map(|factor| factor_recommendation(factor.factor_type).to_string()),
        );

        if recommendations.is_empty() {
            recommendations.push(NO_ACTION.to_string());
        }

        recommendations
    }
}

fn factor_recommendation(factor_type: RiskFactorType) -> &'static str {
    match factor_type {
        RiskFactorType::Concentration => DIVERSIFY,
        RiskFactorType::Liquidity => IMPROVE_LIQUIDITY,
        RiskFactorType::Volatility => HEDGE_VOLATILITY,
    }
}
