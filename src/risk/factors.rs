//! Risk factor detection
//!
//! - Concentration: Herfindahl-Hirschman Index over position values
//! - Liquidity: share of positions in the HIGH/CRITICAL categories
//! - Volatility: raised when return volatility is elevated

use crate::types::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

const HHI_HIGH: f64 = 0.25;
const HHI_MEDIUM: f64 = 0.15;
const ILLIQUID_HIGH: f64 = 0.5;
const ILLIQUID_MEDIUM: f64 = 0.3;
const VOLATILITY_THRESHOLD: f64 = 0.2;

/// Kind of risk factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactorType {
    Concentration,
    Liquidity,
    Volatility,
}

impl fmt::Display for RiskFactorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RiskFactorType::Concentration => "concentration",
            RiskFactorType::Liquidity => "liquidity",
            RiskFactorType::Volatility => "volatility",
        };
        f.write_str(name)
    }
}

/// Impact tier of a risk factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
}

/// A detected source of portfolio risk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub factor_type: RiskFactorType,

    /// Severity in [0, 1]
    pub severity: f64,

    pub description: String,

    pub impact: ImpactLevel,
}

/// Concentration measures for a set of positions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Concentration {
    /// Σ w_i^2 over value weights (1.0 = everything in one position)
    pub hhi: f64,

    /// (1 - HHI) * 100, in [0, 100]
    pub diversification_score: f64,
}

/// Output of a risk factor scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorAnalysis {
    pub factors: Vec<RiskFactor>,
    pub concentration: Concentration,
}

/// Risk factor analyzer
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskFactorAnalyzer;

impl RiskFactorAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Run every factor check, in concentration, liquidity, volatility order
    pub fn analyze(&self, positions: &[Position], volatility: f64) -> FactorAnalysis {
        let concentration = self.concentration(positions);

        let factors = [
            self.concentration_factor(&concentration),
            self.liquidity_factor(positions),
            self.volatility_factor(volatility),
        ]
        .into_iter()
        .flatten()
        .collect();

        FactorAnalysis {
            factors,
            concentration,
        }
    }

    /// HHI and diversification score over current values
    ///
    /// Portfolios with no positions or no value report HHI 0 and a
    /// diversification score of 0.
    pub fn concentration(&self, positions: &[Position]) -> Concentration {
        let total: f64 = positions.iter().map(|p| p.current_value).sum();
        if positions.is_empty() || total <= 0.0 {
            return Concentration {
                hhi: 0.0,
                diversification_score: 0.0,
            };
        }

        let hhi: f64 = positions
            .iter()
            .map(|p| {
                let weight = p.current_value / total;
                weight * weight
            })
            .sum();

        Concentration {
            hhi,
            diversification_score: ((1.0 - hhi) * 100.0).clamp(0.0, 100.0),
        }
    }

    /// Factor raised when HHI exceeds 0.15
    pub fn concentration_factor(&self, concentration: &Concentration) -> Option<RiskFactor> {
        let hhi = concentration.hhi;
        let impact = if hhi > HHI_HIGH {
            ImpactLevel::High
        } else if hhi > HHI_MEDIUM {
            ImpactLevel::Medium
        } else {
            return None;
        };

        Some(RiskFactor {
            factor_type: RiskFactorType::Concentration,
            severity: hhi.min(1.0),
            description: format!(
                "Portfolio is concentrated (HHI {:.2}, diversification score {:.0})",
                hhi, concentration.diversification_score
            ),
            impact,
        })
    }

    /// Liquidity factor from the share of HIGH/CRITICAL positions
    ///
    /// Always produced for a non-empty portfolio; the share only sets the impact.
    pub fn liquidity_factor(&self, positions: &[Position]) -> Option<RiskFactor> {
        if positions.is_empty() {
            return None;
        }

        let illiquid = positions
            .iter()
            .filter(|p| p.risk_category.is_elevated())
            .count();
        let ratio = illiquid as f64 / positions.len() as f64;

        let impact = if ratio > ILLIQUID_HIGH {
            ImpactLevel::High
        } else if ratio > ILLIQUID_MEDIUM {
            ImpactLevel::Medium
        } else {
            ImpactLevel::Low
        };

        Some(RiskFactor {
            factor_type: RiskFactorType::Liquidity,
            severity: ratio,
            description: format!(
                "{} of {} positions ({:.0}%) are in high-risk categories",
                illiquid,
                positions.len(),
                ratio * 100.0
            ),
            impact,
        })
    }

    /// Factor raised when volatility exceeds 0.2
    pub fn volatility_factor(&self, volatility: f64) -> Option<RiskFactor> {
        if volatility <= VOLATILITY_THRESHOLD {
            return None;
        }

        Some(RiskFactor {
            factor_type: RiskFactorType::Volatility,
            severity: volatility.min(1.0),
            description: format!("Return volatility is elevated ({:.1}%)", volatility * 100.0),
            impact: ImpactLevel::High,
        })
    }
}
