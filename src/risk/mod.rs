//! # Risk Models
//!
//! Risk metrics, scoring and factor detection over a portfolio snapshot.
//!
//! ## Modules
//!
//! - `var`: Historical, conditional and parametric Value at Risk
//! - `metrics`: Volatility, drawdown, beta proxy and the `RiskMetrics` record
//! - `scoring`: Composite 0-100 score and risk level
//! - `factors`: Concentration (HHI), liquidity and volatility factors

mod factors;
mod metrics;
mod scoring;
mod var;

pub use factors::{
    Concentration, FactorAnalysis, ImpactLevel, RiskFactor, RiskFactorAnalyzer, RiskFactorType,
};
pub use metrics::{max_drawdown, RiskMetrics, RiskMetricsCalculator};
pub use scoring::{RiskScorer, ScoreComponents};
pub use var::{VarCalculator, DEFAULT_CONFIDENCE_LEVEL};

use crate::types::RiskLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time risk assessment of a portfolio
///
/// A new assessment is produced on every evaluation; existing ones are
/// never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub portfolio_id: String,

    /// Composite score in [0, 100]
    pub risk_score: f64,

    pub risk_level: RiskLevel,

    pub metrics: RiskMetrics,

    pub factors: Vec<RiskFactor>,

    pub hhi: f64,

    /// (1 - HHI) * 100
    pub diversification_score: f64,

    pub recommendations: Vec<String>,

    pub assessed_at: DateTime<Utc>,
}

impl RiskAssessment {
    /// Whether callers should raise an alert for this assessment
    pub fn requires_attention(&self) -> bool {
        self.risk_level.is_elevated()
    }
}
