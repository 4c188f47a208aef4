//! # ag-analytics: Portfolio Performance and Risk Analytics
//!
//! This library computes investment performance and risk for portfolios made
//! of discrete positions and dated cash flows. Every calculation is a pure
//! function of its inputs: no I/O, no shared mutable state.
//!
//! ## Core Components
//!
//! - **ReturnCalculator**: absolute, annualized and portfolio returns
//! - **IrrSolver**: Newton-Raphson internal rate of return
//! - **SharpeCalculator**: risk-adjusted return
//! - **RiskMetricsCalculator**: volatility, VaR/CVaR, drawdown, beta proxy
//! - **RiskScorer** / **RiskFactorAnalyzer**: score, level and risk factors
//! - **StressTester**: scenario shocks and pass/fail against loss thresholds
//! - **AnalyticsEngine**: the entry points, configured from YAML or JSON
//!
//! ## Example Usage
//!
//! ```rust
//! use ag_analytics::{AnalyticsEngine, Portfolio, Position, RiskLevel};
//! use ag_analytics::stress::{ScenarioType, StressScenario};
//! use chrono::NaiveDate;
//!
//! let acquired = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
//! let portfolio = Portfolio::new(
//!     "retirement",
//!     vec![Position::new("index-fund", 1000.0, 1000.0, acquired, RiskLevel::Medium)],
//! )
//! .with_historical_returns(vec![0.01, -0.02, 0.015, 0.005]);
//!
//! let engine = AnalyticsEngine::default();
//!
//! let assessment = engine.assess_risk(&portfolio).unwrap();
//! assert!(assessment.risk_score <= 100.0);
//!
//! let crash = StressScenario::new("Crash", ScenarioType::MarketCrash);
//! let result = engine.run_stress_test(&portfolio, &crash);
//! assert_eq!(result.loss_percentage.round(), 30.0);
//! assert!(!result.passes_threshold); // default threshold is 20%
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod irr;
pub mod metrics;
pub mod recommendations;
pub mod returns;
pub mod risk;
pub mod stress;
pub mod types;

pub use config::{AnalyticsConfig, StressConfig};
pub use engine::AnalyticsEngine;
pub use error::{AnalyticsError, Result};
pub use irr::{IrrSolver, SolverConfig};
pub use metrics::{BenchmarkComparison, PerformanceMetrics, SharpeCalculator};
pub use recommendations::RecommendationGenerator;
pub use returns::{PositionReturn, ReturnCalculator};
pub use risk::{
    RiskAssessment, RiskFactor, RiskFactorAnalyzer, RiskFactorType, RiskMetrics,
    RiskMetricsCalculator, RiskScorer,
};
pub use stress::{StressScenario, StressTestReport, StressTestResult, StressTester};
pub use types::{CashFlow, CashFlowLedger, CashFlowType, Portfolio, Position, PositionStatus, RiskLevel};
