//! Analytics engine
//!
//! Entry points for callers. The engine owns one instance of each
//! calculator plus the configuration; it holds no mutable state, so a single
//! engine can be shared across threads and portfolios.

use crate::config::AnalyticsConfig;
use crate::error::Result;
use crate::irr::IrrSolver;
use crate::metrics::{PerformanceMetrics, SharpeCalculator};
use crate::recommendations::{RecommendationGenerator, RecommendationInput};
use crate::returns::{PositionReturn, ReturnCalculator};
use crate::risk::{RiskAssessment, RiskFactorAnalyzer, RiskMetrics, RiskMetricsCalculator, RiskScorer};
use crate::stress::{StressScenario, StressTestReport, StressTestResult, StressTester};
use crate::types::{CashFlow, Portfolio, Position};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};

/// Portfolio performance and risk engine
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    config: AnalyticsConfig,
    returns: ReturnCalculator,
    irr: IrrSolver,
    sharpe: SharpeCalculator,
    risk_metrics: RiskMetricsCalculator,
    scorer: RiskScorer,
    factors: RiskFactorAnalyzer,
    stress: StressTester,
    recommendations: RecommendationGenerator,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::build(AnalyticsConfig::default())
    }
}

impl AnalyticsEngine {
    /// Create an engine from a configuration
    ///
    /// Fails with a configuration error when a value is out of range, so a
    /// constructed engine never rejects its own confidence level.
    pub fn new(config: AnalyticsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: AnalyticsConfig) -> Self {
        info!(
            confidence_level = config.confidence_level,
            scenarios = config.stress.scenarios.len(),
            "Initializing AnalyticsEngine"
        );

        let irr = IrrSolver::new(config.solver.clone());
        Self {
            returns: ReturnCalculator::new(irr.clone()),
            irr,
            sharpe: SharpeCalculator::new(),
            risk_metrics: RiskMetricsCalculator::new(),
            scorer: RiskScorer::new(),
            factors: RiskFactorAnalyzer::new(),
            stress: StressTester::new(config.stress.default_max_loss_pct),
            recommendations: RecommendationGenerator::new(),
            config,
        }
    }

    /// Load configuration from YAML string
    ///
    /// # Example
    ///
    /// ```
    /// use ag_analytics::AnalyticsEngine;
    ///
    /// let yaml = r#"
    /// confidence_level: 0.99
    /// risk_free_rate: 0.0001
    /// "#;
    ///
    /// let engine = AnalyticsEngine::from_yaml(yaml).unwrap();
    /// assert_eq!(engine.config().confidence_level, 0.99);
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::new(AnalyticsConfig::from_yaml(yaml)?)
    }

    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Self::new(AnalyticsConfig::from_json(json)?)
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Absolute and annualized return of a position as of today (UTC)
    pub fn compute_return(&self, position: &Position) -> Result<PerformanceMetrics> {
        self.compute_return_as_of(position, Utc::now().date_naive())
    }

    /// Absolute and annualized return of a position as of `as_of`
    pub fn compute_return_as_of(
        &self,
        position: &Position,
        as_of: NaiveDate,
    ) -> Result<PerformanceMetrics> {
        self.returns.compute_return(position, as_of)
    }

    /// Returns for every position of a portfolio, one result each
    pub fn compute_position_returns(
        &self,
        portfolio: &Portfolio,
        as_of: NaiveDate,
    ) -> Vec<PositionReturn> {
        self.returns.position_returns(portfolio, as_of)
    }

    /// Aggregated portfolio performance, optionally against a benchmark return
    pub fn compute_portfolio_performance(
        &self,
        portfolio: &Portfolio,
        as_of: NaiveDate,
        benchmark_return: Option<f64>,
    ) -> Result<PerformanceMetrics> {
        self.returns.portfolio_performance(
            portfolio,
            as_of,
            self.config.risk_free_rate,
            benchmark_return,
        )
    }

    /// Annual IRR of a cash-flow series
    pub fn compute_irr(&self, cash_flows: &[CashFlow]) -> Result<f64> {
        let result = self.irr.irr(cash_flows);
        if let Err(err) = &result {
            debug!(flows = cash_flows.len(), error = %err, "IRR calculation failed");
        }
        result
    }

    /// Sharpe ratio of a period-return series
    pub fn compute_sharpe(&self, returns: &[f64], risk_free_rate: f64) -> f64 {
        self.sharpe.sharpe_ratio(returns, risk_free_rate)
    }

    /// Risk metrics at the given confidence level
    pub fn compute_risk_metrics(
        &self,
        portfolio: &Portfolio,
        confidence_level: f64,
    ) -> Result<RiskMetrics> {
        self.risk_metrics
            .calculate(portfolio, confidence_level, self.config.risk_free_rate)
    }

    /// Assess portfolio risk now
    pub fn assess_risk(&self, portfolio: &Portfolio) -> Result<RiskAssessment> {
        self.assess_risk_at(portfolio, Utc::now())
    }

    /// Assess portfolio risk with an explicit assessment timestamp
    ///
    /// Identical inputs always produce identical assessments.
    pub fn assess_risk_at(
        &self,
        portfolio: &Portfolio,
        assessed_at: DateTime<Utc>,
    ) -> Result<RiskAssessment> {
        let metrics = self.compute_risk_metrics(portfolio, self.config.confidence_level)?;

        let risk_score = self.scorer.score(&metrics);
        let risk_level = self.scorer.classify(risk_score);
        let analysis = self.factors.analyze(&portfolio.positions, metrics.volatility);

        let recommendations = self.recommendations.generate(&RecommendationInput {
            risk_level,
            volatility: metrics.volatility,
            sharpe_ratio: metrics.sharpe_ratio,
            factors: &analysis.factors,
        });

        let assessment = RiskAssessment {
            portfolio_id: portfolio.id.clone(),
            risk_score,
            risk_level,
            metrics,
            factors: analysis.factors,
            hhi: analysis.concentration.hhi,
            diversification_score: analysis.concentration.diversification_score,
            recommendations,
            assessed_at,
        };

        if assessment.requires_attention() {
            warn!(
                portfolio_id = %assessment.portfolio_id,
                risk_score = assessment.risk_score,
                risk_level = %assessment.risk_level,
                "Portfolio risk is elevated"
            );
        } else {
            info!(
                portfolio_id = %assessment.portfolio_id,
                risk_score = assessment.risk_score,
                risk_level = %assessment.risk_level,
                "Assessed portfolio risk"
            );
        }

        Ok(assessment)
    }

    /// Apply a single stress scenario
    pub fn run_stress_test(&self, portfolio: &Portfolio, scenario: &StressScenario) -> StressTestResult {
        self.run_stress_test_at(portfolio, scenario, Utc::now())
    }

    /// Apply a single stress scenario with an explicit result timestamp
    pub fn run_stress_test_at(
        &self,
        portfolio: &Portfolio,
        scenario: &StressScenario,
        at: DateTime<Utc>,
    ) -> StressTestResult {
        self.stress.run_stress_test_at(portfolio, scenario, at)
    }

    /// Run every configured scenario and summarize; `None` when none are configured
    pub fn run_stress_scenarios(&self, portfolio: &Portfolio) -> Option<StressTestReport> {
        self.run_stress_scenarios_at(portfolio, Utc::now())
    }

    /// Configured scenarios and report, stamped with `at`
    pub fn run_stress_scenarios_at(
        &self,
        portfolio: &Portfolio,
        at: DateTime<Utc>,
    ) -> Option<StressTestReport> {
        let results = self
            .stress
            .run_scenarios_at(portfolio, &self.config.stress.scenarios, at);
        self.stress.generate_report_at(&results, at)
    }
}
