//! Stress testing and scenario analysis
//!
//! Applies a per-position shock determined by the scenario type, then
//! compares the resulting portfolio loss with the scenario's maximum
//! acceptable loss.

use crate::types::{Portfolio, Position};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Loss threshold (percent) applied when a scenario does not set one
pub const DEFAULT_MAX_LOSS_PCT: f64 = 20.0;

/// Family of shock applied by a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioType {
    MarketCrash,
    RateShock,
    LiquidityCrisis,
    SectorSpecific,
    #[default]
    General,
}

impl ScenarioType {
    /// Fractional value change applied to `position` (e.g. -0.30 for -30%)
    pub fn shock_for(self, position: &Position) -> f64 {
        match self {
            ScenarioType::MarketCrash => -0.30,
            ScenarioType::RateShock => -0.15,
            ScenarioType::LiquidityCrisis if position.risk_category.is_elevated() => -0.40,
            ScenarioType::LiquidityCrisis => -0.20,
            ScenarioType::SectorSpecific => -0.25,
            ScenarioType::General => -0.20,
        }
    }
}

/// Stress test scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressScenario {
    /// Scenario name
    pub name: String,

    /// Scenario description
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub scenario_type: ScenarioType,

    /// Maximum acceptable loss in percent of portfolio value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_loss_threshold: Option<f64>,
}

impl StressScenario {
    pub fn new(name: impl Into<String>, scenario_type: ScenarioType) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            scenario_type,
            max_loss_threshold: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_max_loss_threshold(mut self, threshold_pct: f64) -> Self {
        self.max_loss_threshold = Some(threshold_pct);
        self
    }
}

/// Impact of a scenario on one position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionImpact {
    pub position_id: String,

    pub base_value: f64,

    /// Applied shock as a fraction
    pub shock: f64,

    /// Value change (negative for a loss)
    pub impact: f64,
}

/// Result of a stress test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressTestResult {
    /// Scenario name
    pub scenario_name: String,

    pub scenario_type: ScenarioType,

    /// Portfolio value before the shock
    pub base_value: f64,

    /// Portfolio value after the shock
    pub stressed_value: f64,

    /// base_value - stressed_value
    pub loss: f64,

    /// Loss as a percentage of base value
    pub loss_percentage: f64,

    /// Threshold the loss was compared against
    pub max_loss_threshold: f64,

    pub passes_threshold: bool,

    /// Position-level impacts
    pub position_impacts: Vec<PositionImpact>,

    /// Position with the largest loss
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worst_position: Option<String>,

    /// Timestamp of stress test
    pub timestamp: DateTime<Utc>,
}

/// Summary across several stress scenarios
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressTestReport {
    /// All scenario results
    pub results: Vec<StressTestResult>,

    /// Scenario with the largest loss
    pub worst_scenario: String,

    /// Largest loss across scenarios
    pub max_loss: f64,

    /// Average loss percentage across scenarios
    pub average_loss_percentage: f64,

    /// Scenarios whose loss exceeded their threshold
    pub failed_scenarios: Vec<String>,

    /// Report generation timestamp
    pub timestamp: DateTime<Utc>,
}

impl StressTestReport {
    pub fn all_passed(&self) -> bool {
        self.failed_scenarios.is_empty()
    }
}

/// Stress testing engine
#[derive(Debug, Clone)]
pub struct StressTester {
    default_max_loss_pct: f64,
}

impl Default for StressTester {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LOSS_PCT)
    }
}

impl StressTester {
    /// Create a tester with the threshold used for scenarios that set none
    pub fn new(default_max_loss_pct: f64) -> Self {
        Self {
            default_max_loss_pct,
        }
    }

    /// One scenario per scenario type
    pub fn standard_scenarios() -> Vec<StressScenario> {
        vec![
            StressScenario::new("Market Crash", ScenarioType::MarketCrash)
                .with_description("Broad equity sell-off of 30%"),
            StressScenario::new("Rate Shock", ScenarioType::RateShock)
                .with_description("Sharp rise in interest rates"),
            StressScenario::new("Liquidity Crisis", ScenarioType::LiquidityCrisis)
                .with_description("Funding stress hitting high-risk holdings hardest"),
            StressScenario::new("Sector Downturn", ScenarioType::SectorSpecific)
                .with_description("Severe decline in a single sector"),
        ]
    }

    /// Run stress test on portfolio for a specific scenario
    pub fn run_stress_test(&self, portfolio: &Portfolio, scenario: &StressScenario) -> StressTestResult {
        self.run_stress_test_at(portfolio, scenario, Utc::now())
    }

    /// Run a scenario with an explicit result timestamp
    ///
    /// Identical inputs always produce identical results.
    pub fn run_stress_test_at(
        &self,
        portfolio: &Portfolio,
        scenario: &StressScenario,
        timestamp: DateTime<Utc>,
    ) -> StressTestResult {
        let base_value = portfolio.total_value();
        let mut position_impacts = Vec::with_capacity(portfolio.positions.len());
        let mut total_impact = 0.0;
        let mut worst: Option<(&str, f64)> = None;

        for position in &portfolio.positions {
            let shock = scenario.scenario_type.shock_for(position);
            let impact = position.current_value * shock;
            total_impact += impact;

            if worst.map_or(true, |(_, worst_impact)| impact < worst_impact) {
                worst = Some((position.id.as_str(), impact));
            }

            position_impacts.push(PositionImpact {
                position_id: position.id.clone(),
                base_value: position.current_value,
                shock,
                impact,
            });
        }

        let stressed_value = base_value + total_impact;
        let loss = base_value - stressed_value;
        let loss_percentage = if base_value > 0.0 {
            loss / base_value * 100.0
        } else {
            0.0
        };
        let max_loss_threshold = scenario
            .max_loss_threshold
            .unwrap_or(self.default_max_loss_pct);
        let passes_threshold = loss_percentage <= max_loss_threshold;

        debug!(
            scenario = %scenario.name,
            base_value,
            stressed_value,
            loss_percentage,
            passes_threshold,
            "Ran stress scenario"
        );

        StressTestResult {
            scenario_name: scenario.name.clone(),
            scenario_type: scenario.scenario_type,
            base_value,
            stressed_value,
            loss,
            loss_percentage,
            max_loss_threshold,
            passes_threshold,
            position_impacts,
            worst_position: worst.map(|(id, _)| id.to_string()),
            timestamp,
        }
    }

    /// Run multiple stress test scenarios
    pub fn run_scenarios(
        &self,
        portfolio: &Portfolio,
        scenarios: &[StressScenario],
    ) -> Vec<StressTestResult> {
        self.run_scenarios_at(portfolio, scenarios, Utc::now())
    }

    /// Run multiple scenarios, stamping every result with `timestamp`
    pub fn run_scenarios_at(
        &self,
        portfolio: &Portfolio,
        scenarios: &[StressScenario],
        timestamp: DateTime<Utc>,
    ) -> Vec<StressTestResult> {
        scenarios
            .iter()
            .map(|scenario| self.run_stress_test_at(portfolio, scenario, timestamp))
            .collect()
    }

    /// Summarize scenario results; `None` when there are no results
    pub fn generate_report(&self, results: &[StressTestResult]) -> Option<StressTestReport> {
        self.generate_report_at(results, Utc::now())
    }

    /// Summarize scenario results with an explicit report timestamp
    pub fn generate_report_at(
        &self,
        results: &[StressTestResult],
        timestamp: DateTime<Utc>,
    ) -> Option<StressTestReport> {
        let worst = results
            .iter()
            .max_by(|a, b| a.loss.total_cmp(&b.loss))?;

        let average_loss_percentage =
            results.iter().map(|r| r.loss_percentage).sum::<f64>() / results.len() as f64;

        let failed_scenarios: Vec<String> = results
            .iter()
            .filter(|r| !r.passes_threshold)
            .map(|r| r.scenario_name.clone())
            .collect();

        if !failed_scenarios.is_empty() {
            warn!(failed = ?failed_scenarios, "Stress scenarios exceeded loss threshold");
        }

        Some(StressTestReport {
            results: results.to_vec(),
            worst_scenario: worst.scenario_name.clone(),
            max_loss: worst.loss,
            average_loss_percentage,
            failed_scenarios,
            timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RiskLevel;
    use approx::assert_relative_eq;
    use chrono::{NaiveDate, TimeZone};

    fn position(id: &str, value: f64, category: RiskLevel) -> Position {
        Position::new(
            id,
            value,
            value,
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            category,
        )
    }

    fn create_test_portfolio() -> Portfolio {
        Portfolio::new(
            "pf",
            vec![
                position("equity", 6000.0, RiskLevel::High),
                position("bonds", 3000.0, RiskLevel::Low),
                position("cash", 1000.0, RiskLevel::VeryLow),
            ],
        )
    }

    #[test]
    fn test_market_crash_single_position() {
        let portfolio = Portfolio::new("pf", vec![position("a", 1000.0, RiskLevel::Medium)]);
        let scenario = StressScenario::new("Crash", ScenarioType::MarketCrash);

        let result = StressTester::default().run_stress_test(&portfolio, &scenario);

        assert_relative_eq!(result.stressed_value, 700.0, epsilon = 1e-9);
        assert_relative_eq!(result.loss, 300.0, epsilon = 1e-9);
        assert_relative_eq!(result.loss_percentage, 30.0, epsilon = 1e-9);
        assert_eq!(result.max_loss_threshold, 20.0);
        assert!(!result.passes_threshold);
    }

    #[test]
    fn test_liquidity_crisis_depends_on_category() {
        let portfolio = create_test_portfolio();
        let scenario = StressScenario::new("Liquidity", ScenarioType::LiquidityCrisis);

        let result = StressTester::default().run_stress_test(&portfolio, &scenario);

        let equity = &result.position_impacts[0];
        assert_eq!(equity.shock, -0.40);
        assert_relative_eq!(equity.impact, -2400.0, epsilon = 1e-9);

        let bonds = &result.position_impacts[1];
        assert_eq!(bonds.shock, -0.20);

        // 2400 + 600 + 200
        assert_relative_eq!(result.loss, 3200.0, epsilon = 1e-9);
        assert_eq!(result.worst_position.as_deref(), Some("equity"));
    }

    #[test]
    fn test_shock_table() {
        let low = position("x", 1.0, RiskLevel::Low);
        let critical = position("y", 1.0, RiskLevel::Critical);

        assert_eq!(ScenarioType::MarketCrash.shock_for(&low), -0.30);
        assert_eq!(ScenarioType::RateShock.shock_for(&low), -0.15);
        assert_eq!(ScenarioType::LiquidityCrisis.shock_for(&low), -0.20);
        assert_eq!(ScenarioType::LiquidityCrisis.shock_for(&critical), -0.40);
        assert_eq!(ScenarioType::SectorSpecific.shock_for(&critical), -0.25);
        assert_eq!(ScenarioType::General.shock_for(&critical), -0.20);
    }

    #[test]
    fn test_custom_threshold() {
        let portfolio = create_test_portfolio();
        let scenario =
            StressScenario::new("Crash", ScenarioType::MarketCrash).with_max_loss_threshold(35.0);

        let result = StressTester::default().run_stress_test(&portfolio, &scenario);
        assert!(result.passes_threshold);

        let strict = StressTester::new(10.0);
        let rate = StressScenario::new("Rates", ScenarioType::RateShock);
        assert!(!strict.run_stress_test(&portfolio, &rate).passes_threshold);
    }

    #[test]
    fn test_general_scenario_at_threshold_passes() {
        let portfolio = create_test_portfolio();
        let scenario = StressScenario::new("General", ScenarioType::General);

        let result = StressTester::default().run_stress_test(&portfolio, &scenario);
        assert_relative_eq!(result.loss_percentage, 20.0, epsilon = 1e-9);
        assert!(result.passes_threshold);
    }

    #[test]
    fn test_empty_portfolio() {
        let portfolio = Portfolio::new("empty", vec![]);
        let scenario = StressScenario::new("Crash", ScenarioType::MarketCrash);

        let result = StressTester::default().run_stress_test(&portfolio, &scenario);
        assert_eq!(result.base_value, 0.0);
        assert_eq!(result.loss_percentage, 0.0);
        assert!(result.passes_threshold);
        assert!(result.worst_position.is_none());
    }

    #[test]
    fn test_stress_results_are_repeatable() {
        let tester = StressTester::default();
        let portfolio = create_test_portfolio();
        let at = Utc.with_ymd_and_hms(2024, 3, 31, 16, 0, 0).unwrap();
        let scenario = StressScenario::new("Liquidity", ScenarioType::LiquidityCrisis);

        let first = tester.run_stress_test_at(&portfolio, &scenario, at);
        let second = tester.run_stress_test_at(&portfolio, &scenario, at);
        assert_eq!(first, second);
        assert_eq!(first.timestamp, at);

        let scenarios = StressTester::standard_scenarios();
        let first = tester.generate_report_at(&tester.run_scenarios_at(&portfolio, &scenarios, at), at);
        let second = tester.generate_report_at(&tester.run_scenarios_at(&portfolio, &scenarios, at), at);
        assert_eq!(first, second);
        assert!(first.unwrap().results.iter().all(|r| r.timestamp == at));
    }

    #[test]
    fn test_stress_test_report() {
        let tester = StressTester::default();
        let portfolio = create_test_portfolio();

        let results = tester.run_scenarios(&portfolio, &StressTester::standard_scenarios());
        assert_eq!(results.len(), 4);

        let report = tester.generate_report(&results).unwrap();
        assert_eq!(report.results.len(), 4);
        assert_eq!(report.worst_scenario, "Liquidity Crisis");
        assert_relative_eq!(report.max_loss, 3200.0, epsilon = 1e-9);
        assert!(report.failed_scenarios.contains(&"Market Crash".to_string()));
        assert!(!report.failed_scenarios.contains(&"Rate Shock".to_string()));
        assert!(!report.all_passed());
    }

    #[test]
    fn test_report_requires_results() {
        assert!(StressTester::default().generate_report(&[]).is_none());
    }

    #[test]
    fn test_scenario_yaml() {
        let yaml = r#"
name: Tech Selloff
scenario_type: sector_specific
max_loss_threshold: 15.0
"#;
        let scenario: StressScenario = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(scenario.scenario_type, ScenarioType::SectorSpecific);
        assert_eq!(scenario.max_loss_threshold, Some(15.0));
        assert!(scenario.description.is_empty());
    }
}
