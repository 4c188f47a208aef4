//! Analytics configuration
//!
//! Loaded from YAML or JSON; every field has a default so partial documents
//! are accepted.

use crate::error::{AnalyticsError, Result};
use crate::irr::SolverConfig;
use crate::risk::DEFAULT_CONFIDENCE_LEVEL;
use crate::stress::{StressScenario, StressTester, DEFAULT_MAX_LOSS_PCT};
use serde::{Deserialize, Serialize};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Confidence level for VaR/CVaR in assessments
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,

    /// Risk-free rate per return period, used for Sharpe ratios
    #[serde(default)]
    pub risk_free_rate: f64,

    /// IRR solver settings
    #[serde(default)]
    pub solver: SolverConfig,

    /// Stress testing settings
    #[serde(default)]
    pub stress: StressConfig,
}

/// Stress testing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressConfig {
    /// Loss threshold (percent) for scenarios that set none
    #[serde(default = "default_max_loss_pct")]
    pub default_max_loss_pct: f64,

    /// Scenarios run by `AnalyticsEngine::run_stress_scenarios`
    #[serde(default = "StressTester::standard_scenarios")]
    pub scenarios: Vec<StressScenario>,
}

fn default_confidence_level() -> f64 {
    DEFAULT_CONFIDENCE_LEVEL
}

fn default_max_loss_pct() -> f64 {
    DEFAULT_MAX_LOSS_PCT
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            default_max_loss_pct: default_max_loss_pct(),
            scenarios: StressTester::standard_scenarios(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            confidence_level: default_confidence_level(),
            risk_free_rate: 0.0,
            solver: SolverConfig::default(),
            stress: StressConfig::default(),
        }
    }
}

impl AnalyticsConfig {
    /// Load configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: AnalyticsConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AnalyticsError::ConfigError(format!("{}: {}", path, e)))?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: AnalyticsConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(AnalyticsError::ConfigError(format!(
                "confidence_level must be between 0 and 1, got {}",
                self.confidence_level
            )));
        }

        if !self.risk_free_rate.is_finite() {
            return Err(AnalyticsError::ConfigError(
                "risk_free_rate must be finite".to_string(),
            ));
        }

        let solver = &self.solver;
        if solver.max_iterations == 0 {
            return Err(AnalyticsError::ConfigError(
                "solver.max_iterations must be positive".to_string(),
            ));
        }
        if solver.tolerance <= 0.0 || solver.min_derivative <= 0.0 {
            return Err(AnalyticsError::ConfigError(
                "solver tolerances must be positive".to_string(),
            ));
        }
        if solver.day_count_basis <= 0.0 {
            return Err(AnalyticsError::ConfigError(format!(
                "solver.day_count_basis must be positive, got {}",
                solver.day_count_basis
            )));
        }

        if self.stress.default_max_loss_pct < 0.0 {
            return Err(AnalyticsError::ConfigError(format!(
                "stress.default_max_loss_pct must not be negative, got {}",
                self.stress.default_max_loss_pct
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stress::ScenarioType;

    #[test]
    fn test_default_config() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.confidence_level, 0.95);
        assert_eq!(config.risk_free_rate, 0.0);
        assert_eq!(config.solver.initial_guess, 0.10);
        assert_eq!(config.solver.tolerance, 1e-6);
        assert_eq!(config.solver.max_iterations, 100);
        assert_eq!(config.solver.day_count_basis, 365.25);
        assert_eq!(config.stress.default_max_loss_pct, 20.0);
        assert_eq!(config.stress.scenarios.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
confidence_level: 0.99
stress:
  default_max_loss_pct: 15.0
  scenarios:
    - name: Rates Up
      scenario_type: rate_shock
"#;

        let config = AnalyticsConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.confidence_level, 0.99);
        assert_eq!(config.solver, SolverConfig::default());
        assert_eq!(config.stress.default_max_loss_pct, 15.0);
        assert_eq!(config.stress.scenarios.len(), 1);
        assert_eq!(config.stress.scenarios[0].scenario_type, ScenarioType::RateShock);
    }

    #[test]
    fn test_json_config() {
        let json = r#"{ "risk_free_rate": 0.001, "solver": { "max_iterations": 50 } }"#;

        let config = AnalyticsConfig::from_json(json).unwrap();
        assert_eq!(config.risk_free_rate, 0.001);
        assert_eq!(config.solver.max_iterations, 50);
        assert_eq!(config.solver.tolerance, 1e-6);
    }

    #[test]
    fn test_invalid_config() {
        let err = AnalyticsConfig::from_yaml("confidence_level: 1.2").unwrap_err();
        assert!(matches!(err, AnalyticsError::ConfigError(_)));

        let err = AnalyticsConfig::from_yaml("solver:\n  max_iterations: 0").unwrap_err();
        assert_eq!(err.code(), crate::error::CONFIG_ERROR);

        assert!(AnalyticsConfig::from_yaml("confidence_level: [oops").is_err());
        assert!(AnalyticsConfig::from_yaml_file("/nonexistent/analytics.yaml").is_err());
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = AnalyticsConfig::default();
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("confidence_level:"));
        assert!(yaml.contains("solver:"));

        let parsed = AnalyticsConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, config);
    }
}
