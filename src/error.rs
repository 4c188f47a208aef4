//! Error types for analytics calculations

use serde_json::json;
use thiserror::Error;

/// Code shared by every failed calculation
pub const CALCULATION_ERROR: &str = "CALCULATION_ERROR";

/// Code for configuration loading and validation failures
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";

/// Errors that can occur in analytics calculations
///
/// Every variant except [`AnalyticsError::ConfigError`] is a calculation
/// failure. A calculation failure means the requested metric is unavailable;
/// it says nothing about other metrics computed from the same portfolio.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Insufficient cash flows: IRR needs at least 2, got {count}")]
    InsufficientCashFlows { count: usize },

    #[error("Non-positive principal {principal} for position {position_id}")]
    NonPositivePrincipal { position_id: String, principal: f64 },

    #[error("IRR derivative too small ({derivative}) at rate {rate} on iteration {iteration}")]
    DerivativeTooSmall {
        rate: f64,
        derivative: f64,
        iteration: usize,
    },

    #[error("IRR did not converge after {iterations} iterations (last rate {last_rate}, npv {last_npv})")]
    NoConvergence {
        iterations: usize,
        last_rate: f64,
        last_npv: f64,
    },

    #[error("Invalid confidence level: {0} (must be between 0 and 1)")]
    InvalidConfidenceLevel(f64),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AnalyticsError {
    /// Error taxonomy code
    pub fn code(&self) -> &'static str {
        match self {
            AnalyticsError::ConfigError(_) => CONFIG_ERROR,
            _ => CALCULATION_ERROR,
        }
    }

    /// Whether this error came from a calculation rather than configuration
    pub fn is_calculation_error(&self) -> bool {
        self.code() == CALCULATION_ERROR
    }

    /// Offending input echoed back as a structured payload
    pub fn details(&self) -> serde_json::Value {
        match self {
            AnalyticsError::InsufficientCashFlows { count } => json!({
                "cash_flow_count": count,
                "minimum": 2,
            }),
            AnalyticsError::NonPositivePrincipal {
                position_id,
                principal,
            } => json!({
                "position_id": position_id,
                "principal": principal,
            }),
            AnalyticsError::DerivativeTooSmall {
                rate,
                derivative,
                iteration,
            } => json!({
                "rate": rate,
                "derivative": derivative,
                "iteration": iteration,
            }),
            AnalyticsError::NoConvergence {
                iterations,
                last_rate,
                last_npv,
            } => json!({
                "iterations": iterations,
                "last_rate": last_rate,
                "last_npv": last_npv,
            }),
            AnalyticsError::InvalidConfidenceLevel(level) => json!({
                "confidence_level": level,
            }),
            AnalyticsError::ConfigError(message) => json!({
                "message": message,
            }),
        }
    }
}

impl From<serde_yaml::Error> for AnalyticsError {
    fn from(err: serde_yaml::Error) -> Self {
        AnalyticsError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for AnalyticsError {
    fn from(err: serde_json::Error) -> Self {
        AnalyticsError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
