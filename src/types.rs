//! Portfolio data model
//!
//! Positions, cash flows and the portfolio snapshot consumed by every
//! calculator in this crate. Derived totals are always computed from the
//! contained positions and never stored.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered risk classification
///
/// Used both as the risk category of a position and as the level of a
/// portfolio risk assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    VeryLow,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// All levels in ascending order
    pub const ALL: [RiskLevel; 5] = [
        RiskLevel::VeryLow,
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Critical,
    ];

    /// Numeric weight used by the approximate beta heuristic (10..=90)
    pub fn beta_weight(self) -> f64 {
        match self {
            RiskLevel::VeryLow => 10.0,
            RiskLevel::Low => 30.0,
            RiskLevel::Medium => 50.0,
            RiskLevel::High => 70.0,
            RiskLevel::Critical => 90.0,
        }
    }

    /// HIGH or CRITICAL
    pub fn is_elevated(self) -> bool {
        matches!(self, RiskLevel::High | RiskLevel::Critical)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::VeryLow => "VERY_LOW",
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionStatus {
    Active,
    Completed,
    Cancelled,
    Suspended,
}

/// A single investment held in a portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Position identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Amount originally invested (must be positive for annualized math)
    pub principal: f64,

    /// Latest valuation (revalued externally)
    pub current_value: f64,

    /// Date the investment was made
    pub acquired_on: NaiveDate,

    /// Discrete risk category
    pub risk_category: RiskLevel,

    /// Lifecycle status
    pub status: PositionStatus,
}

impl Position {
    /// Create an active position
    pub fn new(
        id: impl Into<String>,
        principal: f64,
        current_value: f64,
        acquired_on: NaiveDate,
        risk_category: RiskLevel,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            principal,
            current_value,
            acquired_on,
            risk_category,
            status: PositionStatus::Active,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_status(mut self, status: PositionStatus) -> Self {
        self.status = status;
        self
    }
}

/// Direction of a cash movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashFlowType {
    Inflow,
    Outflow,
}

/// A dated, signed cash movement
///
/// Positive amounts are inflows, negative amounts are outflows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlow {
    pub date: NaiveDate,

    pub amount: f64,

    pub flow_type: CashFlowType,

    /// Free-text category (e.g. "contribution", "dividend")
    #[serde(default)]
    pub category: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl CashFlow {
    /// Create a cash flow whose type tag follows the sign of `amount`
    pub fn new(date: NaiveDate, amount: f64, category: impl Into<String>) -> Self {
        let flow_type = if amount < 0.0 {
            CashFlowType::Outflow
        } else {
            CashFlowType::Inflow
        };

        Self {
            date,
            amount,
            flow_type,
            category: category.into(),
            reference: None,
        }
    }

    /// Money received (amount stored as a positive number)
    pub fn inflow(date: NaiveDate, amount: f64) -> Self {
        Self::new(date, amount.abs(), "inflow")
    }

    /// Money paid out (amount stored as a negative number)
    pub fn outflow(date: NaiveDate, amount: f64) -> Self {
        Self::new(date, -amount.abs(), "outflow")
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Whether the type tag agrees with the sign of the amount
    pub fn is_consistent(&self) -> bool {
        match self.flow_type {
            CashFlowType::Inflow => self.amount >= 0.0,
            CashFlowType::Outflow => self.amount <= 0.0,
        }
    }
}

/// Date-ordered record of cash flows
///
/// Flows are kept sorted ascending by date; flows on the same date keep
/// their insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<CashFlow>", into = "Vec<CashFlow>")]
pub struct CashFlowLedger {
    flows: Vec<CashFlow>,
}

impl CashFlowLedger {
    pub fn new(flows: Vec<CashFlow>) -> Self {
        let mut flows = flows;
        flows.sort_by_key(|flow| flow.date);
        Self { flows }
    }

    /// Record a cash flow, keeping date order
    pub fn record(&mut self, flow: CashFlow) {
        let index = self.flows.partition_point(|existing| existing.date <= flow.date);
        self.flows.insert(index, flow);
    }

    /// Flows in ascending date order
    pub fn flows(&self) -> &[CashFlow] {
        &self.flows
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    pub fn total_inflows(&self) -> f64 {
        self.flows
            .iter()
            .filter(|flow| flow.amount > 0.0)
            .map(|flow| flow.amount)
            .sum()
    }

    /// Sum of outflows as a positive magnitude
    pub fn total_outflows(&self) -> f64 {
        self.flows
            .iter()
            .filter(|flow| flow.amount < 0.0)
            .map(|flow| -flow.amount)
            .sum()
    }

    pub fn net_flow(&self) -> f64 {
        self.flows.iter().map(|flow| flow.amount).sum()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.flows.first().map(|flow| flow.date)
    }
}

impl From<Vec<CashFlow>> for CashFlowLedger {
    fn from(flows: Vec<CashFlow>) -> Self {
        Self::new(flows)
    }
}

impl From<CashFlowLedger> for Vec<CashFlow> {
    fn from(ledger: CashFlowLedger) -> Self {
        ledger.flows
    }
}

/// Point-in-time portfolio snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub id: String,

    pub name: String,

    pub positions: Vec<Position>,

    #[serde(default)]
    pub cash_flows: CashFlowLedger,

    /// Historical period returns supplied by the data collaborator
    #[serde(default)]
    pub historical_returns: Vec<f64>,
}

impl Portfolio {
    pub fn new(id: impl Into<String>, positions: Vec<Position>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            positions,
            cash_flows: CashFlowLedger::default(),
            historical_returns: Vec::new(),
        }
    }

    pub fn with_cash_flows(mut self, flows: Vec<CashFlow>) -> Self {
        self.cash_flows = CashFlowLedger::new(flows);
        self
    }

    pub fn with_historical_returns(mut self, returns: Vec<f64>) -> Self {
        self.historical_returns = returns;
        self
    }

    /// Sum of principals over all positions
    pub fn total_invested(&self) -> f64 {
        self.positions.iter().map(|p| p.principal).sum()
    }

    /// Sum of current values over all positions
    pub fn total_value(&self) -> f64 {
        self.positions.iter().map(|p| p.current_value).sum()
    }

    /// Earliest acquisition date across positions
    pub fn inception_date(&self) -> Option<NaiveDate> {
        self.positions.iter().map(|p| p.acquired_on).min()
    }

    pub fn position(&self, id: &str) -> Option<&Position> {
        self.positions.iter().find(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::VeryLow < RiskLevel::Low);
        assert!(RiskLevel::High < RiskLevel::Critical);
        assert!(RiskLevel::Critical.is_elevated());
        assert!(!RiskLevel::Medium.is_elevated());
        assert_eq!(RiskLevel::Medium.beta_weight(), 50.0);
    }

    #[test]
    fn test_risk_level_serde() {
        let json = serde_json::to_string(&RiskLevel::VeryLow).unwrap();
        assert_eq!(json, "\"VERY_LOW\"");

        let level: RiskLevel = serde_json::from_str("\"CRITICAL\"").unwrap();
        assert_eq!(level, RiskLevel::Critical);
    }

    #[test]
    fn test_cash_flow_type_follows_sign() {
        let out = CashFlow::new(date(2024, 1, 1), -1000.0, "purchase");
        assert_eq!(out.flow_type, CashFlowType::Outflow);
        assert!(out.is_consistent());

        let inflow = CashFlow::inflow(date(2024, 6, 1), 50.0);
        assert_eq!(inflow.flow_type, CashFlowType::Inflow);
        assert_eq!(inflow.amount, 50.0);

        let outflow = CashFlow::outflow(date(2024, 6, 1), 50.0);
        assert_eq!(outflow.amount, -50.0);

        let mismatched = CashFlow {
            flow_type: CashFlowType::Inflow,
            ..out
        };
        assert!(!mismatched.is_consistent());
    }

    #[test]
    fn test_ledger_keeps_date_order() {
        let mut ledger = CashFlowLedger::new(vec![
            CashFlow::inflow(date(2024, 12, 31), 1100.0),
            CashFlow::outflow(date(2024, 1, 1), 1000.0),
        ]);

        ledger.record(CashFlow::inflow(date(2024, 6, 30), 20.0).with_reference("div-1"));

        let dates: Vec<_> = ledger.flows().iter().map(|f| f.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 1), date(2024, 6, 30), date(2024, 12, 31)]);
        assert_eq!(ledger.first_date(), Some(date(2024, 1, 1)));
        assert_eq!(ledger.total_inflows(), 1120.0);
        assert_eq!(ledger.total_outflows(), 1000.0);
        assert_eq!(ledger.net_flow(), 120.0);
    }

    #[test]
    fn test_ledger_deserializes_sorted() {
        let json = r#"[
            {"date": "2024-12-31", "amount": 1100.0, "flow_type": "inflow"},
            {"date": "2024-01-01", "amount": -1000.0, "flow_type": "outflow", "category": "buy"}
        ]"#;

        let ledger: CashFlowLedger = serde_json::from_str(json).unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.flows()[0].amount, -1000.0);
        assert_eq!(ledger.flows()[0].category, "buy");
    }

    #[test]
    fn test_portfolio_totals_follow_positions() {
        let mut portfolio = Portfolio::new(
            "pf-1",
            vec![
                Position::new("a", 1000.0, 1200.0, date(2023, 1, 1), RiskLevel::Low),
                Position::new("b", 500.0, 400.0, date(2022, 6, 1), RiskLevel::High),
            ],
        );

        assert_eq!(portfolio.total_invested(), 1500.0);
        assert_eq!(portfolio.total_value(), 1600.0);
        assert_eq!(portfolio.inception_date(), Some(date(2022, 6, 1)));

        portfolio.positions[1].current_value = 900.0;
        assert_eq!(portfolio.total_value(), 2100.0);
        assert!(portfolio.position("b").is_some());
        assert!(portfolio.position("z").is_none());
    }
}
