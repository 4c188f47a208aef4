//! Return calculations
//!
//! Absolute and annualized returns for single positions, batch returns with
//! per-position results, and aggregated portfolio performance.

use crate::error::{AnalyticsError, Result};
use crate::irr::IrrSolver;
use crate::metrics::{sample_std_dev, BenchmarkComparison, PerformanceMetrics, SharpeCalculator};
use crate::risk::max_drawdown;
use crate::types::{Portfolio, Position};
use chrono::NaiveDate;
use tracing::{debug, warn};

const DAYS_PER_YEAR: f64 = 365.0;

/// Return result for one position in a batch
#[derive(Debug, Clone, PartialEq)]
pub struct PositionReturn {
    pub position_id: String,
    pub result: Result<PerformanceMetrics>,
}

/// Position and portfolio return calculator
#[derive(Debug, Clone, Default)]
pub struct ReturnCalculator {
    irr_solver: IrrSolver,
    sharpe: SharpeCalculator,
}

impl ReturnCalculator {
    pub fn new(irr_solver: IrrSolver) -> Self {
        Self {
            irr_solver,
            sharpe: SharpeCalculator::new(),
        }
    }

    /// Current value minus principal
    pub fn absolute_return(&self, position: &Position) -> f64 {
        position.current_value - position.principal
    }

    /// Compound annual growth rate of a position as of `as_of`
    ///
    /// Holding periods shorter than one day count as one day.
    pub fn annualized_return(&self, position: &Position, as_of: NaiveDate) -> Result<f64> {
        annualize(
            &position.id,
            position.principal,
            position.current_value,
            position.acquired_on,
            as_of,
        )
    }

    /// Absolute and annualized return of a single position
    pub fn compute_return(&self, position: &Position, as_of: NaiveDate) -> Result<PerformanceMetrics> {
        let annualized_return = self.annualized_return(position, as_of)?;
        let absolute_return = self.absolute_return(position);

        Ok(PerformanceMetrics {
            absolute_return,
            absolute_return_pct: percent_of(absolute_return, position.principal),
            annualized_return,
            irr: None,
            sharpe_ratio: None,
            volatility: None,
            max_drawdown: None,
            benchmark: None,
        })
    }

    /// Returns for every position; one failure does not stop the others
    pub fn position_returns(&self, portfolio: &Portfolio, as_of: NaiveDate) -> Vec<PositionReturn> {
        portfolio
            .positions
            .iter()
            .map(|position| {
                let result = self.compute_return(position, as_of);
                if let Err(err) = &result {
                    warn!(position_id = %position.id, error = %err, "Position return unavailable");
                }
                PositionReturn {
                    position_id: position.id.clone(),
                    result,
                }
            })
            .collect()
    }

    /// Aggregated performance of a portfolio
    ///
    /// The totals are annualized from the earliest acquisition date. IRR is
    /// attached when the ledger holds at least 2 flows and the solver
    /// converges; return-series metrics need at least 2 historical returns.
    pub fn portfolio_performance(
        &self,
        portfolio: &Portfolio,
        as_of: NaiveDate,
        risk_free_rate: f64,
        benchmark_return: Option<f64>,
    ) -> Result<PerformanceMetrics> {
        let invested = portfolio.total_invested();
        let value = portfolio.total_value();
        let inception = portfolio.inception_date().unwrap_or(as_of);

        let annualized_return = annualize(&portfolio.id, invested, value, inception, as_of)?;
        let absolute_return = value - invested;

        let irr = if portfolio.cash_flows.len() >= 2 {
            match self.irr_solver.irr(portfolio.cash_flows.flows()) {
                Ok(rate) => Some(rate),
                Err(err) => {
                    warn!(portfolio_id = %portfolio.id, error = %err, "IRR unavailable");
                    None
                }
            }
        } else {
            None
        };

        let returns = &portfolio.historical_returns;
        let (sharpe_ratio, volatility, max_dd) = if returns.len() >= 2 {
            (
                Some(self.sharpe.sharpe_ratio(returns, risk_free_rate)),
                Some(sample_std_dev(returns)),
                Some(max_drawdown(returns)),
            )
        } else {
            (None, None, None)
        };

        debug!(
            portfolio_id = %portfolio.id,
            absolute_return,
            annualized_return,
            "Computed portfolio performance"
        );

        Ok(PerformanceMetrics {
            absolute_return,
            absolute_return_pct: percent_of(absolute_return, invested),
            annualized_return,
            irr,
            sharpe_ratio,
            volatility,
            max_drawdown: max_dd,
            benchmark: benchmark_return.map(|b| BenchmarkComparison::new(annualized_return, b)),
        })
    }
}

fn annualize(
    id: &str,
    principal: f64,
    current_value: f64,
    start: NaiveDate,
    as_of: NaiveDate,
) -> Result<f64> {
    if principal <= 0.0 {
        return Err(AnalyticsError::NonPositivePrincipal {
            position_id: id.to_string(),
            principal,
        });
    }

    let days_held = (as_of - start).num_days().max(1) as f64;
    Ok((current_value / principal).powf(DAYS_PER_YEAR / days_held) - 1.0)
}

fn percent_of(amount: f64, base: f64) -> f64 {
    if base > 0.0 {
        amount / base * 100.0
    } else {
        0.0
    }
}
