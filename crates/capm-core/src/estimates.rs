use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::CapmError;

/// OLS fit of a stock's daily returns against the benchmark's
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetaEstimate {
    pub stock: String,
    /// Slope: sensitivity of the stock to benchmark moves
    pub beta: f64,
    /// Intercept, in daily return units
    pub alpha: f64,
    pub r_squared: f64,
    /// Number of jointly defined observations used in the fit
    pub observations: usize,
}

/// CAPM expected annual return for one stock (fractional, 0.15 = 15%)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedReturn {
    pub stock: String,
    pub beta: f64,
    pub expected_return: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedReturnTable {
    /// Annualized mean benchmark return
    pub market_return: f64,
    pub risk_free_rate: f64,
    pub entries: Vec<ExpectedReturn>,
}

impl ExpectedReturnTable {
    pub fn get(&self, stock: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.stock == stock)
            .map(|e| e.expected_return)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Date range and size of the return sample behind a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub observations: usize,
}

/// Full CAPM statistics for one stock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockCapm {
    pub stock: String,
    pub beta: f64,
    pub alpha: f64,
    pub r_squared: f64,
    pub observations: usize,
    pub expected_return: f64,
}

impl StockCapm {
    pub fn from_parts(estimate: BetaEstimate, expected_return: f64) -> Self {
        Self {
            stock: estimate.stock,
            beta: estimate.beta,
            alpha: estimate.alpha,
            r_squared: estimate.r_squared,
            observations: estimate.observations,
            expected_return,
        }
    }
}

/// Immutable result of one analysis pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapmReport {
    pub benchmark: String,
    pub market_return: f64,
    pub risk_free_rate: f64,
    pub trading_days_per_year: u32,
    pub window: SampleWindow,
    pub stocks: Vec<StockCapm>,
}

impl CapmReport {
    pub fn get(&self, stock: &str) -> Option<&StockCapm> {
        self.stocks.iter().find(|s| s.stock == stock)
    }
}

/// Per-stock result when stocks are analyzed in isolation
#[derive(Debug, Clone, PartialEq)]
pub struct StockOutcome {
    pub stock: String,
    pub result: Result<StockCapm, CapmError>,
}

impl StockOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}
