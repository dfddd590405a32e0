use serde::{Deserialize, Serialize};

use crate::{CapmError, Result};

/// Trading days used to annualize daily returns
pub const TRADING_DAYS_PER_YEAR: u32 = 252;

/// Parameters of the CAPM calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParams {
    /// Annual risk-free rate, fractional (0.04 = 4%)
    pub risk_free_rate: f64,

    /// Annualization factor applied to the mean daily benchmark return
    pub trading_days_per_year: u32,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.0,
            trading_days_per_year: TRADING_DAYS_PER_YEAR,
        }
    }
}

impl AnalysisParams {
    pub fn new(risk_free_rate: f64, trading_days_per_year: u32) -> Result<Self> {
        let params = Self {
            risk_free_rate,
            trading_days_per_year,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn with_risk_free_rate(mut self, risk_free_rate: f64) -> Self {
        self.risk_free_rate = risk_free_rate;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.risk_free_rate.is_finite() {
            return Err(CapmError::InvalidConfig(format!(
                "risk-free rate must be finite, got {}",
                self.risk_free_rate
            )));
        }
        if self.trading_days_per_year == 0 {
            return Err(CapmError::InvalidConfig(
                "trading days per year must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
