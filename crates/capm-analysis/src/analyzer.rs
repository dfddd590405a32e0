use capm_core::{
    AnalysisParams, CapmError, CapmReport, PriceTable, Result, ReturnTable, SampleWindow,
    StockCapm, StockOutcome,
};

use crate::expected_return::{capm_expected_return, expected_returns, market_return};
use crate::regression::estimate_beta;
use crate::returns::daily_returns;

/// Runs the full CAPM pipeline over an aligned price table.
///
/// Every method is a pure function of its inputs: nothing is cached between
/// calls and no state is shared across stocks.
#[derive(Debug, Clone, Default)]
pub struct CapmAnalyzer {
    params: AnalysisParams,
}

impl CapmAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: AnalysisParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &AnalysisParams {
        &self.params
    }

    /// Compute beta, alpha and CAPM expected return for every requested
    /// stock, failing on the first error.
    pub fn analyze<S: AsRef<str>>(&self, prices: &PriceTable, stocks: &[S]) -> Result<CapmReport> {
        let returns = daily_returns(prices)?;
        self.analyze_returns(&returns, stocks)
    }

    /// Same as [`analyze`](Self::analyze) for callers already holding returns.
    pub fn analyze_returns<S: AsRef<str>>(
        &self,
        returns: &ReturnTable,
        stocks: &[S],
    ) -> Result<CapmReport> {
        let window = sample_window(returns)?;

        let estimates = stocks
            .iter()
            .map(|s| estimate_beta(returns, s.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        for est in &estimates {
            tracing::debug!(
                "{}: beta={:.4} alpha={:.6} r2={:.3} n={}",
                est.stock,
                est.beta,
                est.alpha,
                est.r_squared,
                est.observations
            );
        }

        let table = expected_returns(
            estimates.iter().map(|e| (e.stock.as_str(), e.beta)),
            &returns.benchmark().values,
            &self.params,
        )?;

        let stocks: Vec<StockCapm> = estimates
            .into_iter()
            .zip(&table.entries)
            .map(|(est, entry)| StockCapm::from_parts(est, entry.expected_return))
            .collect();

        tracing::info!(
            "CAPM over {} returns ({} to {}): {} stock(s), market return {:.4}",
            window.observations,
            window.start,
            window.end,
            stocks.len(),
            table.market_return
        );

        Ok(CapmReport {
            benchmark: returns.benchmark().name.clone(),
            market_return: table.market_return,
            risk_free_rate: self.params.risk_free_rate,
            trading_days_per_year: self.params.trading_days_per_year,
            window,
            stocks,
        })
    }

    /// Analyze each stock in isolation so one bad column does not sink the
    /// rest. Benchmark problems are reported against every stock.
    pub fn analyze_each<S: AsRef<str>>(&self, prices: &PriceTable, stocks: &[S]) -> Vec<StockOutcome> {
        stocks
            .iter()
            .map(|s| {
                let stock = s.as_ref();
                let result = self.isolated(prices, stock);
                if let Err(e) = &result {
                    tracing::debug!("{} failed: {}", stock, e);
                }
                StockOutcome {
                    stock: stock.to_string(),
                    result,
                }
            })
            .collect()
    }

    /// Annualized benchmark return used as the market return.
    pub fn market_return(&self, returns: &ReturnTable) -> Result<f64> {
        market_return(&returns.benchmark().values, self.params.trading_days_per_year)
    }

    fn isolated(&self, prices: &PriceTable, stock: &str) -> Result<StockCapm> {
        let single = PriceTable::new(
            prices.dates().to_vec(),
            prices.benchmark().clone(),
            vec![prices.stock(stock)?.clone()],
        )?;
        let returns = daily_returns(&single)?;
        let rm = self.market_return(&returns)?;

        let est = estimate_beta(&returns, stock)?;
        let er = capm_expected_return(est.beta, self.params.risk_free_rate, rm)
            .map_err(|e| e.context(stock))?;
        Ok(StockCapm::from_parts(est, er))
    }
}

fn sample_window(returns: &ReturnTable) -> Result<SampleWindow> {
    match (returns.first_date(), returns.last_date()) {
        (Some(start), Some(end)) => Ok(SampleWindow {
            start,
            end,
            observations: returns.len(),
        }),
        _ => Err(CapmError::DataAlignment("return table is empty".to_string())),
    }
}
