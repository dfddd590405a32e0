use capm_core::{AnalysisParams, CapmError, ExpectedReturn, ExpectedReturnTable, Result};
use statrs::statistics::Statistics;

/// Annualized market return: mean daily benchmark return times the number of
/// trading days per year. `NaN` entries are treated as missing.
pub fn market_return(benchmark_returns: &[f64], trading_days_per_year: u32) -> Result<f64> {
    if benchmark_returns.iter().any(|r| r.is_infinite()) {
        return Err(CapmError::DataValidity(
            "benchmark returns contain an infinite value".to_string(),
        ));
    }
    let defined: Vec<f64> = benchmark_returns
        .iter()
        .copied()
        .filter(|r| !r.is_nan())
        .collect();
    if defined.is_empty() {
        return Err(CapmError::DegenerateRegression(
            "no benchmark returns to estimate the market return".to_string(),
        ));
    }

    Ok(defined.as_slice().mean() * f64::from(trading_days_per_year))
}

/// CAPM: `rf + beta * (rm - rf)`, all rates annual and fractional.
pub fn capm_expected_return(beta: f64, risk_free_rate: f64, market_return: f64) -> Result<f64> {
    if !beta.is_finite() {
        return Err(CapmError::DegenerateRegression(format!(
            "beta is {beta}, expected return is undefined"
        )));
    }
    Ok(risk_free_rate + beta * (market_return - risk_free_rate))
}

/// Expected annual return for every stock in `betas`, in input order.
///
/// An empty beta mapping yields an empty table; its `market_return` is still
/// computed when the benchmark allows it and 0.0 otherwise. Any non-finite
/// beta fails the whole table with an error naming the stock.
pub fn expected_returns<I, S>(
    betas: I,
    benchmark_returns: &[f64],
    params: &AnalysisParams,
) -> Result<ExpectedReturnTable>
where
    I: IntoIterator<Item = (S, f64)>,
    S: Into<String>,
{
    params.validate()?;
    let betas: Vec<(String, f64)> = betas.into_iter().map(|(s, b)| (s.into(), b)).collect();

    let market = match market_return(benchmark_returns, params.trading_days_per_year) {
        Ok(rm) => rm,
        Err(_) if betas.is_empty() => 0.0,
        Err(e) => return Err(e),
    };

    let entries = betas
        .into_iter()
        .map(|(stock, beta)| {
            let expected_return = capm_expected_return(beta, params.risk_free_rate, market)
                .map_err(|e| e.context(&stock))?;
            Ok(ExpectedReturn {
                stock,
                beta,
                expected_return,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ExpectedReturnTable {
        market_return: market,
        risk_free_rate: params.risk_free_rate,
        entries,
    })
}
