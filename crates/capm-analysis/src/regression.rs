use capm_core::{BetaEstimate, CapmError, Result, ReturnTable};

/// Relative tolerance for the zero-variance check: `x` is degenerate when
/// `Σ(x - x̄)² <= VARIANCE_FLOOR * Σx²`. This is not an exact `var(x) == 0`
/// test; a series with a large mean and a tiny spread also trips it, which
/// daily returns (mean near zero) never do.
const VARIANCE_FLOOR: f64 = 1e-12;

/// Closed-form univariate least-squares fit of `y = intercept + slope * x`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OlsFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub observations: usize,
}

/// OLS regression of `y` on `x` over the rows where both are defined.
///
/// `NaN` marks a missing observation and drops that row. Infinite values are
/// rejected. Fewer than two usable rows, or an `x` whose spread is negligible
/// relative to its magnitude (`VARIANCE_FLOOR`), leave the slope
/// undefined and fail.
pub fn ols_fit(y: &[f64], x: &[f64]) -> Result<OlsFit> {
    if y.len() != x.len() {
        return Err(CapmError::DataAlignment(format!(
            "regression inputs differ in length ({} vs {})",
            y.len(),
            x.len()
        )));
    }
    if y.iter().chain(x).any(|v| v.is_infinite()) {
        return Err(CapmError::DataValidity(
            "regression input contains an infinite return".to_string(),
        ));
    }

    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter(|(xi, yi)| !xi.is_nan() && !yi.is_nan())
        .map(|(xi, yi)| (*xi, *yi))
        .collect();

    let n = pairs.len();
    if n < 2 {
        return Err(CapmError::DegenerateRegression(format!(
            "{n} jointly defined observation(s), need at least 2"
        )));
    }

    let nf = n as f64;
    let x_mean = pairs.iter().map(|(xi, _)| xi).sum::<f64>() / nf;
    let y_mean = pairs.iter().map(|(_, yi)| yi).sum::<f64>() / nf;

    let mut ss_xy = 0.0;
    let mut ss_xx = 0.0;
    let mut ss_yy = 0.0;
    let mut x_sq = 0.0;
    for (xi, yi) in &pairs {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        ss_xy += dx * dy;
        ss_xx += dx * dx;
        ss_yy += dy * dy;
        x_sq += xi * xi;
    }

    if ss_xx <= VARIANCE_FLOOR * x_sq {
        return Err(CapmError::DegenerateRegression(
            "benchmark returns have zero variance".to_string(),
        ));
    }

    let slope = ss_xy / ss_xx;
    let intercept = y_mean - slope * x_mean;
    let r_squared = if ss_yy > 0.0 {
        (ss_xy * ss_xy) / (ss_xx * ss_yy)
    } else {
        0.0
    };

    Ok(OlsFit {
        slope,
        intercept,
        r_squared,
        observations: n,
    })
}

/// Estimate a stock's beta and alpha against the benchmark column.
pub fn estimate_beta(returns: &ReturnTable, stock: &str) -> Result<BetaEstimate> {
    let stock_returns = returns.stock(stock)?;
    let fit = ols_fit(&stock_returns.values, &returns.benchmark().values)
        .map_err(|e| e.context(stock))?;

    Ok(BetaEstimate {
        stock: stock.to_string(),
        beta: fit.slope,
        alpha: fit.intercept,
        r_squared: fit.r_squared,
        observations: fit.observations,
    })
}
