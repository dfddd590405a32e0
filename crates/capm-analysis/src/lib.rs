//! Statistical core of the CAPM calculation: price alignment, daily
//! returns, normalization, OLS beta/alpha estimation and CAPM expected
//! returns.

pub mod alignment;
pub mod analyzer;
pub mod expected_return;
pub mod normalize;
pub mod regression;
pub mod returns;

pub use alignment::{align, restrict_to_years, validate_series};
pub use analyzer::CapmAnalyzer;
pub use expected_return::{capm_expected_return, expected_returns, market_return};
pub use normalize::normalize;
pub use regression::{estimate_beta, ols_fit, OlsFit};
pub use returns::daily_returns;
