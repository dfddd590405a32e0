use std::collections::HashSet;
use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use capm_core::AnalysisParams;

/// Stocks offered by default when none are configured
pub const DEFAULT_STOCKS: &[&str] = &["TSLA", "AAPL", "AMZN", "GOOGL"];

/// Longest history window the report accepts, in years
pub const MAX_YEARS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" | "text" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            other => bail!("unknown output format '{}' (expected table or json)", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub data_dir: PathBuf,             // directory of <SYMBOL>.csv files
    pub stocks: Vec<String>,
    pub benchmark: String,             // sp500
    pub years: u32,                    // history window, 1..=10
    pub risk_free_rate: f64,           // annual, fractional
    pub trading_days_per_year: u32,    // 252
    pub output: OutputFormat,
    pub fail_fast: bool,               // abort on the first failing stock
}

impl ReportConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key/value lookup, applying defaults.
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            data_dir: get("CAPM_DATA_DIR")
                .unwrap_or_else(|| "data".to_string())
                .into(),
            stocks: parse_symbols(
                &get("CAPM_STOCKS").unwrap_or_else(|| DEFAULT_STOCKS.join(",")),
            ),
            benchmark: get("CAPM_BENCHMARK").unwrap_or_else(|| "sp500".to_string()),
            years: get("CAPM_YEARS")
                .unwrap_or_else(|| "1".to_string())
                .trim()
                .parse()
                .context("CAPM_YEARS must be a positive integer")?,
            risk_free_rate: get("CAPM_RISK_FREE_RATE")
                .unwrap_or_else(|| "0.0".to_string())
                .trim()
                .parse()
                .context("CAPM_RISK_FREE_RATE must be a number")?,
            trading_days_per_year: get("CAPM_TRADING_DAYS")
                .unwrap_or_else(|| "252".to_string())
                .trim()
                .parse()
                .context("CAPM_TRADING_DAYS must be a positive integer")?,
            output: get("CAPM_OUTPUT")
                .unwrap_or_else(|| "table".to_string())
                .parse()?,
            fail_fast: get("CAPM_FAIL_FAST")
                .unwrap_or_else(|| "false".to_string())
                .trim()
                .parse()
                .context("CAPM_FAIL_FAST must be true or false")?,
        };

        Ok(config)
    }

    /// Apply command-line overrides on top of the environment.
    pub fn apply_args(&mut self, args: &[String]) -> Result<()> {
        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--stocks" => {
                    let symbols: Vec<String> = args[i + 1..]
                        .iter()
                        .take_while(|a| !a.starts_with("--"))
                        .flat_map(|a| parse_symbols(a))
                        .collect();
                    let consumed = args[i + 1..]
                        .iter()
                        .take_while(|a| !a.starts_with("--"))
                        .count();
                    if symbols.is_empty() {
                        bail!("--stocks needs at least one symbol");
                    }
                    self.stocks = symbols;
                    i += consumed;
                }
                "--years" => {
                    self.years = flag_value(args, i)?
                        .parse()
                        .context("--years must be a positive integer")?;
                    i += 1;
                }
                "--data-dir" => {
                    self.data_dir = flag_value(args, i)?.into();
                    i += 1;
                }
                "--benchmark" => {
                    self.benchmark = flag_value(args, i)?.to_string();
                    i += 1;
                }
                "--risk-free-rate" => {
                    self.risk_free_rate = flag_value(args, i)?
                        .parse()
                        .context("--risk-free-rate must be a number")?;
                    i += 1;
                }
                "--json" => self.output = OutputFormat::Json,
                "--fail-fast" => self.fail_fast = true,
                other => bail!("unknown argument '{}'", other),
            }
            i += 1;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.stocks.is_empty() {
            bail!("at least one stock must be selected");
        }
        let mut seen = HashSet::new();
        for stock in &self.stocks {
            if !seen.insert(stock.as_str()) {
                bail!("stock {} selected more than once", stock);
            }
            if stock.eq_ignore_ascii_case(&self.benchmark) {
                bail!("stock {} is also the benchmark", stock);
            }
        }
        if self.benchmark.trim().is_empty() {
            bail!("benchmark name must not be empty");
        }
        if self.years == 0 || self.years > MAX_YEARS {
            bail!("years must be between 1 and {}, got {}", MAX_YEARS, self.years);
        }
        self.analysis_params().validate()?;
        Ok(())
    }

    pub fn analysis_params(&self) -> AnalysisParams {
        AnalysisParams {
            risk_free_rate: self.risk_free_rate,
            trading_days_per_year: self.trading_days_per_year,
        }
    }
}

fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn flag_value(args: &[String], i: usize) -> Result<&str> {
    args.get(i + 1)
        .map(|s| s.as_str())
        .with_context(|| format!("{} needs a value", args[i]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let config = ReportConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.stocks, vec!["TSLA", "AAPL", "AMZN", "GOOGL"]);
        assert_eq!(config.benchmark, "sp500");
        assert_eq!(config.years, 1);
        assert_eq!(config.risk_free_rate, 0.0);
        assert_eq!(config.trading_days_per_year, 252);
        assert_eq!(config.output, OutputFormat::Table);
        assert!(!config.fail_fast);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_values() {
        let config = ReportConfig::from_lookup(lookup(&[
            ("CAPM_STOCKS", " nflx, msft ,,mgm"),
            ("CAPM_YEARS", "5"),
            ("CAPM_RISK_FREE_RATE", "0.045"),
            ("CAPM_OUTPUT", "JSON"),
            ("CAPM_FAIL_FAST", "true"),
            ("CAPM_DATA_DIR", "/tmp/prices"),
        ]))
        .unwrap();

        assert_eq!(config.stocks, vec!["NFLX", "MSFT", "MGM"]);
        assert_eq!(config.years, 5);
        assert_eq!(config.risk_free_rate, 0.045);
        assert_eq!(config.output, OutputFormat::Json);
        assert!(config.fail_fast);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/prices"));
    }

    #[test]
    fn test_bad_env_value() {
        assert!(ReportConfig::from_lookup(lookup(&[("CAPM_YEARS", "three")])).is_err());
        assert!(ReportConfig::from_lookup(lookup(&[("CAPM_OUTPUT", "chart")])).is_err());
    }

    #[test]
    fn test_args_override_env() {
        let mut config = ReportConfig::from_lookup(lookup(&[])).unwrap();
        config
            .apply_args(&args(&[
                "--stocks", "aapl", "nvda", "--years", "3", "--json", "--data-dir", "prices",
            ]))
            .unwrap();

        assert_eq!(config.stocks, vec!["AAPL", "NVDA"]);
        assert_eq!(config.years, 3);
        assert_eq!(config.output, OutputFormat::Json);
        assert_eq!(config.data_dir, PathBuf::from("prices"));
    }

    #[test]
    fn test_bad_args() {
        let mut config = ReportConfig::from_lookup(lookup(&[])).unwrap();
        assert!(config.apply_args(&args(&["--years"])).is_err());
        assert!(config.apply_args(&args(&["--stocks", "--json"])).is_err());
        assert!(config.apply_args(&args(&["--plot"])).is_err());
    }

    #[test]
    fn test_validation() {
        let base = ReportConfig::from_lookup(lookup(&[])).unwrap();

        let mut config = base.clone();
        config.years = 11;
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.stocks = vec!["AAPL".to_string(), "AAPL".to_string()];
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.stocks = vec!["SP500".to_string()];
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.trading_days_per_year = 0;
        assert!(config.validate().is_err());

        let mut config = base;
        config.stocks.clear();
        assert!(config.validate().is_err());
    }
}
