use std::fs;
use std::path::PathBuf;

use capm_core::{CapmError, PriceSeries, PriceSource, Result};
use chrono::NaiveDate;

/// Column names tried, in order, for the closing price
const CLOSE_COLUMNS: &[&str] = &["close", "adj close", "adj_close", "value"];

/// Reads `<dir>/<SYMBOL>.csv` files exported from a market-data provider.
///
/// Each file needs a header with a date column (`Date`, `DATE` or
/// `observation_date`) and a closing-price column (`Close`, `Adj Close`, a
/// column named after the symbol, or the only other column). Blank values
/// and the `.` placeholder used by FRED mark non-trading days and are skipped.
pub struct CsvPriceSource {
    dir: PathBuf,
}

impl CsvPriceSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }
}

impl PriceSource for CsvPriceSource {
    fn closing_prices(&self, symbol: &str) -> Result<PriceSeries> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(CapmError::MissingStock(format!(
                "{} (no file at {})",
                symbol,
                path.display()
            )));
        }
        let raw = fs::read_to_string(&path)
            .map_err(|e| CapmError::DataSource(format!("{}: {}", path.display(), e)))?;

        let series = parse_price_csv(symbol, &raw)?;
        tracing::debug!("Loaded {} prices for {} from {}", series.len(), symbol, path.display());
        Ok(series)
    }
}

/// Parse a date/close CSV into a price series named `symbol`.
pub fn parse_price_csv(symbol: &str, csv_data: &str) -> Result<PriceSeries> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| CapmError::DataSource(format!("{symbol}: {e}")))?
        .iter()
        .map(|h| h.to_ascii_lowercase())
        .collect();

    let date_idx = headers
        .iter()
        .position(|h| h == "date" || h == "observation_date")
        .ok_or_else(|| CapmError::DataSource(format!("{symbol}: no date column")))?;
    let value_idx = close_column(&headers, symbol, date_idx)
        .ok_or_else(|| CapmError::DataSource(format!("{symbol}: no closing price column")))?;

    let mut points = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| CapmError::DataSource(format!("{symbol}: {e}")))?;
        let raw_date = record.get(date_idx).unwrap_or("");
        let raw_value = record.get(value_idx).unwrap_or("");
        if raw_date.is_empty() {
            continue;
        }
        if raw_value.is_empty() || raw_value == "." {
            continue;
        }

        let date = parse_date(raw_date).ok_or_else(|| {
            CapmError::DataValidity(format!(
                "{symbol}: bad date '{raw_date}' on row {}",
                line + 2
            ))
        })?;
        let value = raw_value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| {
                CapmError::DataValidity(format!(
                    "{symbol}: bad price '{raw_value}' on {date}"
                ))
            })?;
        points.push((date, value));
    }

    Ok(PriceSeries::from_pairs(symbol, points))
}

fn close_column(headers: &[String], symbol: &str, date_idx: usize) -> Option<usize> {
    let symbol = symbol.to_ascii_lowercase();
    CLOSE_COLUMNS
        .iter()
        .find_map(|name| headers.iter().position(|h| h == name))
        .or_else(|| headers.iter().position(|h| *h == symbol))
        .or_else(|| match headers.len() {
            2 => Some(1 - date_idx),
            _ => None,
        })
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time part.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}
