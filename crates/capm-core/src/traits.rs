use crate::{PriceSeries, Result};

/// Supplier of already-fetched daily closing prices.
///
/// Implementations resolve a symbol (a stock ticker or the benchmark name)
/// to its full price history. Ordering of the returned points is not
/// significant; alignment sorts them.
pub trait PriceSource {
    fn closing_prices(&self, symbol: &str) -> Result<PriceSeries>;

    /// Load several series, failing on the first one that cannot be read.
    fn load_all(&self, symbols: &[String]) -> Result<Vec<PriceSeries>> {
        symbols.iter().map(|s| self.closing_prices(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CapmError;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    struct InMemorySource(HashMap<String, PriceSeries>);

    impl PriceSource for InMemorySource {
        fn closing_prices(&self, symbol: &str) -> Result<PriceSeries> {
            self.0
                .get(symbol)
                .cloned()
                .ok_or_else(|| CapmError::MissingStock(symbol.to_string()))
        }
    }

    fn source() -> InMemorySource {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let mut map = HashMap::new();
        for name in ["AAPL", "MSFT"] {
            map.insert(
                name.to_string(),
                PriceSeries::from_pairs(name, vec![(date, 100.0)]),
            );
        }
        InMemorySource(map)
    }

    #[test]
    fn test_load_all_keeps_order() {
        let loaded = source()
            .load_all(&["MSFT".to_string(), "AAPL".to_string()])
            .unwrap();
        let names: Vec<&str> = loaded.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["MSFT", "AAPL"]);
    }

    #[test]
    fn test_load_all_fails_on_missing() {
        let err = source()
            .load_all(&["AAPL".to_string(), "TSLA".to_string()])
            .unwrap_err();
        assert_eq!(err, CapmError::MissingStock("TSLA".to_string()));
    }
}
