use capm_core::{CapmError, Column, PriceTable, Result, ReturnTable};
use chrono::NaiveDate;

/// Build the daily return table from an aligned price table.
///
/// `return[t] = price[t] / price[t-1] - 1` for every column. The first price
/// row has no predecessor and is dropped, so the result has one row fewer
/// and starts at the second price date. Every price must be finite and
/// strictly positive.
pub fn daily_returns(prices: &PriceTable) -> Result<ReturnTable> {
    if prices.len() < 2 {
        return Err(CapmError::DataAlignment(format!(
            "need at least 2 price rows to compute returns, got {}",
            prices.len()
        )));
    }

    let dates = prices.dates();
    let benchmark = column_returns(prices.benchmark(), dates)?;
    let stocks = prices
        .stocks()
        .iter()
        .map(|column| column_returns(column, dates))
        .collect::<Result<Vec<_>>>()?;

    ReturnTable::new(dates[1..].to_vec(), benchmark, stocks)
}

fn column_returns(column: &Column, dates: &[NaiveDate]) -> Result<Column> {
    if let Some((date, price)) = dates
        .iter()
        .zip(&column.values)
        .find(|(_, price)| !(price.is_finite() && **price > 0.0))
    {
        return Err(CapmError::DataValidity(format!(
            "{} has non-positive price {} on {}",
            column.name, price, date
        )));
    }

    let values = column
        .values
        .windows(2)
        .map(|w| w[1] / w[0] - 1.0)
        .collect();
    Ok(Column::new(column.name.clone(), values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        (0..n as u64)
            .map(|i| start + chrono::Days::new(i))
            .collect()
    }

    fn table(bench: Vec<f64>, stock: Vec<f64>) -> PriceTable {
        PriceTable::new(
            dates(bench.len()),
            Column::new("sp500", bench),
            vec![Column::new("AAPL", stock)],
        )
        .unwrap()
    }

    #[test]
    fn test_first_row_dropped() {
        let prices = table(vec![100.0, 101.0, 99.99], vec![50.0, 55.0, 44.0]);
        let returns = daily_returns(&prices).unwrap();

        assert_eq!(returns.len(), prices.len() - 1);
        assert_eq!(returns.dates(), &prices.dates()[1..]);
        assert_relative_eq!(returns.benchmark().values[0], 0.01, epsilon = 1e-12);
        assert_relative_eq!(returns.benchmark().values[1], -0.01, epsilon = 1e-12);
        assert_relative_eq!(returns.stock("AAPL").unwrap().values[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(returns.stock("AAPL").unwrap().values[1], -0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_prices_reconstruct_from_returns() {
        let original = vec![
            187.15, 185.64, 184.25, 181.91, 181.18, 185.56, 185.14, 186.19, 185.59, 185.92,
            183.63, 182.68, 188.63, 191.56, 193.89, 195.18, 194.5, 194.17, 192.42, 191.73,
        ];
        let bench = vec![1.0; original.len()];
        let returns = daily_returns(&table(bench, original.clone())).unwrap();

        let mut rebuilt = vec![original[0]];
        for r in &returns.stock("AAPL").unwrap().values {
            let prev = *rebuilt.last().unwrap();
            rebuilt.push(prev * (1.0 + r));
        }

        assert_eq!(rebuilt.len(), original.len());
        for (a, b) in rebuilt.iter().zip(&original) {
            assert_relative_eq!(a, b, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_zero_price_mid_series() {
        let prices = table(vec![1.0, 1.0, 1.0, 1.0], vec![10.0, 11.0, 0.0, 12.0]);
        let err = daily_returns(&prices).unwrap_err();

        match err {
            CapmError::DataValidity(msg) => {
                assert!(msg.contains("AAPL"));
                assert!(msg.contains("2024-03-03"));
            }
            other => panic!("expected DataValidity, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_benchmark_level() {
        let prices = table(vec![1.0, -1.0], vec![10.0, 11.0]);
        assert!(matches!(
            daily_returns(&prices),
            Err(CapmError::DataValidity(_))
        ));
    }

    #[test]
    fn test_single_row_rejected() {
        let prices = table(vec![1.0], vec![10.0]);
        assert!(matches!(
            daily_returns(&prices),
            Err(CapmError::DataAlignment(_))
        ));
    }
}
