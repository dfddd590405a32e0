use std::collections::{BTreeMap, BTreeSet};

use capm_core::{CapmError, Column, PriceSeries, PriceTable, Result};
use chrono::{Months, NaiveDate};

/// Inner-join stock and benchmark price series on date.
///
/// The resulting table holds only dates present in every series, sorted
/// ascending. At least two common dates are required, since anything less
/// yields no daily return.
pub fn align(stocks: &[PriceSeries], benchmark: &PriceSeries) -> Result<PriceTable> {
    let benchmark_index = index_by_date(benchmark)?;
    let stock_indexes = stocks
        .iter()
        .map(index_by_date)
        .collect::<Result<Vec<_>>>()?;

    let mut common: BTreeSet<NaiveDate> = benchmark_index.keys().copied().collect();
    for index in &stock_indexes {
        common.retain(|date| index.contains_key(date));
    }

    match common.len() {
        0 => {
            return Err(CapmError::DataAlignment(format!(
                "no dates common to all {} series",
                stocks.len() + 1
            )))
        }
        1 => {
            return Err(CapmError::DataAlignment(
                "only one date common to all series, need at least 2".to_string(),
            ))
        }
        _ => {}
    }

    let dates: Vec<NaiveDate> = common.into_iter().collect();
    let benchmark_column = build_column(&benchmark.name, &benchmark_index, &dates)?;
    let stock_columns = stocks
        .iter()
        .zip(&stock_indexes)
        .map(|(series, index)| build_column(&series.name, index, &dates))
        .collect::<Result<Vec<_>>>()?;

    PriceTable::new(dates, benchmark_column, stock_columns)
}

/// Keep only rows dated within `years` calendar years of the table's last date.
pub fn restrict_to_years(prices: &PriceTable, years: u32) -> Result<PriceTable> {
    if years == 0 {
        return Err(CapmError::InvalidConfig(
            "history window must be at least one year".to_string(),
        ));
    }
    let last = prices
        .last_date()
        .ok_or_else(|| CapmError::DataAlignment("price table is empty".to_string()))?;
    let cutoff = last
        .checked_sub_months(Months::new(years.saturating_mul(12)))
        .unwrap_or(NaiveDate::MIN);

    let start = prices.dates().partition_point(|date| *date < cutoff);
    let window = prices.select_rows(start..prices.len());
    if window.len() < 2 {
        return Err(CapmError::DataAlignment(format!(
            "only {} row(s) within {} year(s) of {}",
            window.len(),
            years,
            last
        )));
    }

    tracing::debug!(
        "History window {} year(s): {} of {} rows from {}",
        years,
        window.len(),
        prices.len(),
        cutoff
    );
    Ok(window)
}

/// Check one series on its own: unique dates and finite prices throughout.
///
/// `align` only inspects the dates it keeps, so callers that want to drop a
/// faulty series instead of failing the whole join run this first.
pub fn validate_series(series: &PriceSeries) -> Result<()> {
    index_by_date(series)?;
    match series.points.iter().find(|p| !p.value.is_finite()) {
        Some(point) => Err(CapmError::DataValidity(format!(
            "{} has non-finite price {} on {}",
            series.name, point.value, point.date
        ))),
        None => Ok(()),
    }
}

fn index_by_date(series: &PriceSeries) -> Result<BTreeMap<NaiveDate, f64>> {
    let mut index = BTreeMap::new();
    for point in &series.points {
        if index.insert(point.date, point.value).is_some() {
            return Err(CapmError::DataAlignment(format!(
                "{} has more than one observation on {}",
                series.name, point.date
            )));
        }
    }
    Ok(index)
}

fn build_column(
    name: &str,
    index: &BTreeMap<NaiveDate, f64>,
    dates: &[NaiveDate],
) -> Result<Column> {
    let mut values = Vec::with_capacity(dates.len());
    for date in dates {
        let value = index[date];
        if !value.is_finite() {
            return Err(CapmError::DataValidity(format!(
                "{name} has non-finite price {value} on {date}"
            )));
        }
        values.push(value);
    }
    Ok(Column::new(name, values))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn series(name: &str, points: &[(NaiveDate, f64)]) -> PriceSeries {
        PriceSeries::from_pairs(name, points.iter().copied())
    }

    #[test]
    fn test_align_intersects_and_sorts() {
        // Provider output is not necessarily sorted
        let bench = series(
            "sp500",
            &[
                (d(2024, 1, 5), 4700.0),
                (d(2024, 1, 2), 4740.0),
                (d(2024, 1, 3), 4705.0),
                (d(2024, 1, 4), 4690.0),
            ],
        );
        let aapl = series(
            "AAPL",
            &[
                (d(2024, 1, 4), 181.9),
                (d(2024, 1, 2), 185.6),
                (d(2024, 1, 3), 184.2),
                (d(2024, 1, 8), 185.5),
            ],
        );
        let msft = series(
            "MSFT",
            &[
                (d(2024, 1, 2), 370.9),
                (d(2024, 1, 4), 367.9),
                (d(2024, 1, 5), 367.7),
            ],
        );

        let table = align(&[aapl, msft], &bench).unwrap();

        assert_eq!(table.dates(), &[d(2024, 1, 2), d(2024, 1, 4)]);
        assert_eq!(table.benchmark().values, vec![4740.0, 4690.0]);
        assert_eq!(table.stock("AAPL").unwrap().values, vec![185.6, 181.9]);
        assert_eq!(table.stock("MSFT").unwrap().values, vec![370.9, 367.9]);
        assert_eq!(table.stock_names().collect::<Vec<_>>(), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn test_align_disjoint_dates() {
        let bench = series("sp500", &[(d(2024, 1, 2), 1.0), (d(2024, 1, 3), 1.0)]);
        let stock = series("AAPL", &[(d(2024, 2, 1), 1.0), (d(2024, 2, 2), 1.0)]);

        let err = align(&[stock], &bench).unwrap_err();
        assert!(matches!(err, CapmError::DataAlignment(_)));
    }

    #[test]
    fn test_align_single_common_date() {
        let bench = series("sp500", &[(d(2024, 1, 2), 1.0), (d(2024, 1, 3), 1.0)]);
        let stock = series("AAPL", &[(d(2024, 1, 3), 1.0), (d(2024, 1, 4), 1.0)]);

        assert!(matches!(
            align(&[stock], &bench),
            Err(CapmError::DataAlignment(_))
        ));
    }

    #[test]
    fn test_align_duplicate_date() {
        let bench = series(
            "sp500",
            &[(d(2024, 1, 2), 1.0), (d(2024, 1, 2), 1.1), (d(2024, 1, 3), 1.0)],
        );
        assert!(matches!(align(&[], &bench), Err(CapmError::DataAlignment(_))));
    }

    #[test]
    fn test_align_duplicate_stock_names() {
        let bench = series("sp500", &[(d(2024, 1, 2), 1.0), (d(2024, 1, 3), 1.0)]);
        let a = series("AAPL", &[(d(2024, 1, 2), 1.0), (d(2024, 1, 3), 1.0)]);

        assert!(matches!(
            align(&[a.clone(), a], &bench),
            Err(CapmError::DataAlignment(_))
        ));
    }

    #[test]
    fn test_align_rejects_nan_price() {
        let bench = series("sp500", &[(d(2024, 1, 2), 1.0), (d(2024, 1, 3), 1.0)]);
        let stock = series("AAPL", &[(d(2024, 1, 2), f64::NAN), (d(2024, 1, 3), 1.0)]);

        assert!(matches!(
            align(&[stock], &bench),
            Err(CapmError::DataValidity(_))
        ));
    }

    #[test]
    fn test_nan_outside_common_dates_is_ignored() {
        let bench = series("sp500", &[(d(2024, 1, 2), 1.0), (d(2024, 1, 3), 1.0)]);
        let stock = series(
            "AAPL",
            &[(d(2024, 1, 1), f64::NAN), (d(2024, 1, 2), 2.0), (d(2024, 1, 3), 2.1)],
        );

        let table = align(&[stock], &bench).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_validate_series() {
        let good = series("AAPL", &[(d(2024, 1, 2), 185.6), (d(2024, 1, 3), 184.2)]);
        assert!(validate_series(&good).is_ok());

        // Outside any window, but still a fault in the series itself
        let nan = series("NFLX", &[(d(2019, 1, 2), f64::NAN), (d(2024, 1, 3), 480.0)]);
        assert!(matches!(
            validate_series(&nan),
            Err(CapmError::DataValidity(_))
        ));

        let dup = series("TSLA", &[(d(2024, 1, 2), 248.4), (d(2024, 1, 2), 248.5)]);
        assert!(matches!(
            validate_series(&dup),
            Err(CapmError::DataAlignment(_))
        ));
    }

    fn yearly_table() -> PriceTable {
        let bench = series(
            "sp500",
            &[
                (d(2021, 6, 1), 1.0),
                (d(2022, 6, 1), 1.1),
                (d(2023, 5, 31), 1.2),
                (d(2023, 6, 1), 1.3),
                (d(2024, 6, 1), 1.4),
            ],
        );
        align(&[], &bench).unwrap()
    }

    #[test]
    fn test_restrict_to_years() {
        let table = yearly_table();

        let one = restrict_to_years(&table, 1).unwrap();
        assert_eq!(one.dates(), &[d(2023, 6, 1), d(2024, 6, 1)]);

        let two = restrict_to_years(&table, 2).unwrap();
        assert_eq!(two.first_date(), Some(d(2022, 6, 1)));
        assert_eq!(two.len(), 4);

        let all = restrict_to_years(&table, 10).unwrap();
        assert_eq!(all.len(), table.len());
    }

    #[test]
    fn test_restrict_to_years_errors() {
        let table = yearly_table();
        assert!(matches!(
            restrict_to_years(&table, 0),
            Err(CapmError::InvalidConfig(_))
        ));

        let sparse = align(
            &[],
            &series("sp500", &[(d(2020, 1, 2), 1.0), (d(2024, 1, 2), 1.0)]),
        )
        .unwrap();
        assert!(matches!(
            restrict_to_years(&sparse, 1),
            Err(CapmError::DataAlignment(_))
        ));
    }
}
