use std::collections::HashSet;
use std::marker::PhantomData;
use std::ops::Range;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{CapmError, Result};

/// A single dated observation (closing price or index level)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Raw price history for one instrument, as delivered by a price source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub name: String,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(name: impl Into<String>, points: Vec<PricePoint>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    pub fn from_pairs<I>(name: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::new(
            name,
            pairs
                .into_iter()
                .map(|(date, value)| PricePoint { date, value })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// One named column of a date-indexed table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Marker for tables holding price levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prices;

/// Marker for tables holding fractional daily returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Returns;

/// Date-indexed table with one column per stock plus a benchmark column.
///
/// Dates are strictly increasing and every column has exactly one value per
/// date. Stock columns keep the order they were supplied in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(bound = "")]
pub struct DateTable<K> {
    dates: Vec<NaiveDate>,
    benchmark: Column,
    stocks: Vec<Column>,
    #[serde(skip)]
    kind: PhantomData<K>,
}

/// Aligned (or normalized) price table.
pub type PriceTable = DateTable<Prices>;

/// Daily return table.
///
/// When derived from a [`PriceTable`] the first price row is dropped: a
/// return table built from `n` price rows has `n - 1` rows, dated from the
/// second price date on. `NaN` entries mark missing observations.
pub type ReturnTable = DateTable<Returns>;

impl<K> DateTable<K> {
    pub fn new(dates: Vec<NaiveDate>, benchmark: Column, stocks: Vec<Column>) -> Result<Self> {
        if let Some(pair) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(CapmError::DataAlignment(format!(
                "dates must be strictly increasing ({} followed by {})",
                pair[0], pair[1]
            )));
        }

        let mut seen = HashSet::new();
        for column in std::iter::once(&benchmark).chain(stocks.iter()) {
            if column.len() != dates.len() {
                return Err(CapmError::DataAlignment(format!(
                    "column {} has {} values for {} dates",
                    column.name,
                    column.len(),
                    dates.len()
                )));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(CapmError::DataAlignment(format!(
                    "duplicate column {}",
                    column.name
                )));
            }
        }

        Ok(Self {
            dates,
            benchmark,
            stocks,
            kind: PhantomData,
        })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn benchmark(&self) -> &Column {
        &self.benchmark
    }

    pub fn stocks(&self) -> &[Column] {
        &self.stocks
    }

    pub fn stock_names(&self) -> impl Iterator<Item = &str> {
        self.stocks.iter().map(|c| c.name.as_str())
    }

    /// Look up a stock column by name.
    pub fn stock(&self, name: &str) -> Result<&Column> {
        self.stocks
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| CapmError::MissingStock(name.to_string()))
    }

    /// Stock columns followed by the benchmark column.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.stocks.iter().chain(std::iter::once(&self.benchmark))
    }

    /// Copy of the table restricted to the given row range (clamped).
    pub fn select_rows(&self, rows: Range<usize>) -> Self {
        let end = rows.end.min(self.len());
        let start = rows.start.min(end);
        let slice = |c: &Column| Column::new(c.name.clone(), c.values[start..end].to_vec());

        Self {
            dates: self.dates[start..end].to_vec(),
            benchmark: slice(&self.benchmark),
            stocks: self.stocks.iter().map(slice).collect(),
            kind: PhantomData,
        }
    }

    /// Copy of the table keeping only the named stock columns, in the given order.
    pub fn select_stocks<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        let stocks = names
            .iter()
            .map(|name| self.stock(name.as_ref()).cloned())
            .collect::<Result<Vec<_>>>()?;
        Self::new(self.dates.clone(), self.benchmark.clone(), stocks)
    }

    pub fn head(&self, n: usize) -> Self {
        self.select_rows(0..n)
    }

    pub fn tail(&self, n: usize) -> Self {
        self.select_rows(self.len().saturating_sub(n)..self.len())
    }
}
