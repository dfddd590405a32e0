use capm_core::{CapmError, Column, PriceTable, Result};

/// Rescale every column so its first row equals 1.0.
///
/// Presentation helper: lets instruments at very different price levels be
/// compared on one axis. An empty table normalizes to itself.
pub fn normalize(prices: &PriceTable) -> Result<PriceTable> {
    if prices.is_empty() {
        return Ok(prices.clone());
    }

    let benchmark = rebase(prices.benchmark())?;
    let stocks = prices
        .stocks()
        .iter()
        .map(rebase)
        .collect::<Result<Vec<_>>>()?;

    PriceTable::new(prices.dates().to_vec(), benchmark, stocks)
}

fn rebase(column: &Column) -> Result<Column> {
    let base = column.values[0];
    if !(base.is_finite() && base > 0.0) {
        return Err(CapmError::DataValidity(format!(
            "{} cannot be normalized: first value is {}",
            column.name, base
        )));
    }
    Ok(Column::new(
        column.name.clone(),
        column.values.iter().map(|v| v / base).collect(),
    ))
}
