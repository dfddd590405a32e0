use capm_core::{CapmReport, DateTable, StockOutcome};

const DATE_WIDTH: usize = 12;
const COLUMN_WIDTH: usize = 12;

/// Plain-text rendering of a date-indexed table, one row per date.
pub fn render_table<K>(title: &str, table: &DateTable<K>, decimals: usize) -> String {
    let mut out = format!("### {title}\n");

    let mut header = format!("{:<DATE_WIDTH$}", "Date");
    for column in table.columns() {
        header.push_str(&format!("{:>COLUMN_WIDTH$}", column.name));
    }
    out.push_str(&header);
    out.push('\n');

    for (row, date) in table.dates().iter().enumerate() {
        let mut line = format!("{:<DATE_WIDTH$}", date.to_string());
        for column in table.columns() {
            line.push_str(&format!("{:>COLUMN_WIDTH$.decimals$}", column.values[row]));
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Beta and CAPM expected-return tables, values rounded to two decimals.
pub fn render_report(report: &CapmReport) -> String {
    let mut out = format!(
        "Sample: {} daily returns, {} to {} | benchmark {} | market return {:.2}% | risk-free {:.2}%\n",
        report.window.observations,
        report.window.start,
        report.window.end,
        report.benchmark,
        report.market_return * 100.0,
        report.risk_free_rate * 100.0,
    );

    out.push_str("\n### Calculated Beta Value\n");
    out.push_str(&format!(
        "{:<8}{:>12}{:>14}{:>10}\n",
        "Stock", "Beta Value", "Alpha (ann.)", "R²"
    ));
    let alpha_scale = f64::from(report.trading_days_per_year) * 100.0;
    for stock in &report.stocks {
        out.push_str(&format!(
            "{:<8}{:>12.2}{:>13.2}%{:>10.2}\n",
            stock.stock,
            stock.beta,
            stock.alpha * alpha_scale,
            stock.r_squared
        ));
    }

    out.push_str("\n### Calculated Return using CAPM\n");
    out.push_str(&format!("{:<8}{:>14}\n", "Stock", "Return Value"));
    for stock in &report.stocks {
        out.push_str(&format!(
            "{:<8}{:>13.2}%\n",
            stock.stock,
            stock.expected_return * 100.0
        ));
    }
    out
}

/// One line per stock that could not be analyzed.
pub fn render_failures(outcomes: &[StockOutcome]) -> String {
    outcomes
        .iter()
        .filter_map(|o| match &o.result {
            Err(e) => Some(format!("skipped {}: {}\n", o.stock, e)),
            Ok(_) => None,
        })
        .collect()
}
