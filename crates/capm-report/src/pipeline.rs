use anyhow::{bail, Context, Result};
use capm_analysis::{align, restrict_to_years, validate_series, CapmAnalyzer};
use capm_core::{CapmReport, PriceSeries, PriceSource, PriceTable, StockOutcome};

use crate::config::ReportConfig;
use crate::render;

/// Everything the report prints: the windowed prices, the CAPM figures for
/// the stocks that made it through and the stocks that were dropped.
#[derive(Debug)]
pub struct ReportRun {
    pub prices: PriceTable,
    pub report: CapmReport,
    pub skipped: Vec<StockOutcome>,
}

/// Load, align and analyze the configured stocks.
///
/// In fail-fast mode the first failing stock aborts the run. Otherwise a
/// stock that cannot be loaded, fails series checks or fails its own
/// analysis is logged and dropped; the run fails only when none are left.
/// Benchmark problems always abort.
pub fn build_report<P: PriceSource>(source: &P, config: &ReportConfig) -> Result<ReportRun> {
    let benchmark = source
        .closing_prices(&config.benchmark)
        .with_context(|| format!("loading benchmark {}", config.benchmark))?;
    validate_series(&benchmark).with_context(|| format!("checking benchmark {}", config.benchmark))?;

    let (stocks, mut skipped) = load_stocks(source, config)?;
    if stocks.is_empty() {
        bail!(
            "no usable price data for {:?}:\n{}",
            config.stocks,
            render::render_failures(&skipped)
        );
    }

    let prices = align(&stocks, &benchmark).context("aligning price series")?;
    let prices = restrict_to_years(&prices, config.years)?;
    tracing::info!(
        "Aligned {} trading days across {} series",
        prices.len(),
        stocks.len() + 1
    );

    let analyzer = CapmAnalyzer::with_params(config.analysis_params())?;
    let names: Vec<String> = stocks.iter().map(|s| s.name.clone()).collect();

    let (prices, names) = if config.fail_fast {
        (prices, names)
    } else {
        let (usable, failed): (Vec<StockOutcome>, Vec<StockOutcome>) = analyzer
            .analyze_each(&prices, &names)
            .into_iter()
            .partition(|o| o.is_ok());
        for outcome in &failed {
            if let Err(e) = &outcome.result {
                tracing::warn!("Skipping {}: {}", outcome.stock, e);
            }
        }
        skipped.extend(failed);

        let usable: Vec<String> = usable.into_iter().map(|o| o.stock).collect();
        if usable.is_empty() {
            bail!(
                "none of the selected stocks could be analyzed:\n{}",
                render::render_failures(&skipped)
            );
        }
        (prices.select_stocks(&usable)?, usable)
    };

    let report = analyzer.analyze(&prices, &names)?;
    Ok(ReportRun {
        prices,
        report,
        skipped,
    })
}

/// Load every configured stock. Outside fail-fast mode a stock whose file is
/// missing, unreadable or internally inconsistent is dropped with a warning
/// and returned among the skipped outcomes.
fn load_stocks<P: PriceSource>(
    source: &P,
    config: &ReportConfig,
) -> Result<(Vec<PriceSeries>, Vec<StockOutcome>)> {
    if config.fail_fast {
        let stocks = source
            .load_all(&config.stocks)
            .with_context(|| format!("loading prices from {}", config.data_dir.display()))?;
        return Ok((stocks, Vec::new()));
    }

    let mut loaded = Vec::with_capacity(config.stocks.len());
    let mut skipped = Vec::new();
    for stock in &config.stocks {
        let series = source
            .closing_prices(stock)
            .and_then(|series| validate_series(&series).map(|_| series));
        match series {
            Ok(series) => loaded.push(series),
            Err(e) => {
                tracing::warn!("Skipping {}: {}", stock, e);
                skipped.push(StockOutcome {
                    stock: stock.clone(),
                    result: Err(e),
                });
            }
        }
    }
    Ok((loaded, skipped))
}
