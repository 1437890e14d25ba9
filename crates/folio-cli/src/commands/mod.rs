mod frontier;
mod metrics;
mod regression;
mod simulate;
mod store;

use std::fs;
use std::path::Path;

use serde_json::{json, Value};
use uuid::Uuid;

use folio_analytics::{
    aggregate_weighted, align_by_intersection, price_series_to_returns, AlignedReturns,
    PortfolioReturnSeries,
};
use folio_core::{Portfolio, PriceSeries};

use crate::cli::{Cli, Command, PortfolioInputs};
use crate::error::CliError;

pub fn run(cli: &Cli, request_id: Uuid) -> Result<Value, CliError> {
    let (command, data) = match &cli.command {
        Command::Metrics(args) => ("metrics", metrics::run(args)?),
        Command::Regression(args) => ("regression", regression::run(args)?),
        Command::Simulate(args) => ("simulate", simulate::run(args)?),
        Command::Frontier(args) => ("frontier", frontier::run(args)?),
        Command::Store(args) => ("store", store::run(args)?),
    };

    Ok(json!({
        "request_id": request_id.to_string(),
        "command": command,
        "data": data,
    }))
}

fn load_portfolio(path: &Path) -> Result<Portfolio, CliError> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn load_price_series(path: &Path) -> Result<PriceSeries, CliError> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Loads the inputs and aligns every holding's returns on common dates.
fn aligned_returns(inputs: &PortfolioInputs) -> Result<(Portfolio, AlignedReturns), CliError> {
    let portfolio = load_portfolio(inputs.portfolio.as_path())?;

    let mut series = Vec::with_capacity(inputs.prices.len());
    for path in &inputs.prices {
        let prices = load_price_series(path.as_path())?;
        series.push(price_series_to_returns(&prices)?);
    }

    let aligned = align_by_intersection(&series)?;
    Ok((portfolio, aligned))
}

fn portfolio_returns(
    inputs: &PortfolioInputs,
) -> Result<(Portfolio, PortfolioReturnSeries), CliError> {
    let (portfolio, aligned) = aligned_returns(inputs)?;
    let returns = aggregate_weighted(&aligned, &portfolio, None)?;
    Ok((portfolio, returns))
}
