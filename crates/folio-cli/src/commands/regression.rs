use std::fs;

use serde_json::{json, Value};

use folio_analytics::{align_portfolio_with_factors, run_factor_regression};
use folio_core::FactorSeries;

use crate::cli::RegressionArgs;
use crate::error::CliError;

use super::portfolio_returns;

pub fn run(args: &RegressionArgs) -> Result<Value, CliError> {
    let (_, returns) = portfolio_returns(&args.inputs)?;

    let bytes = fs::read(args.factors.as_path())?;
    let factors: FactorSeries = serde_json::from_slice(&bytes)?;

    let aligned = align_portfolio_with_factors(&returns, &factors)?;
    let results = run_factor_regression(&aligned)?;

    Ok(json!({
        "alignment": aligned.meta,
        "regression": results,
    }))
}
