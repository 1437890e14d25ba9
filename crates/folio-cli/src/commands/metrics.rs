use serde_json::{json, Value};

use folio_analytics::compute_metrics;

use crate::cli::MetricsArgs;
use crate::error::CliError;

use super::portfolio_returns;

pub fn run(args: &MetricsArgs) -> Result<Value, CliError> {
    let (portfolio, returns) = portfolio_returns(&args.inputs)?;
    let metrics = compute_metrics(returns.values(), args.risk_free)?;

    Ok(json!({
        "holdings": portfolio.holdings().len(),
        "start": returns.dates().first(),
        "end": returns.dates().last(),
        "risk_free": args.risk_free,
        "metrics": metrics,
    }))
}
