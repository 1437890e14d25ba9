use serde_json::{json, Value};

use folio_analytics::{simulate, summarize, SimulationConfig, SimulationMethod};

use crate::cli::SimulateArgs;
use crate::error::CliError;

use super::portfolio_returns;

pub fn run(args: &SimulateArgs) -> Result<Value, CliError> {
    let method: SimulationMethod = args.method.parse().map_err(CliError::Validation)?;

    let (_, returns) = portfolio_returns(&args.inputs)?;

    let simulation = simulate(
        returns.values(),
        &SimulationConfig {
            paths: args.paths,
            horizon_days: args.horizon,
            method,
            seed: args.seed,
        },
    )?;
    let summary = summarize(&simulation)?;

    Ok(json!({
        "meta": simulation.meta(),
        "summary": summary,
    }))
}
