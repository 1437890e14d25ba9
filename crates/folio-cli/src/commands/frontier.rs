use serde_json::{json, Value};

use folio_analytics::{efficient_frontier, FrontierConfig};

use crate::cli::FrontierArgs;
use crate::error::CliError;

use super::aligned_returns;

pub fn run(args: &FrontierArgs) -> Result<Value, CliError> {
    let (_, aligned) = aligned_returns(&args.inputs)?;

    let frontier = efficient_frontier(
        &aligned,
        &FrontierConfig {
            points: args.points,
            risk_free: args.risk_free,
        },
    )?;

    Ok(json!({
        "observations": aligned.len(),
        "frontier": frontier,
    }))
}
