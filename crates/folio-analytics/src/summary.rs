//! Distribution statistics over a simulated path matrix.

use serde::Serialize;

use folio_core::ValidationError;

use crate::monte_carlo::MonteCarloSimulation;

pub const DISCLAIMER: &str = "Simulation results are hypothetical projections \
derived from historical data under simplifying statistical assumptions. They \
are not predictions of future performance and must not be read as investment \
advice.";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Percentiles {
    pub p5: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DrawdownDistribution {
    pub percentiles: Percentiles,
    pub worst: f64,
}

/// The full best and worst paths by terminal cumulative return, first
/// occurrence winning ties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathExtremes {
    pub best_terminal: f64,
    pub worst_terminal: f64,
    pub best_path: Vec<f64>,
    pub worst_path: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonteCarloSummary {
    pub terminal_percentiles: Percentiles,
    pub drawdowns: DrawdownDistribution,
    pub probability_of_loss: f64,
    pub extremes: PathExtremes,
    pub paths: usize,
    pub horizon_days: usize,
    pub disclaimer: &'static str,
}

pub fn summarize(simulation: &MonteCarloSimulation) -> Result<MonteCarloSummary, ValidationError> {
    let cumulative = simulation.cumulative();
    if cumulative.is_empty() {
        return Err(ValidationError::ZeroPaths);
    }

    let terminals: Vec<f64> = cumulative
        .iter()
        .map(|path| path.last().copied().unwrap_or(0.0))
        .collect();

    let mut best_index = 0;
    let mut worst_index = 0;
    for (index, terminal) in terminals.iter().enumerate() {
        if *terminal > terminals[best_index] {
            best_index = index;
        }
        if *terminal < terminals[worst_index] {
            worst_index = index;
        }
    }

    let drawdowns: Vec<f64> = cumulative.iter().map(|path| path_drawdown(path)).collect();
    let worst_drawdown = drawdowns
        .iter()
        .copied()
        .fold(0.0_f64, |worst, value| worst.min(value));

    let losses = terminals.iter().filter(|terminal| **terminal < 0.0).count();

    Ok(MonteCarloSummary {
        terminal_percentiles: percentile_set(&terminals),
        drawdowns: DrawdownDistribution {
            percentiles: percentile_set(&drawdowns),
            worst: worst_drawdown,
        },
        probability_of_loss: losses as f64 / terminals.len() as f64,
        extremes: PathExtremes {
            best_terminal: terminals[best_index],
            worst_terminal: terminals[worst_index],
            best_path: cumulative[best_index].clone(),
            worst_path: cumulative[worst_index].clone(),
        },
        paths: cumulative.len(),
        horizon_days: simulation.meta().horizon_days,
        disclaimer: DISCLAIMER,
    })
}

/// Most negative gap between a cumulative path and its running maximum.
/// Paths that only rise have a drawdown of zero.
fn path_drawdown(cumulative: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for value in cumulative {
        if *value > peak {
            peak = *value;
        }
        worst = worst.min(value - peak);
    }
    worst
}

fn percentile_set(values: &[f64]) -> Percentiles {
    let mut sorted = values.to_vec();
    sorted.sort_by(|left, right| left.partial_cmp(right).expect("finite values"));
    Percentiles {
        p5: percentile(&sorted, 5.0),
        p25: percentile(&sorted, 25.0),
        p50: percentile(&sorted, 50.0),
        p75: percentile(&sorted, 75.0),
        p95: percentile(&sorted, 95.0),
    }
}

/// Linear interpolation between order statistics at rank `p/100 * (n - 1)`,
/// over an already sorted, non-empty slice.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let fraction = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}
