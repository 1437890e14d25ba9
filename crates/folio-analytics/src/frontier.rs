//! Long-only efficient frontier via quadratic programming.
//!
//! Inputs are aligned daily returns; means and the sample covariance are
//! annualized at 252 trading days with no shrinkage. Each frontier point
//! minimizes `w' Sigma w` subject to `sum(w) = 1`, `mu' w = target`, and
//! `w >= 0`. Targets that the solver cannot reach are dropped rather than
//! approximated.

use serde::Serialize;
use tracing::debug;

use folio_core::ValidationError;

use crate::metrics::TRADING_DAYS_PER_YEAR;
use crate::returns::AlignedReturns;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrontierConfig {
    /// Number of evenly spaced target returns between the minimum-variance
    /// return and the highest single-asset return.
    pub points: usize,
    /// Annual risk-free rate used for the per-point Sharpe ratio.
    pub risk_free: f64,
}

impl Default for FrontierConfig {
    fn default() -> Self {
        Self {
            points: 50,
            risk_free: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrontierPoint {
    pub weights: Vec<f64>,
    pub expected_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EfficientFrontier {
    pub tickers: Vec<String>,
    /// Converged points, ascending by volatility.
    pub points: Vec<FrontierPoint>,
    pub min_variance: FrontierPoint,
    pub target_low: f64,
    pub target_high: f64,
    pub solver: &'static str,
    pub trading_days_per_year: u32,
    pub assumptions: Vec<String>,
}

pub fn efficient_frontier(
    aligned: &AlignedReturns,
    config: &FrontierConfig,
) -> Result<EfficientFrontier, ValidationError> {
    let assets = aligned.ticker_count();
    if assets < 2 {
        return Err(ValidationError::TooFewAssets { got: assets });
    }
    if config.points < 2 {
        return Err(ValidationError::TooFewTargets { got: config.points });
    }
    if aligned.len() < 2 {
        return Err(ValidationError::TooFewObservations {
            got: aligned.len(),
            min: 2,
        });
    }

    let tickers: Vec<String> = aligned.tickers().map(str::to_owned).collect();
    let rows: Vec<&[f64]> = tickers
        .iter()
        .map(|ticker| {
            aligned
                .returns_for(ticker)
                .expect("ticker taken from the aligned set")
        })
        .collect();

    let means = annualized_means(&rows);
    let covariance = annualized_covariance(&rows);

    let min_weights = solve_qp(&covariance, &[(vec![1.0; assets], 1.0)])
        .ok_or(ValidationError::NoFrontierPoints)?;
    let min_variance = point_from_weights(min_weights, &means, &covariance, config.risk_free);

    let target_low = min_variance.expected_return;
    let target_high = means
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);

    let mut points = Vec::with_capacity(config.points);
    for index in 0..config.points {
        let fraction = index as f64 / (config.points - 1) as f64;
        let target = target_low + (target_high - target_low) * fraction;
        let constraints = [(vec![1.0; assets], 1.0), (means.clone(), target)];
        let Some(weights) = solve_qp(&covariance, &constraints) else {
            debug!(target, "frontier target did not converge, dropping");
            continue;
        };
        points.push(point_from_weights(
            weights,
            &means,
            &covariance,
            config.risk_free,
        ));
    }

    if points.is_empty() {
        return Err(ValidationError::NoFrontierPoints);
    }

    points.sort_by(|left, right| {
        left.volatility
            .partial_cmp(&right.volatility)
            .expect("finite volatilities")
    });

    Ok(EfficientFrontier {
        tickers,
        points,
        min_variance,
        target_low,
        target_high,
        solver: "clarabel",
        trading_days_per_year: TRADING_DAYS_PER_YEAR as u32,
        assumptions: vec![
            String::from("expected returns are annualized historical means (times 252)"),
            String::from("risk is the annualized sample covariance with no shrinkage"),
            String::from("long-only portfolios, fully invested, no transaction costs"),
            String::from("a description of the historical trade-off, not a recommendation"),
        ],
    })
}

fn annualized_means(rows: &[&[f64]]) -> Vec<f64> {
    rows.iter()
        .map(|row| row.iter().sum::<f64>() / row.len() as f64 * TRADING_DAYS_PER_YEAR)
        .collect()
}

fn annualized_covariance(rows: &[&[f64]]) -> Vec<Vec<f64>> {
    let assets = rows.len();
    let periods = rows[0].len();
    let means: Vec<f64> = rows
        .iter()
        .map(|row| row.iter().sum::<f64>() / periods as f64)
        .collect();

    let mut covariance = vec![vec![0.0; assets]; assets];
    for i in 0..assets {
        for j in i..assets {
            let value = (0..periods)
                .map(|t| (rows[i][t] - means[i]) * (rows[j][t] - means[j]))
                .sum::<f64>()
                / (periods - 1) as f64
                * TRADING_DAYS_PER_YEAR;
            covariance[i][j] = value;
            covariance[j][i] = value;
        }
    }
    covariance
}

/// Minimizes `w' Sigma w` subject to the given equality rows and `w >= 0`.
/// Returns `None` when the solver does not reach an optimal solution.
fn solve_qp(covariance: &[Vec<f64>], equalities: &[(Vec<f64>, f64)]) -> Option<Vec<f64>> {
    use clarabel::algebra::*;
    use clarabel::solver::*;

    let n = covariance.len();
    let m = equalities.len();

    let mut p_data = Vec::new();
    let mut p_indices = Vec::new();
    let mut p_indptr = vec![0];
    for j in 0..n {
        for (i, row) in covariance.iter().enumerate() {
            let value = row[j];
            if value.abs() > 1e-12 {
                p_data.push(value);
                p_indices.push(i);
            }
        }
        p_indptr.push(p_data.len());
    }
    let p = CscMatrix::new(n, n, p_indptr, p_indices, p_data);

    let q = vec![0.0; n];

    // Rows: m equality constraints, then -w <= 0 for long-only.
    let mut a_data = Vec::new();
    let mut a_indices = Vec::new();
    let mut a_indptr = vec![0];
    for j in 0..n {
        for (i, (coefficients, _)) in equalities.iter().enumerate() {
            a_data.push(coefficients[j]);
            a_indices.push(i);
        }
        a_data.push(-1.0);
        a_indices.push(m + j);
        a_indptr.push(a_data.len());
    }
    let a = CscMatrix::new(m + n, n, a_indptr, a_indices, a_data);

    let mut b: Vec<f64> = equalities.iter().map(|(_, rhs)| *rhs).collect();
    b.extend(vec![0.0; n]);

    let cones = [ZeroConeT(m), NonnegativeConeT(n)];

    let settings = DefaultSettingsBuilder::default()
        .max_iter(200)
        .verbose(false)
        .build()
        .ok()?;
    let mut solver = DefaultSolver::new(&p, &q, &a, &b, &cones, settings).ok()?;
    solver.solve();

    if !matches!(solver.solution.status, SolverStatus::Solved) {
        return None;
    }

    // Clamp solver jitter and renormalize to an exact unit sum.
    let mut weights: Vec<f64> = solver.solution.x.iter().map(|w| w.max(0.0)).collect();
    let sum: f64 = weights.iter().sum();
    if sum <= 0.0 {
        return None;
    }
    for weight in &mut weights {
        *weight /= sum;
    }
    Some(weights)
}

fn point_from_weights(
    weights: Vec<f64>,
    means: &[f64],
    covariance: &[Vec<f64>],
    risk_free: f64,
) -> FrontierPoint {
    let expected_return = weights
        .iter()
        .zip(means)
        .map(|(weight, mean)| weight * mean)
        .sum::<f64>();

    let mut variance = 0.0;
    for (i, wi) in weights.iter().enumerate() {
        for (j, wj) in weights.iter().enumerate() {
            variance += wi * wj * covariance[i][j];
        }
    }
    let volatility = variance.max(0.0).sqrt();

    let sharpe_ratio = if volatility > 0.0 {
        (expected_return - risk_free) / volatility
    } else {
        0.0
    };

    FrontierPoint {
        weights,
        expected_return,
        volatility,
        sharpe_ratio,
    }
}
