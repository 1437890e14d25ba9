//! Fama-French three-factor OLS regression.
//!
//! Model: `R_p - RF = alpha + b_mkt (MKT - RF) + b_smb SMB + b_hml HML + e`,
//! estimated by least squares on the aligned daily data.

use nalgebra::{DMatrix, DVector};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use tracing::debug;

use folio_core::ValidationError;

use crate::factors::AlignedFactorData;

/// Below this sample size the coefficient statistics are not meaningful.
pub const MIN_OBSERVATIONS: usize = 30;

const COEFFICIENTS: usize = 4;
const RANK_EPSILON: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FactorLoadings {
    pub market_beta: f64,
    pub smb_beta: f64,
    pub hml_beta: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoefficientStats {
    pub t_stat: f64,
    pub p_value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegressionStatistics {
    pub r_squared: f64,
    pub adjusted_r_squared: f64,
    pub alpha: CoefficientStats,
    pub market: CoefficientStats,
    pub smb: CoefficientStats,
    pub hml: CoefficientStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorRegressionResults {
    pub alpha: f64,
    pub loadings: FactorLoadings,
    pub statistics: RegressionStatistics,
    pub observations: usize,
    pub assumptions: Vec<String>,
}

pub fn run_factor_regression(
    data: &AlignedFactorData,
) -> Result<FactorRegressionResults, ValidationError> {
    run_factor_regression_with_min(data, MIN_OBSERVATIONS)
}

/// Same as [`run_factor_regression`] with an explicit observation floor,
/// which tests use to exercise small samples.
pub fn run_factor_regression_with_min(
    data: &AlignedFactorData,
    min_observations: usize,
) -> Result<FactorRegressionResults, ValidationError> {
    let matrix = &data.matrix;
    let n = matrix.dates.len();
    if n < min_observations.max(COEFFICIENTS + 1) {
        return Err(ValidationError::TooFewObservations {
            got: n,
            min: min_observations.max(COEFFICIENTS + 1),
        });
    }

    let y = DVector::from_iterator(
        n,
        matrix
            .portfolio
            .iter()
            .zip(&matrix.risk_free)
            .map(|(portfolio, risk_free)| portfolio - risk_free),
    );
    let x = DMatrix::from_fn(n, COEFFICIENTS, |row, column| match column {
        0 => 1.0,
        1 => matrix.market_excess[row],
        2 => matrix.smb[row],
        3 => matrix.hml[row],
        _ => unreachable!("design matrix has four columns"),
    });

    let svd = x.clone().svd(true, true);
    let rank = svd.rank(RANK_EPSILON);
    if rank < COEFFICIENTS {
        return Err(ValidationError::RankDeficient {
            rank,
            expected: COEFFICIENTS,
        });
    }
    let beta = svd
        .solve(&y, RANK_EPSILON)
        .map_err(|_| ValidationError::RankDeficient {
            rank,
            expected: COEFFICIENTS,
        })?;

    let fitted = &x * &beta;
    let residuals = &y - &fitted;
    let ss_res = residuals.norm_squared();
    let mean_y = y.mean();
    let ss_tot = y.iter().map(|value| (value - mean_y).powi(2)).sum::<f64>();
    let r_squared = if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else {
        0.0
    };

    let df = n - COEFFICIENTS;
    let adjusted_r_squared = 1.0 - (1.0 - r_squared) * (n as f64 - 1.0) / df as f64;
    let mse = ss_res / df as f64;

    let xtx_inverse = (x.transpose() * &x)
        .try_inverse()
        .ok_or(ValidationError::RankDeficient {
            rank,
            expected: COEFFICIENTS,
        })?;

    let t_dist = StudentsT::new(0.0, 1.0, df as f64).map_err(|_| {
        ValidationError::TooFewObservations {
            got: n,
            min: COEFFICIENTS + 1,
        }
    })?;
    let stats_for = |index: usize| -> CoefficientStats {
        let standard_error = (xtx_inverse[(index, index)] * mse).sqrt();
        let t_stat = if standard_error > 0.0 {
            beta[index] / standard_error
        } else {
            f64::INFINITY * beta[index].signum()
        };
        let p_value = 2.0 * (1.0 - t_dist.cdf(t_stat.abs()));
        CoefficientStats { t_stat, p_value }
    };

    debug!(observations = n, r_squared, "factor regression complete");

    Ok(FactorRegressionResults {
        alpha: beta[0],
        loadings: FactorLoadings {
            market_beta: beta[1],
            smb_beta: beta[2],
            hml_beta: beta[3],
        },
        statistics: RegressionStatistics {
            r_squared,
            adjusted_r_squared,
            alpha: stats_for(0),
            market: stats_for(1),
            smb: stats_for(2),
            hml: stats_for(3),
        },
        observations: n,
        assumptions: vec![
            String::from("daily simple returns, factors in decimal form"),
            String::from("ordinary least squares with an intercept"),
            String::from("homoskedastic residuals assumed for t-statistics"),
            String::from("two-tailed p-values from the Student-t distribution"),
        ],
    })
}
