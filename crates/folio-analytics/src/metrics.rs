//! Performance metrics over a daily return series.
//!
//! Every metric fails fast with a named error when its preconditions do not
//! hold; none substitutes a default value.

use serde::Serialize;

use folio_core::ValidationError;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub cumulative_return: f64,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub observations: usize,
}

/// Total compounded return, `prod(1 + r) - 1`.
pub fn cumulative_return(returns: &[f64]) -> Result<f64, ValidationError> {
    if returns.is_empty() {
        return Err(ValidationError::EmptySeries);
    }
    Ok(returns.iter().fold(1.0, |wealth, r| wealth * (1.0 + r)) - 1.0)
}

/// Compound annual growth rate with the year count implied by the sample
/// length at 252 trading days per year.
pub fn annualized_return(returns: &[f64]) -> Result<f64, ValidationError> {
    let years = returns.len() as f64 / TRADING_DAYS_PER_YEAR;
    if years <= 0.0 {
        return Err(ValidationError::NonPositiveYears { years });
    }
    let cumulative = cumulative_return(returns)?;
    Ok((1.0 + cumulative).powf(1.0 / years) - 1.0)
}

/// Sample standard deviation (n-1 denominator) scaled by sqrt(252).
pub fn annualized_volatility(returns: &[f64]) -> Result<f64, ValidationError> {
    Ok(daily_volatility(returns)? * TRADING_DAYS_PER_YEAR.sqrt())
}

/// Largest peak-to-trough decline of the compounded wealth curve, as a
/// non-positive fraction.
pub fn max_drawdown(returns: &[f64]) -> Result<f64, ValidationError> {
    if returns.is_empty() {
        return Err(ValidationError::EmptySeries);
    }

    let mut wealth = 1.0_f64;
    let mut peak = 1.0_f64;
    let mut worst = 0.0_f64;
    for r in returns {
        wealth *= 1.0 + r;
        if wealth > peak {
            peak = wealth;
        }
        let drawdown = (wealth - peak) / peak;
        if drawdown < worst {
            worst = drawdown;
        }
    }
    Ok(worst)
}

/// Annualized excess return over annualized volatility.
///
/// `risk_free` is an annual rate supplied by the caller; constant returns
/// make the ratio undefined and yield `ZeroVolatility`.
pub fn sharpe_ratio(returns: &[f64], risk_free: f64) -> Result<f64, ValidationError> {
    let volatility = annualized_volatility(returns)?;
    if volatility == 0.0 {
        return Err(ValidationError::ZeroVolatility);
    }
    let mean_daily = returns.iter().sum::<f64>() / returns.len() as f64;
    let annualized = mean_daily * TRADING_DAYS_PER_YEAR;
    Ok((annualized - risk_free) / volatility)
}

/// Computes the full metric set in one pass of precondition checks.
pub fn compute_metrics(returns: &[f64], risk_free: f64) -> Result<PerformanceMetrics, ValidationError> {
    Ok(PerformanceMetrics {
        cumulative_return: cumulative_return(returns)?,
        annualized_return: annualized_return(returns)?,
        annualized_volatility: annualized_volatility(returns)?,
        sharpe_ratio: sharpe_ratio(returns, risk_free)?,
        max_drawdown: max_drawdown(returns)?,
        observations: returns.len(),
    })
}

pub(crate) fn daily_volatility(returns: &[f64]) -> Result<f64, ValidationError> {
    if returns.len() < 2 {
        return Err(ValidationError::TooFewObservations {
            got: returns.len(),
            min: 2,
        });
    }
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance = returns
        .iter()
        .map(|r| (r - mean).powi(2))
        .sum::<f64>()
        / (returns.len() - 1) as f64;
    Ok(variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cumulative_return_compounds() {
        let value = cumulative_return(&[0.01, -0.02, 0.03]).expect("cumulative");
        let expected = 1.01 * 0.98 * 1.03 - 1.0;
        assert!((value - expected).abs() < 1e-12);
    }

    #[test]
    fn empty_series_never_yields_a_default() {
        assert_eq!(
            cumulative_return(&[]).expect_err("empty"),
            ValidationError::EmptySeries
        );
        assert!(matches!(
            annualized_return(&[]).expect_err("empty"),
            ValidationError::NonPositiveYears { .. }
        ));
        assert_eq!(
            max_drawdown(&[]).expect_err("empty"),
            ValidationError::EmptySeries
        );
    }

    #[test]
    fn volatility_needs_two_observations() {
        let error = annualized_volatility(&[0.01]).expect_err("one obs");
        assert_eq!(error, ValidationError::TooFewObservations { got: 1, min: 2 });
    }

    #[test]
    fn constant_returns_have_no_sharpe_ratio() {
        let error = sharpe_ratio(&[0.01, 0.01, 0.01], 0.0).expect_err("constant");
        assert_eq!(error, ValidationError::ZeroVolatility);
    }

    #[test]
    fn drawdown_tracks_the_running_peak() {
        // Wealth path: 1.10, 0.88, 0.968 with peak 1.10.
        let value = max_drawdown(&[0.10, -0.20, 0.10]).expect("drawdown");
        assert!((value - (0.88 / 1.10 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn one_year_of_flat_growth_annualizes_to_itself() {
        let daily = (1.05_f64).powf(1.0 / 252.0) - 1.0;
        let returns = vec![daily; 252];
        let value = annualized_return(&returns).expect("cagr");
        assert!((value - 0.05).abs() < 1e-9);
    }
}
