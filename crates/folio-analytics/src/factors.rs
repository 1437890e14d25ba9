//! Alignment of portfolio returns with factor observations.

use std::collections::BTreeMap;

use serde::Serialize;
use time::Date;

use folio_core::{FactorSeries, ValidationError};

use crate::portfolio::PortfolioReturnSeries;

/// Column-parallel arrays restricted to the dates where both the portfolio
/// and the factor dataset have an observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedFactorMatrix {
    pub dates: Vec<Date>,
    pub portfolio: Vec<f64>,
    pub market_excess: Vec<f64>,
    pub smb: Vec<f64>,
    pub hml: Vec<f64>,
    pub risk_free: Vec<f64>,
}

/// How much data the intersection discarded on each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FactorAlignmentMeta {
    pub method: &'static str,
    pub start: Date,
    pub end: Date,
    pub common_days: usize,
    pub portfolio_days: usize,
    pub factor_days: usize,
    pub portfolio_days_dropped: usize,
    pub factor_days_dropped: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedFactorData {
    pub matrix: AlignedFactorMatrix,
    pub meta: FactorAlignmentMeta,
}

/// Intersects portfolio and factor dates. Days present on only one side are
/// dropped and counted in the metadata so callers can see how much history
/// the regression actually uses.
pub fn align_portfolio_with_factors(
    portfolio: &PortfolioReturnSeries,
    factors: &FactorSeries,
) -> Result<AlignedFactorData, ValidationError> {
    let portfolio_by_date: BTreeMap<Date, f64> = portfolio
        .dates()
        .iter()
        .copied()
        .zip(portfolio.values().iter().copied())
        .collect();

    let mut dates = Vec::new();
    let mut portfolio_values = Vec::new();
    let mut market_excess = Vec::new();
    let mut smb = Vec::new();
    let mut hml = Vec::new();
    let mut risk_free = Vec::new();

    for bar in factors.bars() {
        if let Some(value) = portfolio_by_date.get(&bar.date) {
            dates.push(bar.date);
            portfolio_values.push(*value);
            market_excess.push(bar.market_excess);
            smb.push(bar.smb);
            hml.push(bar.hml);
            risk_free.push(bar.risk_free);
        }
    }

    if dates.is_empty() {
        return Err(ValidationError::EmptyIntersection);
    }

    let meta = FactorAlignmentMeta {
        method: "intersection",
        start: dates[0],
        end: dates[dates.len() - 1],
        common_days: dates.len(),
        portfolio_days: portfolio.len(),
        factor_days: factors.bars().len(),
        portfolio_days_dropped: portfolio.len() - dates.len(),
        factor_days_dropped: factors.bars().len() - dates.len(),
    };

    Ok(AlignedFactorData {
        matrix: AlignedFactorMatrix {
            dates,
            portfolio: portfolio_values,
            market_excess,
            smb,
            hml,
            risk_free,
        },
        meta,
    })
}
