//! Weighted aggregation of aligned returns into one portfolio series.

use serde::Serialize;
use time::Date;

use folio_core::{Portfolio, ValidationError};

use crate::returns::AlignedReturns;

/// The portfolio's daily return series, with an optional benchmark aligned
/// to the same dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioReturnSeries {
    dates: Vec<Date>,
    values: Vec<f64>,
    benchmark: Option<Vec<f64>>,
}

impl PortfolioReturnSeries {
    pub fn new(
        dates: Vec<Date>,
        values: Vec<f64>,
        benchmark: Option<Vec<f64>>,
    ) -> Result<Self, ValidationError> {
        if dates.is_empty() {
            return Err(ValidationError::EmptySeries);
        }
        if values.len() != dates.len() {
            return Err(ValidationError::LengthMismatch {
                expected: dates.len(),
                got: values.len(),
            });
        }
        if let Some(benchmark) = &benchmark {
            if benchmark.len() != dates.len() {
                return Err(ValidationError::LengthMismatch {
                    expected: dates.len(),
                    got: benchmark.len(),
                });
            }
        }

        Ok(Self {
            dates,
            values,
            benchmark,
        })
    }

    pub fn dates(&self) -> &[Date] {
        self.dates.as_slice()
    }

    pub fn values(&self) -> &[f64] {
        self.values.as_slice()
    }

    pub fn benchmark(&self) -> Option<&[f64]> {
        self.benchmark.as_deref()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Weighted sum of per-ticker returns, date by date.
///
/// Every ticker in the aligned set must carry a portfolio weight; a missing
/// weight is an error, never treated as zero. Tickers are folded in
/// lexicographic order so the floating-point sum is reproducible.
pub fn aggregate_weighted(
    aligned: &AlignedReturns,
    portfolio: &Portfolio,
    benchmark: Option<Vec<f64>>,
) -> Result<PortfolioReturnSeries, ValidationError> {
    for ticker in aligned.tickers() {
        if portfolio.weight_for(ticker).is_none() {
            return Err(ValidationError::MissingWeight {
                ticker: ticker.to_owned(),
            });
        }
    }

    let mut values = vec![0.0_f64; aligned.len()];
    for (ticker, returns) in aligned.iter() {
        let weight = portfolio
            .weight_for(ticker)
            .ok_or_else(|| ValidationError::MissingWeight {
                ticker: ticker.to_owned(),
            })?;
        for (accumulated, value) in values.iter_mut().zip(returns) {
            *accumulated += weight * value;
        }
    }

    PortfolioReturnSeries::new(aligned.dates().to_vec(), values, benchmark)
}
