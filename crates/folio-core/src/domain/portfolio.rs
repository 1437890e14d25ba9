use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use time::Date;

use super::validate_finite;
use crate::error::ValidationError;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// A single portfolio position: uppercase ticker plus a weight in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holding {
    ticker: String,
    weight: f64,
}

impl Holding {
    pub fn new(ticker: &str, weight: f64) -> Result<Self, ValidationError> {
        let ticker = ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(ValidationError::EmptyTicker);
        }
        validate_finite("weight", weight)?;
        if !(0.0..=1.0).contains(&weight) {
            return Err(ValidationError::WeightOutOfRange { ticker, weight });
        }

        Ok(Self { ticker, weight })
    }

    pub fn ticker(&self) -> &str {
        self.ticker.as_str()
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}

/// A validated portfolio definition over a date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Portfolio {
    holdings: Vec<Holding>,
    start: Date,
    end: Date,
    benchmark: Option<String>,
}

impl Portfolio {
    /// Requires at least one holding, weights summing to 1 within 1e-6, and
    /// `start <= end`.
    pub fn new(
        holdings: Vec<Holding>,
        start: Date,
        end: Date,
        benchmark: Option<String>,
    ) -> Result<Self, ValidationError> {
        if holdings.is_empty() {
            return Err(ValidationError::NoHoldings);
        }
        if start > end {
            return Err(ValidationError::InvalidDateRange);
        }

        let sum: f64 = holdings.iter().map(Holding::weight).sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ValidationError::WeightSumInvalid { sum });
        }

        let benchmark = benchmark
            .map(|ticker| ticker.trim().to_uppercase())
            .filter(|ticker| !ticker.is_empty());

        Ok(Self {
            holdings,
            start,
            end,
            benchmark,
        })
    }

    pub fn holdings(&self) -> &[Holding] {
        self.holdings.as_slice()
    }

    pub fn start(&self) -> Date {
        self.start
    }

    pub fn end(&self) -> Date {
        self.end
    }

    pub fn benchmark(&self) -> Option<&str> {
        self.benchmark.as_deref()
    }

    pub fn weight_for(&self, ticker: &str) -> Option<f64> {
        self.holdings
            .iter()
            .find(|holding| holding.ticker() == ticker)
            .map(Holding::weight)
    }
}

#[derive(Deserialize)]
struct HoldingSnapshot {
    ticker: String,
    weight: f64,
}

#[derive(Deserialize)]
struct PortfolioSnapshot {
    holdings: Vec<HoldingSnapshot>,
    start: Date,
    end: Date,
    #[serde(default)]
    benchmark: Option<String>,
}

impl<'de> Deserialize<'de> for Portfolio {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = PortfolioSnapshot::deserialize(deserializer)?;
        let holdings = raw
            .holdings
            .iter()
            .map(|holding| Holding::new(holding.ticker.as_str(), holding.weight))
            .collect::<Result<Vec<_>, _>>()
            .map_err(D::Error::custom)?;
        Self::new(holdings, raw.start, raw.end, raw.benchmark).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn normalizes_tickers_to_uppercase() {
        let holding = Holding::new(" aapl ", 0.5).expect("holding");
        assert_eq!(holding.ticker(), "AAPL");
    }

    #[test]
    fn rejects_weights_not_summing_to_one() {
        let holdings = vec![
            Holding::new("AAPL", 0.6).expect("aapl"),
            Holding::new("MSFT", 0.3).expect("msft"),
        ];
        let error = Portfolio::new(holdings, date!(2023 - 01 - 01), date!(2023 - 12 - 31), None)
            .expect_err("bad sum");
        assert!(matches!(error, ValidationError::WeightSumInvalid { .. }));
    }

    #[test]
    fn rejects_inverted_date_range() {
        let holdings = vec![Holding::new("AAPL", 1.0).expect("aapl")];
        let error = Portfolio::new(holdings, date!(2023 - 12 - 31), date!(2023 - 01 - 01), None)
            .expect_err("inverted range");
        assert_eq!(error, ValidationError::InvalidDateRange);
    }

    #[test]
    fn deserializes_through_validation() {
        let json = r#"{
            "holdings": [{"ticker": "aapl", "weight": 0.6}, {"ticker": "msft", "weight": 0.4}],
            "start": "2023-01-01",
            "end": "2023-12-31"
        }"#;
        let portfolio: Portfolio = serde_json::from_str(json).expect("portfolio");
        assert_eq!(portfolio.weight_for("AAPL"), Some(0.6));
        assert_eq!(portfolio.benchmark(), None);
    }
}
