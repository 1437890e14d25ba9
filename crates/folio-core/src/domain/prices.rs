use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use time::Date;

use super::validate_positive;
use crate::error::ValidationError;

/// A single daily price observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: Date,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adjusted_close: Option<f64>,
    pub volume: u64,
}

impl PriceBar {
    pub fn new(
        date: Date,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        adjusted_close: Option<f64>,
        volume: u64,
    ) -> Result<Self, ValidationError> {
        validate_positive("open", open)?;
        validate_positive("high", high)?;
        validate_positive("low", low)?;
        validate_positive("close", close)?;
        if let Some(adjusted) = adjusted_close {
            validate_positive("adjusted_close", adjusted)?;
        }

        Ok(Self {
            date,
            open,
            high,
            low,
            close,
            adjusted_close,
            volume,
        })
    }

    /// The price used for return construction: adjusted close when present.
    pub fn effective_close(&self) -> f64 {
        self.adjusted_close.unwrap_or(self.close)
    }
}

/// Provenance and shape metadata carried alongside a price series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSeriesMeta {
    pub source: String,
    pub ticker: String,
    pub currency: String,
    pub is_adjusted: bool,
    pub frequency: String,
}

impl PriceSeriesMeta {
    pub fn daily(source: &str, ticker: &str, currency: &str, is_adjusted: bool) -> Self {
        Self {
            source: source.to_owned(),
            ticker: ticker.to_owned(),
            currency: currency.to_owned(),
            is_adjusted,
            frequency: String::from("daily"),
        }
    }
}

/// An immutable, strictly date-ascending daily price series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
    meta: PriceSeriesMeta,
}

impl PriceSeries {
    /// Validates ordering and adjustment consistency.
    ///
    /// Bars must be strictly ascending by date. Either every bar carries an
    /// adjusted close or none does; a mix means the upstream payload was
    /// assembled from incompatible snapshots and is rejected outright.
    pub fn new(bars: Vec<PriceBar>, meta: PriceSeriesMeta) -> Result<Self, ValidationError> {
        if bars.is_empty() {
            return Err(ValidationError::EmptySeries);
        }

        for pair in bars.windows(2) {
            if pair[0].date >= pair[1].date {
                return Err(ValidationError::UnsortedBars {
                    ticker: meta.ticker.clone(),
                });
            }
        }

        let adjusted_count = bars
            .iter()
            .filter(|bar| bar.adjusted_close.is_some())
            .count();
        if adjusted_count != 0 && adjusted_count != bars.len() {
            return Err(ValidationError::MixedAdjustment {
                ticker: meta.ticker.clone(),
            });
        }

        Ok(Self { bars, meta })
    }

    pub fn bars(&self) -> &[PriceBar] {
        self.bars.as_slice()
    }

    pub fn meta(&self) -> &PriceSeriesMeta {
        &self.meta
    }

    /// Whether return construction will use adjusted closes.
    pub fn uses_adjusted(&self) -> bool {
        self.bars
            .first()
            .is_some_and(|bar| bar.adjusted_close.is_some())
    }
}

#[derive(Deserialize)]
struct PriceSeriesSnapshot {
    bars: Vec<PriceBar>,
    meta: PriceSeriesMeta,
}

impl<'de> Deserialize<'de> for PriceSeries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = PriceSeriesSnapshot::deserialize(deserializer)?;
        Self::new(raw.bars, raw.meta).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn bar(date: Date, close: f64, adjusted: Option<f64>) -> PriceBar {
        PriceBar::new(date, close, close, close, close, adjusted, 1_000).expect("valid bar")
    }

    fn meta() -> PriceSeriesMeta {
        PriceSeriesMeta::daily("test", "AAPL", "USD", true)
    }

    #[test]
    fn rejects_non_positive_prices() {
        let error = PriceBar::new(date!(2023 - 01 - 03), 0.0, 1.0, 1.0, 1.0, None, 0)
            .expect_err("zero open");
        assert_eq!(error, ValidationError::NonPositiveValue { field: "open" });
    }

    #[test]
    fn rejects_unsorted_bars() {
        let bars = vec![
            bar(date!(2023 - 01 - 04), 101.0, Some(100.5)),
            bar(date!(2023 - 01 - 03), 100.0, Some(99.5)),
        ];
        let error = PriceSeries::new(bars, meta()).expect_err("unsorted");
        assert!(matches!(error, ValidationError::UnsortedBars { .. }));
    }

    #[test]
    fn rejects_mixed_adjustment() {
        let bars = vec![
            bar(date!(2023 - 01 - 03), 100.0, Some(99.5)),
            bar(date!(2023 - 01 - 04), 101.0, None),
        ];
        let error = PriceSeries::new(bars, meta()).expect_err("mixed");
        assert!(matches!(error, ValidationError::MixedAdjustment { .. }));
    }

    #[test]
    fn deserialization_revalidates() {
        let json = r#"{
            "bars": [
                {"date": "2023-01-04", "open": 1.0, "high": 1.0, "low": 1.0,
                 "close": 1.0, "adjusted_close": null, "volume": 1},
                {"date": "2023-01-03", "open": 1.0, "high": 1.0, "low": 1.0,
                 "close": 1.0, "adjusted_close": null, "volume": 1}
            ],
            "meta": {"source": "test", "ticker": "AAPL", "currency": "USD",
                     "is_adjusted": false, "frequency": "daily"}
        }"#;
        let result: Result<PriceSeries, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
