use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use time::Date;

use super::validate_finite;
use crate::error::ValidationError;

/// One day of Fama-French three-factor observations, in decimal form
/// (0.01 means one percent).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorBar {
    pub date: Date,
    pub market_excess: f64,
    pub smb: f64,
    pub hml: f64,
    pub risk_free: f64,
}

impl FactorBar {
    pub fn new(
        date: Date,
        market_excess: f64,
        smb: f64,
        hml: f64,
        risk_free: f64,
    ) -> Result<Self, ValidationError> {
        validate_finite("market_excess", market_excess)?;
        validate_finite("smb", smb)?;
        validate_finite("hml", hml)?;
        validate_finite("risk_free", risk_free)?;

        Ok(Self {
            date,
            market_excess,
            smb,
            hml,
            risk_free,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorSeriesMeta {
    pub source: String,
    pub dataset: String,
    pub frequency: String,
}

impl FactorSeriesMeta {
    pub fn daily(source: &str, dataset: &str) -> Self {
        Self {
            source: source.to_owned(),
            dataset: dataset.to_owned(),
            frequency: String::from("daily"),
        }
    }
}

/// Strictly date-ascending factor series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorSeries {
    bars: Vec<FactorBar>,
    meta: FactorSeriesMeta,
}

impl FactorSeries {
    pub fn new(bars: Vec<FactorBar>, meta: FactorSeriesMeta) -> Result<Self, ValidationError> {
        if bars.is_empty() {
            return Err(ValidationError::EmptySeries);
        }

        for pair in bars.windows(2) {
            if pair[0].date >= pair[1].date {
                return Err(ValidationError::UnsortedBars {
                    ticker: meta.dataset.clone(),
                });
            }
        }

        Ok(Self { bars, meta })
    }

    pub fn bars(&self) -> &[FactorBar] {
        self.bars.as_slice()
    }

    pub fn meta(&self) -> &FactorSeriesMeta {
        &self.meta
    }
}

#[derive(Deserialize)]
struct FactorSeriesSnapshot {
    bars: Vec<FactorBar>,
    meta: FactorSeriesMeta,
}

impl<'de> Deserialize<'de> for FactorSeries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = FactorSeriesSnapshot::deserialize(deserializer)?;
        Self::new(raw.bars, raw.meta).map_err(D::Error::custom)
    }
}
