//! Provider contracts for upstream market data.
//!
//! Implementations must honor the never-partial rule: a fetch either returns
//! a complete, validated value for the requested range or classifies its
//! failure as a [`DataError`]. Returning a truncated series instead of an
//! error would poison the replay store for every future run of that request.

use serde_json::Value;
use time::Date;

use crate::domain::{FactorSeries, PriceSeries};
use crate::error::DataError;

/// Daily OHLCV history for one ticker over an inclusive date range.
pub trait PriceProvider {
    /// Stable lowercase identifier used as the store key prefix.
    fn source(&self) -> &str;

    fn fetch_price_series(
        &self,
        ticker: &str,
        start: Date,
        end: Date,
    ) -> Result<PriceSeries, DataError>;
}

/// Daily Fama-French three-factor data over an inclusive date range.
pub trait FactorProvider {
    fn source(&self) -> &str;

    /// Dataset identifier, part of the store key.
    fn dataset(&self) -> &str;

    fn fetch_factor_series(&self, start: Date, end: Date) -> Result<FactorSeries, DataError>;
}

/// Regulatory filing metadata, keyed by registrant identifier.
pub trait FilingProvider {
    fn source(&self) -> &str;

    /// The raw submissions document for one registrant. Kept as JSON since
    /// the upstream schema is open-ended.
    fn fetch_submissions(&self, registrant_id: &str) -> Result<Value, DataError>;
}
