//! Core contracts for folio.
//!
//! This crate contains:
//! - Canonical domain models and validation
//! - The data-layer error taxonomy
//! - Provider trait contracts
//! - The replay/fetch/fallback acquisition state machine
//! - Request-scoped memoization and upstream rate limiting

pub mod acquire;
pub mod domain;
pub mod error;
pub mod provider;
pub mod throttle;

pub use acquire::{
    acquire, acquire_factor_series, acquire_price_series, acquire_submissions, factor_series_key,
    price_series_key, submissions_key, Acquired, Origin, RequestCache,
};
pub use domain::{
    FactorBar, FactorSeries, FactorSeriesMeta, Holding, Portfolio, PriceBar, PriceSeries,
    PriceSeriesMeta,
};
pub use error::{DataError, ValidationError};
pub use folio_store::{ReplayStore, StoreError, StoreKey};
pub use provider::{FactorProvider, FilingProvider, PriceProvider};
pub use throttle::RateGate;
