use thiserror::Error;

use folio_store::StoreError;

/// Validation and precondition errors.
///
/// Every failed precondition has a named variant with the offending values
/// embedded; callers never receive a substituted default in place of one.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("ticker cannot be empty")]
    EmptyTicker,
    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be strictly positive")]
    NonPositiveValue { field: &'static str },
    #[error("start date must not be after end date")]
    InvalidDateRange,

    #[error("series for '{ticker}' must be ordered oldest to newest without duplicate dates")]
    UnsortedBars { ticker: String },
    #[error("series for '{ticker}' mixes adjusted and unadjusted prices")]
    MixedAdjustment { ticker: String },
    #[error("series cannot be empty")]
    EmptySeries,
    #[error("price series needs at least 2 bars to compute returns, got {got}")]
    TooFewBars { got: usize },

    #[error("portfolio must contain at least one holding")]
    NoHoldings,
    #[error("holding weight for '{ticker}' must be between 0 and 1, got {weight}")]
    WeightOutOfRange { ticker: String, weight: f64 },
    #[error("portfolio weights must sum to 1.0, got {sum}")]
    WeightSumInvalid { sum: f64 },
    #[error("no portfolio weight for ticker '{ticker}' present in the aligned returns")]
    MissingWeight { ticker: String },

    #[error("no common dates across the input series")]
    EmptyIntersection,
    #[error("aligned arrays must share one length, expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("CAGR requires a positive year count, got {years}")]
    NonPositiveYears { years: f64 },
    #[error("requires at least {min} observations, got {got}")]
    TooFewObservations { got: usize, min: usize },
    #[error("sharpe ratio is undefined for constant returns (zero volatility)")]
    ZeroVolatility,

    #[error("a random seed is required for deterministic simulation")]
    MissingSeed,
    #[error("number of simulation paths must be greater than zero")]
    ZeroPaths,
    #[error("simulation horizon must be greater than zero")]
    ZeroHorizon,
    #[error("invalid simulation method '{value}', expected one of bootstrap, normal")]
    InvalidMethod { value: String },

    #[error("regression design matrix is rank-deficient (rank {rank}, expected {expected})")]
    RankDeficient { rank: usize, expected: usize },

    #[error("efficient frontier requires at least 2 assets, got {got}")]
    TooFewAssets { got: usize },
    #[error("efficient frontier requires at least 2 target points, got {got}")]
    TooFewTargets { got: usize },
    #[error("no frontier point converged")]
    NoFrontierPoints,
}

/// Data-layer error taxonomy.
///
/// Providers and the acquisition pipeline classify every failure into one of
/// four kinds. Messages are deterministic functions of the inputs so that a
/// failed request fails identically on replay.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DataError {
    #[error("{what} not found ({context})")]
    NotFound { what: String, context: String },

    #[error("bad input: {reason} ({context})")]
    BadInput { reason: String, context: String },

    #[error("source '{name}' is unavailable: {reason}")]
    Unavailable { name: String, reason: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl DataError {
    pub fn not_found(what: impl Into<String>, context: impl Into<String>) -> Self {
        Self::NotFound {
            what: what.into(),
            context: context.into(),
        }
    }

    pub fn bad_input(reason: impl Into<String>, context: impl Into<String>) -> Self {
        Self::BadInput {
            reason: reason.into(),
            context: context.into(),
        }
    }

    pub fn unavailable(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl From<StoreError> for DataError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { key } => Self::NotFound {
                what: String::from("stored data"),
                context: key,
            },
            StoreError::Corrupt { key, reason } => Self::BadInput {
                reason: format!("stored data is corrupt: {reason}"),
                context: key,
            },
            StoreError::EmptyPayload { key } => Self::BadInput {
                reason: String::from("cannot store empty data"),
                context: key,
            },
            StoreError::WriteFailed { key, source } => Self::Unavailable {
                name: String::from("replay store"),
                reason: format!("write failed for key '{key}': {source}"),
            },
            StoreError::Io(source) => Self::Unavailable {
                name: String::from("replay store"),
                reason: source.to_string(),
            },
        }
    }
}
