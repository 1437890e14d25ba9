//! Canonical domain models with constructor validation.
//!
//! Instances are built through `new` constructors that enforce the type's
//! invariants; deserialization routes through the same constructors, so a
//! stored snapshot can never produce a value a fresh fetch could not.

mod factors;
mod portfolio;
mod prices;

pub use factors::{FactorBar, FactorSeries, FactorSeriesMeta};
pub use portfolio::{Holding, Portfolio};
pub use prices::{PriceBar, PriceSeries, PriceSeriesMeta};

use crate::error::ValidationError;

pub(crate) fn validate_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    Ok(())
}

pub(crate) fn validate_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    validate_finite(field, value)?;
    if value <= 0.0 {
        return Err(ValidationError::NonPositiveValue { field });
    }
    Ok(())
}
