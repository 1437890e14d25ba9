//! Simple-return construction and date alignment.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use time::Date;

use folio_core::{PriceSeries, ValidationError};

/// One daily simple return.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReturnBar {
    pub date: Date,
    pub value: f64,
}

/// Daily simple returns for one ticker, date-ascending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnSeries {
    ticker: String,
    bars: Vec<ReturnBar>,
    uses_adjusted: bool,
}

impl ReturnSeries {
    pub fn new(
        ticker: &str,
        bars: Vec<ReturnBar>,
        uses_adjusted: bool,
    ) -> Result<Self, ValidationError> {
        if bars.is_empty() {
            return Err(ValidationError::EmptySeries);
        }
        Ok(Self {
            ticker: ticker.to_uppercase(),
            bars,
            uses_adjusted,
        })
    }

    pub fn ticker(&self) -> &str {
        self.ticker.as_str()
    }

    pub fn bars(&self) -> &[ReturnBar] {
        self.bars.as_slice()
    }

    pub fn uses_adjusted(&self) -> bool {
        self.uses_adjusted
    }
}

/// Converts prices to simple returns, `p[t] / p[t-1] - 1`, dated by the later
/// bar. Adjusted closes are preferred when the series carries them.
pub fn price_series_to_returns(series: &PriceSeries) -> Result<ReturnSeries, ValidationError> {
    let bars = series.bars();
    if bars.len() < 2 {
        return Err(ValidationError::TooFewBars { got: bars.len() });
    }

    let returns = bars
        .windows(2)
        .map(|pair| ReturnBar {
            date: pair[1].date,
            value: pair[1].effective_close() / pair[0].effective_close() - 1.0,
        })
        .collect();

    ReturnSeries::new(series.meta().ticker.as_str(), returns, series.uses_adjusted())
}

/// Return series for several tickers restricted to their common dates,
/// ascending. Tickers iterate in lexicographic order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedReturns {
    dates: Vec<Date>,
    by_ticker: BTreeMap<String, Vec<f64>>,
}

impl AlignedReturns {
    pub fn dates(&self) -> &[Date] {
        self.dates.as_slice()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.by_ticker.keys().map(String::as_str)
    }

    pub fn ticker_count(&self) -> usize {
        self.by_ticker.len()
    }

    pub fn returns_for(&self, ticker: &str) -> Option<&[f64]> {
        self.by_ticker.get(ticker).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.by_ticker
            .iter()
            .map(|(ticker, values)| (ticker.as_str(), values.as_slice()))
    }
}

/// Aligns series by strict date intersection. Dates missing from any series
/// are dropped from all of them; nothing is filled or interpolated.
pub fn align_by_intersection(series: &[ReturnSeries]) -> Result<AlignedReturns, ValidationError> {
    if series.is_empty() {
        return Err(ValidationError::EmptySeries);
    }

    let mut common: BTreeSet<Date> = series[0].bars().iter().map(|bar| bar.date).collect();
    for one in &series[1..] {
        let dates: BTreeSet<Date> = one.bars().iter().map(|bar| bar.date).collect();
        common.retain(|date| dates.contains(date));
    }

    if common.is_empty() {
        return Err(ValidationError::EmptyIntersection);
    }

    let dates: Vec<Date> = common.into_iter().collect();
    let mut by_ticker = BTreeMap::new();
    for one in series {
        let lookup: BTreeMap<Date, f64> = one
            .bars()
            .iter()
            .map(|bar| (bar.date, bar.value))
            .collect();
        let values = dates
            .iter()
            .map(|date| lookup[date])
            .collect::<Vec<f64>>();
        by_ticker.insert(one.ticker().to_owned(), values);
    }

    Ok(AlignedReturns { dates, by_ticker })
}
