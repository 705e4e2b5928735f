use crate::error::CoreError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single closing price observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: Decimal,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, close: Decimal) -> Self {
        Self { timestamp, close }
    }
}

/// An owned sequence of `PricePoint`s handed to a single analysis call.
///
/// The series makes no ordering promise on construction. Consumers that need
/// chronological order call [`PriceSeries::into_sorted`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceSeries(Vec<PricePoint>);

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Self {
        Self(points)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.0
    }

    /// Sorts the series by timestamp, ascending.
    ///
    /// The sort is stable: points sharing a timestamp keep their input order.
    pub fn into_sorted(mut self) -> Self {
        self.0.sort_by_key(|p| p.timestamp);
        self
    }

    pub fn into_inner(self) -> Vec<PricePoint> {
        self.0
    }
}

impl From<Vec<PricePoint>> for PriceSeries {
    fn from(points: Vec<PricePoint>) -> Self {
        Self::new(points)
    }
}

impl FromIterator<PricePoint> for PriceSeries {
    fn from_iter<I: IntoIterator<Item = PricePoint>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One daily OHLCV bar as it is stored and imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawStockRecord")]
pub struct StockRecord {
    pub date: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: i64,
}

// Unchecked mirror used so that deserialized records go through `StockRecord::new`.
#[derive(Deserialize)]
struct RawStockRecord {
    date: DateTime<Utc>,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
    volume: i64,
}

impl TryFrom<RawStockRecord> for StockRecord {
    type Error = CoreError;

    fn try_from(raw: RawStockRecord) -> Result<Self, Self::Error> {
        StockRecord::new(raw.date, raw.open, raw.high, raw.low, raw.close, raw.volume)
    }
}

impl StockRecord {
    /// Builds a bar, rejecting values that cannot describe a real trading day.
    pub fn new(
        date: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: i64,
    ) -> Result<Self, CoreError> {
        for (field, value) in [("open", open), ("high", high), ("low", low), ("close", close)] {
            if value < Decimal::ZERO {
                return Err(CoreError::InvalidInput(
                    field.to_string(),
                    format!("price must not be negative, got {}", value),
                ));
            }
        }

        if low > high {
            return Err(CoreError::InvalidInput(
                "low".to_string(),
                format!("low {} is above high {}", low, high),
            ));
        }

        for (field, value) in [("open", open), ("close", close)] {
            if value < low || value > high {
                return Err(CoreError::InvalidInput(
                    field.to_string(),
                    format!("{} is outside the [{}, {}] range", value, low, high),
                ));
            }
        }

        if volume < 0 {
            return Err(CoreError::InvalidInput(
                "volume".to_string(),
                format!("volume must not be negative, got {}", volume),
            ));
        }

        Ok(Self { date, open, high, low, close, volume })
    }
}
