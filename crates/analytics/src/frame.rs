use chrono::{DateTime, Utc};
use core_types::Signal;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The state of the strategy on a single day of the series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalRow {
    pub timestamp: DateTime<Utc>,
    pub close: Decimal,
    /// `None` during the short window's warm-up.
    pub short_ma: Option<Decimal>,
    /// `None` during the long window's warm-up.
    pub long_ma: Option<Decimal>,
    pub signal: Signal,
    /// Close-to-close return. `None` on the first day and after a zero close.
    pub period_return: Option<Decimal>,
    /// Today's return weighted by yesterday's signal. `None` only on the first day.
    pub strategy_return: Option<Decimal>,
}

/// The full, chronologically ordered output of one crossover evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalFrame {
    pub short_window: usize,
    pub long_window: usize,
    pub rows: Vec<SignalRow>,
}

impl SignalFrame {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn signals(&self) -> impl Iterator<Item = Signal> + '_ {
        self.rows.iter().map(|row| row.signal)
    }

    pub fn count(&self, signal: Signal) -> usize {
        self.signals().filter(|s| *s == signal).count()
    }

    /// The unrounded sum of every defined strategy return.
    ///
    /// `None` if the sum does not fit in a `Decimal`.
    pub fn cumulative_return(&self) -> Option<Decimal> {
        self.rows
            .iter()
            .filter_map(|row| row.strategy_return)
            .try_fold(Decimal::ZERO, |total, r| total.checked_add(r))
    }
}
