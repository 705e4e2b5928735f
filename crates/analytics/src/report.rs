use crate::error::AnalyticsError;
use crate::frame::SignalFrame;
use core_types::Signal;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places `total_return` is reported with.
pub const RETURN_DECIMAL_PLACES: u32 = 4;

/// The summary of a crossover strategy's performance over one price series.
///
/// This struct is the final output of the `CrossoverAnalyzer` and is what the
/// HTTP and CLI layers hand back to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceReport {
    /// Sum of the lagged strategy returns, rounded half-to-even to 4 places.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_return: Decimal,
    pub buy_signal_count: usize,
    pub sell_signal_count: usize,
}

impl PerformanceReport {
    /// Creates a new, zeroed-out PerformanceReport.
    pub fn new() -> Self {
        Self {
            total_return: Decimal::ZERO,
            buy_signal_count: 0,
            sell_signal_count: 0,
        }
    }

    /// Summarizes an evaluated frame.
    pub fn from_frame(frame: &SignalFrame) -> Result<Self, AnalyticsError> {
        let total_return = frame
            .cumulative_return()
            .ok_or(AnalyticsError::NumericOverflow("total return"))?;

        Ok(Self {
            total_return: round_return(total_return),
            buy_signal_count: frame.count(Signal::Buy),
            sell_signal_count: frame.count(Signal::Sell),
        })
    }
}

impl Default for PerformanceReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Rounds a return to `RETURN_DECIMAL_PLACES` using banker's rounding.
pub fn round_return(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(RETURN_DECIMAL_PLACES, RoundingStrategy::MidpointNearestEven)
}
