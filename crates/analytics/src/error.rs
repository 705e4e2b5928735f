use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("No price data available to analyze")]
    EmptySeries,

    #[error("Invalid window sizes: short={short_window}, long={long_window}. Both must be positive")]
    InvalidWindow {
        short_window: usize,
        long_window: usize,
    },

    #[error("Prices are too large to compute the {0} exactly")]
    NumericOverflow(&'static str),
}
