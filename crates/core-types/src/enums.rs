use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The position a crossover strategy wants to hold for the next period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Sell,
    #[default]
    Hold,
}

impl Signal {
    /// Returns the signed exposure of the signal: +1 long, -1 short, 0 flat.
    pub fn direction(&self) -> i8 {
        match self {
            Signal::Buy => 1,
            Signal::Sell => -1,
            Signal::Hold => 0,
        }
    }

    /// The exposure as a `Decimal`, ready to be multiplied into a return.
    pub fn weight(&self) -> Decimal {
        Decimal::from(self.direction())
    }
}
