//! # Crossover Analytics Engine
//!
//! This crate scores a dual simple-moving-average crossover strategy over a
//! daily price series.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of external systems.
//!   It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** The `CrossoverAnalyzer` takes an owned `PriceSeries` and two
//!   window lengths and produces a `PerformanceReport`. Calls share nothing, so any number of
//!   them may run in parallel.
//!
//! ## Public API
//!
//! - `CrossoverAnalyzer`: The main struct that contains the calculation logic.
//! - `SignalFrame`: The per-day detail (moving averages, signals, returns) of one analysis.
//! - `PerformanceReport`: The summary handed back to callers.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod frame;
pub mod report;
mod rolling;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{validate_windows, CrossoverAnalyzer, PRICE_DECIMAL_PLACES};
pub use error::AnalyticsError;
pub use frame::{SignalFrame, SignalRow};
pub use report::PerformanceReport;
