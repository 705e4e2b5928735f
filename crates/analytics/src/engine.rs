use crate::error::AnalyticsError;
use crate::frame::{SignalFrame, SignalRow};
use crate::report::PerformanceReport;
use crate::rolling::{exact_mul, rolling_sums};
use core_types::{PriceSeries, Signal};
use rust_decimal::{Decimal, RoundingStrategy};
use std::cmp::Ordering;

/// Decimal places a close is carried with during analysis. Finer digits are
/// rounded half-to-even before any averaging.
pub const PRICE_DECIMAL_PLACES: u32 = 12;

/// A stateless calculator for the dual simple-moving-average crossover strategy.
#[derive(Debug, Default, Clone, Copy)]
pub struct CrossoverAnalyzer {}

impl CrossoverAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main entry point for scoring the strategy.
    ///
    /// # Arguments
    ///
    /// * `series` - The closing prices to analyze. They need not be sorted.
    /// * `short_window` - Length of the fast moving average.
    /// * `long_window` - Length of the slow moving average.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `PerformanceReport` or an `AnalyticsError`.
    pub fn analyze(
        &self,
        series: PriceSeries,
        short_window: usize,
        long_window: usize,
    ) -> Result<PerformanceReport, AnalyticsError> {
        let frame = self.evaluate(series, short_window, long_window)?;
        let report = PerformanceReport::from_frame(&frame)?;

        tracing::debug!(
            total_return = %report.total_return,
            buy_signals = report.buy_signal_count,
            sell_signals = report.sell_signal_count,
            "Crossover analysis complete"
        );

        Ok(report)
    }

    /// Computes the per-day moving averages, signals and returns.
    ///
    /// A day's signal is BUY when the short average is above the long one,
    /// SELL when below, and HOLD when they are equal or either is still warming
    /// up. The strategy return of day `i` is the close-to-close return of day
    /// `i` weighted by the signal of day `i - 1`.
    ///
    /// Closes are rounded to `PRICE_DECIMAL_PLACES` first; the rows carry the
    /// rounded values. Prices too large to average exactly yield
    /// `AnalyticsError::NumericOverflow`.
    pub fn evaluate(
        &self,
        series: PriceSeries,
        short_window: usize,
        long_window: usize,
    ) -> Result<SignalFrame, AnalyticsError> {
        validate_windows(short_window, long_window)?;
        if series.is_empty() {
            return Err(AnalyticsError::EmptySeries);
        }

        let points = series.into_sorted().into_inner();
        tracing::debug!(
            points = points.len(),
            short_window,
            long_window,
            "Evaluating crossover signals"
        );

        let closes: Vec<Decimal> = points.iter().map(|p| bound_precision(p.close)).collect();
        let short_sums = rolling_sums(&closes, short_window)
            .ok_or(AnalyticsError::NumericOverflow("short moving average"))?;
        let long_sums = rolling_sums(&closes, long_window)
            .ok_or(AnalyticsError::NumericOverflow("long moving average"))?;
        let short_len = Decimal::from(short_window);
        let long_len = Decimal::from(long_window);

        let mut rows: Vec<SignalRow> = Vec::with_capacity(points.len());
        for (i, point) in points.iter().enumerate() {
            let (short_sum, long_sum) = (short_sums[i], long_sums[i]);
            let signal = crossover_signal(short_sum, long_sum, short_len, long_len)?;

            let (period_return, strategy_return) = match rows.last() {
                Some(prev) => {
                    let period_return = close_to_close_return(prev.close, closes[i])?;
                    // A zero previous close leaves the return undefined; that day contributes nothing.
                    let strategy_return = match period_return {
                        Some(r) => r
                            .checked_mul(prev.signal.weight())
                            .ok_or(AnalyticsError::NumericOverflow("strategy return"))?,
                        None => Decimal::ZERO,
                    };
                    (period_return, Some(strategy_return))
                }
                None => (None, None),
            };

            rows.push(SignalRow {
                timestamp: point.timestamp,
                close: closes[i],
                short_ma: short_sum.map(|s| s / short_len),
                long_ma: long_sum.map(|s| s / long_len),
                signal,
                period_return,
                strategy_return,
            });
        }

        Ok(SignalFrame {
            short_window,
            long_window,
            rows,
        })
    }
}

/// Rejects window lengths that could never produce a moving average.
pub fn validate_windows(short_window: usize, long_window: usize) -> Result<(), AnalyticsError> {
    if short_window == 0 || long_window == 0 {
        return Err(AnalyticsError::InvalidWindow {
            short_window,
            long_window,
        });
    }
    Ok(())
}

/// Rounds a close to `PRICE_DECIMAL_PLACES`.
///
/// With the scale bounded, window sums and their cross-products fit a
/// `Decimal` without rounding for any realistic price.
fn bound_precision(close: Decimal) -> Decimal {
    close.round_dp_with_strategy(PRICE_DECIMAL_PLACES, RoundingStrategy::MidpointNearestEven)
}

/// Compares the two averages through their window sums.
///
/// `short_sum / short_len` vs `long_sum / long_len` is decided by
/// `short_sum * long_len` vs `long_sum * short_len`. Both products are
/// computed without rounding (or rejected), so equal averages always compare
/// equal and yield HOLD.
fn crossover_signal(
    short_sum: Option<Decimal>,
    long_sum: Option<Decimal>,
    short_len: Decimal,
    long_len: Decimal,
) -> Result<Signal, AnalyticsError> {
    let (Some(short_sum), Some(long_sum)) = (short_sum, long_sum) else {
        return Ok(Signal::Hold);
    };

    let overflow = || AnalyticsError::NumericOverflow("moving average comparison");
    let short_side = exact_mul(short_sum, long_len).ok_or_else(overflow)?;
    let long_side = exact_mul(long_sum, short_len).ok_or_else(overflow)?;

    Ok(match short_side.cmp(&long_side) {
        Ordering::Greater => Signal::Buy,
        Ordering::Less => Signal::Sell,
        Ordering::Equal => Signal::Hold,
    })
}

fn close_to_close_return(
    prev_close: Decimal,
    close: Decimal,
) -> Result<Option<Decimal>, AnalyticsError> {
    if prev_close.is_zero() {
        return Ok(None);
    }
    close
        .checked_sub(prev_close)
        .and_then(|change| change.checked_div(prev_close))
        .map(Some)
        .ok_or(AnalyticsError::NumericOverflow("close-to-close return"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use core_types::PricePoint;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    fn series_from(closes: &[Decimal]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, close)| PricePoint::new(start + Duration::days(i as i64), *close))
            .collect()
    }

    fn scenario() -> PriceSeries {
        series_from(&[
            dec!(100),
            dec!(102),
            dec!(101),
            dec!(105),
            dec!(108),
            dec!(110),
            dec!(107),
            dec!(109),
        ])
    }

    #[test]
    fn test_scenario_report() {
        let report = CrossoverAnalyzer::new().analyze(scenario(), 3, 5).unwrap();

        // Short MA sits above long MA on every day where both are defined (days 4..=7).
        assert_eq!(report.buy_signal_count, 4);
        assert_eq!(report.sell_signal_count, 0);
        assert!(report.buy_signal_count + report.sell_signal_count <= 8);
        // 2/108 - 3/110 + 2/107 = 0.009937...
        assert_eq!(report.total_return, dec!(0.0099));
    }

    #[test]
    fn test_scenario_report_has_expected_keys() {
        let report = CrossoverAnalyzer::new().analyze(scenario(), 3, 5).unwrap();
        let value = serde_json::to_value(report).unwrap();
        let object = value.as_object().unwrap();

        assert!(object.contains_key("total_return"));
        assert!(object.contains_key("buy_signal_count"));
        assert!(object.contains_key("sell_signal_count"));
    }

    #[test]
    fn test_scenario_frame_values() {
        let frame = CrossoverAnalyzer::new().evaluate(scenario(), 3, 5).unwrap();

        assert_eq!(frame.rows[1].short_ma, None);
        assert_eq!(frame.rows[2].short_ma, Some(dec!(101)));
        assert_eq!(frame.rows[3].long_ma, None);
        assert_eq!(frame.rows[4].long_ma, Some(dec!(103.2)));
        assert_eq!(frame.rows[0].period_return, None);
        assert_eq!(frame.rows[0].strategy_return, None);
        assert_eq!(frame.rows[1].period_return, Some(dec!(0.02)));
        // Day 1 acts on day 0's HOLD.
        assert_eq!(frame.rows[1].strategy_return, Some(Decimal::ZERO));
    }

    #[test]
    fn test_length_invariant() {
        for (short, long) in [(1, 1), (2, 3), (3, 5), (5, 20), (7, 2)] {
            let frame = CrossoverAnalyzer::new().evaluate(scenario(), short, long).unwrap();
            assert_eq!(frame.len(), 8, "windows {}/{}", short, long);
        }
    }

    #[test]
    fn test_warm_up_invariant() {
        let closes: Vec<Decimal> = (0..30).map(|i| Decimal::from(100 + (i * 7) % 13)).collect();
        let frame = CrossoverAnalyzer::new()
            .evaluate(series_from(&closes), 5, 20)
            .unwrap();

        for row in &frame.rows[..19] {
            assert_eq!(row.signal, Signal::Hold);
            assert_eq!(row.long_ma, None);
        }
        assert!(frame.rows[19].long_ma.is_some());
    }

    #[test]
    fn test_deterministic_output() {
        let analyzer = CrossoverAnalyzer::new();
        let first = analyzer.analyze(scenario(), 3, 5).unwrap();
        let second = analyzer.analyze(scenario(), 3, 5).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_empty_series_is_rejected() {
        let result = CrossoverAnalyzer::new().analyze(PriceSeries::default(), 5, 20);
        assert_eq!(result, Err(AnalyticsError::EmptySeries));
    }

    #[test]
    fn test_zero_window_is_rejected() {
        let analyzer = CrossoverAnalyzer::new();
        assert_eq!(
            analyzer.analyze(scenario(), 0, 5),
            Err(AnalyticsError::InvalidWindow {
                short_window: 0,
                long_window: 5
            })
        );
        assert!(matches!(
            analyzer.analyze(scenario(), 3, 0),
            Err(AnalyticsError::InvalidWindow { .. })
        ));
        // Windows are checked before the series.
        assert!(matches!(
            analyzer.analyze(PriceSeries::default(), 0, 0),
            Err(AnalyticsError::InvalidWindow { .. })
        ));
    }

    #[test]
    fn test_flat_prices_hold_everywhere() {
        let closes = vec![dec!(42.17); 25];
        let analyzer = CrossoverAnalyzer::new();
        let frame = analyzer.evaluate(series_from(&closes), 5, 20).unwrap();
        assert!(frame.signals().all(|s| s == Signal::Hold));

        let report = analyzer.analyze(series_from(&closes), 5, 20).unwrap();
        assert_eq!(report.total_return, Decimal::ZERO);
        assert_eq!(report.buy_signal_count, 0);
        assert_eq!(report.sell_signal_count, 0);
    }

    #[test]
    fn test_equal_averages_with_non_terminating_means_hold() {
        // Both means are 10/3; the cross-multiplied comparison sees them as equal.
        let closes = [dec!(3), dec!(3), dec!(4), dec!(3), dec!(3), dec!(4)];
        let frame = CrossoverAnalyzer::new()
            .evaluate(series_from(&closes), 3, 6)
            .unwrap();
        assert_eq!(frame.rows[5].signal, Signal::Hold);
    }

    #[test]
    fn test_single_point_series() {
        let analyzer = CrossoverAnalyzer::new();
        let one = series_from(&[dec!(100)]);

        let frame = analyzer.evaluate(one.clone(), 1, 1).unwrap();
        assert_eq!(frame.rows[0].short_ma, Some(dec!(100)));
        assert_eq!(frame.rows[0].long_ma, Some(dec!(100)));
        assert_eq!(frame.rows[0].signal, Signal::Hold);

        let frame = analyzer.evaluate(one.clone(), 5, 20).unwrap();
        assert_eq!(frame.rows[0].long_ma, None);
        assert_eq!(frame.rows[0].signal, Signal::Hold);

        let report = analyzer.analyze(one, 5, 20).unwrap();
        assert_eq!(report, PerformanceReport::new());
    }

    #[test]
    fn test_window_misuse_still_produces_report() {
        let analyzer = CrossoverAnalyzer::new();

        let inverted = analyzer.analyze(scenario(), 5, 3).unwrap();
        assert!(inverted.buy_signal_count + inverted.sell_signal_count <= 8);

        let equal = analyzer.analyze(scenario(), 4, 4).unwrap();
        assert_eq!(equal, PerformanceReport::new());
    }

    #[test]
    fn test_falling_prices_short_the_market() {
        let closes = [dec!(10), dec!(9), dec!(8), dec!(7), dec!(6)];
        let report = CrossoverAnalyzer::new()
            .analyze(series_from(&closes), 1, 2)
            .unwrap();

        assert_eq!(report.buy_signal_count, 0);
        assert_eq!(report.sell_signal_count, 4);
        // 1/9 + 1/8 + 1/7 = 0.378968...
        assert_eq!(report.total_return, dec!(0.3790));
    }

    #[test]
    fn test_zero_close_contributes_nothing() {
        let closes = [dec!(4), dec!(0), dec!(5), dec!(6)];
        let frame = CrossoverAnalyzer::new()
            .evaluate(series_from(&closes), 1, 2)
            .unwrap();

        assert_eq!(
            frame.signals().collect::<Vec<_>>(),
            vec![Signal::Hold, Signal::Sell, Signal::Buy, Signal::Buy]
        );
        assert_eq!(frame.rows[2].period_return, None);
        assert_eq!(frame.rows[2].strategy_return, Some(Decimal::ZERO));

        let report = PerformanceReport::from_frame(&frame).unwrap();
        assert_eq!(report.total_return, dec!(0.2));
        assert_eq!(report.buy_signal_count, 2);
        assert_eq!(report.sell_signal_count, 1);
    }

    #[test]
    fn test_unsorted_input_matches_sorted_input() {
        let sorted = scenario();
        let mut shuffled = sorted.clone().into_inner();
        shuffled.reverse();
        shuffled.swap(1, 5);

        let analyzer = CrossoverAnalyzer::new();
        assert_eq!(
            analyzer.analyze(PriceSeries::new(shuffled), 3, 5).unwrap(),
            analyzer.analyze(sorted, 3, 5).unwrap()
        );
    }

    #[test]
    fn test_signal_lags_return_by_one_day() {
        // Day 2 turns BUY; the jump on day 2 itself must not be credited to it.
        let closes = [dec!(10), dec!(10), dec!(20), dec!(22)];
        let frame = CrossoverAnalyzer::new()
            .evaluate(series_from(&closes), 1, 2)
            .unwrap();

        assert_eq!(frame.rows[1].signal, Signal::Hold);
        assert_eq!(frame.rows[2].signal, Signal::Buy);
        assert_eq!(frame.rows[2].strategy_return, Some(Decimal::ZERO));
        assert_eq!(frame.rows[3].strategy_return, Some(dec!(0.1)));
    }

    #[test]
    fn test_flat_high_precision_prices_hold_everywhere() {
        let close = Decimal::from_str("1.2345678901234567890123456789").unwrap();
        let closes = vec![close; 40];
        let analyzer = CrossoverAnalyzer::new();

        let frame = analyzer.evaluate(series_from(&closes), 5, 20).unwrap();
        assert!(frame.signals().all(|s| s == Signal::Hold));
        assert_eq!(frame.rows[0].close, dec!(1.234567890123));

        let report = analyzer.analyze(series_from(&closes), 5, 20).unwrap();
        assert_eq!(report.total_return, Decimal::ZERO);
        assert_eq!(report.buy_signal_count, 0);
        assert_eq!(report.sell_signal_count, 0);
    }

    #[test]
    fn test_sub_precision_moves_are_ignored() {
        // Differences past the twelfth decimal place round away.
        let closes: Vec<Decimal> = (0..25)
            .map(|i| dec!(10.5) + Decimal::new(i % 3, 14))
            .collect();
        let report = CrossoverAnalyzer::new()
            .analyze(series_from(&closes), 5, 20)
            .unwrap();
        assert_eq!(report, PerformanceReport::new());
    }

    #[test]
    fn test_huge_prices_are_an_error_not_a_panic() {
        let closes = vec![Decimal::from_i128_with_scale(10_i128.pow(27), 0); 25];
        let result = CrossoverAnalyzer::new().analyze(series_from(&closes), 5, 20);
        assert!(matches!(result, Err(AnalyticsError::NumericOverflow(_))));

        let closes = vec![Decimal::from_i128_with_scale(5 * 10_i128.pow(27), 0); 25];
        assert_eq!(
            CrossoverAnalyzer::new().analyze(series_from(&closes), 5, 20),
            Err(AnalyticsError::NumericOverflow("long moving average"))
        );
    }

    #[test]
    fn test_close_to_close_return_edges() {
        assert_eq!(close_to_close_return(dec!(0), dec!(5)), Ok(None));
        assert_eq!(close_to_close_return(dec!(4), dec!(5)), Ok(Some(dec!(0.25))));
        assert_eq!(
            close_to_close_return(dec!(0.0000000000000000000000000001), Decimal::MAX),
            Err(AnalyticsError::NumericOverflow("close-to-close return"))
        );
    }
}
