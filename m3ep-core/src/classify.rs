//! Extreme precipitation event classification.
//!
//! A high quantile of the wet-day record selects the extreme subset. The
//! median and sample standard deviation of that subset place three tier
//! boundaries (`median`, `median + std`, `median + 2 std`), and every wet day
//! of the record is counted into the half-open interval it falls in.

use crate::date_range::DateRange;
use crate::error::ClassifyError;
use crate::series::{Observation, TimeSeries};
use crate::stats::{median, quantile_linear, round_to, sample_std, sorted};
use crate::tier::Tier;
use log::debug;
use serde::Serialize;

/// Margin added above the wettest day for the reported very strong upper bound.
pub const TOP_TIER_MARGIN_MM: f64 = 10.0;

/// Decimal places used when reporting tier thresholds.
pub const REPORT_DECIMALS: i32 = 2;

/// Default quantile for the extreme subset.
pub const DEFAULT_QUANTILE: f64 = 0.95;

/// Boundaries and event count of one tier.
///
/// `lower` and `upper` are unrounded; membership is `lower <= v < upper`,
/// except for the very strong tier, which has no upper limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TierSummary {
    pub tier: Tier,
    pub lower: f64,
    pub upper: f64,
    pub event_count: usize,
}

impl TierSummary {
    /// Lower bound rounded for reporting.
    pub fn threshold(&self) -> f64 {
        round_to(self.lower, REPORT_DECIMALS)
    }

    pub fn contains(&self, value: f64) -> bool {
        match self.tier {
            Tier::VeryStrong => self.lower <= value,
            _ => self.lower <= value && value < self.upper,
        }
    }
}

/// Outcome of classifying one precipitation record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    /// Quantile level used to select the extreme subset.
    pub quantile: f64,
    /// Precipitation value at `quantile` over the wet days (limiar).
    pub quantile_threshold: f64,
    /// Median of the extreme subset.
    pub median: f64,
    /// Sample standard deviation of the extreme subset.
    pub std_dev: f64,
    /// Size of the extreme subset.
    pub extreme_count: usize,
    /// Number of wet days the tiers were counted over.
    pub positive_count: usize,
    /// One entry per tier, in [`Tier::ALL`] order.
    pub tiers: [TierSummary; 3],
}

/// Wet days of one tier, in date order. Used for charting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventSubset {
    pub tier: Tier,
    pub observations: Vec<Observation>,
}

impl ClassificationResult {
    pub fn tier(&self, tier: Tier) -> &TierSummary {
        &self.tiers[tier as usize]
    }

    pub fn event_count(&self, tier: Tier) -> usize {
        self.tier(tier).event_count
    }

    pub fn total_events(&self) -> usize {
        self.tiers.iter().map(|t| t.event_count).sum()
    }

    /// The wet days of `series` that fall in `tier`.
    ///
    /// `series` should be the record this result was computed from.
    pub fn event_subset(&self, series: &TimeSeries, tier: Tier) -> EventSubset {
        let summary = self.tier(tier);
        let observations = series
            .iter()
            .filter(|o| o.value > 0.0 && summary.contains(o.value))
            .copied()
            .collect();
        EventSubset { tier, observations }
    }

    pub fn event_subsets(&self, series: &TimeSeries) -> Vec<EventSubset> {
        Tier::ALL
            .iter()
            .map(|tier| self.event_subset(series, *tier))
            .collect()
    }
}

/// Accept a quantile strictly inside `(0, 1)`.
pub fn validate_quantile(quantile: f64) -> Result<f64, ClassifyError> {
    if quantile.is_finite() && quantile > 0.0 && quantile < 1.0 {
        Ok(quantile)
    } else {
        Err(ClassifyError::InvalidParameter {
            name: "quantile",
            value: quantile,
            reason: "must lie strictly between 0 and 1",
        })
    }
}

/// Classify the wet days of `series` at the given quantile.
pub fn classify(series: &TimeSeries, quantile: f64) -> Result<ClassificationResult, ClassifyError> {
    let quantile = validate_quantile(quantile)?;
    let positive = series.filter_positive();
    if positive.is_empty() {
        return Err(ClassifyError::InsufficientData(format!(
            "no positive observations among {} records",
            series.len()
        )));
    }
    Ok(classify_positive(&positive, quantile))
}

/// Restrict `series` to `range`, then classify it.
///
/// The quantile is checked before the series is touched. An empty
/// restriction is reported as insufficient data.
pub fn classify_in_range(
    series: &TimeSeries,
    quantile: f64,
    range: &DateRange,
) -> Result<ClassificationResult, ClassifyError> {
    let quantile = validate_quantile(quantile)?;
    let positive = series.restrict_to_range(range).filter_positive();
    if positive.is_empty() {
        return Err(ClassifyError::InsufficientData(format!(
            "no positive observations between {} and {}",
            range.start(),
            range.end()
        )));
    }
    Ok(classify_positive(&positive, quantile))
}

fn classify_positive(positive: &TimeSeries, quantile: f64) -> ClassificationResult {
    let values = sorted(positive.values());
    let quantile_threshold = quantile_linear(&values, quantile);

    // values is sorted, so the extreme subset is a suffix
    let first_extreme = values.partition_point(|v| *v < quantile_threshold);
    let extreme = &values[first_extreme..];
    let median = median(extreme);
    let std_dev = sample_std(extreme);

    let max = values[values.len() - 1];
    let lowers = Tier::ALL.map(|tier| median + tier.std_offset() * std_dev);
    let uppers = [lowers[1], lowers[2], max + TOP_TIER_MARGIN_MM];
    let tiers = Tier::ALL.map(|tier| {
        let i = tier as usize;
        let mut summary = TierSummary {
            tier,
            lower: lowers[i],
            upper: uppers[i],
            event_count: 0,
        };
        summary.event_count = values.iter().filter(|v| summary.contains(**v)).count();
        summary
    });

    debug!(
        "quantile {} -> limiar {:.3} mm over {} wet days; extreme subset n={} median={:.3} std={:.3}",
        quantile,
        quantile_threshold,
        values.len(),
        extreme.len(),
        median,
        std_dev
    );

    ClassificationResult {
        quantile,
        quantile_threshold,
        median,
        std_dev,
        extreme_count: extreme.len(),
        positive_count: values.len(),
        tiers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeDelta};
    use proptest::prelude::*;

    const TOL: f64 = 1e-9;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily_series(start: NaiveDate, values: &[f64]) -> TimeSeries {
        let end = start + TimeDelta::days(values.len() as i64 - 1);
        let observations = DateRange(start, end)
            .zip(values.iter())
            .map(|(date, value)| Observation::new(date, *value))
            .collect();
        TimeSeries::new(observations).unwrap()
    }

    fn series(values: &[f64]) -> TimeSeries {
        daily_series(day(2000, 1, 1), values)
    }

    /// Daily totals quantized to 0.1 mm, like gauge readings.
    fn wet_day() -> impl Strategy<Value = f64> {
        (0.1f64..500.0).prop_map(|v| (v * 10.0).round() / 10.0)
    }

    // Mostly dry record with at least one wet day.
    prop_compose! {
        fn rainfall_record()(
            days in prop::collection::vec(prop_oneof![3 => Just(0.0), 2 => wet_day()], 0..300),
            last in wet_day()
        ) -> Vec<f64> {
            let mut days = days;
            days.push(last);
            days
        }
    }

    #[test]
    fn test_concrete_scenario_is_degenerate() {
        let s = series(&[
            1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 20.0, 20.0, 20.0,
        ]);
        let result = classify(&s, 0.9).unwrap();
        // rank 0.9 * 12 = 10.8 falls between two 20 mm days
        assert!((result.quantile_threshold - 20.0).abs() < TOL);
        assert_eq!(result.extreme_count, 3);
        assert!((result.median - 20.0).abs() < TOL);
        assert_eq!(result.std_dev, 0.0);
        for tier in Tier::ALL {
            assert_eq!(result.tier(tier).threshold(), 20.0);
        }
        assert_eq!(result.event_count(Tier::Moderate), 0);
        assert_eq!(result.event_count(Tier::Strong), 0);
        assert_eq!(result.event_count(Tier::VeryStrong), 3);
        assert_eq!(result.positive_count, 13);
    }

    #[test]
    fn test_concrete_scenario_lower_quantile() {
        let s = series(&[
            1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 20.0, 20.0, 20.0,
        ]);
        let result = classify(&s, 0.75).unwrap();
        // rank 9 -> 10 mm; extreme subset {10, 20, 20, 20}
        assert!((result.quantile_threshold - 10.0).abs() < TOL);
        assert!((result.median - 20.0).abs() < TOL);
        assert!((result.std_dev - 5.0).abs() < TOL);
        assert_eq!(result.tier(Tier::Moderate).threshold(), 20.0);
        assert_eq!(result.tier(Tier::Strong).threshold(), 25.0);
        assert_eq!(result.tier(Tier::VeryStrong).threshold(), 30.0);
        assert_eq!(result.event_count(Tier::Moderate), 3);
        assert_eq!(result.event_count(Tier::Strong), 0);
        assert_eq!(result.event_count(Tier::VeryStrong), 0);
        assert!((result.tier(Tier::VeryStrong).upper - 30.0).abs() < TOL);
    }

    #[test]
    fn test_rounded_thresholds_and_unrounded_bounds() {
        let values: Vec<f64> = (1..=20).map(f64::from).collect();
        let result = classify(&series(&values), 0.9).unwrap();
        // rank 17.1 -> 18.1; extreme subset {19, 20}
        assert!((result.quantile_threshold - 18.1).abs() < TOL);
        assert!((result.median - 19.5).abs() < TOL);
        assert!((result.std_dev - 0.5f64.sqrt()).abs() < TOL);
        assert_eq!(result.tier(Tier::Moderate).threshold(), 19.5);
        assert_eq!(result.tier(Tier::Strong).threshold(), 20.21);
        assert_eq!(result.tier(Tier::VeryStrong).threshold(), 20.91);
        assert!((result.tier(Tier::Strong).lower - (19.5 + 0.5f64.sqrt())).abs() < TOL);
        assert_eq!(result.event_count(Tier::Moderate), 1);
        assert_eq!(result.event_count(Tier::Strong), 0);
        assert_eq!(result.event_count(Tier::VeryStrong), 0);
    }

    #[test]
    fn test_dry_days_are_ignored() {
        let s = series(&[0.0, 5.0, 0.0, 10.0, 0.0, 15.0, 0.0, 0.0]);
        let result = classify(&s, 0.5).unwrap();
        assert_eq!(result.positive_count, 3);
        // rank 1 of {5, 10, 15}
        assert!((result.quantile_threshold - 10.0).abs() < TOL);
    }

    #[test]
    fn test_degenerate_extreme_subset() {
        let s = series(&[1.0, 2.0, 10.0, 10.0, 10.0, 10.0]);
        let result = classify(&s, 0.9).unwrap();
        assert_eq!(result.std_dev, 0.0);
        for tier in Tier::ALL {
            assert_eq!(result.tier(tier).threshold(), 10.0);
        }
        assert_eq!(result.event_count(Tier::Moderate), 0);
        assert_eq!(result.event_count(Tier::Strong), 0);
        assert_eq!(result.event_count(Tier::VeryStrong), 4);
    }

    #[test]
    fn test_single_wet_day() {
        let s = series(&[0.0, 0.0, 42.0, 0.0]);
        let result = classify(&s, 0.95).unwrap();
        assert_eq!(result.extreme_count, 1);
        assert_eq!(result.std_dev, 0.0);
        assert_eq!(result.event_count(Tier::VeryStrong), 1);
    }

    #[test]
    fn test_empty_range_is_insufficient_data() {
        let s = series(&[5.0, 6.0, 7.0]);
        let range = DateRange(day(1990, 1, 1), day(1990, 12, 31));
        let err = classify_in_range(&s, 0.95, &range).unwrap_err();
        assert!(matches!(err, ClassifyError::InsufficientData(_)));
    }

    #[test]
    fn test_range_restricts_before_classifying() {
        let mut values = vec![100.0; 10];
        values.extend([1.0, 2.0, 3.0, 4.0, 5.0]);
        let s = series(&values);
        let range = DateRange(day(2000, 1, 11), day(2000, 1, 15));
        let result = classify_in_range(&s, 0.5, &range).unwrap();
        assert_eq!(result.positive_count, 5);
        assert!((result.quantile_threshold - 3.0).abs() < TOL);
    }

    #[test]
    fn test_all_dry_is_insufficient_data() {
        let s = series(&[0.0, 0.0, 0.0]);
        assert!(matches!(
            classify(&s, 0.95),
            Err(ClassifyError::InsufficientData(_))
        ));
        assert!(matches!(
            classify(&TimeSeries::default(), 0.95),
            Err(ClassifyError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_invalid_quantile_rejected_before_series_access() {
        // an empty series would otherwise be insufficient data
        let empty = TimeSeries::default();
        for q in [1.5, 1.0, 0.0, -0.1, f64::NAN] {
            assert!(matches!(
                classify(&empty, q),
                Err(ClassifyError::InvalidParameter { name: "quantile", .. })
            ));
        }
        let range = DateRange(day(1990, 1, 1), day(1990, 1, 2));
        assert!(matches!(
            classify_in_range(&empty, 1.5, &range),
            Err(ClassifyError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_very_strong_has_no_upper_limit() {
        // max + margin rounds back to max at this magnitude
        let s = series(&[1e18, 1e18, 1e18]);
        let result = classify(&s, 0.9).unwrap();
        let top = result.tier(Tier::VeryStrong);
        assert_eq!(top.upper, 1e18);
        assert!(top.contains(1e18));
        assert_eq!(result.event_count(Tier::Moderate), 0);
        assert_eq!(result.event_count(Tier::Strong), 0);
        assert_eq!(result.event_count(Tier::VeryStrong), 3);
        assert_eq!(result.event_subset(&s, Tier::VeryStrong).observations.len(), 3);
    }

    #[test]
    fn test_wettest_day_is_counted() {
        let s = series(&[1.0, 2.0, 3.0, 4.0, 50.0]);
        let result = classify(&s, 0.6).unwrap();
        let top = result.tier(Tier::VeryStrong);
        assert!(top.upper > 50.0);
        let counted: usize = result.total_events();
        assert!(counted >= 1);
        assert!(result
            .event_subsets(&s)
            .iter()
            .any(|subset| subset.observations.iter().any(|o| o.value == 50.0)));
    }

    proptest! {
        #[test]
        fn prop_threshold_grows_with_quantile(
            values in rainfall_record(),
            q1 in 0.01f64..0.99,
            q2 in 0.01f64..0.99
        ) {
            let (low, high) = if q1 <= q2 { (q1, q2) } else { (q2, q1) };
            let s = series(&values);
            let a = classify(&s, low).unwrap().quantile_threshold;
            let b = classify(&s, high).unwrap().quantile_threshold;
            prop_assert!(a <= b + 1e-9, "q {} -> {}, q {} -> {}", low, a, high, b);
        }

        #[test]
        fn prop_tiers_ordered_or_collapsed(values in rainfall_record(), q in 0.01f64..0.99) {
            let result = classify(&series(&values), q).unwrap();
            let [moderate, strong, very_strong] = result.tiers.map(|t| t.lower);
            if result.std_dev > 0.0 {
                prop_assert!(moderate < strong && strong < very_strong);
            } else {
                prop_assert_eq!(moderate, strong);
                prop_assert_eq!(strong, very_strong);
                prop_assert_eq!(result.event_count(Tier::Moderate), 0);
                prop_assert_eq!(result.event_count(Tier::Strong), 0);
            }
        }

        #[test]
        fn prop_tiers_partition_wet_days_above_median(
            values in rainfall_record(),
            q in 0.01f64..0.99
        ) {
            let s = series(&values);
            let result = classify(&s, q).unwrap();
            let wet = s.filter_positive();
            prop_assert_eq!(result.positive_count, wet.len());
            prop_assert!(result.total_events() <= result.positive_count);
            let at_or_above_median = wet.values().filter(|v| *v >= result.median).count();
            prop_assert_eq!(result.total_events(), at_or_above_median);
            // the wettest day always lands in a tier
            prop_assert!(result.total_events() >= 1);
        }

        #[test]
        fn prop_classification_is_deterministic(values in rainfall_record(), q in 0.01f64..0.99) {
            let s = series(&values);
            prop_assert_eq!(classify(&s, q).unwrap(), classify(&s, q).unwrap());
        }

        #[test]
        fn prop_event_subsets_match_counts(values in rainfall_record(), q in 0.01f64..0.99) {
            let s = series(&values);
            let result = classify(&s, q).unwrap();
            for subset in result.event_subsets(&s) {
                prop_assert_eq!(subset.observations.len(), result.event_count(subset.tier));
                let summary = result.tier(subset.tier);
                prop_assert!(subset.observations.iter().all(|o| summary.contains(o.value)));
                prop_assert!(subset.observations.windows(2).all(|w| w[0].date < w[1].date));
            }
        }
    }
}
