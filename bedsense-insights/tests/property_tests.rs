//! Property-based tests for the insight analyzers.
//!
//! Series are generated with random lengths, values and gaps. The properties
//! checked hold for every input:
//!
//! - gap filling leaves no missing value when at least one value is recorded
//!   and never alters recorded values
//! - change-point indices are strictly increasing and below `n - 1`
//! - every analyzer is a pure function of its input
//! - anomaly indices are exactly the samples whose z-score reaches the threshold
//! - a window of identical values has no anomalies and no change points

use bedsense_insights::analyzers::stats::PopulationStats;
use bedsense_insights::analyzers::{
    change_point::Pelt, compute_anomalies, compute_change_points, compute_trend,
};
use bedsense_insights::config::{InsightsConfig, PenaltyPolicy};
use bedsense_insights::series::{prepare, Metric, MetricSample, ResidentId};
use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

fn to_series(values: &[Option<f64>]) -> Vec<MetricSample> {
    let start = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();
    values
        .iter()
        .enumerate()
        .map(|(i, v)| MetricSample::new(start + Duration::days(i as i64), *v))
        .collect()
}

/// Durations up to a full day, with roughly one gap in five.
fn arb_values(max_len: usize) -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(
        prop_oneof![
            4 => (0.0f64..86_400.0).prop_map(Some),
            1 => Just(None),
        ],
        0..max_len,
    )
}

fn arb_penalty() -> impl Strategy<Value = PenaltyPolicy> {
    prop_oneof![
        (0.0f64..20.0).prop_map(PenaltyPolicy::Fixed),
        (0.0f64..5.0).prop_map(PenaltyPolicy::LogLength),
    ]
}

proptest! {
    #[test]
    fn prop_prepare_fills_every_gap(values in arb_values(60)) {
        let prepared = prepare(&to_series(&values));
        prop_assert_eq!(prepared.len(), values.len());

        let any_recorded = values.iter().any(Option::is_some);
        match prepared.usable_values() {
            Some(filled) => {
                prop_assert!(any_recorded);
                prop_assert!(filled.iter().all(|v| v.is_finite()));
                for (raw, filled) in values.iter().zip(filled) {
                    if let Some(raw) = raw {
                        prop_assert_eq!(raw, filled);
                    }
                }
            }
            None => prop_assert!(!any_recorded),
        }
    }

    #[test]
    fn prop_change_point_indices_in_bounds(
        values in arb_values(45),
        penalty in arb_penalty(),
        min_size in 1usize..5,
        jump in 1usize..6,
    ) {
        let mut config = InsightsConfig::default().with_penalty(penalty);
        config.change_point.min_size = min_size;
        config.change_point.jump = jump;

        let samples = to_series(&values);
        if let Some(result) = compute_change_points(ResidentId(1), Metric::TimeInBed, &samples, &config) {
            let n = samples.len().min(config.detection_window);
            prop_assert_eq!(result.n_change_points, result.change_point_indices.len());
            prop_assert_eq!(result.change_point_dates.len(), result.n_change_points);
            prop_assert_eq!(result.change_point_values.len(), result.n_change_points);
            prop_assert!(result.change_point_indices.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(result.change_point_indices.iter().all(|&i| i + 1 < n));
        }
    }

    #[test]
    fn prop_pelt_breakpoints_partition_signal(
        signal in prop::collection::vec(-10.0f64..10.0, 1..40),
        penalty in 0.0f64..10.0,
        min_size in 1usize..5,
        jump in 1usize..6,
    ) {
        let breakpoints = Pelt::new(min_size, jump).segment(&signal, penalty);
        prop_assert_eq!(breakpoints.last().copied(), Some(signal.len()));
        prop_assert!(breakpoints.windows(2).all(|w| w[0] < w[1]));
        for &b in &breakpoints[..breakpoints.len() - 1] {
            prop_assert_eq!(b % jump, 0);
        }
    }

    #[test]
    fn prop_analyzers_are_idempotent(values in arb_values(40)) {
        let samples = to_series(&values);
        let config = InsightsConfig::default();

        prop_assert_eq!(
            compute_trend(ResidentId(3), Metric::AtRest, &samples, &config),
            compute_trend(ResidentId(3), Metric::AtRest, &samples, &config)
        );
        prop_assert_eq!(
            compute_anomalies(ResidentId(3), Metric::AtRest, &samples, &config),
            compute_anomalies(ResidentId(3), Metric::AtRest, &samples, &config)
        );
        prop_assert_eq!(
            compute_change_points(ResidentId(3), Metric::AtRest, &samples, &config),
            compute_change_points(ResidentId(3), Metric::AtRest, &samples, &config)
        );
    }

    #[test]
    fn prop_flat_window_has_no_anomalies(
        value in 0.0f64..86_400.0,
        len in 2usize..=30,
        threshold in 0.0f64..4.0,
    ) {
        let samples = to_series(&vec![Some(value); len]);
        let config = InsightsConfig::default().with_anomaly_threshold(threshold);
        prop_assert!(compute_anomalies(ResidentId(4), Metric::AtRest, &samples, &config).is_none());

        let result = compute_change_points(ResidentId(4), Metric::AtRest, &samples, &config);
        prop_assert_eq!(result.map(|r| r.n_change_points), Some(0));
    }

    #[test]
    fn prop_anomalies_match_threshold(
        values in arb_values(40),
        threshold in 0.5f64..4.0,
    ) {
        let samples = to_series(&values);
        let config = InsightsConfig::default().with_anomaly_threshold(threshold);
        let window = &samples[samples.len().saturating_sub(config.detection_window)..];
        let prepared = prepare(window);
        let result = compute_anomalies(ResidentId(4), Metric::LowActivity, &samples, &config);

        let Some(filled) = prepared.usable_values() else {
            prop_assert!(result.is_none());
            return Ok(());
        };
        let stats = PopulationStats::compute(filled).unwrap();
        if filled.len() < 2 || !stats.has_spread() {
            prop_assert!(result.is_none());
            return Ok(());
        }

        let expected: Vec<usize> = filled
            .iter()
            .enumerate()
            .filter(|(_, v)| stats.z_score(**v).abs() >= threshold)
            .map(|(i, _)| i)
            .collect();
        let result = result.unwrap();
        prop_assert_eq!(result.n_anomalies, result.anomaly_indices.len());
        prop_assert_eq!(result.anomaly_indices, expected);
    }
}
