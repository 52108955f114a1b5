//! Structural change-point detection.
//!
//! The window is standardized (centered and scaled by its population standard
//! deviation, or only centered when the deviation is zero) and segmented with
//! [`Pelt`] under an L2 cost. Each reported index is the last sample of a
//! segment; the implicit boundary at the end of the window is never reported.

pub mod cost;
pub mod pelt;

pub use cost::L2Cost;
pub use pelt::Pelt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::stats::PopulationStats;
use super::SeriesAnalyzer;
use crate::config::{ChangePointConfig, InsightsConfig};
use crate::formatters::format_duration;
use crate::series::{prepare, window, Metric, MetricSample, ResidentId};

/// Positions in a window after which the mean level shifts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangePointResult {
    /// Resident the window belongs to.
    pub resident_id: ResidentId,
    /// Metric the window holds.
    pub metric: Metric,
    /// Number of detected change points.
    pub n_change_points: usize,
    /// Zero-based window positions, strictly increasing and below `n - 1`.
    pub change_point_indices: Vec<usize>,
    /// Dates of the change points.
    pub change_point_dates: Vec<NaiveDate>,
    /// Formatted raw values at the change points; gaps render as `"N/A"`.
    pub change_point_values: Vec<String>,
    /// Summary naming the count, the method and the window length.
    pub description: String,
}

/// Locates mean shifts with PELT over the most recent window.
#[derive(Debug, Clone)]
pub struct ChangePointDetector {
    /// Penalty and search grid.
    pub config: ChangePointConfig,
    /// Number of most recent samples inspected.
    pub window: usize,
}

impl ChangePointDetector {
    /// Creates a detector from the shared configuration.
    pub fn from_config(config: &InsightsConfig) -> Self {
        Self {
            config: config.change_point,
            window: config.detection_window,
        }
    }

    fn standardize(values: &[f64]) -> Option<Vec<f64>> {
        let stats = PopulationStats::compute(values)?;
        let scale = if stats.has_spread() { stats.std_dev } else { 1.0 };
        Some(values.iter().map(|v| (v - stats.mean) / scale).collect())
    }
}

impl Default for ChangePointDetector {
    fn default() -> Self {
        Self::from_config(&InsightsConfig::default())
    }
}

impl SeriesAnalyzer for ChangePointDetector {
    type Output = ChangePointResult;

    fn analyze(
        &self,
        resident_id: ResidentId,
        metric: Metric,
        samples: &[MetricSample],
    ) -> Option<ChangePointResult> {
        let recent = window(samples, self.window);
        if recent.len() < 2 {
            debug!(
                %resident_id,
                %metric,
                samples = recent.len(),
                "Insufficient history for change-point detection"
            );
            return None;
        }

        let prepared = prepare(recent);
        let Some(values) = prepared.usable_values() else {
            debug!(%resident_id, %metric, "No recorded values for change-point detection");
            return None;
        };
        let n = values.len();
        let signal = Self::standardize(values)?;

        let penalty = self.config.penalty.resolve(n);
        let breakpoints =
            Pelt::new(self.config.min_size, self.config.jump).segment(&signal, penalty);

        let change_point_indices: Vec<usize> = breakpoints
            .iter()
            .filter_map(|&b| b.checked_sub(1))
            .filter(|&i| i < n - 1)
            .collect();

        let change_point_dates = change_point_indices
            .iter()
            .map(|&i| prepared.dates()[i])
            .collect();
        let change_point_values = change_point_indices
            .iter()
            .map(|&i| format_duration(recent[i].value))
            .collect();

        let n_change_points = change_point_indices.len();
        debug!(
            %resident_id,
            %metric,
            penalty,
            ?breakpoints,
            n_change_points,
            "Computed change points"
        );

        Some(ChangePointResult {
            resident_id,
            metric,
            n_change_points,
            change_point_indices,
            change_point_dates,
            change_point_values,
            description: format!(
                "Detected {n_change_points} change points using PELT (l2) over last {n} days."
            ),
        })
    }

    fn name(&self) -> &str {
        "PELT"
    }

    fn description(&self) -> &str {
        "Detects mean shifts by penalized optimal segmentation"
    }

    fn window_size(&self) -> usize {
        self.window
    }
}

/// Detects change points in `samples` with the given configuration.
pub fn compute_change_points(
    resident_id: ResidentId,
    metric: Metric,
    samples: &[MetricSample],
    config: &InsightsConfig,
) -> Option<ChangePointResult> {
    ChangePointDetector::from_config(config).analyze(resident_id, metric, samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PenaltyPolicy;
    use chrono::Duration;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
    }

    fn series(values: &[Option<f64>]) -> Vec<MetricSample> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| MetricSample::new(start() + Duration::days(i as i64), *v))
            .collect()
    }

    fn sleep_drop() -> Vec<Option<f64>> {
        let mut values = vec![Some(28_800.0); 23];
        values.extend(vec![Some(14_400.0); 7]);
        values
    }

    #[test]
    fn test_step_change_detected() {
        let result = compute_change_points(
            ResidentId(7),
            Metric::TimeInBed,
            &series(&sleep_drop()),
            &InsightsConfig::default(),
        )
        .unwrap();

        assert_eq!(result.n_change_points, 1);
        assert_eq!(result.change_point_indices, vec![22]);
        assert_eq!(result.change_point_dates, vec![start() + Duration::days(22)]);
        assert_eq!(result.change_point_values, vec!["8h"]);
        assert_eq!(
            result.description,
            "Detected 1 change points using PELT (l2) over last 30 days."
        );
    }

    #[test]
    fn test_shipped_grid_still_brackets_the_step() {
        let result = compute_change_points(
            ResidentId(7),
            Metric::TimeInBed,
            &series(&sleep_drop()),
            &InsightsConfig::shipped(),
        )
        .unwrap();

        assert!(result
            .change_point_indices
            .iter()
            .any(|i| (21..=24).contains(i)));
        for i in &result.change_point_indices {
            assert_eq!((i + 1) % 5, 0, "index {i} is off the breakpoint grid");
        }
    }

    #[test]
    fn test_constant_series_has_no_change_points() {
        let result = ChangePointDetector::default()
            .analyze(ResidentId(1), Metric::AtRest, &series(&[Some(3_600.0); 30]))
            .unwrap();

        assert_eq!(result.n_change_points, 0);
        assert!(result.change_point_indices.is_empty());
        assert_eq!(
            result.description,
            "Detected 0 change points using PELT (l2) over last 30 days."
        );
    }

    #[test]
    fn test_fractional_constant_series_is_only_centered() {
        let values = [28_800.3; 30];
        assert_eq!(
            ChangePointDetector::standardize(&values).unwrap(),
            vec![0.0; 30]
        );

        let result = compute_change_points(
            ResidentId(1),
            Metric::AtRest,
            &series(&[Some(3_600.7); 30]),
            &InsightsConfig::shipped(),
        )
        .unwrap();
        assert_eq!(result.n_change_points, 0);
    }

    #[test]
    fn test_insufficient_or_missing_data() {
        let detector = ChangePointDetector::default();
        assert!(detector
            .analyze(ResidentId(1), Metric::AtRest, &[])
            .is_none());
        assert!(detector
            .analyze(ResidentId(1), Metric::AtRest, &series(&[Some(1.0)]))
            .is_none());
        assert!(detector
            .analyze(ResidentId(1), Metric::AtRest, &series(&[None; 12]))
            .is_none());
    }

    #[test]
    fn test_values_are_raw_samples() {
        // The gap is filled for the search but reported as missing.
        let mut values = sleep_drop();
        values[22] = None;
        let result = ChangePointDetector::default()
            .analyze(ResidentId(1), Metric::TimeInBed, &series(&values))
            .unwrap();

        assert_eq!(result.change_point_indices, vec![22]);
        assert_eq!(result.change_point_values, vec!["N/A"]);
    }

    #[test]
    fn test_indices_are_relative_to_window() {
        let mut values = vec![Some(0.0); 10];
        values.extend(sleep_drop());
        let result = ChangePointDetector::default()
            .analyze(ResidentId(1), Metric::TimeInBed, &series(&values))
            .unwrap();

        assert_eq!(result.change_point_indices, vec![22]);
        assert_eq!(result.change_point_dates[0], start() + Duration::days(32));
    }

    #[test]
    fn test_repeated_calls_agree() {
        let samples = series(&sleep_drop());
        let detector = ChangePointDetector::default();
        let first = detector.analyze(ResidentId(1), Metric::TimeInBed, &samples);
        let second = detector.analyze(ResidentId(1), Metric::TimeInBed, &samples);
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_penalty_bounds() {
        // With no penalty every admissible split pays off; indices stay in range.
        let values: Vec<_> = (0..30).map(|i| Some((i * i % 17) as f64 * 600.0)).collect();
        let config = InsightsConfig::default().with_penalty(PenaltyPolicy::Fixed(0.0));
        let result =
            compute_change_points(ResidentId(1), Metric::LowActivity, &series(&values), &config)
                .unwrap();

        assert!(result.n_change_points > 0);
        assert!(result
            .change_point_indices
            .windows(2)
            .all(|pair| pair[0] < pair[1]));
        assert!(result.change_point_indices.iter().all(|&i| i < 29));
    }
}
