//! Short-term trend against a rolling baseline.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::stats::tail_mean;
use super::SeriesAnalyzer;
use crate::config::InsightsConfig;
use crate::formatters::{describe_change, format_duration, ChangeDirection};
use crate::series::{prepare, window, Metric, MetricSample, ResidentId};

/// Recent average compared with the baseline, rendered for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    /// Resident the trend was computed for.
    pub resident_id: ResidentId,
    /// Metric the trend was computed for.
    pub metric: Metric,
    /// Mean over the baseline window, e.g. `"7h"`.
    pub baseline: String,
    /// Mean over the short window, e.g. `"4h"`.
    pub recent_average: String,
    /// Magnitude of `recent_average - baseline`; the sign is in `direction`.
    pub difference: String,
    /// Direction of the difference after the noise floor is applied.
    pub direction: ChangeDirection,
    /// Sentence such as `"time in bed decreased by 3h"`.
    pub description: String,
}

/// Compares the mean of the most recent days with a longer baseline mean.
#[derive(Debug, Clone)]
pub struct TrendAnalyzer {
    /// Days averaged for the baseline.
    pub baseline_window: usize,
    /// Most recent days averaged; also the minimum sample count.
    pub short_window: usize,
    /// Differences below this many seconds count as no change.
    pub noise_floor_seconds: f64,
}

impl TrendAnalyzer {
    /// Creates an analyzer from the shared configuration.
    pub fn from_config(config: &InsightsConfig) -> Self {
        Self {
            baseline_window: config.baseline_window,
            short_window: config.short_window,
            noise_floor_seconds: config.noise_floor_seconds,
        }
    }
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::from_config(&InsightsConfig::default())
    }
}

impl SeriesAnalyzer for TrendAnalyzer {
    type Output = TrendResult;

    fn analyze(
        &self,
        resident_id: ResidentId,
        metric: Metric,
        samples: &[MetricSample],
    ) -> Option<TrendResult> {
        if samples.len() < self.short_window {
            debug!(
                %resident_id,
                %metric,
                samples = samples.len(),
                required = self.short_window,
                "Insufficient history for trend"
            );
            return None;
        }

        let prepared = prepare(window(samples, self.baseline_window));
        let Some(values) = prepared.usable_values() else {
            debug!(%resident_id, %metric, "Trend window has no recorded values");
            return None;
        };

        let baseline = tail_mean(values, self.baseline_window)?;
        let recent = tail_mean(values, self.short_window)?;
        let difference = recent - baseline;

        debug!(
            %resident_id,
            %metric,
            baseline,
            recent,
            difference,
            "Computed trend"
        );

        Some(TrendResult {
            resident_id,
            metric,
            baseline: format_duration(Some(baseline)),
            recent_average: format_duration(Some(recent)),
            difference: format_duration(Some(difference)),
            direction: ChangeDirection::classify(difference, self.noise_floor_seconds),
            description: describe_change(metric, difference, self.noise_floor_seconds),
        })
    }

    fn name(&self) -> &str {
        "Trend"
    }

    fn description(&self) -> &str {
        "Compares the short-term average with a rolling baseline"
    }

    fn window_size(&self) -> usize {
        self.baseline_window
    }
}

/// Computes the trend of `samples` with the given configuration.
pub fn compute_trend(
    resident_id: ResidentId,
    metric: Metric,
    samples: &[MetricSample],
    config: &InsightsConfig,
) -> Option<TrendResult> {
    TrendAnalyzer::from_config(config).analyze(resident_id, metric, samples)
}
