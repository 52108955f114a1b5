//! Z-score anomaly detection over a recent window.
//!
//! Every sample in the window is standardized against the window's own
//! population mean and standard deviation. Samples whose absolute z-score
//! reaches the threshold are reported, oldest first.
//!
//! A window with no spread (all values equal) has no anomalies by
//! construction and yields `None` rather than an empty result.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::stats::PopulationStats;
use super::SeriesAnalyzer;
use crate::config::InsightsConfig;
use crate::formatters::format_duration;
use crate::series::{prepare, window, Metric, MetricSample, ResidentId};

/// Samples of a window that deviate from its mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyResult {
    /// Resident the window belongs to.
    pub resident_id: ResidentId,
    /// Metric the window holds.
    pub metric: Metric,
    /// Number of anomalous samples.
    pub n_anomalies: usize,
    /// Zero-based positions in the window, ascending.
    pub anomaly_indices: Vec<usize>,
    /// Dates of the anomalous samples.
    pub anomaly_dates: Vec<NaiveDate>,
    /// Formatted values of the anomalous samples after gap filling.
    pub anomaly_values: Vec<String>,
    /// Short summary, e.g. `"2 anomalies detected"`.
    pub description: String,
}

/// Flags samples at least `threshold` standard deviations from the mean.
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    /// Absolute z-score at or above which a sample is anomalous.
    pub z_score_threshold: f64,
    /// Number of most recent samples inspected.
    pub window: usize,
}

impl AnomalyDetector {
    /// Creates a detector over the default 30-day window.
    ///
    /// # Arguments
    /// * `z_score_threshold` - Number of standard deviations for the anomaly threshold
    pub fn new(z_score_threshold: f64) -> Self {
        Self {
            z_score_threshold,
            window: InsightsConfig::default().detection_window,
        }
    }

    /// Creates a detector from the shared configuration.
    pub fn from_config(config: &InsightsConfig) -> Self {
        Self {
            z_score_threshold: config.anomaly_threshold,
            window: config.detection_window,
        }
    }

    /// Sets the number of samples inspected.
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::from_config(&InsightsConfig::default())
    }
}

impl SeriesAnalyzer for AnomalyDetector {
    type Output = AnomalyResult;

    fn analyze(
        &self,
        resident_id: ResidentId,
        metric: Metric,
        samples: &[MetricSample],
    ) -> Option<AnomalyResult> {
        let prepared = prepare(window(samples, self.window));
        let Some(values) = prepared.usable_values() else {
            debug!(%resident_id, %metric, "No recorded values for anomaly detection");
            return None;
        };

        if values.len() < 2 {
            debug!(
                %resident_id,
                %metric,
                samples = values.len(),
                "Insufficient history for anomaly detection"
            );
            return None;
        }

        let stats = PopulationStats::compute(values)?;

        // Can't calculate Z-score if standard deviation is zero
        if !stats.has_spread() {
            debug!(%resident_id, %metric, mean = stats.mean, "Window has no spread");
            return None;
        }

        let anomaly_indices: Vec<usize> = values
            .iter()
            .enumerate()
            .filter(|(_, v)| stats.z_score(**v).abs() >= self.z_score_threshold)
            .map(|(i, _)| i)
            .collect();

        let anomaly_dates = anomaly_indices
            .iter()
            .map(|&i| prepared.dates()[i])
            .collect();
        let anomaly_values = anomaly_indices
            .iter()
            .map(|&i| format_duration(Some(values[i])))
            .collect();

        let n_anomalies = anomaly_indices.len();
        debug!(
            %resident_id,
            %metric,
            mean = stats.mean,
            std_dev = stats.std_dev,
            threshold = self.z_score_threshold,
            n_anomalies,
            "Computed anomalies"
        );

        let description = if n_anomalies > 0 {
            format!("{n_anomalies} anomalies detected")
        } else {
            "no anomalies".to_string()
        };

        Some(AnomalyResult {
            resident_id,
            metric,
            n_anomalies,
            anomaly_indices,
            anomaly_dates,
            anomaly_values,
            description,
        })
    }

    fn name(&self) -> &str {
        "ZScore"
    }

    fn description(&self) -> &str {
        "Detects anomalies using statistical Z-score analysis"
    }

    fn window_size(&self) -> usize {
        self.window
    }
}

/// Detects anomalies in `samples` with the given configuration.
pub fn compute_anomalies(
    resident_id: ResidentId,
    metric: Metric,
    samples: &[MetricSample],
    config: &InsightsConfig,
) -> Option<AnomalyResult> {
    AnomalyDetector::from_config(config).analyze(resident_id, metric, samples)
}
