//! Configuration for the insight analyzers.
//!
//! Window sizes, the anomaly threshold and the change-point penalty are
//! passed explicitly to every analyzer through [`InsightsConfig`] so that
//! tests can exercise edge values without touching shared state.
//!
//! ```rust
//! use bedsense_insights::config::{InsightsConfig, PenaltyPolicy};
//!
//! let config = InsightsConfig::default()
//!     .with_anomaly_threshold(2.5)
//!     .with_penalty(PenaltyPolicy::Fixed(4.0));
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{InsightError, Result};

/// Default number of days averaged for the trend baseline.
pub const DEFAULT_BASELINE_WINDOW: usize = 28;
/// Default number of most recent days averaged for the trend figure.
pub const DEFAULT_SHORT_WINDOW: usize = 7;
/// Default number of days inspected by anomaly and change-point detection.
pub const DEFAULT_DETECTION_WINDOW: usize = 30;

/// How the per-segment penalty of the change-point search is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PenaltyPolicy {
    /// The same penalty regardless of window length.
    Fixed(f64),
    /// `scale * ln(n + 1)` for a window of `n` samples.
    LogLength(f64),
}

impl PenaltyPolicy {
    /// Resolves the penalty for a signal of `n` samples.
    pub fn resolve(&self, n: usize) -> f64 {
        match *self {
            PenaltyPolicy::Fixed(value) => value,
            PenaltyPolicy::LogLength(scale) => scale * ((n + 1) as f64).ln(),
        }
    }

    fn parameter(&self) -> (&'static str, f64) {
        match *self {
            PenaltyPolicy::Fixed(value) => ("penalty", value),
            PenaltyPolicy::LogLength(scale) => ("penalty scale", scale),
        }
    }
}

impl Default for PenaltyPolicy {
    fn default() -> Self {
        PenaltyPolicy::LogLength(3.0)
    }
}

/// Parameters of the change-point search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangePointConfig {
    /// Per-segment penalty policy.
    pub penalty: PenaltyPolicy,
    /// Minimum number of samples in a segment.
    pub min_size: usize,
    /// Grid spacing of candidate breakpoints (1 searches every position).
    pub jump: usize,
}

impl Default for ChangePointConfig {
    fn default() -> Self {
        Self {
            penalty: PenaltyPolicy::default(),
            min_size: 2,
            jump: 1,
        }
    }
}

/// Configuration shared by the trend, anomaly and change-point analyzers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightsConfig {
    /// Days averaged for the trend baseline.
    pub baseline_window: usize,
    /// Most recent days averaged for the trend figure; also the minimum
    /// number of samples a trend needs.
    pub short_window: usize,
    /// Days inspected by anomaly and change-point detection.
    pub detection_window: usize,
    /// Trend differences below this many seconds are reported as no change.
    pub noise_floor_seconds: f64,
    /// Absolute z-score at or above which a sample is anomalous.
    pub anomaly_threshold: f64,
    /// Change-point search parameters.
    pub change_point: ChangePointConfig,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            baseline_window: DEFAULT_BASELINE_WINDOW,
            short_window: DEFAULT_SHORT_WINDOW,
            detection_window: DEFAULT_DETECTION_WINDOW,
            noise_floor_seconds: 60.0,
            anomaly_threshold: 3.0,
            change_point: ChangePointConfig::default(),
        }
    }
}

impl InsightsConfig {
    /// The constants the first production deployment ran with: a 1-sigma
    /// anomaly threshold, a fixed penalty of 1 and a 5-sample breakpoint grid.
    pub fn shipped() -> Self {
        Self {
            anomaly_threshold: 1.0,
            change_point: ChangePointConfig {
                penalty: PenaltyPolicy::Fixed(1.0),
                min_size: 2,
                jump: 5,
            },
            ..Self::default()
        }
    }

    /// Parses a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the trend baseline window.
    pub fn with_baseline_window(mut self, days: usize) -> Self {
        self.baseline_window = days;
        self
    }

    /// Sets the short trend window.
    pub fn with_short_window(mut self, days: usize) -> Self {
        self.short_window = days;
        self
    }

    /// Sets the detection window.
    pub fn with_detection_window(mut self, days: usize) -> Self {
        self.detection_window = days;
        self
    }

    /// Sets the trend noise floor in seconds.
    pub fn with_noise_floor(mut self, seconds: f64) -> Self {
        self.noise_floor_seconds = seconds;
        self
    }

    /// Sets the anomaly z-score threshold.
    pub fn with_anomaly_threshold(mut self, threshold: f64) -> Self {
        self.anomaly_threshold = threshold;
        self
    }

    /// Sets the change-point penalty policy.
    pub fn with_penalty(mut self, penalty: PenaltyPolicy) -> Self {
        self.change_point.penalty = penalty;
        self
    }

    /// Sets the change-point search parameters.
    pub fn with_change_point(mut self, change_point: ChangePointConfig) -> Self {
        self.change_point = change_point;
        self
    }

    /// Checks that every parameter is usable.
    pub fn validate(&self) -> Result<()> {
        if self.short_window == 0 {
            return Err(InsightError::invalid_config("short_window must be positive"));
        }
        if self.baseline_window < self.short_window {
            return Err(InsightError::invalid_config(format!(
                "baseline_window ({}) must be at least short_window ({})",
                self.baseline_window, self.short_window
            )));
        }
        if self.detection_window < 2 {
            return Err(InsightError::invalid_config(format!(
                "detection_window must be at least 2, got: {}",
                self.detection_window
            )));
        }
        validate_non_negative(self.noise_floor_seconds, "noise_floor_seconds")?;
        validate_non_negative(self.anomaly_threshold, "anomaly_threshold")?;

        let (name, value) = self.change_point.penalty.parameter();
        validate_non_negative(value, name)?;
        if self.change_point.min_size == 0 {
            return Err(InsightError::invalid_config("min_size must be positive"));
        }
        if self.change_point.jump == 0 {
            return Err(InsightError::invalid_config("jump must be positive"));
        }
        Ok(())
    }
}

fn validate_non_negative(value: f64, name: &str) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(InsightError::invalid_config(format!(
            "{name} must be finite and non-negative, got: {value}"
        )));
    }
    Ok(())
}
