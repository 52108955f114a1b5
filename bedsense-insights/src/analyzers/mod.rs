//! Statistical analyzers that turn a metric window into an insight.
//!
//! ## Available Analyzers
//!
//! - **Trend** (`trend`): recent average against a rolling baseline
//! - **Anomaly** (`anomaly`): z-score outliers within the window
//! - **Change points** (`change_point`): PELT segmentation with an L2 cost
//!
//! Every analyzer is a pure function of the samples it receives. Insufficient
//! data is reported as `None`; nothing here performs I/O.
//!
//! ## Example
//!
//! ```rust
//! use bedsense_insights::analyzers::{compute_anomalies, SeriesAnalyzer, TrendAnalyzer};
//! use bedsense_insights::config::InsightsConfig;
//! use bedsense_insights::series::{Metric, MetricSample, ResidentId};
//! use chrono::{Duration, NaiveDate};
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let samples: Vec<_> = (0..30)
//!     .map(|i| {
//!         let seconds = if i == 15 { 7_200.0 } else { 28_800.0 };
//!         MetricSample::present(start + Duration::days(i), seconds)
//!     })
//!     .collect();
//!
//! let config = InsightsConfig::default();
//! let anomalies = compute_anomalies(ResidentId(1), Metric::TimeInBed, &samples, &config)
//!     .expect("the outlier makes the window non-degenerate");
//! assert_eq!(anomalies.anomaly_indices, vec![15]);
//!
//! let trend = TrendAnalyzer::from_config(&config)
//!     .analyze(ResidentId(1), Metric::TimeInBed, &samples)
//!     .expect("30 samples are enough for a trend");
//! assert_eq!(trend.recent_average, "8h");
//! ```

pub mod anomaly;
pub mod change_point;
pub mod stats;
pub mod trend;

pub use anomaly::{compute_anomalies, AnomalyDetector, AnomalyResult};
pub use change_point::{compute_change_points, ChangePointDetector, ChangePointResult};
pub use trend::{compute_trend, TrendAnalyzer, TrendResult};

use crate::series::{Metric, MetricSample, ResidentId};

/// Common interface of the insight analyzers.
///
/// Implementations inspect at most [`window_size`](Self::window_size) of the
/// most recent samples and return `None` when the window cannot support a
/// meaningful result.
pub trait SeriesAnalyzer: Send + Sync {
    /// The insight produced on success.
    type Output: Send;

    /// Returns the name of this analyzer.
    fn name(&self) -> &str;

    /// Returns a description of this analyzer.
    fn description(&self) -> &str;

    /// Number of most recent samples the analyzer needs from a provider.
    fn window_size(&self) -> usize;

    /// Computes the insight for one resident's metric series.
    ///
    /// # Arguments
    /// * `resident_id` - Resident the series belongs to
    /// * `metric` - Metric the series holds
    /// * `samples` - Samples sorted by date, oldest first
    fn analyze(
        &self,
        resident_id: ResidentId,
        metric: Metric,
        samples: &[MetricSample],
    ) -> Option<Self::Output>;
}
