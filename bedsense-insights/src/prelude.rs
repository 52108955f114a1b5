//! Prelude for commonly used types and traits in bedsense-insights.

pub use crate::analyzers::{
    AnomalyDetector, AnomalyResult, ChangePointDetector, ChangePointResult, SeriesAnalyzer,
    TrendAnalyzer, TrendResult,
};
pub use crate::config::{ChangePointConfig, InsightsConfig, PenaltyPolicy};
pub use crate::error::{InsightError, Result};
pub use crate::formatters::{format_duration, ChangeDirection};
pub use crate::provider::{InMemorySeriesProvider, SeriesProvider};
pub use crate::series::{DailyRecord, Metric, MetricSample, ResidentId};
pub use crate::service::{Insight, InsightKind, InsightRequest, InsightsService};
