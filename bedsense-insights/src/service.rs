//! Entry points that fetch a window and run an analyzer on it.
//!
//! [`InsightsService`] is what an application embeds: it parses the metric
//! key, asks the [`SeriesProvider`] for as many recent samples as the chosen
//! analyzer inspects, and returns the analyzer's result. `Ok(None)` means the
//! resident has too little usable data; an unknown metric key is an error.
//!
//! ```rust,no_run
//! use bedsense_insights::prelude::*;
//!
//! # async fn example() -> Result<()> {
//! let provider = InMemorySeriesProvider::new();
//! let service = InsightsService::builder()
//!     .provider(Box::new(provider))
//!     .config(InsightsConfig::default())
//!     .build()?;
//!
//! if let Some(trend) = service.compute_trend(ResidentId(1), "time_in_bed").await? {
//!     println!("{}", trend.description);
//! }
//! # Ok(())
//! # }
//! ```

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::analyzers::{
    AnomalyDetector, AnomalyResult, ChangePointDetector, ChangePointResult, SeriesAnalyzer,
    TrendAnalyzer, TrendResult,
};
use crate::config::InsightsConfig;
use crate::error::{InsightError, Result};
use crate::provider::SeriesProvider;
use crate::series::{Metric, ResidentId};

/// The insight an analyzer produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    /// Recent average against the baseline.
    Trend,
    /// Z-score outliers.
    Anomalies,
    /// PELT change points.
    ChangePoints,
}

/// A computed insight of any kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Insight {
    /// See [`TrendResult`].
    Trend(TrendResult),
    /// See [`AnomalyResult`].
    Anomalies(AnomalyResult),
    /// See [`ChangePointResult`].
    ChangePoints(ChangePointResult),
}

impl Insight {
    /// The kind of this insight.
    pub fn kind(&self) -> InsightKind {
        match self {
            Insight::Trend(_) => InsightKind::Trend,
            Insight::Anomalies(_) => InsightKind::Anomalies,
            Insight::ChangePoints(_) => InsightKind::ChangePoints,
        }
    }
}

/// One entry of a batch computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightRequest {
    /// Resident to analyze.
    pub resident_id: ResidentId,
    /// Metric key as received from the caller, e.g. `"time_in_bed"`.
    pub metric_key: String,
    /// Insight to compute.
    pub kind: InsightKind,
}

impl InsightRequest {
    /// Creates a request.
    pub fn new(resident_id: ResidentId, metric_key: impl Into<String>, kind: InsightKind) -> Self {
        Self {
            resident_id,
            metric_key: metric_key.into(),
            kind,
        }
    }
}

/// Computes insights from series fetched through a provider.
pub struct InsightsService {
    provider: Box<dyn SeriesProvider>,
    config: InsightsConfig,
}

impl InsightsService {
    /// Creates a new builder for the service.
    pub fn builder() -> InsightsServiceBuilder {
        InsightsServiceBuilder::default()
    }

    /// The configuration the analyzers are built from.
    pub fn config(&self) -> &InsightsConfig {
        &self.config
    }

    /// Compares the last week with the 28-day baseline (by default).
    #[instrument(skip(self))]
    pub async fn compute_trend(
        &self,
        resident_id: ResidentId,
        metric_key: &str,
    ) -> Result<Option<TrendResult>> {
        let metric = metric_key.parse::<Metric>()?;
        self.run(&TrendAnalyzer::from_config(&self.config), resident_id, metric)
            .await
    }

    /// Flags outliers in the detection window.
    #[instrument(skip(self))]
    pub async fn compute_anomalies(
        &self,
        resident_id: ResidentId,
        metric_key: &str,
    ) -> Result<Option<AnomalyResult>> {
        let metric = metric_key.parse::<Metric>()?;
        self.run(&AnomalyDetector::from_config(&self.config), resident_id, metric)
            .await
    }

    /// Locates mean shifts in the detection window.
    #[instrument(skip(self))]
    pub async fn compute_change_points(
        &self,
        resident_id: ResidentId,
        metric_key: &str,
    ) -> Result<Option<ChangePointResult>> {
        let metric = metric_key.parse::<Metric>()?;
        self.run(&ChangePointDetector::from_config(&self.config), resident_id, metric)
            .await
    }

    /// Computes one insight of the requested kind.
    pub async fn compute(
        &self,
        resident_id: ResidentId,
        metric_key: &str,
        kind: InsightKind,
    ) -> Result<Option<Insight>> {
        Ok(match kind {
            InsightKind::Trend => self
                .compute_trend(resident_id, metric_key)
                .await?
                .map(Insight::Trend),
            InsightKind::Anomalies => self
                .compute_anomalies(resident_id, metric_key)
                .await?
                .map(Insight::Anomalies),
            InsightKind::ChangePoints => self
                .compute_change_points(resident_id, metric_key)
                .await?
                .map(Insight::ChangePoints),
        })
    }

    /// Computes independent requests concurrently.
    ///
    /// Results are returned in request order. A failing request does not
    /// affect the others.
    #[instrument(skip(self, requests), fields(requests = requests.len()))]
    pub async fn compute_batch(&self, requests: &[InsightRequest]) -> Vec<Result<Option<Insight>>> {
        let results = join_all(
            requests
                .iter()
                .map(|req| self.compute(req.resident_id, &req.metric_key, req.kind)),
        )
        .await;

        for (req, result) in requests.iter().zip(&results) {
            if let Err(e) = result {
                warn!(
                    resident_id = %req.resident_id,
                    metric_key = %req.metric_key,
                    kind = ?req.kind,
                    error = %e,
                    "Insight request failed"
                );
            }
        }

        results
    }

    async fn run<A: SeriesAnalyzer>(
        &self,
        analyzer: &A,
        resident_id: ResidentId,
        metric: Metric,
    ) -> Result<Option<A::Output>> {
        let samples = self
            .provider
            .fetch(resident_id, metric, analyzer.window_size())
            .await?;

        debug!(
            analyzer = analyzer.name(),
            %resident_id,
            %metric,
            samples = samples.len(),
            "Running analyzer"
        );

        let result = analyzer.analyze(resident_id, metric, &samples);
        if result.is_none() {
            info!(
                analyzer = analyzer.name(),
                %resident_id,
                %metric,
                "Insufficient data for insight"
            );
        }
        Ok(result)
    }
}

/// Builder for InsightsService.
#[derive(Default)]
pub struct InsightsServiceBuilder {
    provider: Option<Box<dyn SeriesProvider>>,
    config: InsightsConfig,
}

impl InsightsServiceBuilder {
    /// Sets the series provider.
    pub fn provider(mut self, provider: Box<dyn SeriesProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Sets the configuration.
    pub fn config(mut self, config: InsightsConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the service, validating the configuration.
    pub fn build(self) -> Result<InsightsService> {
        let provider = self
            .provider
            .ok_or_else(|| InsightError::invalid_config("Series provider is required"))?;
        self.config.validate()?;

        Ok(InsightsService {
            provider,
            config: self.config,
        })
    }
}
