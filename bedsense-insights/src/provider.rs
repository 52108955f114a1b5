//! Access to stored metric series.
//!
//! Analyzers never load data themselves. A [`SeriesProvider`] returns the most
//! recent samples of one resident's metric, oldest first, and the service
//! hands them to an analyzer. [`InMemorySeriesProvider`] backs tests and
//! embedding applications that already hold their readings in memory.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{InsightError, Result};
use crate::series::{DailyRecord, Metric, MetricSample, ResidentId};

/// Source of metric windows.
#[async_trait]
pub trait SeriesProvider: Send + Sync {
    /// Retrieves up to `limit` of the most recent samples of a metric.
    ///
    /// # Arguments
    /// * `resident_id` - Resident whose readings are requested
    /// * `metric` - Metric to project each day onto
    /// * `limit` - Maximum number of samples to return
    ///
    /// Samples are ordered by date, oldest first. An unknown resident yields
    /// an empty series rather than an error.
    async fn fetch(
        &self,
        resident_id: ResidentId,
        metric: Metric,
        limit: usize,
    ) -> Result<Vec<MetricSample>>;
}

#[async_trait]
impl<P: SeriesProvider + ?Sized> SeriesProvider for Arc<P> {
    async fn fetch(
        &self,
        resident_id: ResidentId,
        metric: Metric,
        limit: usize,
    ) -> Result<Vec<MetricSample>> {
        (**self).fetch(resident_id, metric, limit).await
    }
}

/// Limits for [`InMemorySeriesProvider`].
#[derive(Debug, Clone)]
pub struct InMemorySeriesConfig {
    /// Maximum number of residents held (default: 1,000).
    pub max_residents: usize,
    /// Maximum number of days kept per resident (default: 3,650).
    pub max_records_per_resident: usize,
}

impl Default for InMemorySeriesConfig {
    fn default() -> Self {
        Self {
            max_residents: 1_000,
            max_records_per_resident: 3_650,
        }
    }
}

type Store = HashMap<ResidentId, BTreeMap<NaiveDate, DailyRecord>>;

/// In-memory daily readings keyed by resident and date.
///
/// New residents past `max_residents` are rejected. Past
/// `max_records_per_resident` the oldest days of that resident are evicted.
#[derive(Clone)]
pub struct InMemorySeriesProvider {
    data: Arc<tokio::sync::RwLock<Store>>,
    config: InMemorySeriesConfig,
}

impl InMemorySeriesProvider {
    /// Creates a provider with default limits.
    pub fn new() -> Self {
        Self::with_config(InMemorySeriesConfig::default())
    }

    /// Creates a provider with custom limits.
    pub fn with_config(config: InMemorySeriesConfig) -> Self {
        Self {
            data: Arc::new(tokio::sync::RwLock::new(HashMap::new())),
            config,
        }
    }

    /// Inserts a day of readings, replacing any record with the same date.
    pub async fn upsert_record(&self, resident_id: ResidentId, record: DailyRecord) -> Result<()> {
        self.upsert_records(resident_id, std::iter::once(record))
            .await
            .map(|_| ())
    }

    /// Inserts several days of readings for one resident.
    ///
    /// Returns the number of records written.
    pub async fn upsert_records<I>(&self, resident_id: ResidentId, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = DailyRecord> + Send,
        I::IntoIter: Send,
    {
        let mut data = self.data.write().await;

        if data.len() >= self.config.max_residents && !data.contains_key(&resident_id) {
            warn!(
                %resident_id,
                max_residents = self.config.max_residents,
                "Rejected readings for new resident"
            );
            return Err(InsightError::CapacityExceeded(format!(
                "Maximum residents limit ({}) exceeded",
                self.config.max_residents
            )));
        }

        let days = data.entry(resident_id).or_default();
        let mut written = 0;
        for record in records {
            days.insert(record.date, record);
            written += 1;
        }

        let excess = days.len().saturating_sub(self.config.max_records_per_resident);
        if excess > 0 {
            let evicted: Vec<NaiveDate> = days.keys().take(excess).copied().collect();
            for date in &evicted {
                days.remove(date);
            }
            info!(
                %resident_id,
                evicted = excess,
                remaining = days.len(),
                "Evicted oldest records"
            );
        }

        debug!(%resident_id, written, total = days.len(), "Stored daily records");
        Ok(written)
    }

    /// Number of days stored for a resident.
    pub async fn record_count(&self, resident_id: ResidentId) -> usize {
        self.data
            .read()
            .await
            .get(&resident_id)
            .map_or(0, BTreeMap::len)
    }

    /// Returns the current memory usage statistics.
    pub async fn memory_stats(&self) -> MemoryStats {
        let data = self.data.read().await;

        let total_records = data.values().map(BTreeMap::len).sum();
        let oldest_record = data
            .values()
            .filter_map(|days| days.keys().next())
            .min()
            .copied();
        let newest_record = data
            .values()
            .filter_map(|days| days.keys().next_back())
            .max()
            .copied();

        MemoryStats {
            total_residents: data.len(),
            total_records,
            oldest_record,
            newest_record,
            estimated_memory_bytes: Self::estimate_memory_usage(&data),
        }
    }

    fn estimate_memory_usage(data: &Store) -> usize {
        let per_record = std::mem::size_of::<NaiveDate>() + std::mem::size_of::<DailyRecord>();
        std::mem::size_of::<Store>()
            + data
                .values()
                .map(|days| {
                    std::mem::size_of::<ResidentId>()
                        + std::mem::size_of::<BTreeMap<NaiveDate, DailyRecord>>()
                        + days.len() * per_record
                })
                .sum::<usize>()
    }
}

impl Default for InMemorySeriesProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SeriesProvider for InMemorySeriesProvider {
    async fn fetch(
        &self,
        resident_id: ResidentId,
        metric: Metric,
        limit: usize,
    ) -> Result<Vec<MetricSample>> {
        let data = self.data.read().await;
        let Some(days) = data.get(&resident_id) else {
            debug!(%resident_id, "No readings stored for resident");
            return Ok(Vec::new());
        };

        let mut samples: Vec<MetricSample> = days
            .values()
            .rev()
            .take(limit)
            .map(|record| record.sample(metric))
            .collect();
        samples.reverse();
        Ok(samples)
    }
}

/// Memory usage statistics for the in-memory provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryStats {
    /// Number of residents with at least one record.
    pub total_residents: usize,
    /// Number of daily records across all residents.
    pub total_records: usize,
    /// Earliest stored date.
    pub oldest_record: Option<NaiveDate>,
    /// Latest stored date.
    pub newest_record: Option<NaiveDate>,
    /// Estimated memory usage in bytes.
    pub estimated_memory_bytes: usize,
}
