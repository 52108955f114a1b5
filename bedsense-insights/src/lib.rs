//! # bedsense-insights - Sleep and activity insights for Rust
//!
//! Turns a resident's daily in-bed sensor readings (time in bed, low and high
//! activity, time at rest) into three kinds of insight:
//!
//! - a **trend**: the last week's average against a four-week baseline,
//! - **anomalies**: days whose z-score within the last 30 days reaches a
//!   threshold,
//! - **change points**: days after which the mean level shifts, located with
//!   PELT under an L2 cost.
//!
//! Gaps in a series are forward-filled, then leading gaps are back-filled.
//! Durations are rendered as `"7h 30min"`-style strings by one shared
//! formatter.
//!
//! ## Quick Start
//!
//! ```rust
//! use bedsense_insights::prelude::*;
//! use chrono::{Duration, NaiveDate};
//!
//! # async fn example() -> Result<()> {
//! let provider = InMemorySeriesProvider::new();
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let records = (0..30).map(|day| {
//!     let seconds = if day < 23 { 28_800.0 } else { 14_400.0 };
//!     DailyRecord::empty(start + Duration::days(day)).with_metric(Metric::TimeInBed, seconds)
//! });
//! provider.upsert_records(ResidentId(1), records).await?;
//!
//! let service = InsightsService::builder()
//!     .provider(Box::new(provider))
//!     .build()?;
//!
//! let trend = service.compute_trend(ResidentId(1), "time_in_bed").await?;
//! assert_eq!(trend.unwrap().description, "time in bed decreased by 3h");
//!
//! let change_points = service.compute_change_points(ResidentId(1), "time_in_bed").await?;
//! assert_eq!(change_points.unwrap().change_point_indices, vec![22]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`analyzers`]: the trend, anomaly and change-point algorithms
//! - [`series`]: metric model, windowing and gap filling
//! - [`formatters`]: duration rendering and change classification
//! - [`config`]: analyzer parameters
//! - [`provider`]: where series come from
//! - [`service`]: fetch-and-analyze entry points
//! - [`logging`]: subscriber setup

pub mod analyzers;
pub mod config;
pub mod error;
pub mod formatters;
pub mod logging;
pub mod prelude;
pub mod provider;
pub mod series;
pub mod service;
