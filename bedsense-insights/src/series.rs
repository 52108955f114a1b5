//! Metric series model and gap-filling preparation.
//!
//! A series is a sequence of [`MetricSample`]s ordered oldest first with
//! unique dates. Samples may be missing a value; [`prepare`] resolves those
//! gaps before any statistic is computed.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::InsightError;

/// Identifier of a resident whose sensor readings are analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResidentId(pub i64);

impl fmt::Display for ResidentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ResidentId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// The daily duration metrics that can be analyzed. All values are seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Total time spent in bed.
    TimeInBed,
    /// Time with small movements.
    LowActivity,
    /// Time with large movements (restlessness).
    HighActivity,
    /// Time lying still.
    AtRest,
}

impl Metric {
    /// Every supported metric, in key order.
    pub const ALL: [Metric; 4] = [
        Metric::TimeInBed,
        Metric::LowActivity,
        Metric::HighActivity,
        Metric::AtRest,
    ];

    /// The wire key of this metric.
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::TimeInBed => "time_in_bed",
            Metric::LowActivity => "low_activity",
            Metric::HighActivity => "high_activity",
            Metric::AtRest => "at_rest",
        }
    }

    /// The key with underscores replaced by spaces, for descriptions.
    pub fn human_name(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = InsightError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        match key {
            "time_in_bed" => Ok(Metric::TimeInBed),
            "low_activity" => Ok(Metric::LowActivity),
            "high_activity" => Ok(Metric::HighActivity),
            "at_rest" => Ok(Metric::AtRest),
            other => Err(InsightError::InvalidMetric(other.to_string())),
        }
    }
}

/// A single day's value of one metric. `None` marks a gap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Calendar day of the reading.
    pub date: NaiveDate,
    /// Value in seconds, if one was recorded.
    pub value: Option<f64>,
}

impl MetricSample {
    /// Creates a sample. Non-finite values are stored as gaps.
    pub fn new(date: NaiveDate, value: Option<f64>) -> Self {
        Self {
            date,
            value: value.filter(|v| v.is_finite()),
        }
    }

    /// Creates a sample with a recorded value.
    pub fn present(date: NaiveDate, value: f64) -> Self {
        Self::new(date, Some(value))
    }

    /// Creates a gap.
    pub fn missing(date: NaiveDate) -> Self {
        Self { date, value: None }
    }
}

/// One day of in-bed sensor readings for a resident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Calendar day of the readings.
    pub date: NaiveDate,
    /// Total time in bed (seconds).
    pub time_in_bed: Option<f64>,
    /// Time lying still (seconds).
    pub at_rest: Option<f64>,
    /// Time with small movements (seconds).
    pub low_activity: Option<f64>,
    /// Time with large movements (seconds).
    pub high_activity: Option<f64>,
    /// Number of times out of bed during the night.
    #[serde(default)]
    pub times_out_bed_night: Option<u32>,
    /// Number of times out of bed during the day.
    #[serde(default)]
    pub times_out_bed_day: Option<u32>,
}

impl DailyRecord {
    /// Creates a record for `date` with no readings.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            time_in_bed: None,
            at_rest: None,
            low_activity: None,
            high_activity: None,
            times_out_bed_night: None,
            times_out_bed_day: None,
        }
    }

    /// Sets the value of one duration metric.
    pub fn with_metric(mut self, metric: Metric, seconds: f64) -> Self {
        let slot = match metric {
            Metric::TimeInBed => &mut self.time_in_bed,
            Metric::LowActivity => &mut self.low_activity,
            Metric::HighActivity => &mut self.high_activity,
            Metric::AtRest => &mut self.at_rest,
        };
        *slot = Some(seconds);
        self
    }

    /// Returns the value recorded for `metric`.
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::TimeInBed => self.time_in_bed,
            Metric::LowActivity => self.low_activity,
            Metric::HighActivity => self.high_activity,
            Metric::AtRest => self.at_rest,
        }
    }

    /// Projects this record onto a single metric.
    pub fn sample(&self, metric: Metric) -> MetricSample {
        MetricSample::new(self.date, self.value(metric))
    }
}

/// Returns the most recent `n` samples of an oldest-first series.
pub fn window(samples: &[MetricSample], n: usize) -> &[MetricSample] {
    &samples[samples.len().saturating_sub(n)..]
}

/// A series whose gaps have been filled.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
    resolved: bool,
}

impl PreparedSeries {
    /// Number of samples, including unresolved ones.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Returns true if the input series was empty.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Dates aligned with the values.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Returns true when every sample holds a value after filling.
    ///
    /// An empty series is trivially resolved; an all-missing one is not.
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// The filled values, or `None` if there is nothing to analyze.
    pub fn usable_values(&self) -> Option<&[f64]> {
        if self.resolved && !self.values.is_empty() {
            Some(&self.values)
        } else {
            None
        }
    }
}

/// Fills gaps forward from the nearest preceding value, then fills leading
/// gaps backward from the first recorded value.
///
/// An all-missing series cannot be filled and is returned unresolved.
pub fn prepare(samples: &[MetricSample]) -> PreparedSeries {
    let dates: Vec<NaiveDate> = samples.iter().map(|s| s.date).collect();

    let mut last = None;
    let mut filled: Vec<Option<f64>> = samples
        .iter()
        .map(|s| {
            if let Some(v) = s.value.filter(|v| v.is_finite()) {
                last = Some(v);
            }
            last
        })
        .collect();

    let first_known = filled.iter().flatten().next().copied();
    let resolved = match first_known {
        Some(first) => {
            for slot in filled.iter_mut().take_while(|slot| slot.is_none()) {
                *slot = Some(first);
            }
            true
        }
        None => samples.is_empty(),
    };

    let values = filled.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect();

    PreparedSeries {
        dates,
        values,
        resolved,
    }
}
