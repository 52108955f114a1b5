//! Human-readable rendering of durations and deltas.
//!
//! All three analyzers present seconds the same way, so the formatting lives
//! here once.
//!
//! # Examples
//!
//! ```rust
//! use bedsense_insights::formatters::format_duration;
//!
//! assert_eq!(format_duration(Some(9000.0)), "2h 30min");
//! assert_eq!(format_duration(Some(-3600.0)), "1h");
//! assert_eq!(format_duration(None), "N/A");
//! ```

use serde::{Deserialize, Serialize};

use crate::series::Metric;

const SECONDS_PER_HOUR: f64 = 3600.0;
const SECONDS_PER_MINUTE: f64 = 60.0;

/// Splits an absolute duration into whole hours and leftover whole minutes.
fn hours_minutes(seconds: f64) -> (u64, u64) {
    let abs = seconds.abs();
    let hours = (abs / SECONDS_PER_HOUR).floor() as u64;
    let minutes = ((abs % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE).floor() as u64;
    (hours, minutes)
}

/// Formats seconds as `"{h}h {m}min"`, `"{h}h"` or `"{m}min"`.
///
/// The sign is dropped; callers that need a direction use
/// [`ChangeDirection::classify`]. Missing or non-finite input renders as
/// `"N/A"`.
pub fn format_duration(seconds: Option<f64>) -> String {
    let Some(seconds) = seconds.filter(|s| s.is_finite()) else {
        return "N/A".to_string();
    };

    match hours_minutes(seconds) {
        (0, minutes) => format!("{minutes}min"),
        (hours, 0) => format!("{hours}h"),
        (hours, minutes) => format!("{hours}h {minutes}min"),
    }
}

/// Direction of a change once noise below the floor is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeDirection {
    /// The change is smaller than the noise floor.
    Negligible,
    /// The value went up.
    Increase,
    /// The value went down.
    Decrease,
}

impl ChangeDirection {
    /// Classifies `delta` against a noise floor (in the same unit).
    pub fn classify(delta: f64, noise_floor: f64) -> Self {
        if delta.abs() < noise_floor {
            ChangeDirection::Negligible
        } else if delta > 0.0 {
            ChangeDirection::Increase
        } else {
            ChangeDirection::Decrease
        }
    }

    /// Past-tense verb used in descriptions.
    pub fn verb(&self) -> Option<&'static str> {
        match self {
            ChangeDirection::Negligible => None,
            ChangeDirection::Increase => Some("increased"),
            ChangeDirection::Decrease => Some("decreased"),
        }
    }
}

/// Spelled-out form used in trend sentences: `"2h and 35 minutes"`.
fn time_phrase(seconds: f64) -> String {
    match hours_minutes(seconds) {
        (0, minutes) => format!("{minutes} minutes"),
        (hours, 0) => format!("{hours}h"),
        (hours, minutes) => format!("{hours}h and {minutes} minutes"),
    }
}

/// Describes a change of `metric` by `delta` seconds.
///
/// Returns `"≈ no change"` below the noise floor, otherwise e.g.
/// `"time in bed decreased by 2h and 35 minutes"`.
pub fn describe_change(metric: Metric, delta: f64, noise_floor: f64) -> String {
    match ChangeDirection::classify(delta, noise_floor).verb() {
        None => "≈ no change".to_string(),
        Some(verb) => format!(
            "{} {verb} by {}",
            metric.human_name(),
            time_phrase(delta)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_examples() {
        assert_eq!(format_duration(None), "N/A");
        assert_eq!(format_duration(Some(9000.0)), "2h 30min");
        assert_eq!(format_duration(Some(3600.0)), "1h");
        assert_eq!(format_duration(Some(120.0)), "2min");
        assert_eq!(format_duration(Some(0.0)), "0min");
    }

    #[test]
    fn test_format_duration_drops_sign() {
        assert_eq!(format_duration(Some(-9000.0)), "2h 30min");
        assert_eq!(format_duration(Some(-59.0)), "0min");
    }

    #[test]
    fn test_format_duration_truncates() {
        // 1h 59min 59s
        assert_eq!(format_duration(Some(7199.0)), "1h 59min");
        assert_eq!(format_duration(Some(f64::NAN)), "N/A");
    }

    #[test]
    fn test_classify_direction() {
        assert_eq!(ChangeDirection::classify(59.9, 60.0), ChangeDirection::Negligible);
        assert_eq!(ChangeDirection::classify(-59.9, 60.0), ChangeDirection::Negligible);
        assert_eq!(ChangeDirection::classify(60.0, 60.0), ChangeDirection::Increase);
        assert_eq!(ChangeDirection::classify(-600.0, 60.0), ChangeDirection::Decrease);
    }

    #[test]
    fn test_describe_change() {
        assert_eq!(describe_change(Metric::TimeInBed, 30.0, 60.0), "≈ no change");
        assert_eq!(
            describe_change(Metric::TimeInBed, -9300.0, 60.0),
            "time in bed decreased by 2h and 35 minutes"
        );
        assert_eq!(
            describe_change(Metric::HighActivity, 1800.0, 60.0),
            "high activity increased by 30 minutes"
        );
        assert_eq!(
            describe_change(Metric::AtRest, -7200.0, 60.0),
            "at rest decreased by 2h"
        );
    }
}
