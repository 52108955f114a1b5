//! Error types for the insights engine.
//!
//! Only genuine failures are represented here. Insufficient data (empty
//! windows, all-missing series, constant signals for anomaly detection) is
//! not an error: analyzers report it as `None`.

use thiserror::Error;

/// The main error type for the insights engine.
#[derive(Error, Debug)]
pub enum InsightError {
    /// A metric key outside the supported enumeration was requested.
    #[error("Unknown metric: '{0}' (expected one of time_in_bed, low_activity, high_activity, at_rest)")]
    InvalidMetric(String),

    /// Invalid configuration or parameters.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The series provider failed to return a window.
    #[error("Series provider error: {message}")]
    Provider {
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An in-memory limit was reached.
    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A type alias for `Result<T, InsightError>`.
pub type Result<T> = std::result::Result<T, InsightError>;

impl InsightError {
    /// Creates an invalid configuration error with the given message.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Creates a provider error without an underlying cause.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a provider error wrapping the error that caused it.
    pub fn provider_with_source(
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Provider {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Returns true when the error was caused by the caller's input rather
    /// than by the engine or its collaborators.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidMetric(_) | Self::InvalidConfiguration(_) | Self::Serialization(_)
        )
    }
}

impl From<serde_json::Error> for InsightError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_invalid_metric_message() {
        let err = InsightError::InvalidMetric("heart_rate".to_string());
        assert!(err.to_string().contains("heart_rate"));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_provider_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "db timeout");
        let err = InsightError::provider_with_source("fetch failed", Box::new(io));

        assert_eq!(err.to_string(), "Series provider error: fetch failed");
        assert!(err.source().is_some());
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_from_serde_json() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: InsightError = parse.unwrap_err().into();
        assert!(matches!(err, InsightError::Serialization(_)));
    }
}
