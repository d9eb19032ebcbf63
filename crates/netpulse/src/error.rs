//! Error types for netpulse.
//!
//! This module defines all error types used throughout the netpulse crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for netpulse operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Network Errors ===
    /// An HTTP request failed (probe or throughput measurement).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A throughput measurement produced an unusable result.
    #[error("speed test failed: {message}")]
    SpeedTest {
        /// Description of what went wrong.
        message: String,
    },

    // === Storage Errors ===
    /// Failed to write the log file.
    #[error("failed to write log file {path}: {source}")]
    LogWrite {
        /// Path to the log file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for netpulse operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new speed test error.
    #[must_use]
    pub fn speed_test(message: impl Into<String>) -> Self {
        Self::SpeedTest {
            message: message.into(),
        }
    }

    /// Check if this error is a configuration problem.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigLoad(_) | Self::ConfigValidation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation_display() {
        let err = Error::ConfigValidation {
            message: "interval_secs must be greater than 0".to_string(),
        };
        assert!(err.to_string().contains("interval_secs"));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_speed_test_error() {
        let err = Error::speed_test("download returned no data");
        assert_eq!(
            err.to_string(),
            "speed test failed: download returned no data"
        );
        assert!(!err.is_config_error());
    }

    #[test]
    fn test_log_write_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::LogWrite {
            path: PathBuf::from("/var/log/netpulse.json"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("/var/log/netpulse.json"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }
}
