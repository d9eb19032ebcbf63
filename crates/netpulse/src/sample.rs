//! Core observation types for netpulse.
//!
//! This module defines the record type that the monitor appends to the
//! JSON log on every iteration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether the internet was reachable when a sample was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionStatus {
    /// The reachability probe succeeded.
    Available,
    /// The probe failed, or the throughput measurement errored out.
    Unavailable,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available => write!(f, "Available"),
            Self::Unavailable => write!(f, "Unavailable"),
        }
    }
}

/// A single throughput observation.
///
/// One sample is appended to the log per monitor iteration. The wire field
/// names (`download_speed`, `upload_speed`, `internet_status`) are the
/// historical log format; speeds are megabits per second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// When this observation was taken.
    pub timestamp: DateTime<Utc>,

    /// Measured download throughput in Mbps.
    #[serde(rename = "download_speed")]
    pub download_mbps: f64,

    /// Measured upload throughput in Mbps.
    #[serde(rename = "upload_speed")]
    pub upload_mbps: f64,

    /// Reachability status at measurement time.
    #[serde(rename = "internet_status")]
    pub status: ConnectionStatus,
}

impl Sample {
    /// Create a sample for a successful measurement, timestamped now.
    #[must_use]
    pub fn available(download_mbps: f64, upload_mbps: f64) -> Self {
        Self {
            timestamp: Utc::now(),
            download_mbps,
            upload_mbps,
            status: ConnectionStatus::Available,
        }
    }

    /// Create a zero-throughput sample for an unreachable iteration.
    ///
    /// Unavailable samples always carry 0.0 download and upload.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            timestamp: Utc::now(),
            download_mbps: 0.0,
            upload_mbps: 0.0,
            status: ConnectionStatus::Unavailable,
        }
    }

    /// Check whether this sample recorded an unreachable internet.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        self.status == ConnectionStatus::Unavailable
    }
}
