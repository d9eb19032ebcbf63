//! Storage layer for netpulse.
//!
//! The log is a single JSON array of samples, fully rewritten on every
//! append. Writes go to a temporary file in the same directory followed by
//! a rename, so the log is valid JSON after every write. A missing or
//! corrupt log is treated as empty on open.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::sample::Sample;

/// JSON-file backed sample log.
///
/// Holds the full sample history in memory; the sequence only grows.
#[derive(Debug)]
pub struct Store {
    /// Path to the log file.
    path: PathBuf,
    /// All samples, in append order.
    samples: Vec<Sample>,
}

impl Store {
    /// Open a store, loading any existing log at the given path.
    ///
    /// A missing file yields an empty store. A file that does not parse as
    /// a JSON array of samples also yields an empty store, logged at WARN;
    /// the corrupt content is overwritten on the next append.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let samples = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            match serde_json::from_str::<Vec<Sample>>(&raw) {
                Ok(samples) => {
                    debug!("Loaded {} samples from {}", samples.len(), path.display());
                    samples
                }
                Err(err) => {
                    warn!(
                        "Log file {} is not valid JSON ({}), starting empty",
                        path.display(),
                        err
                    );
                    Vec::new()
                }
            }
        } else {
            debug!("No log file at {}, starting empty", path.display());
            Vec::new()
        };

        Ok(Self { path, samples })
    }

    /// Get the path to the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a sample and rewrite the log file.
    ///
    /// # Errors
    ///
    /// Returns an error if the rewrite fails. The sample is retained in
    /// memory either way, so a later successful append persists it.
    pub fn append(&mut self, sample: Sample) -> Result<()> {
        self.samples.push(sample);
        self.save()
    }

    /// Rewrite the whole log file from the in-memory samples.
    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let json = serde_json::to_string(&self.samples)?;

        // Write to a sibling temp file and rename so readers never observe
        // a partially written log.
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|source| Error::LogWrite {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|source| Error::LogWrite {
            path: self.path.clone(),
            source,
        })?;

        debug!("Wrote {} samples to {}", self.samples.len(), self.path.display());
        Ok(())
    }

    /// All samples in append order.
    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// The most recent `n` samples, oldest first.
    #[must_use]
    pub fn recent(&self, n: usize) -> &[Sample] {
        let start = self.samples.len().saturating_sub(n);
        &self.samples[start..]
    }

    /// Number of samples in the log.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Count of samples that recorded the internet as available.
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.samples.iter().filter(|s| !s.is_unavailable()).count()
    }

    /// Count of samples that recorded an outage.
    #[must_use]
    pub fn outage_count(&self) -> usize {
        self.samples.iter().filter(|s| s.is_unavailable()).count()
    }

    /// Average number of outage samples per observed day.
    ///
    /// A day is a UTC calendar date that appears in the log; days with no
    /// samples at all are not counted. Returns `None` for an empty log.
    #[must_use]
    pub fn daily_outage_average(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let days: HashSet<NaiveDate> = self
            .samples
            .iter()
            .map(|s| s.timestamp.date_naive())
            .collect();
        #[allow(clippy::cast_precision_loss)]
        Some(self.outage_count() as f64 / days.len() as f64)
    }

    /// Mean download speed in Mbps over available samples.
    ///
    /// Outage samples carry zero throughput by construction and are
    /// excluded. Returns `None` when no available sample exists.
    #[must_use]
    pub fn average_download_mbps(&self) -> Option<f64> {
        mean(
            self.samples
                .iter()
                .filter(|s| !s.is_unavailable())
                .map(|s| s.download_mbps),
        )
    }

    /// Mean upload speed in Mbps over available samples.
    ///
    /// Returns `None` when no available sample exists.
    #[must_use]
    pub fn average_upload_mbps(&self) -> Option<f64> {
        mean(
            self.samples
                .iter()
                .filter(|s| !s.is_unavailable())
                .map(|s| s.upload_mbps),
        )
    }

    /// Log a short summary of the store contents at INFO.
    pub fn log_summary(&self) {
        info!(
            "Log {}: {} samples ({} available)",
            self.path.display(),
            self.len(),
            self.available_count()
        );
    }
}

/// Arithmetic mean, or `None` for an empty sequence.
#[allow(clippy::cast_precision_loss)]
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut sum = 0.0;
    let mut count: usize = 0;
    for value in values {
        sum += value;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
