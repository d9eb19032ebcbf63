//! Throughput measurement over HTTP.
//!
//! Download speed is measured by streaming a fixed-size payload from the
//! measurement endpoint and timing it; upload speed by POSTing a zero-filled
//! body of a fixed size. Both transfers are timeout-bounded and report in
//! megabits per second.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::SpeedTestConfig;
use crate::error::{Error, Result};

/// Result of a throughput measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Throughput {
    /// Download speed in Mbps.
    pub download_mbps: f64,
    /// Upload speed in Mbps.
    pub upload_mbps: f64,
}

/// HTTP-based speed tester.
#[derive(Debug, Clone)]
pub struct SpeedTest {
    client: reqwest::Client,
    config: SpeedTestConfig,
    timeout: Duration,
}

impl SpeedTest {
    /// Create a speed tester from configuration.
    #[must_use]
    pub fn new(config: SpeedTestConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        Self {
            client: reqwest::Client::new(),
            config,
            timeout,
        }
    }

    /// Run a full measurement: download, then upload.
    ///
    /// # Errors
    ///
    /// Returns an error if either transfer fails or times out. The caller
    /// (the monitor) degrades such iterations to an `Unavailable` sample.
    pub async fn run(&self) -> Result<Throughput> {
        let download_mbps = self.measure_download().await?;
        let upload_mbps = self.measure_upload().await?;

        // Zero throughput is reserved for unavailable samples.
        if download_mbps <= 0.0 || upload_mbps <= 0.0 {
            return Err(Error::speed_test("measured zero throughput"));
        }

        info!(
            "Speed test complete: {:.2} Mbps down / {:.2} Mbps up",
            download_mbps, upload_mbps
        );
        Ok(Throughput {
            download_mbps,
            upload_mbps,
        })
    }

    /// Measure download throughput.
    ///
    /// Streams the response body chunk by chunk so the whole payload is
    /// never buffered in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, times out, or yields no data.
    pub async fn measure_download(&self) -> Result<f64> {
        debug!(
            "Downloading {} bytes from {}",
            self.config.download_bytes, self.config.download_url
        );
        let start = Instant::now();
        let mut response = self
            .client
            .get(&self.config.download_url)
            .query(&[("bytes", self.config.download_bytes)])
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;

        let mut received: u64 = 0;
        while let Some(chunk) = response.chunk().await? {
            received += chunk.len() as u64;
        }
        let elapsed = start.elapsed();

        if received == 0 {
            return Err(Error::speed_test("download returned no data"));
        }

        let mbps = to_mbps(received, elapsed);
        debug!("Downloaded {} bytes in {:?} ({:.2} Mbps)", received, elapsed, mbps);
        Ok(mbps)
    }

    /// Measure upload throughput by POSTing a zero-filled payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or times out.
    pub async fn measure_upload(&self) -> Result<f64> {
        let payload_len = usize::try_from(self.config.upload_bytes)
            .map_err(|_| Error::speed_test("upload payload size does not fit in memory"))?;
        let payload = vec![0u8; payload_len];

        debug!(
            "Uploading {} bytes to {}",
            payload_len, self.config.upload_url
        );
        let start = Instant::now();
        self.client
            .post(&self.config.upload_url)
            .body(payload)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;
        let elapsed = start.elapsed();

        let mbps = to_mbps(self.config.upload_bytes, elapsed);
        debug!("Uploaded in {:?} ({:.2} Mbps)", elapsed, mbps);
        Ok(mbps)
    }
}

/// Convert a transferred byte count and elapsed time to megabits per second.
#[must_use]
#[allow(clippy::cast_precision_loss)]
fn to_mbps(bytes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0.0;
    }
    (bytes as f64 * 8.0) / secs / 1_000_000.0
}
