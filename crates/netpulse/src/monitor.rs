//! The monitor loop.
//!
//! One iteration: probe reachability, measure throughput if the link is up,
//! append exactly one sample to the log. Failures degrade to a
//! zero-throughput `Unavailable` sample; the loop never terminates on error.

use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::probe::Prober;
use crate::sample::Sample;
use crate::speedtest::SpeedTest;
use crate::storage::Store;

/// Periodic connectivity and throughput monitor.
#[derive(Debug)]
pub struct Monitor {
    config: Config,
    prober: Prober,
    speedtest: SpeedTest,
    store: Store,
}

impl Monitor {
    /// Create a monitor, opening (or creating) the sample log.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing log file cannot be read.
    pub fn new(config: Config) -> Result<Self> {
        let prober = Prober::new(config.probe.url.clone(), config.probe_timeout());
        let speedtest = SpeedTest::new(config.speedtest.clone());
        let store = Store::open(config.log_path())?;
        Ok(Self {
            config,
            prober,
            speedtest,
            store,
        })
    }

    /// Access the underlying sample log.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Perform one iteration and return the sample it produced.
    ///
    /// Exactly one sample is appended per call. Probe failures, measurement
    /// errors, and even log-write errors never propagate; the latter are
    /// logged and the sample stays in memory for the next rewrite.
    pub async fn tick(&mut self) -> Sample {
        let sample = if self.prober.is_online().await {
            match self.speedtest.run().await {
                Ok(throughput) => {
                    Sample::available(throughput.download_mbps, throughput.upload_mbps)
                }
                Err(err) => {
                    warn!("Speed test failed, recording unavailable: {err}");
                    Sample::unavailable()
                }
            }
        } else {
            info!("Internet unreachable");
            Sample::unavailable()
        };

        if let Err(err) = self.store.append(sample.clone()) {
            error!("Failed to persist sample: {err}");
        }
        sample
    }

    /// Run the monitor loop.
    ///
    /// With `once` set, performs a single iteration and returns; otherwise
    /// loops forever with the configured delay between iterations.
    pub async fn run(&mut self, once: bool) {
        self.store.log_summary();
        info!(
            "Monitoring every {} s, logging to {}",
            self.config.monitor.interval_secs,
            self.store.path().display()
        );

        loop {
            let sample = self.tick().await;
            info!(
                "Recorded: {} ({:.2} Mbps down / {:.2} Mbps up)",
                sample.status, sample.download_mbps, sample.upload_mbps
            );

            if once {
                return;
            }
            sleep(self.config.interval()).await;
        }
    }
}
