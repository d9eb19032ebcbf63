//! Internet reachability probe.
//!
//! A probe is a single timeout-bounded GET to a well-known endpoint. Any
//! transport error, timeout, or non-success status counts as unreachable;
//! the probe itself never fails.

use std::time::Duration;

use tracing::debug;

/// Reachability prober.
#[derive(Debug, Clone)]
pub struct Prober {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl Prober {
    /// Create a prober for the given endpoint and timeout.
    #[must_use]
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            timeout,
        }
    }

    /// Get the probe URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Check whether the internet is reachable.
    ///
    /// Returns `true` iff the probe request completes within the timeout
    /// with a success status.
    pub async fn is_online(&self) -> bool {
        debug!("Probing {} (timeout {:?})", self.url, self.timeout);
        let reachable = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false);
        if reachable {
            debug!("Probe OK");
        } else {
            debug!("Probe failed or timed out");
        }
        reachable
    }
}
