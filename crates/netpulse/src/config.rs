//! Configuration management for netpulse.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "netpulse";

/// Default log file name.
const LOG_FILE_NAME: &str = "speedtest_log.json";

/// Default reachability probe URL.
pub const DEFAULT_PROBE_URL: &str = "https://www.google.com";

/// Default download measurement endpoint.
pub const DEFAULT_DOWNLOAD_URL: &str = "https://speed.cloudflare.com/__down";

/// Default upload measurement endpoint.
pub const DEFAULT_UPLOAD_URL: &str = "https://speed.cloudflare.com/__up";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `NETPULSE_`)
/// 2. TOML config file at `~/.config/netpulse/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Monitor loop configuration.
    pub monitor: MonitorConfig,
    /// Reachability probe configuration.
    pub probe: ProbeConfig,
    /// Throughput measurement configuration.
    pub speedtest: SpeedTestConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
}

/// Monitor loop configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Seconds to sleep between iterations.
    pub interval_secs: u64,
}

/// Reachability probe configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// URL to request when checking reachability.
    pub url: String,
    /// Probe request timeout in seconds.
    pub timeout_secs: u64,
}

/// Throughput measurement configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedTestConfig {
    /// Download measurement endpoint.
    ///
    /// The payload size is requested via a `bytes` query parameter.
    pub download_url: String,
    /// Upload measurement endpoint.
    pub upload_url: String,
    /// Size of the download payload in bytes.
    pub download_bytes: u64,
    /// Size of the upload payload in bytes.
    pub upload_bytes: u64,
    /// Per-transfer timeout in seconds.
    pub timeout_secs: u64,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the JSON log file.
    /// Defaults to `~/.local/share/netpulse/speedtest_log.json`
    pub log_path: Option<PathBuf>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: 300, // 5 minutes
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_PROBE_URL.to_string(),
            timeout_secs: 5,
        }
    }
}

impl Default for SpeedTestConfig {
    fn default() -> Self {
        Self {
            download_url: DEFAULT_DOWNLOAD_URL.to_string(),
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            download_bytes: 10_000_000, // 10 MB
            upload_bytes: 2_000_000,    // 2 MB
            timeout_secs: 60,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `NETPULSE_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("NETPULSE_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.monitor.interval_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "monitor.interval_secs must be greater than 0".to_string(),
            });
        }

        if self.probe.timeout_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "probe.timeout_secs must be greater than 0".to_string(),
            });
        }

        if self.speedtest.timeout_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "speedtest.timeout_secs must be greater than 0".to_string(),
            });
        }

        if self.speedtest.download_bytes == 0 || self.speedtest.upload_bytes == 0 {
            return Err(Error::ConfigValidation {
                message: "speedtest payload sizes must be greater than 0".to_string(),
            });
        }

        for (name, url) in [
            ("probe.url", &self.probe.url),
            ("speedtest.download_url", &self.speedtest.download_url),
            ("speedtest.upload_url", &self.speedtest.upload_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(Error::ConfigValidation {
                    message: format!("{name} must be an http(s) URL, got: {url}"),
                });
            }
        }

        Ok(())
    }

    /// Get the log file path, resolving defaults if not set.
    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        self.storage
            .log_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(LOG_FILE_NAME))
    }

    /// Get the inter-iteration delay as a Duration.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.monitor.interval_secs)
    }

    /// Get the probe timeout as a Duration.
    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe.timeout_secs)
    }

    /// Get the speed test transfer timeout as a Duration.
    #[must_use]
    pub fn speedtest_timeout(&self) -> Duration {
        Duration::from_secs(self.speedtest.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.monitor.interval_secs, 300);
        assert_eq!(config.probe.url, DEFAULT_PROBE_URL);
        assert_eq!(config.probe.timeout_secs, 5);
        assert!(config.storage.log_path.is_none());
    }

    #[test]
    fn test_default_speedtest_config() {
        let speedtest = SpeedTestConfig::default();

        assert_eq!(speedtest.download_url, DEFAULT_DOWNLOAD_URL);
        assert_eq!(speedtest.upload_url, DEFAULT_UPLOAD_URL);
        assert_eq!(speedtest.download_bytes, 10_000_000);
        assert_eq!(speedtest.upload_bytes, 2_000_000);
        assert_eq!(speedtest.timeout_secs, 60);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_interval() {
        let mut config = Config::default();
        config.monitor.interval_secs = 0;

        let result = config.validate();
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("interval_secs"));
    }

    #[test]
    fn test_validate_zero_probe_timeout() {
        let mut config = Config::default();
        config.probe.timeout_secs = 0;

        let result = config.validate();
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("probe.timeout_secs"));
    }

    #[test]
    fn test_validate_zero_payload() {
        let mut config = Config::default();
        config.speedtest.download_bytes = 0;

        let result = config.validate();
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("payload"));
    }

    #[test]
    fn test_validate_bad_url() {
        let mut config = Config::default();
        config.probe.url = "ftp://example.com".to_string();

        let result = config.validate();
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("probe.url"));
    }

    #[test]
    fn test_log_path_default() {
        let config = Config::default();
        let path = config.log_path();

        assert!(path.to_string_lossy().contains("speedtest_log.json"));
    }

    #[test]
    fn test_log_path_custom() {
        let mut config = Config::default();
        config.storage.log_path = Some(PathBuf::from("/custom/path/log.json"));

        assert_eq!(config.log_path(), PathBuf::from("/custom/path/log.json"));
    }

    #[test]
    fn test_interval() {
        let config = Config::default();
        assert_eq!(config.interval(), Duration::from_secs(300));
    }

    #[test]
    fn test_probe_timeout() {
        let config = Config::default();
        assert_eq!(config.probe_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_speedtest_timeout() {
        let config = Config::default();
        assert_eq!(config.speedtest_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("netpulse"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    // Every test that calls load_from goes through figment's env provider,
    // so they all run inside a Jail to serialize environment access.

    #[test]
    fn test_load_nonexistent_config() {
        figment::Jail::expect_with(|jail| {
            // Loading from a nonexistent path should work (uses defaults)
            let config =
                Config::load_from(Some(jail.directory().join("missing.toml"))).unwrap();
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn test_load_from_toml_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                "[monitor]\ninterval_secs = 60\n\n[probe]\ntimeout_secs = 10\n",
            )?;

            let config = Config::load_from(Some(jail.directory().join("config.toml"))).unwrap();
            assert_eq!(config.monitor.interval_secs, 60);
            assert_eq!(config.probe.timeout_secs, 10);
            // Untouched sections keep their defaults
            assert_eq!(config.speedtest.download_bytes, 10_000_000);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_toml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                "[monitor]\ninterval_secs = 60\n\n[probe]\ntimeout_secs = 10\n",
            )?;
            jail.set_env("NETPULSE_MONITOR__INTERVAL_SECS", "45");

            let config = Config::load_from(Some(jail.directory().join("config.toml"))).unwrap();
            // Env wins over TOML for the overridden key
            assert_eq!(config.monitor.interval_secs, 45);
            // TOML still applies where the environment is silent
            assert_eq!(config.probe.timeout_secs, 10);
            Ok(())
        });
    }

    #[test]
    fn test_env_layer_reaches_nested_sections() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("NETPULSE_SPEEDTEST__DOWNLOAD_BYTES", "5000000");

            let config =
                Config::load_from(Some(jail.directory().join("missing.toml"))).unwrap();
            assert_eq!(config.speedtest.download_bytes, 5_000_000);
            // Everything else keeps its default
            assert_eq!(config.monitor.interval_secs, 300);
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_toml_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[monitor]\ninterval_secs = 0\n")?;

            let result = Config::load_from(Some(jail.directory().join("config.toml")));
            assert!(result.is_err());
            Ok(())
        });
    }

    #[test]
    fn test_config_serialize() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("interval_secs"));
        assert!(json.contains("download_url"));
    }

    #[test]
    fn test_config_clone() {
        let config = Config::default();
        let cloned = config.clone();
        assert_eq!(config, cloned);
    }
}
