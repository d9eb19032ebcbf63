//! `netpulse` - Periodic internet reachability and throughput monitor
//!
//! This library provides the core functionality for probing internet
//! reachability, measuring download/upload throughput, and appending the
//! observations to a persisted JSON log.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod probe;
pub mod sample;
pub mod speedtest;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use monitor::Monitor;
pub use probe::Prober;
pub use sample::{ConnectionStatus, Sample};
pub use speedtest::{SpeedTest, Throughput};
pub use storage::Store;
