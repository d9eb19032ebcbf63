//! `netpulse` - CLI for the internet connectivity and throughput monitor.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use clap::Parser;

use netpulse::cli::{Cli, Command, ConfigCommand, HistoryCommand, StatusCommand};
use netpulse::{init_logging, Config, Monitor, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let mut config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Run(cmd) => {
            if let Some(interval) = cmd.interval {
                config.monitor.interval_secs = interval;
                config.validate()?;
            }
            let mut monitor = Monitor::new(config)?;
            monitor.run(cmd.once).await;
            Ok(())
        }
        Command::Status(cmd) => handle_status(&config, &cmd),
        Command::History(cmd) => handle_history(&config, &cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn handle_status(config: &Config, cmd: &StatusCommand) -> anyhow::Result<()> {
    let store = Store::open(config.log_path())?;
    let last = store.samples().last();

    if cmd.json {
        let status = serde_json::json!({
            "log_path": store.path(),
            "samples": store.len(),
            "available": store.available_count(),
            "outages": store.outage_count(),
            "daily_outage_average": store.daily_outage_average(),
            "average_download_mbps": store.average_download_mbps(),
            "average_upload_mbps": store.average_upload_mbps(),
            "last": last,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("netpulse status");
        println!("---------------");
        println!("Log file:        {}", store.path().display());
        println!("Samples:         {}", store.len());
        println!(
            "Available:       {} of {}",
            store.available_count(),
            store.len()
        );
        println!("Outages:         {}", store.outage_count());
        println!(
            "Outages per day: {}",
            fmt_stat(store.daily_outage_average(), "")
        );
        println!(
            "Avg download:    {}",
            fmt_stat(store.average_download_mbps(), " Mbps")
        );
        println!(
            "Avg upload:      {}",
            fmt_stat(store.average_upload_mbps(), " Mbps")
        );
        match last {
            Some(sample) => println!(
                "Last:            {} {} ({:.2} Mbps down / {:.2} Mbps up)",
                sample.timestamp.to_rfc3339(),
                sample.status,
                sample.download_mbps,
                sample.upload_mbps
            ),
            None => println!("Last:            (no observations yet)"),
        }
    }
    Ok(())
}

/// Format an optional statistic, `-` when there is no data.
fn fmt_stat(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v:.2}{unit}"),
        None => "-".to_string(),
    }
}

fn handle_history(config: &Config, cmd: &HistoryCommand) -> anyhow::Result<()> {
    let store = Store::open(config.log_path())?;
    let samples = store.recent(cmd.limit);

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(samples)?);
    } else if samples.is_empty() {
        println!("No observations logged yet.");
    } else {
        for sample in samples {
            println!(
                "{}  {:11}  {:8.2} Mbps down  {:8.2} Mbps up",
                sample.timestamp.to_rfc3339(),
                sample.status.to_string(),
                sample.download_mbps,
                sample.upload_mbps
            );
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Monitor]");
                println!("  Interval (s):       {}", config.monitor.interval_secs);
                println!();
                println!("[Probe]");
                println!("  URL:                {}", config.probe.url);
                println!("  Timeout (s):        {}", config.probe.timeout_secs);
                println!();
                println!("[Speed test]");
                println!("  Download URL:       {}", config.speedtest.download_url);
                println!("  Upload URL:         {}", config.speedtest.upload_url);
                println!("  Download bytes:     {}", config.speedtest.download_bytes);
                println!("  Upload bytes:       {}", config.speedtest.upload_bytes);
                println!("  Timeout (s):        {}", config.speedtest.timeout_secs);
                println!();
                println!("[Storage]");
                println!("  Log path:           {}", config.log_path().display());
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
