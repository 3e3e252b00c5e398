//! Command line surface.
//!
//! `sensorbox-streamer [HOST PORT] [options]`. Without both HOST and PORT the
//! orientation is only printed locally.

use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::streaming::connection::Endpoint;
use crate::tracking::tracker::period_for_rate;

pub const DEFAULT_RATE_HZ: f64 = 1000.0;
pub const DEFAULT_STARTUP_DELAY_MS: u64 = 2000;

#[derive(Parser, Debug)]
#[command(name = "sensorbox-streamer")]
#[command(version, about = "Streams head orientation (yaw, pitch, roll) to a TCP consumer")]
pub struct Cli {
    /// Consumer host name or address
    pub host: Option<String>,

    /// Consumer port
    pub port: Option<String>,

    /// Tracking sample rate of the simulated headset
    #[arg(long, default_value_t = DEFAULT_RATE_HZ)]
    pub rate_hz: f64,

    /// Probability that a sample reports lost tracking
    #[arg(long, default_value_t = 0.0)]
    pub dropout: f64,

    /// Stop after this many polls (default: run until Ctrl-C)
    #[arg(long)]
    pub samples: Option<u64>,

    /// Append a session summary row to this CSV file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Pause after connecting and after device start
    #[arg(long, default_value_t = DEFAULT_STARTUP_DELAY_MS)]
    pub startup_delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StreamerConfig {
    /// `None` disables streaming.
    pub endpoint: Option<Endpoint>,
    /// Release period of the simulated headset, derived from `--rate-hz`.
    pub sample_period: Duration,
    pub dropout: f64,
    pub max_iterations: Option<u64>,
    pub summary_path: Option<PathBuf>,
    pub startup_delay: Duration,
}

impl TryFrom<Cli> for StreamerConfig {
    type Error = String;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let sample_period = period_for_rate(cli.rate_hz).ok_or_else(|| {
            format!(
                "--rate-hz must be positive with a schedulable period, got {}",
                cli.rate_hz
            )
        })?;
        if !(0.0..=1.0).contains(&cli.dropout) {
            return Err(format!("--dropout must be within [0, 1], got {}", cli.dropout));
        }

        let endpoint = match (cli.host, cli.port) {
            (Some(host), Some(port)) => Some(Endpoint::new(host, port)),
            _ => None,
        };

        Ok(Self {
            endpoint,
            sample_period,
            dropout: cli.dropout,
            max_iterations: cli.samples,
            summary_path: cli.summary,
            startup_delay: Duration::from_millis(cli.startup_delay_ms),
        })
    }
}
