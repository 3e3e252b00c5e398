//! # SensorBox Streamer Entry Point
//! Prints the head orientation of the tracking source and, when a consumer
//! address is given, streams every reading to it.
//!
//! ## Startup
//! - `HOST PORT` given: connect once; on failure keep running without streaming.
//! - Start the tracking source, print its description, recenter.
//!
//! ## Shutdown
//! - Ctrl-C (handled from before the connect) or `--samples` ends the loop
//!   between iterations and cuts the startup pauses short.
//! - `-1` end-of-stream frame sent best-effort, socket released.
//! - Optional summary row appended with `--summary`.

use std::error::Error;

use clap::Parser;
use log::{error, info};

use sensorbox_streamer::{
    config::{Cli, StreamerConfig},
    streaming::transmitter::StreamSender,
    tracking::{
        sampler::Sampler,
        tracker::{SimulatedHeadset, TrackingSource},
    },
    utils::{
        export::{SessionSummary, export_summary_csv},
        metrics::StreamStats,
        signal::{StopToken, install_ctrl_c_handler},
    },
};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = StreamerConfig::try_from(Cli::parse())?;
    info!("=== SENSORBOX STREAMER START ===");

    // Installed before connecting so Ctrl-C during startup still ends with `-1`.
    let stop = StopToken::new();
    install_ctrl_c_handler(&stop)?;

    let mut sender = open_stream(&config);
    stop.pause(config.startup_delay);

    let headset = SimulatedHeadset::new(config.sample_period, config.dropout);
    let desc = headset.describe();
    println!("Product Name: {}", desc.product_name);
    println!("Firmware: {}", desc.firmware);
    stop.pause(config.startup_delay);

    let mut sampler = Sampler::new(headset, stop).with_max_iterations(config.max_iterations);
    sampler.run(sender.as_mut());

    println!("Destroying HMD");

    let stream_stats = sender.map(StreamSender::finish).unwrap_or_else(StreamStats::default);
    info!(
        "[Main] {} valid samples, {} records streamed",
        sampler.stats().valid_samples,
        stream_stats.records_sent
    );

    if let Some(path) = &config.summary_path {
        let summary = SessionSummary::new(config.endpoint.as_ref(), sampler.stats(), &stream_stats);
        if let Err(e) = export_summary_csv(path, &summary) {
            error!("Failed to export summary to {}: {}", path.display(), e);
        }
    }

    info!("=== SENSORBOX STREAMER FINISHED ===");
    Ok(())
}

/// Connects to the consumer if one was given. `None` means streaming was
/// never requested; a failed connect keeps a closed sender so drops are counted.
fn open_stream(config: &StreamerConfig) -> Option<StreamSender> {
    let Some(endpoint) = config.endpoint.clone() else {
        println!("Usage: sensorbox-streamer <IP> <PORT>");
        println!("Orientation data will not be streamed");
        return None;
    };

    println!("Trying connection with {}", endpoint);
    let sender = StreamSender::connect(endpoint.clone());
    if !sender.is_streaming() {
        println!("Error at connection with {}", endpoint);
        println!("Orientation data will not be streamed");
    }
    Some(sender)
}
