//! Session summary export.
//!
//! One row per run, appended to a CSV so repeated sessions can be compared.
//! The header is written only when the file is created.

use std::{
    fs::{OpenOptions, create_dir_all},
    path::Path,
};

use csv::WriterBuilder;
use log::info;
use serde::Serialize;

use crate::streaming::connection::Endpoint;
use crate::utils::metrics::{SampleStats, StreamStats, calculate_stats_u64};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    /// Empty when streaming was never requested.
    pub endpoint: String,
    pub iterations: u64,
    pub valid_samples: u64,
    pub invalid_samples: u64,
    pub records_sent: u64,
    pub bytes_sent: u64,
    pub records_dropped: u64,
    pub write_failures: u64,
    pub end_of_stream_sent: bool,
    pub jitter_min_us: f64,
    pub jitter_max_us: f64,
    pub jitter_avg_us: f64,
    /// Loop periods the jitter figures are computed over.
    pub jitter_samples: usize,
}

impl SessionSummary {
    pub fn new(endpoint: Option<&Endpoint>, samples: &SampleStats, stream: &StreamStats) -> Self {
        let jitter = calculate_stats_u64(&samples.jitter_us);
        Self {
            endpoint: endpoint.map(|e| format!("{}:{}", e.host, e.port)).unwrap_or_default(),
            iterations: samples.iterations,
            valid_samples: samples.valid_samples,
            invalid_samples: samples.invalid_samples,
            records_sent: stream.records_sent,
            bytes_sent: stream.bytes_sent,
            records_dropped: stream.records_dropped,
            write_failures: stream.write_failures,
            end_of_stream_sent: stream.end_of_stream_sent,
            jitter_min_us: jitter.as_ref().map_or(0.0, |s| s.min),
            jitter_max_us: jitter.as_ref().map_or(0.0, |s| s.max),
            jitter_avg_us: jitter.as_ref().map_or(0.0, |s| s.mean),
            jitter_samples: jitter.as_ref().map_or(0, |s| s.count),
        }
    }
}

/// Appends `summary` to `path`, creating parent directories as needed.
pub fn export_summary_csv(path: &Path, summary: &SessionSummary) -> Result<(), csv::Error> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        create_dir_all(dir)?;
    }

    let file_exists = path.exists();
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let mut wtr = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);
    wtr.serialize(summary)?;
    wtr.flush()?;

    info!("Summary exported to: {}", path.display());
    Ok(())
}
