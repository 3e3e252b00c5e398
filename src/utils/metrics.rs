//! Counters for one streaming session.
//!
//! Two independent views:
//! - **StreamStats:** what reached (or failed to reach) the wire.
//! - **SampleStats:** what the tracking source delivered, plus sampling period jitter.
//!
//! Everything runs on the sampling thread, so plain fields are enough.

use std::collections::VecDeque;

/// Wire-side counters, owned by the sender.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreamStats {
    pub records_sent: u64,
    pub bytes_sent: u64,
    /// Records produced while streaming was disabled.
    pub records_dropped: u64,
    pub write_failures: u64,
    pub end_of_stream_sent: bool,
}

/// Source-side counters, owned by the sampler.
#[derive(Debug, Default, Clone)]
pub struct SampleStats {
    pub iterations: u64,
    pub valid_samples: u64,
    pub invalid_samples: u64,
    /// Deviation of each loop period from the nominal one (last `MAX_POINTS`).
    pub jitter_us: VecDeque<u64>,
}

impl SampleStats {
    pub fn record_jitter(&mut self, jitter_us: u64) {
        push_capped_u64(&mut self.jitter_us, jitter_us);
    }
}

pub const MAX_POINTS: usize = 1_000;

/// Appends value to buffer; removes oldest if at capacity (FIFO).
#[inline]
pub fn push_capped_u64(buf: &mut VecDeque<u64>, val: u64) {
    if buf.len() >= MAX_POINTS {
        buf.pop_front();
    }
    buf.push_back(val);
}

/// Statistics summary for a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub count: usize,
}

/// Computes min, max, mean for u64 buffer (cast to f64).
pub fn calculate_stats_u64(data: &VecDeque<u64>) -> Option<Stats> {
    if data.is_empty() {
        return None;
    }

    let count = data.len();
    let min = data.iter().map(|&x| x as f64).fold(f64::INFINITY, f64::min);
    let max = data.iter().map(|&x| x as f64).fold(f64::NEG_INFINITY, f64::max);
    let mean = data.iter().map(|&x| x as f64).sum::<f64>() / count as f64;

    Some(Stats { min, max, mean, count })
}
