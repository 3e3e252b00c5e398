//! sampler.rs
//! The host loop: poll the tracking source, convert, print, stream.
//! - stop token checked at the top of each iteration only
//! - invalid samples produce no record and no frame
//! - a streaming failure is reported once; local printing carries on

use std::{
    io::{self, Stdout, Write},
    time::Instant,
};

use log::{debug, warn};

use crate::streaming::transmitter::StreamSender;
use crate::tracking::{euler::Orientation, tracker::TrackingSource};
use crate::utils::{metrics::SampleStats, signal::StopToken};

pub struct Sampler<T: TrackingSource, W: Write = Stdout> {
    source: T,
    out: W,
    stop: StopToken,
    max_iterations: Option<u64>,
    stats: SampleStats,
}

impl<T: TrackingSource> Sampler<T, Stdout> {
    pub fn new(source: T, stop: StopToken) -> Self {
        Self {
            source,
            out: io::stdout(),
            stop,
            max_iterations: None,
            stats: SampleStats::default(),
        }
    }
}

impl<T: TrackingSource, W: Write> Sampler<T, W> {
    /// Redirects the local readout.
    pub fn with_output<W2: Write>(self, out: W2) -> Sampler<T, W2> {
        Sampler {
            source: self.source,
            out,
            stop: self.stop,
            max_iterations: self.max_iterations,
            stats: self.stats,
        }
    }

    /// Ends the loop after `n` polls even if no stop is requested.
    pub fn with_max_iterations(mut self, n: Option<u64>) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn stats(&self) -> &SampleStats {
        &self.stats
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn source(&self) -> &T {
        &self.source
    }

    /// Runs until stopped. Pass `None` when streaming is disabled.
    pub fn run<S: Write>(&mut self, mut sender: Option<&mut StreamSender<S>>) {
        self.source.recenter();

        let nominal_us = self.source.nominal_period().map(|p| p.as_micros() as u64);
        let mut last_tick = Instant::now();
        // A sender that never opened was already reported by whoever opened it.
        let mut reported_failure = sender.as_ref().is_some_and(|tx| !tx.is_streaming());

        while !self.stop.is_stopped() {
            if self
                .max_iterations
                .is_some_and(|max| self.stats.iterations >= max)
            {
                break;
            }

            let sample = self.source.sample();
            self.stats.iterations += 1;

            let tick = Instant::now();
            if let Some(nominal) = nominal_us {
                let actual_us = tick.duration_since(last_tick).as_micros() as u64;
                self.stats.record_jitter(actual_us.abs_diff(nominal));
            }
            last_tick = tick;

            if !sample.valid {
                self.stats.invalid_samples += 1;
                continue;
            }
            self.stats.valid_samples += 1;

            let orientation = Orientation::from_quat(sample.orientation);
            let _ = writeln!(
                self.out,
                "Yaw: {:.6}, Pitch: {:.6}, Roll: {:.6}",
                orientation.yaw, orientation.pitch, orientation.roll
            );

            if let Some(tx) = sender.as_mut() {
                if let Err(e) = tx.send_record(&orientation.fields()) {
                    if !reported_failure {
                        warn!("[Sampler] streaming disabled: {}", e);
                        let _ = writeln!(self.out, "Orientation data will not be streamed");
                        reported_failure = true;
                    }
                }
            }
        }

        debug!(
            "[Sampler] stopped after {} iterations ({} valid)",
            self.stats.iterations, self.stats.valid_samples
        );
    }
}
