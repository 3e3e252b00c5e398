//! Cooperative cancellation for the sampling loop.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use log::info;

const PAUSE_SLICE: Duration = Duration::from_millis(10);

/// Shared stop flag. The loop reads it once per iteration, never mid-write.
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Sleeps for `duration`, waking early on stop. Returns `true` if stopped.
    pub fn pause(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        while !self.is_stopped() {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            thread::sleep((deadline - now).min(PAUSE_SLICE));
        }
        true
    }
}

/// Routes Ctrl-C to `token`. Can only be installed once per process.
pub fn install_ctrl_c_handler(token: &StopToken) -> Result<(), ctrlc::Error> {
    let t = token.clone();
    ctrlc::set_handler(move || {
        info!("Ctrl-C event");
        t.stop();
    })
}
