//! tracker.rs
//! Head-tracking sources.
//! - `TrackingSource` is the seam to the device: recenter once, then poll
//! - `SimulatedHeadset` paces itself at a fixed rate (SpinSleeper, periodic release)
//!   and wanders like a seated user's head, with optional tracking dropouts
//! - `ScriptedSource` replays a fixed list of samples

use std::{
    collections::VecDeque,
    ops::Mul,
    time::{Duration, Instant},
};

use log::debug;
use rand::{random_bool, random_range};
use spin_sleep::{SpinSleeper, SpinStrategy};

/// Orientation quaternion (x, y, z, w), right-handed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub const IDENTITY: Quat = Quat { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `angle` radians about a unit axis.
    pub fn from_axis_angle(axis: [f32; 3], angle: f32) -> Self {
        let (s, c) = (angle * 0.5).sin_cos();
        Self::new(axis[0] * s, axis[1] * s, axis[2] * s, c)
    }

    /// Yaw about Y, then pitch about X, then roll about Z (radians).
    pub fn from_yxz(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self::from_axis_angle([0.0, 1.0, 0.0], yaw)
            * Self::from_axis_angle([1.0, 0.0, 0.0], pitch)
            * Self::from_axis_angle([0.0, 0.0, 1.0], roll)
    }

    pub fn normalized(self) -> Self {
        let n = (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt();
        if n == 0.0 {
            return Self::IDENTITY;
        }
        Self::new(self.x / n, self.y / n, self.z / n, self.w / n)
    }
}

impl Mul for Quat {
    type Output = Quat;

    fn mul(self, b: Quat) -> Quat {
        let a = self;
        Quat::new(
            a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
            a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x,
            a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w,
            a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
        )
    }
}

/// One poll of the tracking source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackingSample {
    pub orientation: Quat,
    /// False when the device lost orientation tracking for this poll.
    pub valid: bool,
}

impl TrackingSample {
    pub fn valid(orientation: Quat) -> Self {
        Self { orientation, valid: true }
    }

    pub fn lost() -> Self {
        Self { orientation: Quat::IDENTITY, valid: false }
    }
}

/// Device description printed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    pub product_name: String,
    pub firmware: String,
}

pub trait TrackingSource {
    fn describe(&self) -> SourceInfo;

    /// Makes the current heading the zero reference.
    fn recenter(&mut self);

    /// Blocks until the next reading is available.
    fn sample(&mut self) -> TrackingSample;

    /// Nominal delivery period, if the source has one.
    fn nominal_period(&self) -> Option<Duration> {
        None
    }
}

// Wander limits for the simulated head (degrees).
const MAX_PITCH_DEG: f32 = 60.0;
const MAX_ROLL_DEG: f32 = 30.0;
const STEP_DEG: f32 = 0.5;

pub struct SimulatedHeadset {
    period: Duration,
    sleeper: SpinSleeper,
    next_deadline: Instant,
    dropout: f64,
    yaw_deg: f32,
    pitch_deg: f32,
    roll_deg: f32,
    yaw_reference_deg: f32,
}

impl SimulatedHeadset {
    /// `dropout` is the per-sample probability of reporting lost tracking,
    /// in `[0, 1]`. See [`period_for_rate`] for turning a rate into `period`.
    pub fn new(period: Duration, dropout: f64) -> Self {
        Self {
            period,
            sleeper: SpinSleeper::new(100_000).with_spin_strategy(SpinStrategy::YieldThread),
            next_deadline: Instant::now() + period,
            dropout: dropout.clamp(0.0, 1.0),
            yaw_deg: random_range(-180.0..180.0),
            pitch_deg: 0.0,
            roll_deg: 0.0,
            yaw_reference_deg: 0.0,
        }
    }

    fn wait_for_release(&mut self) {
        let now = Instant::now();
        if now < self.next_deadline {
            self.sleeper.sleep(self.next_deadline - now);
        } else if now - self.next_deadline > self.period {
            // Fell more than a period behind: restart the schedule instead of bursting.
            self.next_deadline = now;
        }
        self.next_deadline += self.period;
    }

    fn wander(&mut self) {
        self.yaw_deg = wrap_degrees(self.yaw_deg + random_range(-STEP_DEG..STEP_DEG));
        self.pitch_deg =
            (self.pitch_deg + random_range(-STEP_DEG..STEP_DEG)).clamp(-MAX_PITCH_DEG, MAX_PITCH_DEG);
        self.roll_deg =
            (self.roll_deg + random_range(-STEP_DEG..STEP_DEG)).clamp(-MAX_ROLL_DEG, MAX_ROLL_DEG);
    }
}

impl TrackingSource for SimulatedHeadset {
    fn describe(&self) -> SourceInfo {
        SourceInfo {
            product_name: "SensorBox Simulated HMD".to_string(),
            firmware: "0.8".to_string(),
        }
    }

    fn recenter(&mut self) {
        self.yaw_reference_deg = self.yaw_deg;
        debug!("[Headset] recentered at yaw {:.2}", self.yaw_deg);
    }

    fn sample(&mut self) -> TrackingSample {
        self.wait_for_release();
        self.wander();

        if self.dropout > 0.0 && random_bool(self.dropout) {
            return TrackingSample::lost();
        }

        let yaw = wrap_degrees(self.yaw_deg - self.yaw_reference_deg);
        TrackingSample::valid(Quat::from_yxz(
            yaw.to_radians(),
            self.pitch_deg.to_radians(),
            self.roll_deg.to_radians(),
        ))
    }

    fn nominal_period(&self) -> Option<Duration> {
        Some(self.period)
    }
}

/// Release period for `rate_hz` samples per second. `None` when the rate is
/// not positive or the period cannot be scheduled on the monotonic clock.
pub fn period_for_rate(rate_hz: f64) -> Option<Duration> {
    if !(rate_hz.is_finite() && rate_hz > 0.0) {
        return None;
    }
    let period = Duration::try_from_secs_f64(1.0 / rate_hz).ok()?;
    Instant::now().checked_add(period).map(|_| period)
}

/// Wraps an angle into `(-180, 180]`.
fn wrap_degrees(deg: f32) -> f32 {
    let mut d = deg % 360.0;
    if d > 180.0 {
        d -= 360.0;
    } else if d <= -180.0 {
        d += 360.0;
    }
    d
}

/// Replays a fixed list of samples, then reports lost tracking forever.
#[derive(Debug, Default, Clone)]
pub struct ScriptedSource {
    samples: VecDeque<TrackingSample>,
    recenters: u32,
}

impl ScriptedSource {
    pub fn new(samples: impl IntoIterator<Item = TrackingSample>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
            recenters: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.samples.len()
    }

    pub fn recenter_count(&self) -> u32 {
        self.recenters
    }
}

impl TrackingSource for ScriptedSource {
    fn describe(&self) -> SourceInfo {
        SourceInfo {
            product_name: "Scripted source".to_string(),
            firmware: "n/a".to_string(),
        }
    }

    fn recenter(&mut self) {
        self.recenters += 1;
    }

    fn sample(&mut self) -> TrackingSample {
        self.samples.pop_front().unwrap_or_else(TrackingSample::lost)
    }
}
