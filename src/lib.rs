//! # SensorBox Streamer
//! Samples head orientation from a tracking source and streams each reading
//! (yaw, pitch, roll) to a remote consumer over a single TCP connection.
//!
//! ## Pipeline
//! - **Tracking:** `TrackingSource` polled once per iteration; invalid polls are skipped.
//! - **Conversion:** quaternion -> Y-X-Z Euler angles in degrees.
//! - **Streaming:** `i32` length frame (`12`) + three big-endian f32 bit patterns per record,
//!   one `-1` length frame at shutdown.
//!
//! ## Failure model
//! - Connection or write failures disable streaming for the rest of the run.
//! - The sampling loop and the local readout never stop because of the network.
//!
//! ## Concurrency
//! - Single thread: sample, encode and write happen in sequence.
//! - Ctrl-C sets a `StopToken` that the loop checks at the top of each iteration.

pub mod config;
pub mod streaming;
pub mod tracking;
pub mod utils;

pub use streaming::{
    connection::{Connection, ConnectionState, Endpoint},
    error::{StreamError, StreamResult},
    transmitter::StreamSender,
};
pub use tracking::{
    euler::Orientation,
    sampler::Sampler,
    tracker::{Quat, ScriptedSource, SimulatedHeadset, TrackingSample, TrackingSource},
};
pub use utils::signal::StopToken;
