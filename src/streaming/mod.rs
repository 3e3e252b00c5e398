// Streaming: point-to-point transport of orientation records.
// One outbound TCP connection per run, length-prefixed big-endian frames,
// `-1` sentinel on shutdown. Failures here never stop the sampling loop.

pub mod error;
pub mod connection;
pub mod encoder;
pub mod transmitter;
