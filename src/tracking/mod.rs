// Tracking: orientation acquisition side of the pipeline.
// Polls the head-tracking source once per iteration, converts the quaternion to
// yaw/pitch/roll and hands each valid record to the streaming side.

pub mod tracker;
pub mod euler;
pub mod sampler;
