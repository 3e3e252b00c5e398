//! euler.rs
//! Quaternion -> (yaw, pitch, roll) in degrees.
//!
//! Axis order is Y, then X, then Z (intrinsic), right-handed, counter-clockwise
//! positive. Consumers compare these numbers against other tools using the same
//! convention, so the formulas and the singularity threshold must not drift.

use std::f32::consts::FRAC_PI_2;

use crate::tracking::tracker::Quat;

/// Below this distance from +-1 the pitch term is treated as gimbal lock.
const SINGULARITY_RADIUS: f32 = 1e-7;

/// One streamed record. Field order is the wire order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl Orientation {
    pub const FIELD_COUNT: usize = 3;

    pub fn new(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self { yaw, pitch, roll }
    }

    pub fn from_quat(q: Quat) -> Self {
        let (yaw, pitch, roll) = yxz_angles(q);
        Self::new(yaw.to_degrees(), pitch.to_degrees(), roll.to_degrees())
    }

    /// Values in wire order: yaw, pitch, roll.
    pub fn fields(&self) -> [f32; Self::FIELD_COUNT] {
        [self.yaw, self.pitch, self.roll]
    }
}

/// Radians, in (yaw, pitch, roll) order.
fn yxz_angles(q: Quat) -> (f32, f32, f32) {
    let Quat { x, y, z, w } = q;
    let (ww, xx, yy, zz) = (w * w, x * x, y * y, z * z);

    let s2 = 2.0 * (w * x - y * z);

    if s2 < -1.0 + SINGULARITY_RADIUS {
        (0.0, -FRAC_PI_2, (2.0 * (w * z - x * y)).atan2(ww + xx - yy - zz))
    } else if s2 > 1.0 - SINGULARITY_RADIUS {
        (0.0, FRAC_PI_2, (2.0 * (w * z - x * y)).atan2(ww + xx - yy - zz))
    } else {
        (
            (2.0 * (w * y + x * z)).atan2(ww - xx - yy + zz),
            s2.asin(),
            (2.0 * (w * z + x * y)).atan2(ww - xx + yy - zz),
        )
    }
}
