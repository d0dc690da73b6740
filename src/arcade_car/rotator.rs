// ==============================================================================
// rotator.rs — EULER ROTATOR (DEGREES) + ANGULAR INTERPOLATION
// ------------------------------------------------------------------------------
// Steering, air righting and reset all reason in pitch / yaw / roll:
// - yaw   : about world up (+Z), 0 faces +X, positive turns toward +Y
// - pitch : nose up positive
// - roll  : about the forward axis
//
// Rotator <-> UnitQuaternion:
//     q = Rz(yaw) * Ry(-pitch) * Rx(roll)
//
// interp_to(...) moves every axis along its shortest wrapped delta by
// clamp(dt * speed, 0, 1) of the remaining difference.
// ==============================================================================

use nalgebra::UnitQuaternion;
use serde::{Deserialize, Serialize};

use crate::arcade_car::types::Vec3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotator {
    pub pitch: f32, // degrees
    pub yaw: f32,   // degrees
    pub roll: f32,  // degrees
}

/// Wrap an angle in degrees into (-180, 180].
#[inline]
pub fn normalize_axis(angle: f32) -> f32 {
    let mut a = angle % 360.0;
    if a > 180.0 {
        a -= 360.0;
    } else if a <= -180.0 {
        a += 360.0;
    }
    a
}

/// Lerp between two headings along the shortest arc.
#[inline]
pub fn lerp_angle(from: f32, to: f32, alpha: f32) -> f32 {
    normalize_axis(from + normalize_axis(to - from) * alpha)
}

impl Rotator {
    pub const ZERO: Rotator = Rotator { pitch: 0.0, yaw: 0.0, roll: 0.0 };

    pub fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Heading + elevation of a direction. Roll is always zero.
    pub fn from_direction(dir: Vec3) -> Self {
        let planar = (dir.x * dir.x + dir.y * dir.y).sqrt();
        if planar < 1e-8 && dir.z.abs() < 1e-8 {
            return Self::ZERO;
        }
        Self {
            pitch: dir.z.atan2(planar).to_degrees(),
            yaw: dir.y.atan2(dir.x).to_degrees(),
            roll: 0.0,
        }
    }

    /// Euler decomposition. At pitch ±90° yaw and roll share one axis (gimbal
    /// lock), so the split is arbitrary and yaw comes back as ±180.
    pub fn from_quat(q: &UnitQuaternion<f32>) -> Self {
        let (roll, pitch, yaw) = q.euler_angles();
        Self {
            pitch: -pitch.to_degrees(),
            yaw: yaw.to_degrees(),
            roll: roll.to_degrees(),
        }
    }

    pub fn to_quat(&self) -> UnitQuaternion<f32> {
        UnitQuaternion::from_euler_angles(
            self.roll.to_radians(),
            -self.pitch.to_radians(),
            self.yaw.to_radians(),
        )
    }

    pub fn normalized(&self) -> Self {
        Self {
            pitch: normalize_axis(self.pitch),
            yaw: normalize_axis(self.yaw),
            roll: normalize_axis(self.roll),
        }
    }

    pub fn is_nearly_zero(&self, tolerance: f32) -> bool {
        self.pitch.abs() <= tolerance && self.yaw.abs() <= tolerance && self.roll.abs() <= tolerance
    }

    /// Constant-fraction angular interpolation toward `target`.
    pub fn interp_to(&self, target: Rotator, dt: f32, speed: f32) -> Rotator {
        if dt == 0.0 || *self == target {
            return *self;
        }
        if speed <= 0.0 {
            return target;
        }

        let delta = Rotator {
            pitch: target.pitch - self.pitch,
            yaw: target.yaw - self.yaw,
            roll: target.roll - self.roll,
        }
        .normalized();

        if delta.is_nearly_zero(1e-4) {
            return target;
        }

        let alpha = (dt * speed).clamp(0.0, 1.0);
        Rotator {
            pitch: self.pitch + delta.pitch * alpha,
            yaw: self.yaw + delta.yaw * alpha,
            roll: self.roll + delta.roll * alpha,
        }
        .normalized()
    }
}
