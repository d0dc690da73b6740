// ==============================================================================
// drive.rs — LONGITUDINAL DRIVE + COAST DECAY
// ------------------------------------------------------------------------------
// coast_velocity(v, threshold_sq):
//     Horizontal part * 0.98, vertical part untouched. When the decayed
//     horizontal speed^2 falls under the threshold it snaps to exactly zero.
//     Called once per tick when both input axes are zero.
//
// drive_force(...):
//     n  = clamp(dot(chassis_vel, wheel_forward) / top_speed, 0, 1)
//     F  = wheel_forward * torque_curve(n) * max_torque * throttle
// ==============================================================================

use crate::arcade_car::curve::Curve;
use crate::arcade_car::types::{horizontal, Vec3};

pub const COAST_DECAY: f32 = 0.98;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveParams {
    pub top_speed: f32,
    pub max_torque: f32,
}

pub fn coast_velocity(velocity: Vec3, stop_threshold_sq: f32) -> Vec3 {
    let mut planar = horizontal(velocity) * COAST_DECAY;
    if planar.norm_squared() < stop_threshold_sq {
        planar = Vec3::zeros();
    }
    Vec3::new(planar.x, planar.y, velocity.z)
}

/// Normalized forward speed along the wheel, clamped to [0, 1].
pub fn speed_fraction(chassis_velocity: Vec3, wheel_forward: Vec3, top_speed: f32) -> f32 {
    if top_speed <= 0.0 {
        return 0.0;
    }
    (chassis_velocity.dot(&wheel_forward) / top_speed).clamp(0.0, 1.0)
}

/// Raw (unscaled) engine force for one grounded wheel.
pub fn drive_force(
    params: &DriveParams,
    torque_curve: &Curve,
    chassis_velocity: Vec3,
    wheel_forward: Vec3,
    throttle: f32,
) -> Vec3 {
    let n = speed_fraction(chassis_velocity, wheel_forward, params.top_speed);
    let torque = torque_curve.evaluate(n) * params.max_torque * throttle;
    wheel_forward * torque
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arcade_car::curve::default_torque_curve;

    const PARAMS: DriveParams = DriveParams {
        top_speed: 2000.0,
        max_torque: 80000.0,
    };

    #[test]
    fn full_throttle_from_standstill() {
        let f = drive_force(&PARAMS, &default_torque_curve(), Vec3::zeros(), Vec3::x(), 1.0);
        assert!((f - Vec3::new(80000.0, 0.0, 0.0)).norm() < 1e-2);
    }

    #[test]
    fn no_torque_at_top_speed() {
        let f = drive_force(&PARAMS, &default_torque_curve(), Vec3::new(2500.0, 0.0, 0.0), Vec3::x(), 1.0);
        assert!(f.norm() < 1e-3);
    }

    #[test]
    fn reversing_uses_full_curve() {
        // moving backwards clamps n to 0, so braking gets full torque
        let f = drive_force(&PARAMS, &default_torque_curve(), Vec3::new(-300.0, 0.0, 0.0), Vec3::x(), -1.0);
        assert!((f.x + 80000.0).abs() < 1e-2);
    }

    #[test]
    fn coast_decays_horizontal_only() {
        let v = coast_velocity(Vec3::new(100.0, 0.0, -40.0), 10.0);
        assert!((v.x - 98.0).abs() < 1e-4);
        assert_eq!(v.y, 0.0);
        assert_eq!(v.z, -40.0);
    }

    #[test]
    fn coast_snaps_to_zero() {
        let v = coast_velocity(Vec3::new(3.0, 0.0, 0.0), 10.0);
        assert_eq!(v, Vec3::zeros());
    }

    #[test]
    fn speed_fraction_guards_zero_top_speed() {
        assert_eq!(speed_fraction(Vec3::new(10.0, 0.0, 0.0), Vec3::x(), 0.0), 0.0);
    }
}
