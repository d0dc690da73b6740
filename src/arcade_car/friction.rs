// ==============================================================================
// friction.rs — LATERAL SLIP FORCE (CURVE-MODULATED, DRIFT-AWARE)
// ------------------------------------------------------------------------------
// For one grounded wheel:
// - slip_dir   = wheel right or wheel left, whichever the velocity leans into
// - slip_speed = dot(v, slip_dir)                    (always >= 0)
// - alignment  = dot(slip_dir, normalize(v))         (0 for a resting wheel)
// - mu         = curve[axle, drifting](alignment)
//
//     dv = -slip_speed * mu
//     a  = dv / dt
//     F  = slip_dir * tire_mass * a
//
// So the force always points against the slide, along the wheel's lateral axis.
// ==============================================================================

use crate::arcade_car::curve::FrictionCurves;
use crate::arcade_car::types::{safe_normal, Axle, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlipSample {
    pub direction: Vec3,
    pub speed: f32,
    pub alignment: f32,
}

/// Pick the lateral direction the wheel is sliding toward.
pub fn slip_sample(wheel_right: Vec3, wheel_velocity: Vec3) -> SlipSample {
    let right = safe_normal(wheel_right);
    let left = -right;

    let direction = if right.dot(&wheel_velocity) >= left.dot(&wheel_velocity) {
        right
    } else {
        left
    };

    SlipSample {
        direction,
        speed: direction.dot(&wheel_velocity),
        alignment: direction.dot(&safe_normal(wheel_velocity)),
    }
}

/// Raw (unscaled) friction force for one grounded wheel.
pub fn friction_force(
    curves: &FrictionCurves,
    axle: Axle,
    drifting: bool,
    wheel_right: Vec3,
    wheel_velocity: Vec3,
    tire_mass: f32,
    dt: f32,
) -> Vec3 {
    if dt <= 0.0 {
        return Vec3::zeros();
    }

    let slip = slip_sample(wheel_right, wheel_velocity);
    let mu = curves.get(axle, drifting).evaluate(slip.alignment);

    let delta_v = -slip.speed * mu;
    let accel = delta_v / dt;

    slip.direction * tire_mass * accel
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arcade_car::curve::Curve;
    use proptest::prelude::*;

    fn flat(mu: f32) -> FrictionCurves {
        FrictionCurves {
            front: Curve::constant(mu),
            back: Curve::constant(mu),
            front_drift: Curve::constant(mu * 0.5),
            back_drift: Curve::constant(mu * 0.25),
        }
    }

    #[test]
    fn sliding_right_pushes_left() {
        let right = Vec3::new(0.0, -1.0, 0.0);
        let v = Vec3::new(0.0, -10.0, 0.0);
        let f = friction_force(&flat(1.0), Axle::Front, false, right, v, 30.0, 0.5);
        // dv = -10, a = -20, F = right * 30 * -20
        assert!((f - Vec3::new(0.0, 600.0, 0.0)).norm() < 1e-3);
    }

    #[test]
    fn resting_wheel_has_no_friction() {
        let f = friction_force(&flat(1.0), Axle::Back, false, -Vec3::y(), Vec3::zeros(), 30.0, 1.0 / 60.0);
        assert_eq!(f, Vec3::zeros());
    }

    #[test]
    fn rolling_straight_has_no_lateral_speed() {
        let f = friction_force(&flat(1.0), Axle::Back, false, -Vec3::y(), Vec3::new(500.0, 0.0, 0.0), 30.0, 1.0 / 60.0);
        assert!(f.norm() < 1e-3);
    }

    #[test]
    fn drifting_back_axle_grips_less() {
        let right = -Vec3::y();
        let v = Vec3::new(100.0, 50.0, 0.0);
        let normal = friction_force(&flat(1.0), Axle::Back, false, right, v, 30.0, 0.1);
        let drift = friction_force(&flat(1.0), Axle::Back, true, right, v, 30.0, 0.1);
        assert!(drift.norm() < normal.norm());
    }

    #[test]
    fn zero_dt_is_absorbed() {
        let f = friction_force(&flat(1.0), Axle::Front, false, -Vec3::y(), Vec3::new(0.0, 5.0, 0.0), 30.0, 0.0);
        assert_eq!(f, Vec3::zeros());
    }

    proptest! {
        #[test]
        fn force_stays_on_the_lateral_axis(
            vx in -2000.0f32..2000.0,
            vy in -2000.0f32..2000.0,
            vz in -500.0f32..500.0,
            yaw in -3.1f32..3.1,
        ) {
            let right = Vec3::new(yaw.sin(), -yaw.cos(), 0.0);
            let v = Vec3::new(vx, vy, vz);
            let f = friction_force(&flat(0.8), Axle::Front, false, right, v, 30.0, 1.0 / 60.0);
            let n = f.norm();
            if n > 1e-3 {
                let dir = f / n;
                prop_assert!((dir.dot(&right).abs() - 1.0).abs() < 1e-3);
                // and it opposes the lateral slide
                prop_assert!(f.dot(&v) <= 1e-2);
            }
        }
    }
}
