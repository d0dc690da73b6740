// ==============================================================================
// air.rs — MID-AIR RIGHTING FROM A TERRAIN FAN AHEAD OF TRAVEL
// ------------------------------------------------------------------------------
// While airborne the chassis is steered (kinematically) toward the slope it is
// about to land on:
//
// 1) travel = normalize(horizontal velocity), else horizontal chassis forward
// 2) axis   = world_up × travel                          (travel "left")
// 3) 5 rays from position + forward * 10, length 5000:
//        ray_i = rotate(travel, axis, 10° + i * per_ray_angle)
// 4) average the hit normals facing up (n · up > 0.2)
// 5) target pitch = pitch(rotate(n,  90°, chassis left))
//    target roll  = pitch(rotate(n, -90°, chassis forward))
//    both snap to 0 once within 1° of the current attitude
// 6) yaw drifts toward the velocity heading when moving (speed^2 > 20)
// 7) rotation = interp_to(current, target, dt, correction_rate)
//
// Zero accepted hits means no update this tick.
// ==============================================================================

use nalgebra::{Unit, UnitQuaternion};
use serde::Serialize;

use crate::arcade_car::ports::RayCaster;
use crate::arcade_car::rotator::{lerp_angle, Rotator};
use crate::arcade_car::types::{horizontal, Pos3, RayHit, Vec3, WORLD_UP};

pub const FAN_RAYS: usize = 5;
pub const FAN_FIRST_ANGLE_DEG: f32 = 10.0;
pub const FAN_FORWARD_OFFSET: f32 = 10.0;
pub const FAN_LENGTH: f32 = 5000.0;
pub const MIN_NORMAL_UP: f32 = 0.2;
pub const SNAP_TOLERANCE_DEG: f32 = 1.0;
pub const YAW_MIN_SPEED_SQ: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirParams {
    pub per_ray_angle_deg: f32,
    pub yaw_evening_rate: f32,
    pub correction_rate: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FanRay {
    pub origin: [f32; 3],
    pub direction: [f32; 3],
    pub hit: Option<[f32; 3]>,
    pub accepted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirFan {
    pub rays: Vec<FanRay>,
    pub average_normal: Option<[f32; 3]>,
}

/// Outcome of one righting step: the fan always, a rotation when something was hit.
#[derive(Debug, Clone, PartialEq)]
pub struct AirRighting {
    pub fan: AirFan,
    pub rotation: Option<Rotator>,
}

/// Horizontal travel direction, or `None` when velocity and forward are both vertical.
pub fn travel_direction(velocity: Vec3, chassis_forward: Vec3) -> Option<Vec3> {
    horizontal(velocity)
        .try_normalize(1e-4)
        .or_else(|| horizontal(chassis_forward).try_normalize(1e-4))
}

fn rotate_about(v: Vec3, axis: Vec3, degrees: f32) -> Vec3 {
    match Unit::try_new(axis, 1e-6) {
        Some(axis) => UnitQuaternion::from_axis_angle(&axis, degrees.to_radians()) * v,
        None => v,
    }
}

pub fn cast_fan<R: RayCaster + ?Sized>(
    caster: &R,
    position: Pos3,
    chassis_forward: Vec3,
    travel: Vec3,
    per_ray_angle_deg: f32,
) -> (AirFan, Option<Vec3>) {
    let origin = position + chassis_forward * FAN_FORWARD_OFFSET;
    let axis = WORLD_UP.cross(&travel);

    let mut rays = Vec::with_capacity(FAN_RAYS);
    let mut sum = Vec3::zeros();
    let mut accepted_count = 0usize;

    for i in 0..FAN_RAYS {
        let angle = FAN_FIRST_ANGLE_DEG + per_ray_angle_deg * i as f32;
        let dir = rotate_about(travel, axis, angle);
        let hit: Option<RayHit> = Unit::try_new(dir, 1e-6)
            .and_then(|d| caster.probe(origin, d, FAN_LENGTH, true));

        let accepted = hit.is_some_and(|h| h.normal.dot(&WORLD_UP) > MIN_NORMAL_UP);
        if let (true, Some(h)) = (accepted, hit) {
            sum += h.normal;
            accepted_count += 1;
        }

        rays.push(FanRay {
            origin: origin.coords.into(),
            direction: dir.into(),
            hit: hit.map(|h| h.point.coords.into()),
            accepted,
        });
    }

    let average = if accepted_count == 0 {
        None
    } else {
        sum.try_normalize(1e-6)
    };

    let fan = AirFan {
        rays,
        average_normal: average.map(Into::into),
    };
    (fan, average)
}

/// Attitude the chassis should settle into above ground with normal `ground_normal`.
pub fn target_rotation(
    ground_normal: Vec3,
    chassis_forward: Vec3,
    chassis_left: Vec3,
    current: Rotator,
    velocity: Vec3,
    dt: f32,
    yaw_evening_rate: f32,
) -> Rotator {
    let look = rotate_about(ground_normal, chassis_left, 90.0);
    let side = rotate_about(ground_normal, chassis_forward, -90.0);

    let mut target = Rotator {
        pitch: Rotator::from_direction(look).pitch,
        yaw: current.yaw,
        roll: Rotator::from_direction(side).pitch,
    };

    if (target.roll - current.roll).abs() < SNAP_TOLERANCE_DEG
        && (target.pitch - current.pitch).abs() < SNAP_TOLERANCE_DEG
    {
        target.roll = 0.0;
        target.pitch = 0.0;
    }

    let planar = horizontal(velocity);
    if planar.norm_squared() > YAW_MIN_SPEED_SQ {
        let heading = Rotator::from_direction(planar).yaw;
        target.yaw = lerp_angle(current.yaw, heading, dt * yaw_evening_rate);
    }

    target
}

/// One full righting step. Returns `None` when there is no usable travel direction.
pub fn righting_step<R: RayCaster + ?Sized>(
    caster: &R,
    params: &AirParams,
    position: Pos3,
    orientation: &UnitQuaternion<f32>,
    velocity: Vec3,
    dt: f32,
) -> Option<AirRighting> {
    let forward = orientation * Vec3::x();
    let left = orientation * Vec3::y();
    let travel = travel_direction(velocity, forward)?;

    let (fan, normal) = cast_fan(caster, position, forward, travel, params.per_ray_angle_deg);
    let rotation = normal.map(|n| {
        let current = Rotator::from_quat(orientation);
        let target = target_rotation(n, forward, left, current, velocity, dt, params.yaw_evening_rate);
        current.interp_to(target, dt, params.correction_rate)
    });

    Some(AirRighting { fan, rotation })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: AirParams = AirParams {
        per_ray_angle_deg: 5.0,
        yaw_evening_rate: 0.25,
        correction_rate: 0.5,
    };

    /// Infinite plane at z = 0 with a fixed reported normal.
    struct Plane {
        normal: Vec3,
    }

    impl RayCaster for Plane {
        fn probe(&self, origin: Pos3, dir: Unit<Vec3>, max: f32, _: bool) -> Option<RayHit> {
            if dir.z >= -1e-6 {
                return None;
            }
            let t = origin.z / -dir.z;
            (t <= max).then(|| RayHit {
                distance: t,
                point: origin + dir.into_inner() * t,
                normal: self.normal,
            })
        }
    }

    struct Nothing;

    impl RayCaster for Nothing {
        fn probe(&self, _: Pos3, _: Unit<Vec3>, _: f32, _: bool) -> Option<RayHit> {
            None
        }
    }

    #[test]
    fn fan_points_down_and_ahead() {
        let plane = Plane { normal: Vec3::z() };
        let (fan, normal) = cast_fan(&plane, Pos3::new(0.0, 0.0, 500.0), Vec3::x(), Vec3::x(), 5.0);
        assert_eq!(fan.rays.len(), FAN_RAYS);
        for ray in &fan.rays {
            assert!(ray.direction[0] > 0.0);
            assert!(ray.direction[2] < 0.0);
        }
        let first = Rotator::from_direction(Vec3::from(fan.rays[0].direction)).pitch;
        let last = Rotator::from_direction(Vec3::from(fan.rays[4].direction)).pitch;
        assert!((first + 10.0).abs() < 1e-3);
        assert!((last + 30.0).abs() < 1e-3);
        assert!((normal.unwrap() - Vec3::z()).norm() < 1e-5);
    }

    #[test]
    fn walls_are_ignored() {
        let wall = Plane { normal: Vec3::new(1.0, 0.0, 0.1).normalize() };
        let (fan, normal) = cast_fan(&wall, Pos3::new(0.0, 0.0, 500.0), Vec3::x(), Vec3::x(), 5.0);
        assert!(normal.is_none());
        assert!(fan.average_normal.is_none());
        assert!(fan.rays.iter().all(|r| !r.accepted));
    }

    #[test]
    fn no_hits_means_no_rotation() {
        let out = righting_step(&Nothing, &PARAMS, Pos3::origin(), &UnitQuaternion::identity(), Vec3::x() * 100.0, 1.0 / 60.0)
            .unwrap();
        assert!(out.rotation.is_none());
    }

    #[test]
    fn vertical_velocity_and_nose_down_skip() {
        let nose_down = Rotator::new(-90.0, 0.0, 0.0).to_quat();
        let out = righting_step(&Nothing, &PARAMS, Pos3::origin(), &nose_down, Vec3::new(0.0, 0.0, -500.0), 0.1);
        assert!(out.is_none());
    }

    #[test]
    fn flat_ground_levels_the_car() {
        let plane = Plane { normal: Vec3::z() };
        let mut q = Rotator::new(20.0, 45.0, -15.0).to_quat();
        let dt = 1.0 / 60.0;
        for _ in 0..900 {
            let step = righting_step(&plane, &PARAMS, Pos3::new(0.0, 0.0, 400.0), &q, Vec3::zeros(), dt).unwrap();
            q = step.rotation.unwrap().to_quat();
        }
        let r = Rotator::from_quat(&q);
        assert!(r.pitch.abs() < 1.0, "pitch {}", r.pitch);
        assert!(r.roll.abs() < 1.0, "roll {}", r.roll);
        assert!((r.yaw - 45.0).abs() < 1.0, "yaw held without speed: {}", r.yaw);
    }

    #[test]
    fn level_car_over_flat_ground_targets_zero() {
        let current = Rotator::new(0.5, 10.0, -0.5);
        let t = target_rotation(Vec3::z(), current.to_quat() * Vec3::x(), current.to_quat() * Vec3::y(), current, Vec3::zeros(), 0.1, 0.25);
        assert_eq!(t.pitch, 0.0);
        assert_eq!(t.roll, 0.0);
        assert_eq!(t.yaw, 10.0);
    }

    #[test]
    fn uphill_ahead_raises_the_nose() {
        let slope = Vec3::new(-0.5, 0.0, 1.0).normalize();
        let t = target_rotation(slope, Vec3::x(), Vec3::y(), Rotator::ZERO, Vec3::zeros(), 0.1, 0.25);
        assert!(t.pitch > 20.0);
    }

    #[test]
    fn yaw_follows_velocity_heading() {
        let t = target_rotation(Vec3::z(), Vec3::x(), Vec3::y(), Rotator::ZERO, Vec3::new(0.0, 100.0, 0.0), 1.0, 0.25);
        assert!((t.yaw - 22.5).abs() < 1e-3);
    }
}
