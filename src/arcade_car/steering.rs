// ==============================================================================
// steering.rs — FRONT WHEEL YAW (SHARED BY FL / FR)
// ------------------------------------------------------------------------------
// goal_dir = rotate(chassis forward, chassis up, -steer * max_turn)
// goal     = (chassis pitch, yaw(goal_dir), chassis roll)
// FL world = interp_to(FL world, goal, dt, steering_rate);  FR = FL
//
// Positive steer turns right (clockwise seen from above).
//
// The wheel rotation is stored relative to the chassis, so it rides along
// when the body turns between ticks.
// ==============================================================================

use nalgebra::{Unit, UnitQuaternion};

use crate::arcade_car::rotator::Rotator;
use crate::arcade_car::types::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrontSteering {
    local: UnitQuaternion<f32>,
}

impl Default for FrontSteering {
    fn default() -> Self {
        Self {
            local: UnitQuaternion::identity(),
        }
    }
}

pub fn steering_goal(chassis: &UnitQuaternion<f32>, steer: f32, max_turn_deg: f32) -> Rotator {
    let forward = chassis * Vec3::x();
    let up = Unit::new_normalize(chassis * Vec3::z());
    let turn = UnitQuaternion::from_axis_angle(&up, (-steer * max_turn_deg).to_radians());
    let goal_dir = turn * forward;

    let body = Rotator::from_quat(chassis);
    Rotator {
        pitch: body.pitch,
        yaw: Rotator::from_direction(goal_dir).yaw,
        roll: body.roll,
    }
}

impl FrontSteering {
    /// Front wheel rotation in world space.
    pub fn world_rotation(&self, chassis: &UnitQuaternion<f32>) -> UnitQuaternion<f32> {
        chassis * self.local
    }

    /// Steer angle relative to chassis forward, degrees (positive = left of forward).
    pub fn local_yaw_deg(&self) -> f32 {
        Rotator::from_quat(&self.local).yaw
    }

    pub fn update(
        &mut self,
        chassis: &UnitQuaternion<f32>,
        steer: f32,
        max_turn_deg: f32,
        rate: f32,
        dt: f32,
    ) -> Rotator {
        let goal = steering_goal(chassis, steer, max_turn_deg);
        let current = Rotator::from_quat(&self.world_rotation(chassis));
        let next = current.interp_to(goal, dt, rate);
        self.local = chassis.inverse() * next.to_quat();
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_right_lock_on_level_chassis() {
        let goal = steering_goal(&UnitQuaternion::identity(), 1.0, 35.0);
        assert!((goal.yaw + 35.0).abs() < 1e-3);
        assert!(goal.pitch.abs() < 1e-3);
    }

    #[test]
    fn wheel_converges_to_goal() {
        let chassis = Rotator::new(0.0, 30.0, 0.0).to_quat();
        let mut steering = FrontSteering::default();
        for _ in 0..120 {
            steering.update(&chassis, -1.0, 35.0, 15.0, 1.0 / 60.0);
        }
        let world = Rotator::from_quat(&steering.world_rotation(&chassis));
        assert!((world.yaw - 65.0).abs() < 0.1);
        assert!((steering.local_yaw_deg() - 35.0).abs() < 0.1);
    }

    #[test]
    fn wheel_follows_chassis_turn() {
        let mut steering = FrontSteering::default();
        steering.update(&UnitQuaternion::identity(), 0.0, 35.0, 15.0, 1.0 / 60.0);
        let turned = Rotator::new(0.0, 90.0, 0.0).to_quat();
        let world = Rotator::from_quat(&steering.world_rotation(&turned));
        assert!((world.yaw - 90.0).abs() < 1e-3);
    }

    #[test]
    fn step_is_partial() {
        let mut steering = FrontSteering::default();
        let next = steering.update(&UnitQuaternion::identity(), 1.0, 35.0, 15.0, 1.0 / 60.0);
        assert!(next.yaw < 0.0 && next.yaw > -35.0);
    }
}
