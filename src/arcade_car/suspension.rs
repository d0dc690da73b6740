// ==============================================================================
// suspension.rs — GROUND PROBE + SPRING/DAMPER FORCE
// ------------------------------------------------------------------------------
// probe_ground(...):
//     Casts from `offset` above the wheel attachment point along -chassis up,
//     for floor_check + offset. A hit reports floor distance = hit - offset.
//
// spring_force(...):
//     F = (rest - floor) * k - (v · up) * c, along chassis up, then the world
//     X/Y components are dropped so the suspension only ever pushes vertically.
//
// Neither function applies anything; the controller scales and pushes forces.
// ==============================================================================

use nalgebra::Unit;

use crate::arcade_car::ports::RayCaster;
use crate::arcade_car::types::{Pos3, RayHit, Vec3, WORLD_UP};

/// Spring-damper parameters shared by all four wheels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringParams {
    pub rest_distance: f32, // floor distance producing zero spring force
    pub strength: f32,      // force per unit of compression
    pub damping: f32,       // force per unit of vertical velocity
}

/// One wheel's ground probe, kept whole so the debug overlay can draw it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundProbe {
    pub origin: Pos3,
    pub direction: Vec3,
    pub max_distance: f32,
    pub hit: Option<RayHit>,
    pub floor_distance: Option<f32>,
}

impl GroundProbe {
    pub fn grounded(&self) -> bool {
        self.floor_distance.is_some()
    }
}

pub fn probe_ground<R: RayCaster + ?Sized>(
    caster: &R,
    wheel_location: Pos3,
    chassis_up: Vec3,
    floor_check_distance: f32,
    probe_offset: f32,
) -> GroundProbe {
    let origin = wheel_location + WORLD_UP * probe_offset;
    let direction = Unit::try_new(-chassis_up, 1e-6).unwrap_or_else(|| -Vec3::z_axis());
    let max_distance = floor_check_distance + probe_offset;

    let hit = caster.probe(origin, direction, max_distance, true);
    let floor_distance = hit.map(|h| h.distance - probe_offset);

    GroundProbe {
        origin,
        direction: direction.into_inner(),
        max_distance,
        hit,
        floor_distance,
    }
}

/// Raw (unscaled) suspension force for one grounded wheel.
pub fn spring_force(
    params: &SpringParams,
    chassis_up: Vec3,
    wheel_velocity: Vec3,
    floor_distance: f32,
) -> Vec3 {
    let compression = params.rest_distance - floor_distance;
    let vertical_vel = chassis_up.dot(&wheel_velocity);
    let force = compression * params.strength - vertical_vel * params.damping;

    let mut out = chassis_up * force;
    out.x = 0.0;
    out.y = 0.0;
    out
}
