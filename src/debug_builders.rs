// ==============================================================================
// debug_builders.rs — DEBUG OVERLAY PRIMITIVES (SERVER -> CLIENT)
// ------------------------------------------------------------------------------
// Defines serializable debug primitives:
// - DebugRay: suspension probes (origin, direction, length, optional hit)
// - DebugWheel: per-wheel forces for the tick (spring, friction, drive)
// - AirFan: the air-righting terrain fan, when it ran this tick
//
// Helpers:
// - push_probe_ray(): converts a GroundProbe into a DebugRay
// - push_wheel_debug(): pushes DebugWheel snapshots into DebugOverlay
//
// Only built when `debug.draw_forces` is on. Purely visualization scaffolding:
// nothing in here feeds back into the simulation.
// ==============================================================================

use serde::Serialize;

use crate::arcade_car::air::AirFan;
use crate::arcade_car::suspension::GroundProbe;
use crate::arcade_car::types::{Pos3, Vec3, WheelId};

const COLOR_HIT: [f32; 3] = [0.1, 0.9, 0.2];
const COLOR_MISS: [f32; 3] = [0.9, 0.2, 0.1];

#[derive(Debug, Clone, Default, Serialize)]
pub struct DebugOverlay {
    pub suspension_rays: Vec<DebugRay>,
    pub wheels: Vec<DebugWheel>,
    pub air_fan: Option<AirFan>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DebugRay {
    pub origin: [f32; 3],
    pub direction: [f32; 3],
    pub length: f32,
    pub hit: Option<[f32; 3]>,
    pub color: [f32; 3],
}

#[derive(Debug, Clone, Serialize)]
pub struct DebugWheel {
    pub id: WheelId,
    pub location: [f32; 3], // world space
    pub grounded: bool,
    pub floor_distance: Option<f32>,

    // forces as pushed into the body (already scaled by dt * 100)
    pub spring: [f32; 3],
    pub friction: [f32; 3],
    pub drive: [f32; 3],
}

impl DebugOverlay {
    pub fn clear(&mut self) {
        self.suspension_rays.clear();
        self.wheels.clear();
        self.air_fan = None;
    }
}

pub fn push_probe_ray(overlay: &mut DebugOverlay, probe: &GroundProbe) {
    let hit = probe.hit.map(|h| h.point.coords.into());
    overlay.suspension_rays.push(DebugRay {
        origin: probe.origin.coords.into(),
        direction: probe.direction.into(),
        length: probe.max_distance,
        hit,
        color: if hit.is_some() { COLOR_HIT } else { COLOR_MISS },
    });
}

pub fn push_wheel_debug(
    overlay: &mut DebugOverlay,
    id: WheelId,
    location: Pos3,
    probe: &GroundProbe,
    spring: Vec3,
    friction: Vec3,
    drive: Vec3,
) {
    overlay.wheels.push(DebugWheel {
        id,
        location: location.coords.into(),
        grounded: probe.grounded(),
        floor_distance: probe.floor_distance,
        spring: spring.into(),
        friction: friction.into(),
        drive: drive.into(),
    });
}
