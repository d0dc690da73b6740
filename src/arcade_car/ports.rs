// ==============================================================================
// ports.rs — WHAT THE CORE NEEDS FROM THE OUTSIDE WORLD
// ------------------------------------------------------------------------------
// - ChassisBody : the rigid body owned by the integrator
// - RayCaster   : world geometry queries
// - EffectService : particle systems, seen only as opaque handles
//
// The controller takes `&mut P where P: ChassisBody + RayCaster` every tick,
// so a single adapter can borrow the whole physics world at once.
// ==============================================================================

use nalgebra::{Unit, UnitQuaternion};
use serde::{Deserialize, Serialize};

use crate::arcade_car::types::{Pos3, RayHit, Vec3, WheelId};

pub trait ChassisBody {
    fn apply_force_at_point(&mut self, force: Vec3, point: Pos3);
    fn linear_velocity(&self) -> Vec3;
    fn linear_velocity_at_point(&self, point: Pos3) -> Vec3;
    fn set_linear_velocity(&mut self, velocity: Vec3);
    fn set_angular_velocity(&mut self, velocity: Vec3);
    fn orientation(&self) -> UnitQuaternion<f32>;
    fn set_orientation(&mut self, rotation: UnitQuaternion<f32>);
    fn position(&self) -> Pos3;
    /// Translate by `offset` expressed in chassis space.
    fn add_local_offset(&mut self, offset: Vec3);

    fn up(&self) -> Vec3 {
        self.orientation() * Vec3::z()
    }
}

pub trait RayCaster {
    /// Closest hit along `direction` within `max_distance`; `None` is "no contact".
    fn probe(
        &self,
        origin: Pos3,
        direction: Unit<Vec3>,
        max_distance: f32,
        ignore_self: bool,
    ) -> Option<RayHit>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectHandle(pub u32);

pub trait EffectService {
    fn spawn_attached(&mut self, asset: &str, attach_to: WheelId, local_offset: Vec3) -> EffectHandle;
    fn activate(&mut self, handle: EffectHandle);
    fn deactivate(&mut self, handle: EffectHandle);
}
