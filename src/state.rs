use std::collections::{HashMap, VecDeque};

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;
use uuid::Uuid;

use crate::arcade_car::ports::{EffectHandle, EffectService};
use crate::arcade_car::rotator::Rotator;
use crate::arcade_car::types::{InputEvent, Vec3, WheelId};
use crate::car::CarController;
use crate::debug_builders::DebugOverlay;
use crate::physics::PhysicsWorld;

// ------------------------------------------------------------
// Visual effects: the server has no renderer, it only tracks what
// clients should be showing and ships it with each snapshot.
// ------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct EffectState {
    pub handle: EffectHandle,
    pub asset: String,
    pub wheel: WheelId,
    pub offset: [f32; 3],
    pub active: bool,
}

#[derive(Debug, Default)]
pub struct EffectRegistry {
    effects: Vec<EffectState>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn states(&self) -> &[EffectState] {
        &self.effects
    }

    pub fn get(&self, handle: EffectHandle) -> Option<&EffectState> {
        self.effects.iter().find(|e| e.handle == handle)
    }

    fn set_active(&mut self, handle: EffectHandle, active: bool) {
        match self.effects.iter_mut().find(|e| e.handle == handle) {
            Some(effect) => effect.active = active,
            None => warn!(?handle, "toggle on unknown effect handle"),
        }
    }
}

impl EffectService for EffectRegistry {
    fn spawn_attached(&mut self, asset: &str, attach_to: WheelId, local_offset: Vec3) -> EffectHandle {
        let handle = EffectHandle(self.effects.len() as u32 + 1);
        self.effects.push(EffectState {
            handle,
            asset: asset.to_string(),
            wheel: attach_to,
            offset: local_offset.into(),
            // spawned systems auto-activate
            active: true,
        });
        handle
    }

    fn activate(&mut self, handle: EffectHandle) {
        self.set_active(handle, true);
    }

    fn deactivate(&mut self, handle: EffectHandle) {
        self.set_active(handle, false);
    }
}

// ------------------------------------------------------------
// Snapshot (server -> client)
// ------------------------------------------------------------

#[derive(Serialize)]
#[serde(tag = "type", rename = "snapshot")]
pub struct Snapshot<'a> {
    pub tick: u64,
    pub position: [f32; 3],
    pub rotation: Rotator,
    pub fov: f32,
    pub airborne: bool,
    pub drifting: bool,
    pub front_steer_deg: f32,
    pub effects: &'a [EffectState],
    pub debug: Option<&'a DebugOverlay>,
}

// ------------------------------------------------------------
// Shared server state
// ------------------------------------------------------------

pub struct SharedGameState {
    pub tick: u64,
    pub clients: HashMap<Uuid, UnboundedSender<String>>,
    pub pending: VecDeque<InputEvent>,
    pub effects: EffectRegistry,
}

impl Default for SharedGameState {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedGameState {
    pub fn new() -> Self {
        Self {
            tick: 0,
            clients: HashMap::new(),
            pending: VecDeque::new(),
            effects: EffectRegistry::new(),
        }
    }

    pub fn register_client(&mut self, id: Uuid, tx: UnboundedSender<String>) {
        self.clients.insert(id, tx);
    }

    pub fn remove_client(&mut self, id: &Uuid) {
        self.clients.remove(id);
    }

    pub fn push_input(&mut self, events: impl IntoIterator<Item = InputEvent>) {
        self.pending.extend(events);
    }

    pub fn drain_input(&mut self) -> Vec<InputEvent> {
        self.pending.drain(..).collect()
    }

    pub fn snapshot_json(&self, car: &CarController, world: &PhysicsWorld) -> serde_json::Result<String> {
        let snapshot = Snapshot {
            tick: self.tick,
            position: world.chassis_position().coords.into(),
            rotation: Rotator::from_quat(&world.chassis_rotation()),
            fov: car.fov(),
            airborne: car.is_airborne(),
            drifting: car.is_drifting(),
            front_steer_deg: car.steering().local_yaw_deg(),
            effects: self.effects.states(),
            debug: car.debug_overlay(),
        };
        serde_json::to_string(&snapshot)
    }

    /// Build and send a snapshot of the car to all clients.
    pub fn broadcast_snapshot(&mut self, car: &CarController, world: &PhysicsWorld) {
        let json = match self.snapshot_json(car, world) {
            Ok(json) => json,
            Err(err) => {
                warn!(%err, "snapshot serialization failed");
                return;
            }
        };

        // drop clients whose send loop has gone away
        self.clients.retain(|_, tx| tx.send(json.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CarTuning;

    #[test]
    fn registry_tracks_toggles() {
        let mut reg = EffectRegistry::new();
        let h = reg.spawn_attached("smoke", WheelId::BL, Vec3::new(-10.0, 0.0, -20.0));
        assert!(reg.get(h).unwrap().active);
        reg.deactivate(h);
        assert!(!reg.get(h).unwrap().active);
        reg.activate(h);
        assert!(reg.get(h).unwrap().active);
    }

    #[test]
    fn snapshot_is_tagged_json() {
        let state = SharedGameState::new();
        let car = CarController::new(CarTuning::default()).unwrap();
        let world = PhysicsWorld::new(false);
        let json = state.snapshot_json(&car, &world).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["type"], "snapshot");
        assert_eq!(v["airborne"], false);
        assert!(v["debug"].is_null());
        assert_eq!(v["position"][2], 150.0);
    }

    #[test]
    fn dead_clients_are_dropped() {
        let mut state = SharedGameState::new();
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        state.register_client(Uuid::new_v4(), tx);
        drop(rx);
        let car = CarController::new(CarTuning::default()).unwrap();
        let world = PhysicsWorld::new(false);
        state.broadcast_snapshot(&car, &world);
        assert!(state.clients.is_empty());
    }
}
