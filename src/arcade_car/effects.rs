//! Drift particle handles on the two back wheels.
//!
//! Handles are spawned lazily on the first drift press and then only toggled
//! for the rest of the car's life.

use crate::arcade_car::ports::{EffectHandle, EffectService};
use crate::arcade_car::types::{Vec3, WheelId};

/// Attach offset of the back-left emitter, in wheel space.
pub const BACK_LEFT_EFFECT_OFFSET: Vec3 = Vec3::new(-10.0, 0.0, -20.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriftEffectHandles {
    pub back_left: EffectHandle,
    pub back_right: EffectHandle,
}

#[derive(Debug, Clone, Default)]
pub struct DriftEffects {
    asset: String,
    handles: Option<DriftEffectHandles>,
    active: bool,
}

impl DriftEffects {
    pub fn new(asset: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            handles: None,
            active: false,
        }
    }

    pub fn handles(&self) -> Option<DriftEffectHandles> {
        self.handles
    }

    pub fn is_active(&self) -> bool {
        self.handles.is_some() && self.active
    }

    /// Spawns both emitters if they do not exist yet. Returns true on spawn.
    /// Freshly spawned emitters start inactive.
    pub fn ensure<E: EffectService + ?Sized>(&mut self, service: &mut E) -> bool {
        if self.handles.is_some() {
            return false;
        }
        let back_left = service.spawn_attached(&self.asset, WheelId::BL, BACK_LEFT_EFFECT_OFFSET);
        let back_right = service.spawn_attached(&self.asset, WheelId::BR, Vec3::zeros());
        service.deactivate(back_left);
        service.deactivate(back_right);
        self.handles = Some(DriftEffectHandles { back_left, back_right });
        self.active = false;
        tracing::debug!(asset = %self.asset, "drift effects spawned");
        true
    }

    /// Toggles existing emitters; a no-op before the first `ensure`.
    pub fn set_active<E: EffectService + ?Sized>(&mut self, service: &mut E, active: bool) {
        let Some(h) = self.handles else {
            return;
        };
        if active {
            service.activate(h.back_left);
            service.activate(h.back_right);
        } else {
            service.deactivate(h.back_left);
            service.deactivate(h.back_right);
        }
        self.active = active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        spawned: Vec<(WheelId, Vec3)>,
        log: Vec<(u32, bool)>,
    }

    impl EffectService for Recorder {
        fn spawn_attached(&mut self, _asset: &str, attach_to: WheelId, offset: Vec3) -> EffectHandle {
            self.spawned.push((attach_to, offset));
            EffectHandle(self.spawned.len() as u32)
        }
        fn activate(&mut self, handle: EffectHandle) {
            self.log.push((handle.0, true));
        }
        fn deactivate(&mut self, handle: EffectHandle) {
            self.log.push((handle.0, false));
        }
    }

    #[test]
    fn spawns_once_with_back_wheel_offsets() {
        let mut service = Recorder::default();
        let mut fx = DriftEffects::new("drift_smoke");
        assert!(fx.ensure(&mut service));
        assert!(!fx.ensure(&mut service));
        assert_eq!(service.spawned, vec![(WheelId::BL, BACK_LEFT_EFFECT_OFFSET), (WheelId::BR, Vec3::zeros())]);
        assert!(!fx.is_active());
    }

    #[test]
    fn toggle_before_spawn_is_ignored() {
        let mut service = Recorder::default();
        let mut fx = DriftEffects::new("drift_smoke");
        fx.set_active(&mut service, true);
        assert!(service.log.is_empty());
        assert!(!fx.is_active());
    }

    #[test]
    fn toggling_reuses_handles() {
        let mut service = Recorder::default();
        let mut fx = DriftEffects::new("drift_smoke");
        fx.ensure(&mut service);
        let first = fx.handles();
        fx.set_active(&mut service, true);
        fx.set_active(&mut service, false);
        assert_eq!(fx.handles(), first);
        assert_eq!(service.spawned.len(), 2);
    }
}
