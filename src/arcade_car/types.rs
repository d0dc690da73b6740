//! Core shared types for `arcade_car` (engine-agnostic).
// arcade_car/types.rs
use std::fmt;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

pub type Vec3 = Vector3<f32>;
pub type Pos3 = Point3<f32>;

/// World up. The whole core works Z-up, chassis forward is +X, left is +Y.
pub const WORLD_UP: Vec3 = Vector3::new(0.0, 0.0, 1.0);

/// Force scaling applied on top of `dt` when pushing forces into the integrator.
pub const FORCE_UNIT_SCALE: f32 = 100.0;

/// Steering axis values below this magnitude are treated as zero.
pub const STEER_DEADZONE: f32 = 0.1;

// ----- small vector helpers -----

/// Normalize or return zero for (near) zero-length input.
#[inline]
pub fn safe_normal(v: Vec3) -> Vec3 {
    v.try_normalize(1e-6).unwrap_or_else(Vec3::zeros)
}

/// Drop the world-vertical component.
#[inline]
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.y, 0.0)
}

// ============================================
// Wheel identification
// ============================================

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum WheelId { FL, FR, BL, BR }

impl WheelId {
    pub const ALL: [WheelId; 4] = [WheelId::FL, WheelId::FR, WheelId::BL, WheelId::BR];

    pub fn as_str(&self) -> &'static str {
        match self {
            WheelId::FL => "FL",
            WheelId::FR => "FR",
            WheelId::BL => "BL",
            WheelId::BR => "BR",
        }
    }

    pub fn axle(&self) -> Axle {
        match self {
            WheelId::FL | WheelId::FR => Axle::Front,
            WheelId::BL | WheelId::BR => Axle::Back,
        }
    }

    pub fn is_front(&self) -> bool {
        matches!(self.axle(), Axle::Front)
    }
}

impl fmt::Display for WheelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axle {
    Front,
    Back,
}

// ============================================
// ----- control input -----------------------
// ============================================

/// Driver intent as last reported by the input provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlInput {
    pub steer: f32,          // -1..1, deadzone already applied
    pub throttle: f32,       // -1..1, positive accelerates, negative brakes
    pub drift_held: bool,    // handbrake / drift trigger
    pub enabled: bool,       // global input gate (drive + steering)
}

impl Default for ControlInput {
    fn default() -> Self {
        Self {
            steer: 0.0,
            throttle: 0.0,
            drift_held: false,
            enabled: true,
        }
    }
}

impl ControlInput {
    /// True when both axes are exactly zero (coasting).
    pub fn is_idle(&self) -> bool {
        self.steer == 0.0 && self.throttle == 0.0
    }

    pub fn set_steer(&mut self, value: f32) {
        let v = value.clamp(-1.0, 1.0);
        self.steer = if v.abs() < STEER_DEADZONE { 0.0 } else { v };
    }

    pub fn set_throttle(&mut self, value: f32) {
        self.throttle = value.clamp(-1.0, 1.0);
    }

    pub fn set_brake(&mut self, value: f32) {
        self.throttle = -value.clamp(-1.0, 1.0);
    }
}

/// Discrete events delivered by the control input provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Steer(f32),
    Throttle(f32),
    Brake(f32),
    DriftPressed,
    DriftReleased,
    Reset,
    SetInputEnabled(bool),
}

// ============================================
// ----- world queries -----
// ============================================

/// Result of a single ray probe against world geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub point: Pos3,
    pub normal: Vec3,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steering_deadzone_zeroes_small_values() {
        let mut input = ControlInput::default();
        input.set_steer(0.05);
        assert_eq!(input.steer, 0.0);
        input.set_steer(-0.09);
        assert_eq!(input.steer, 0.0);
        input.set_steer(0.5);
        assert_eq!(input.steer, 0.5);
    }

    #[test]
    fn brake_is_negative_throttle_without_deadzone() {
        let mut input = ControlInput::default();
        input.set_brake(0.05);
        assert_eq!(input.throttle, -0.05);
        assert!(!input.is_idle());
    }

    #[test]
    fn safe_normal_of_zero_is_zero() {
        assert_eq!(safe_normal(Vec3::zeros()), Vec3::zeros());
        let n = safe_normal(Vec3::new(3.0, 0.0, 4.0));
        assert!((n.norm() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn wheel_axles() {
        assert!(WheelId::FL.is_front());
        assert!(WheelId::FR.is_front());
        assert_eq!(WheelId::BL.axle(), Axle::Back);
        assert_eq!(WheelId::BR.to_string(), "BR");
    }
}
