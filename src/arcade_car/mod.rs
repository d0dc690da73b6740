//! arcade_car - engine-agnostic per-tick vehicle model.
//!
//! Everything here talks to the world through the traits in `ports`; the
//! rapier adapter lives in `crate::physics`.

pub mod air;
pub mod camera;
pub mod curve;
pub mod drive;
pub mod effects;
pub mod friction;
pub mod ports;
pub mod rotator;
pub mod steering;
pub mod suspension;
pub mod timers;
pub mod types;
