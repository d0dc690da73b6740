//! Car tuning: every tunable constant, the curves, wheel layout and debug flags.
//!
//! Loaded from JSON; any field left out falls back to `Default`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::arcade_car::air::AirParams;
use crate::arcade_car::curve::{default_torque_curve, Curve, FrictionCurves};
use crate::arcade_car::drive::DriveParams;
use crate::arcade_car::suspension::SpringParams;
use crate::arcade_car::types::{Vec3, WheelId};
use crate::error::ConfigError;

/// Chassis-space attachment points, one per wheel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelLayout {
    pub front_left: [f32; 3],
    pub front_right: [f32; 3],
    pub back_left: [f32; 3],
    pub back_right: [f32; 3],
}

impl WheelLayout {
    pub fn offset(&self, wheel: WheelId) -> Vec3 {
        let o = match wheel {
            WheelId::FL => self.front_left,
            WheelId::FR => self.front_right,
            WheelId::BL => self.back_left,
            WheelId::BR => self.back_right,
        };
        Vec3::from(o)
    }
}

impl Default for WheelLayout {
    fn default() -> Self {
        // forward +X, left +Y, up +Z
        Self {
            front_left: [130.0, 80.0, -20.0],
            front_right: [130.0, -80.0, -20.0],
            back_left: [-130.0, 80.0, -20.0],
            back_right: [-130.0, -80.0, -20.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugFlags {
    pub draw_forces: bool,
    pub disable_air_correction: bool,
    pub allow_input: bool,
}

impl Default for DebugFlags {
    fn default() -> Self {
        Self {
            draw_forces: false,
            disable_air_correction: false,
            allow_input: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarTuning {
    // suspension
    pub spring_rest_distance: f32,
    pub spring_strength: f32,
    pub damping_amount: f32,
    pub floor_check_distance: f32,
    pub in_air_floor_check_distance: f32,
    pub wheel_probe_offset: f32,

    // tires + engine
    pub tire_mass: f32,
    pub top_speed: f32,
    pub max_torque: f32,
    pub coast_stop_threshold_sq: f32,

    // steering
    pub max_turn_angle_deg: f32,
    pub steering_rate: f32,

    // air
    pub air_correction_rate: f32,
    pub air_enable_delay: f32,
    pub floor_reset_delay: f32,
    pub per_ray_angle_deg: f32,
    pub yaw_evening_rate: f32,

    // camera
    pub base_fov: f32,
    pub max_speed_fov: f32,

    pub friction: FrictionCurves,
    pub torque_curve: Curve,
    pub wheels: WheelLayout,
    pub drift_effect_asset: String,
    pub debug: DebugFlags,
}

impl Default for CarTuning {
    fn default() -> Self {
        Self {
            spring_rest_distance: 50.0,
            spring_strength: 15000.0,
            damping_amount: 3000.0,
            floor_check_distance: 100.0,
            in_air_floor_check_distance: 110.0,
            wheel_probe_offset: 50.0,

            tire_mass: 30.0,
            top_speed: 2000.0,
            max_torque: 80000.0,
            coast_stop_threshold_sq: 10.0,

            max_turn_angle_deg: 35.0,
            steering_rate: 15.0,

            air_correction_rate: 0.5,
            air_enable_delay: 0.9,
            floor_reset_delay: 1.0,
            per_ray_angle_deg: 5.0,
            yaw_evening_rate: 0.25,

            base_fov: 90.0,
            max_speed_fov: 100.0,

            friction: FrictionCurves::default(),
            torque_curve: default_torque_curve(),
            wheels: WheelLayout::default(),
            drift_effect_asset: "fx/tire_drift_smoke".to_string(),
            debug: DebugFlags::default(),
        }
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            detail: format!("expected a positive number, got {value}"),
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            detail: format!("expected zero or more, got {value}"),
        })
    }
}

impl CarTuning {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let tuning: CarTuning = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.friction.validate()?;
        self.torque_curve.validate("torque_curve")?;

        if self.drift_effect_asset.trim().is_empty() {
            return Err(ConfigError::MissingEffectAsset);
        }

        positive("top_speed", self.top_speed)?;
        positive("air_enable_delay", self.air_enable_delay)?;
        positive("floor_reset_delay", self.floor_reset_delay)?;
        positive("floor_check_distance", self.floor_check_distance)?;
        positive("in_air_floor_check_distance", self.in_air_floor_check_distance)?;
        non_negative("wheel_probe_offset", self.wheel_probe_offset)?;
        non_negative("tire_mass", self.tire_mass)?;
        non_negative("spring_strength", self.spring_strength)?;
        non_negative("damping_amount", self.damping_amount)?;
        non_negative("steering_rate", self.steering_rate)?;
        non_negative("air_correction_rate", self.air_correction_rate)?;
        Ok(())
    }

    pub fn spring(&self) -> SpringParams {
        SpringParams {
            rest_distance: self.spring_rest_distance,
            strength: self.spring_strength,
            damping: self.damping_amount,
        }
    }

    pub fn drive(&self) -> DriveParams {
        DriveParams {
            top_speed: self.top_speed,
            max_torque: self.max_torque,
        }
    }

    pub fn air(&self) -> AirParams {
        AirParams {
            per_ray_angle_deg: self.per_ray_angle_deg,
            yaw_evening_rate: self.yaw_evening_rate,
            correction_rate: self.air_correction_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(CarTuning::default().validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let t: CarTuning = serde_json::from_str(r#"{"top_speed": 3000, "debug": {"draw_forces": true}}"#).unwrap();
        assert_eq!(t.top_speed, 3000.0);
        assert_eq!(t.spring_strength, 15000.0);
        assert!(t.debug.draw_forces);
        assert!(t.debug.allow_input);
    }

    #[test]
    fn curves_deserialize_from_pairs() {
        let t: CarTuning = serde_json::from_str(r#"{"torque_curve": [[0, 1], [1, 0.2]]}"#).unwrap();
        assert!((t.torque_curve.evaluate(0.5) - 0.6).abs() < 1e-5);
    }

    #[test]
    fn empty_asset_is_rejected() {
        let t = CarTuning {
            drift_effect_asset: "  ".into(),
            ..CarTuning::default()
        };
        assert!(matches!(t.validate(), Err(ConfigError::MissingEffectAsset)));
    }

    #[test]
    fn zero_top_speed_is_rejected() {
        let t = CarTuning {
            top_speed: 0.0,
            ..CarTuning::default()
        };
        assert!(matches!(t.validate(), Err(ConfigError::InvalidValue { field: "top_speed", .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = CarTuning::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn wheel_layout_lookup() {
        let layout = WheelLayout::default();
        assert!(layout.offset(WheelId::FL).x > 0.0);
        assert!(layout.offset(WheelId::BR).y < 0.0);
    }
}
