// ==============================================================================
// curve.rs — PIECEWISE-LINEAR TUNING CURVES (FRICTION + TORQUE)
// ------------------------------------------------------------------------------
// A Curve is a sorted list of (time, value) keys:
// - evaluate() clamps outside the key range to the first / last value
// - between keys it interpolates linearly
//
// FrictionCurves is the lookup table the friction model reads, keyed by
// (axle, drifting). It is plain data so it can live in the JSON tuning file.
// ==============================================================================

use serde::{Deserialize, Serialize};

use crate::arcade_car::types::Axle;
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Curve {
    pub keys: Vec<(f32, f32)>, // (time, value), time strictly increasing
}

impl Curve {
    pub fn new(keys: Vec<(f32, f32)>) -> Self {
        Self { keys }
    }

    pub fn constant(value: f32) -> Self {
        Self { keys: vec![(0.0, value)] }
    }

    pub fn evaluate(&self, t: f32) -> f32 {
        let Some(&(first_t, first_v)) = self.keys.first() else {
            return 0.0;
        };
        if t <= first_t || !t.is_finite() {
            return first_v;
        }

        for pair in self.keys.windows(2) {
            let (t0, v0) = pair[0];
            let (t1, v1) = pair[1];
            if t <= t1 {
                let span = t1 - t0;
                if span <= f32::EPSILON {
                    return v1;
                }
                let alpha = (t - t0) / span;
                return v0 + (v1 - v0) * alpha;
            }
        }

        // past the last key
        self.keys.last().map(|&(_, v)| v).unwrap_or(first_v)
    }

    pub fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if self.keys.is_empty() {
            return Err(ConfigError::EmptyCurve { curve: name });
        }
        for (i, pair) in self.keys.windows(2).enumerate() {
            if !(pair[1].0 > pair[0].0) {
                return Err(ConfigError::NonMonotonicCurve { curve: name, key: i + 1 });
            }
        }
        if self.keys.iter().any(|(t, v)| !t.is_finite() || !v.is_finite()) {
            return Err(ConfigError::InvalidValue {
                field: name,
                detail: "curve keys must be finite".to_string(),
            });
        }
        Ok(())
    }
}

/// Lateral grip curves, selected by wheel axle and drift state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrictionCurves {
    pub front: Curve,
    pub back: Curve,
    pub front_drift: Curve,
    pub back_drift: Curve,
}

impl FrictionCurves {
    pub fn get(&self, axle: Axle, drifting: bool) -> &Curve {
        match (axle, drifting) {
            (Axle::Front, false) => &self.front,
            (Axle::Back, false) => &self.back,
            (Axle::Front, true) => &self.front_drift,
            (Axle::Back, true) => &self.back_drift,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.front.validate("friction.front")?;
        self.back.validate("friction.back")?;
        self.front_drift.validate("friction.front_drift")?;
        self.back_drift.validate("friction.back_drift")?;
        Ok(())
    }
}

impl Default for FrictionCurves {
    fn default() -> Self {
        // x = alignment of slip with travel (0 = rolling straight, 1 = full sideways)
        Self {
            front: Curve::new(vec![(0.0, 0.9), (0.5, 0.7), (1.0, 0.55)]),
            back: Curve::new(vec![(0.0, 0.85), (0.5, 0.65), (1.0, 0.5)]),
            front_drift: Curve::new(vec![(0.0, 0.7), (0.5, 0.5), (1.0, 0.4)]),
            back_drift: Curve::new(vec![(0.0, 0.25), (0.5, 0.12), (1.0, 0.08)]),
        }
    }
}

/// Default engine torque curve: full torque from standstill, fading toward top speed.
pub fn default_torque_curve() -> Curve {
    Curve::new(vec![(0.0, 1.0), (0.6, 0.85), (0.9, 0.4), (1.0, 0.0)])
}
