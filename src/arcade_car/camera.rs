//! Speed-driven chase camera field of view.

/// Fixed bias added to the speed fraction, so even a parked car sits above base FOV.
pub const FOV_SPEED_BIAS: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FovModel {
    pub base_fov: f32,
    pub max_speed_fov: f32,
    pub top_speed: f32,
    pub fov: f32,
}

impl FovModel {
    pub fn new(base_fov: f32, max_speed_fov: f32, top_speed: f32) -> Self {
        Self {
            base_fov,
            max_speed_fov,
            top_speed,
            fov: base_fov,
        }
    }

    pub fn goal(&self, speed: f32) -> f32 {
        let n = if self.top_speed > 0.0 {
            (speed / self.top_speed).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let b = (n + FOV_SPEED_BIAS).clamp(0.0, 1.0);
        lerp(self.base_fov, self.max_speed_fov, b)
    }

    /// Moves the current FOV toward the speed goal by `dt` of the gap.
    pub fn update(&mut self, speed: f32, dt: f32) -> f32 {
        let goal = self.goal(speed);
        self.fov = lerp(self.fov, goal, dt.clamp(0.0, 1.0));
        self.fov
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
