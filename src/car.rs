// ==============================================================================
// car.rs — CarController: ONE VEHICLE, ONE TICK AT A TIME
// ------------------------------------------------------------------------------
// Per tick (single writer, no threads):
//
//   1) probe all four wheels               (suspension::probe_ground)
//   2) coast decay, once, if input idle    (drive::coast_velocity)
//   3) per grounded wheel:
//        spring + friction (+ drive when input enabled)
//        each scaled by dt * FORCE_UNIT_SCALE, applied at the wheel
//   4) grounded / airborne debounce        (timers: EnterAir, FloorReset)
//   5) air righting while airborne         (air::righting_step)
//   6) camera FOV                          (camera::FovModel)
//   7) front wheel steering                (steering::FrontSteering)
//
// The physics body and ray queries come in through `&mut P` each tick; the
// controller never stores a handle to the world.
// ==============================================================================

use nalgebra::UnitQuaternion;
use tracing::{debug, info, trace};

use crate::arcade_car::air::righting_step;
use crate::arcade_car::camera::FovModel;
use crate::arcade_car::drive::{coast_velocity, drive_force};
use crate::arcade_car::effects::DriftEffects;
use crate::arcade_car::friction::friction_force;
use crate::arcade_car::ports::{ChassisBody, EffectService, RayCaster};
use crate::arcade_car::rotator::Rotator;
use crate::arcade_car::steering::FrontSteering;
use crate::arcade_car::suspension::{probe_ground, spring_force, GroundProbe};
use crate::arcade_car::timers::{DeferredActions, TimerSlot};
use crate::arcade_car::types::{ControlInput, InputEvent, Pos3, Vec3, WheelId, FORCE_UNIT_SCALE};
use crate::config::CarTuning;
use crate::debug_builders::{push_probe_ray, push_wheel_debug, DebugOverlay};
use crate::error::ConfigError;

/// Distance the chassis is lifted along its own up axis on a hard reset.
pub const RESET_LIFT: f32 = 200.0;

/// Per-wheel result of the last tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelFrame {
    pub id: WheelId,
    pub location: Pos3,
    pub floor_distance: Option<f32>,
    pub spring: Vec3,   // scaled, as applied
    pub friction: Vec3, // scaled, as applied
    pub drive: Vec3,    // scaled; zero when input is disabled
}

impl WheelFrame {
    fn idle(id: WheelId) -> Self {
        Self {
            id,
            location: Pos3::origin(),
            floor_distance: None,
            spring: Vec3::zeros(),
            friction: Vec3::zeros(),
            drive: Vec3::zeros(),
        }
    }

    pub fn grounded(&self) -> bool {
        self.floor_distance.is_some()
    }
}

/// State transitions that happened during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub entered_air: bool,
    pub landed: bool,
    pub floor_check_restored: bool,
}

pub struct CarController {
    tuning: CarTuning,
    input: ControlInput,

    airborne: bool,
    floor_check: f32,
    original_floor_check: f32,
    timers: DeferredActions<TimerSlot>,

    camera: FovModel,
    steering: FrontSteering,
    effects: DriftEffects,

    wheels: [WheelFrame; 4],
    overlay: Option<DebugOverlay>,
}

impl CarController {
    pub fn new(tuning: CarTuning) -> Result<Self, ConfigError> {
        tuning.validate()?;

        let input = ControlInput {
            enabled: tuning.debug.allow_input,
            ..ControlInput::default()
        };

        Ok(Self {
            input,
            airborne: false,
            floor_check: tuning.floor_check_distance,
            original_floor_check: tuning.floor_check_distance,
            timers: DeferredActions::new(),
            camera: FovModel::new(tuning.base_fov, tuning.max_speed_fov, tuning.top_speed),
            steering: FrontSteering::default(),
            effects: DriftEffects::new(tuning.drift_effect_asset.clone()),
            wheels: WheelId::ALL.map(WheelFrame::idle),
            overlay: tuning.debug.draw_forces.then(DebugOverlay::default),
            tuning,
        })
    }

    // ----- queries -----

    pub fn tuning(&self) -> &CarTuning {
        &self.tuning
    }

    pub fn input(&self) -> &ControlInput {
        &self.input
    }

    pub fn is_airborne(&self) -> bool {
        self.airborne
    }

    pub fn is_drifting(&self) -> bool {
        self.input.drift_held
    }

    pub fn floor_check_distance(&self) -> f32 {
        self.floor_check
    }

    pub fn fov(&self) -> f32 {
        self.camera.fov
    }

    pub fn wheels(&self) -> &[WheelFrame; 4] {
        &self.wheels
    }

    pub fn effects(&self) -> &DriftEffects {
        &self.effects
    }

    pub fn steering(&self) -> &FrontSteering {
        &self.steering
    }

    pub fn debug_overlay(&self) -> Option<&DebugOverlay> {
        self.overlay.as_ref()
    }

    pub fn timer_pending(&self, slot: TimerSlot) -> bool {
        self.timers.exists(slot)
    }

    /// World position of a wheel attachment point.
    pub fn wheel_location<B: ChassisBody + ?Sized>(&self, body: &B, wheel: WheelId) -> Pos3 {
        body.position() + body.orientation() * self.tuning.wheels.offset(wheel)
    }

    /// World rotation of a wheel; front wheels carry the steering yaw.
    pub fn wheel_rotation(&self, chassis: &UnitQuaternion<f32>, wheel: WheelId) -> UnitQuaternion<f32> {
        if wheel.is_front() {
            self.steering.world_rotation(chassis)
        } else {
            *chassis
        }
    }

    // ----- input -----

    pub fn handle_input<B, E>(&mut self, event: InputEvent, body: &mut B, fx: &mut E)
    where
        B: ChassisBody + ?Sized,
        E: EffectService + ?Sized,
    {
        match event {
            InputEvent::Steer(v) => self.input.set_steer(v),
            InputEvent::Throttle(v) => self.input.set_throttle(v),
            InputEvent::Brake(v) => self.input.set_brake(v),
            InputEvent::DriftPressed => {
                self.input.drift_held = true;
                self.effects.ensure(fx);
                self.effects.set_active(fx, !self.airborne);
            }
            InputEvent::DriftReleased => {
                self.input.drift_held = false;
                self.effects.set_active(fx, false);
            }
            InputEvent::Reset => self.hard_reset(body),
            InputEvent::SetInputEnabled(enabled) => {
                if self.input.enabled != enabled {
                    debug!(enabled, "car input toggled");
                }
                self.input.enabled = enabled;
            }
        }
    }

    /// Stop, lift along local up and level out, keeping the heading.
    pub fn hard_reset<B: ChassisBody + ?Sized>(&mut self, body: &mut B) {
        body.set_linear_velocity(Vec3::zeros());
        body.set_angular_velocity(Vec3::zeros());
        body.add_local_offset(Vec3::new(0.0, 0.0, RESET_LIFT));

        let yaw = Rotator::from_quat(&body.orientation()).yaw;
        body.set_orientation(Rotator::new(0.0, yaw, 0.0).to_quat());
        info!(yaw, "car reset");
    }

    // ----- tick -----

    pub fn tick<P, E>(&mut self, dt: f32, port: &mut P, fx: &mut E) -> TickReport
    where
        P: ChassisBody + RayCaster + ?Sized,
        E: EffectService + ?Sized,
    {
        let mut report = TickReport::default();
        if dt <= 0.0 || !dt.is_finite() {
            return report;
        }
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.clear();
        }

        let rotation = port.orientation();
        let up = port.up();

        // 1) probes
        let view: &P = port;
        let probes: [(Pos3, GroundProbe); 4] = WheelId::ALL.map(|w| {
            let location = self.wheel_location(view, w);
            let probe = probe_ground(view, location, up, self.floor_check, self.tuning.wheel_probe_offset);
            (location, probe)
        });
        let any_grounded = probes.iter().any(|(_, p)| p.grounded());

        // 2) coast (needs a wheel on the ground)
        if self.input.is_idle() && any_grounded {
            let v = port.linear_velocity();
            port.set_linear_velocity(coast_velocity(v, self.tuning.coast_stop_threshold_sq));
        }

        // 3) wheel forces
        self.apply_wheel_forces(dt, port, &rotation, &probes);

        // 4) grounded / airborne
        self.update_air_state(dt, fx, any_grounded, &mut report);

        // 5) air righting
        if self.airborne && !self.tuning.debug.disable_air_correction {
            self.right_in_air(dt, port);
        }

        // 6) camera
        self.camera.update(port.linear_velocity().norm(), dt);

        // 7) steering
        if self.input.enabled {
            self.steering.update(
                &port.orientation(),
                self.input.steer,
                self.tuning.max_turn_angle_deg,
                self.tuning.steering_rate,
                dt,
            );
        }

        report
    }

    fn apply_wheel_forces<P>(
        &mut self,
        dt: f32,
        port: &mut P,
        rotation: &UnitQuaternion<f32>,
        probes: &[(Pos3, GroundProbe); 4],
    ) where
        P: ChassisBody + ?Sized,
    {
        let scale = dt * FORCE_UNIT_SCALE;
        let up = rotation * Vec3::z();
        let chassis_vel = port.linear_velocity();
        let spring_params = self.tuning.spring();
        let drive_params = self.tuning.drive();
        let drifting = self.input.drift_held;

        for (i, wheel) in WheelId::ALL.into_iter().enumerate() {
            let (location, probe) = probes[i];
            let mut frame = WheelFrame {
                location,
                floor_distance: probe.floor_distance,
                ..WheelFrame::idle(wheel)
            };

            if let Some(floor) = probe.floor_distance {
                let wheel_vel = port.linear_velocity_at_point(location);
                let wheel_rot = self.wheel_rotation(rotation, wheel);
                let right = wheel_rot * -Vec3::y();
                let forward = wheel_rot * Vec3::x();

                let spring = spring_force(&spring_params, up, wheel_vel, floor);
                let friction = friction_force(
                    &self.tuning.friction,
                    wheel.axle(),
                    drifting,
                    right,
                    wheel_vel,
                    self.tuning.tire_mass,
                    dt,
                );

                frame.spring = spring * scale;
                frame.friction = friction * scale;
                port.apply_force_at_point(frame.spring, location);
                port.apply_force_at_point(frame.friction, location);

                if self.input.enabled {
                    let drive = drive_force(
                        &drive_params,
                        &self.tuning.torque_curve,
                        chassis_vel,
                        forward,
                        self.input.throttle,
                    );
                    frame.drive = drive * scale;
                    port.apply_force_at_point(frame.drive, location);
                }

                trace!(wheel = %wheel, floor, spring = frame.spring.z, "wheel grounded");
            }

            if let Some(overlay) = self.overlay.as_mut() {
                push_probe_ray(overlay, &probe);
                push_wheel_debug(overlay, wheel, location, &probe, frame.spring, frame.friction, frame.drive);
            }
            self.wheels[i] = frame;
        }
    }

    fn update_air_state<E>(&mut self, dt: f32, fx: &mut E, any_grounded: bool, report: &mut TickReport)
    where
        E: EffectService + ?Sized,
    {
        if any_grounded {
            self.timers.cancel(TimerSlot::EnterAir);
            self.timers.schedule(TimerSlot::FloorReset, self.tuning.floor_reset_delay);
            if self.airborne {
                self.airborne = false;
                report.landed = true;
                info!("car landed");
                if self.input.drift_held {
                    self.effects.set_active(fx, true);
                }
            }
        } else {
            if !self.airborne && self.timers.schedule(TimerSlot::EnterAir, self.tuning.air_enable_delay) {
                debug!(delay = self.tuning.air_enable_delay, "all wheels off the ground");
            }
            self.timers.cancel(TimerSlot::FloorReset);
        }

        for slot in self.timers.advance(dt) {
            match slot {
                TimerSlot::EnterAir => {
                    self.airborne = true;
                    self.floor_check = self.tuning.in_air_floor_check_distance;
                    self.effects.set_active(fx, false);
                    self.input.enabled = true;
                    report.entered_air = true;
                    info!(floor_check = self.floor_check, "car airborne");
                }
                TimerSlot::FloorReset => {
                    if self.floor_check != self.original_floor_check {
                        self.floor_check = self.original_floor_check;
                        report.floor_check_restored = true;
                        debug!(floor_check = self.floor_check, "floor check restored");
                    }
                }
            }
        }
    }

    fn right_in_air<P>(&mut self, dt: f32, port: &mut P)
    where
        P: ChassisBody + RayCaster + ?Sized,
    {
        let rotation = port.orientation();
        let position = port.position();
        let velocity = port.linear_velocity();
        let step = righting_step(&*port, &self.tuning.air(), position, &rotation, velocity, dt);
        let Some(step) = step else {
            return;
        };

        if let Some(target) = step.rotation {
            port.set_orientation(target.to_quat());
        }
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.air_fan = Some(step.fan);
        }
    }
}
