// src/physics.rs

use nalgebra::{Unit, UnitQuaternion};
use rapier3d::prelude::*;
use tracing::{info, warn};

use crate::arcade_car::ports::{ChassisBody, RayCaster};
use crate::arcade_car::types::{Pos3, RayHit, Vec3};

const GROUP_GROUND: Group = Group::from_bits_truncate(0b0001);
const GROUP_CHASSIS: Group = Group::from_bits_truncate(0b0010);

/// World units are centimetres.
pub const LENGTH_UNIT: Real = 100.0;
pub const GRAVITY_Z: Real = -981.0;

/// Anything further than this from the origin (or non-finite) gets respawned.
const SAFETY_BOUND: Real = 100_000.0;

#[derive(Debug, Clone, Copy)]
pub struct ChassisSpec {
    pub half_extents: [f32; 3], // cm
    pub mass: f32,              // kg
    pub spawn: [f32; 3],
    pub angular_damping: f32,
}

pub const DEFAULT_CHASSIS: ChassisSpec = ChassisSpec {
    half_extents: [200.0, 100.0, 40.0],
    mass: 1000.0,
    spawn: [0.0, 0.0, 150.0],
    angular_damping: 0.5,
};

pub struct PhysicsWorld {
    pub gravity: Vector<Real>, // gravity vector
    pub pipeline: PhysicsPipeline, // physics pipeline
    pub island_manager: IslandManager, // manages islands of bodies
    pub broad_phase: DefaultBroadPhase, // broad-phase collision detection
    pub narrow_phase: NarrowPhase, // collision detection
    pub bodies: RigidBodySet, // for rigid bodies
    pub colliders: ColliderSet, // for collision shapes
    pub joints: ImpulseJointSet, // for constraints
    pub multibody_joints: MultibodyJointSet, // for articulated bodies
    pub ccd: CCDSolver, // continuous collision detection
    pub query_pipeline: QueryPipeline, // for raycasting
    pub chassis: RigidBodyHandle,
    chassis_spec: ChassisSpec,
}

impl PhysicsWorld {
    pub fn new(with_ramp: bool) -> Self {
        Self::with_chassis(DEFAULT_CHASSIS, with_ramp)
    }

    pub fn with_chassis(spec: ChassisSpec, with_ramp: bool) -> Self {
        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        // === 1. Big static ground slab, top surface at z = 0 ===
        let ground_rb = RigidBodyBuilder::fixed()
            .translation(vector![0.0, 0.0, -10.0])
            .build();
        let ground_handle = bodies.insert(ground_rb);
        let ground_collider = ColliderBuilder::cuboid(50_000.0, 50_000.0, 10.0)
            .collision_groups(InteractionGroups::new(GROUP_GROUND, GROUP_CHASSIS))
            .friction(1.2)
            .restitution(0.0)
            .build();
        colliders.insert_with_parent(ground_collider, ground_handle, &mut bodies);

        // === 2. Optional launch ramp ahead of the spawn point ===
        if with_ramp {
            let ramp_rb = RigidBodyBuilder::fixed()
                .translation(vector![3000.0, 0.0, 60.0])
                .rotation(vector![0.0, -(15.0_f32).to_radians(), 0.0])
                .build();
            let ramp_handle = bodies.insert(ramp_rb);
            let ramp = ColliderBuilder::cuboid(600.0, 400.0, 20.0)
                .collision_groups(InteractionGroups::new(GROUP_GROUND, GROUP_CHASSIS))
                .friction(1.0)
                .build();
            colliders.insert_with_parent(ramp, ramp_handle, &mut bodies);
        }

        // === 3. The car chassis ===
        let [sx, sy, sz] = spec.spawn;
        let chassis_rb = RigidBodyBuilder::dynamic()
            .translation(vector![sx, sy, sz])
            .angular_damping(spec.angular_damping)
            .ccd_enabled(true)
            .build();
        let chassis = bodies.insert(chassis_rb);
        let [hx, hy, hz] = spec.half_extents;
        let chassis_collider = ColliderBuilder::cuboid(hx, hy, hz)
            .collision_groups(InteractionGroups::new(GROUP_CHASSIS, GROUP_GROUND))
            .mass(spec.mass)
            .friction(0.0)
            .restitution(0.0)
            .build();
        colliders.insert_with_parent(chassis_collider, chassis, &mut bodies);

        let mut query_pipeline = QueryPipeline::new();
        query_pipeline.update(&colliders);

        info!(
            bodies = bodies.len(),
            colliders = colliders.len(),
            with_ramp,
            "physics world ready"
        );

        Self {
            gravity: vector![0.0, 0.0, GRAVITY_Z],
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies,
            colliders,
            joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            query_pipeline,
            chassis,
            chassis_spec: spec,
        }
    }

    /// Chassis user forces persist across rapier steps; clear them before the car adds new ones.
    pub fn begin_tick(&mut self) {
        if let Some(body) = self.bodies.get_mut(self.chassis) {
            body.reset_forces(false);
        }
    }

    /// Borrow the chassis as a car port for one tick.
    pub fn car(&mut self) -> RapierCar<'_> {
        RapierCar { world: self }
    }

    pub fn step(&mut self, dt: Real) {
        self.pipeline.step(
            &self.gravity,
            &IntegrationParameters {
                dt,
                length_unit: LENGTH_UNIT,
                ..IntegrationParameters::default()
            },
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );

        // Safety: prevent the chassis from exploding to insane coordinates
        let spawn = self.chassis_spec.spawn;
        if let Some(body) = self.bodies.get_mut(self.chassis) {
            let pos = *body.translation();
            let bad = !pos.iter().all(|c| c.is_finite())
                || pos.iter().any(|c| c.abs() > SAFETY_BOUND)
                || !body.rotation().coords.iter().all(|c| c.is_finite());

            if bad {
                body.set_translation(vector![spawn[0], spawn[1], spawn[2]], true);
                body.set_rotation(Rotation::identity(), true);
                body.set_linvel(vector![0.0, 0.0, 0.0], true);
                body.set_angvel(vector![0.0, 0.0, 0.0], true);
                warn!(?pos, "chassis left the world, respawned");
            }
        }
    }

    pub fn chassis_position(&self) -> Pos3 {
        self.bodies
            .get(self.chassis)
            .map(|b| Point::from(*b.translation()))
            .unwrap_or_else(Point::origin)
    }

    pub fn chassis_rotation(&self) -> Rotation<Real> {
        self.bodies
            .get(self.chassis)
            .map(|b| *b.rotation())
            .unwrap_or_else(Rotation::identity)
    }
}

/// `ChassisBody` + `RayCaster` over the rapier world, for the single hosted car.
pub struct RapierCar<'a> {
    world: &'a mut PhysicsWorld,
}

impl RapierCar<'_> {
    fn body(&self) -> Option<&RigidBody> {
        self.world.bodies.get(self.world.chassis)
    }

    fn body_mut(&mut self) -> Option<&mut RigidBody> {
        self.world.bodies.get_mut(self.world.chassis)
    }
}

impl ChassisBody for RapierCar<'_> {
    fn apply_force_at_point(&mut self, force: Vec3, point: Pos3) {
        if let Some(body) = self.body_mut() {
            body.add_force_at_point(force, point, true);
        }
    }

    fn linear_velocity(&self) -> Vec3 {
        self.body().map(|b| *b.linvel()).unwrap_or_else(Vec3::zeros)
    }

    fn linear_velocity_at_point(&self, point: Pos3) -> Vec3 {
        self.body()
            .map(|b| b.velocity_at_point(&point))
            .unwrap_or_else(Vec3::zeros)
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        if let Some(body) = self.body_mut() {
            body.set_linvel(velocity, true);
        }
    }

    fn set_angular_velocity(&mut self, velocity: Vec3) {
        if let Some(body) = self.body_mut() {
            body.set_angvel(velocity, true);
        }
    }

    fn orientation(&self) -> UnitQuaternion<f32> {
        self.body().map(|b| *b.rotation()).unwrap_or_else(UnitQuaternion::identity)
    }

    fn set_orientation(&mut self, rotation: UnitQuaternion<f32>) {
        if let Some(body) = self.body_mut() {
            body.set_rotation(rotation, true);
        }
    }

    fn position(&self) -> Pos3 {
        self.world.chassis_position()
    }

    fn add_local_offset(&mut self, offset: Vec3) {
        if let Some(body) = self.body_mut() {
            let moved = body.translation() + body.rotation() * offset;
            body.set_translation(moved, true);
        }
    }
}

impl RayCaster for RapierCar<'_> {
    fn probe(
        &self,
        origin: Pos3,
        direction: Unit<Vec3>,
        max_distance: f32,
        ignore_self: bool,
    ) -> Option<RayHit> {
        let ray = Ray::new(origin, direction.into_inner());
        let mut filter = QueryFilter::default();
        if ignore_self {
            filter = filter.exclude_rigid_body(self.world.chassis);
        }

        let (_collider, hit) = self.world.query_pipeline.cast_ray_and_get_normal(
            &self.world.bodies,
            &self.world.colliders,
            &ray,
            max_distance,
            true,
            filter,
        )?;

        Some(RayHit {
            distance: hit.time_of_impact,
            point: ray.point_at(hit.time_of_impact),
            normal: hit.normal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_hits_ground_and_skips_chassis() {
        let mut world = PhysicsWorld::new(false);
        let car = world.car();
        let hit = car
            .probe(Point::new(0.0, 0.0, 150.0), -Vec3::z_axis(), 1000.0, true)
            .unwrap();
        assert!((hit.distance - 150.0).abs() < 1e-2);
        assert!(hit.normal.z > 0.99);
    }

    #[test]
    fn probe_misses_beyond_range() {
        let mut world = PhysicsWorld::new(false);
        let car = world.car();
        assert!(car.probe(Point::new(0.0, 0.0, 150.0), -Vec3::z_axis(), 100.0, true).is_none());
    }

    #[test]
    fn local_offset_follows_rotation() {
        let mut world = PhysicsWorld::new(false);
        let mut car = world.car();
        car.set_orientation(UnitQuaternion::from_euler_angles(std::f32::consts::FRAC_PI_2, 0.0, 0.0));
        car.add_local_offset(vector![0.0, 0.0, 200.0]);
        let p = car.position();
        // rolled 90 degrees: local up points along world -Y
        assert!((p.y + 200.0).abs() < 1e-2);
        assert!((p.z - 150.0).abs() < 1e-2);
    }

    #[test]
    fn runaway_chassis_is_respawned() {
        let mut world = PhysicsWorld::new(false);
        if let Some(b) = world.bodies.get_mut(world.chassis) {
            b.set_translation(vector![0.0, 0.0, 1.0e7], true);
        }
        world.step(1.0 / 60.0);
        assert!((world.chassis_position().z - DEFAULT_CHASSIS.spawn[2]).abs() < 1e-3);
    }
}
