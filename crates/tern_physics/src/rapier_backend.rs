//! Rapier physics backend implementation
//!
//! Full physics simulation using the Rapier physics engine. Each body owns
//! exactly one collider built from a shared shape.

use crate::backend::{BackendContact, BackendHit, BodyDesc, BodyHandle, BodyKind, PhysicsBackend};
use crate::config::PhysicsConfig;
use crate::error::Result;
use crate::queries::Ray;
use crate::shape::ShapeDesc;
use rapier3d::na;
use rapier3d::prelude::*;
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex};
use tern_core::{Quat, Vec3};

fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

fn to_point(v: Vec3) -> Point<Real> {
    point![v.x, v.y, v.z]
}

fn from_vector(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

fn to_isometry(position: Vec3, rotation: Quat) -> Isometry<Real> {
    let q = na::Quaternion::new(rotation.w, rotation.x, rotation.y, rotation.z);
    Isometry::from_parts(
        na::Translation3::new(position.x, position.y, position.z),
        na::UnitQuaternion::new_normalize(q),
    )
}

fn from_isometry(iso: &Isometry<Real>) -> (Vec3, Quat) {
    let q = iso.rotation.quaternion().coords;
    (
        from_vector(&iso.translation.vector),
        Quat::new(q.x, q.y, q.z, q.w),
    )
}

fn to_body_type(kind: BodyKind) -> RigidBodyType {
    match kind {
        BodyKind::Dynamic => RigidBodyType::Dynamic,
        BodyKind::Kinematic => RigidBodyType::KinematicPositionBased,
        BodyKind::Static => RigidBodyType::Fixed,
    }
}

fn from_body_type(body_type: RigidBodyType) -> BodyKind {
    match body_type {
        RigidBodyType::Dynamic => BodyKind::Dynamic,
        RigidBodyType::Fixed => BodyKind::Static,
        RigidBodyType::KinematicPositionBased | RigidBodyType::KinematicVelocityBased => {
            BodyKind::Kinematic
        }
    }
}

/// Collects collision start/stop pairs while the pipeline steps
#[derive(Default)]
struct ContactCollector {
    events: Mutex<Vec<(ColliderHandle, ColliderHandle, bool)>>,
}

impl EventHandler for ContactCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        if let Ok(mut events) = self.events.lock() {
            events.push((event.collider1(), event.collider2(), event.started()));
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

struct BodyEntry {
    body: RigidBodyHandle,
    collider: ColliderHandle,
}

/// Rapier physics backend
pub struct RapierBackend {
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    gravity: Vector<Real>,

    /// Handle mapping
    handle_to_body: FxHashMap<BodyHandle, BodyEntry>,
    body_to_handle: FxHashMap<RigidBodyHandle, BodyHandle>,

    next_body_handle: u64,

    /// Contacts produced by steps since the last drain
    contacts: Vec<BackendContact>,
}

impl RapierBackend {
    /// Create a new Rapier backend
    pub fn new() -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            gravity: vector![0.0, -9.81, 0.0],
            handle_to_body: FxHashMap::default(),
            body_to_handle: FxHashMap::default(),
            next_body_handle: 1,
            contacts: Vec::new(),
        }
    }

    fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.handle_to_body
            .get(&handle)
            .and_then(|entry| self.rigid_body_set.get(entry.body))
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.handle_to_body
            .get(&handle)
            .and_then(|entry| self.rigid_body_set.get_mut(entry.body))
    }

    fn collider_owner(&self, collider: ColliderHandle) -> Option<BodyHandle> {
        self.collider_set
            .get(collider)
            .and_then(|c| c.parent())
            .and_then(|body| self.body_to_handle.get(&body).copied())
    }
}

impl Default for RapierBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsBackend for RapierBackend {
    type Shape = SharedShape;

    fn init(&mut self, config: &PhysicsConfig) {
        self.gravity = to_vector(config.gravity);
        if config.timestep > 0.0 {
            self.integration_parameters.dt = config.timestep;
        }
        if let Some(iterations) = std::num::NonZeroUsize::new(config.solver_iterations as usize) {
            self.integration_parameters.num_solver_iterations = iterations;
        }
    }

    fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = to_vector(gravity);
    }

    fn create_shape(&mut self, desc: &ShapeDesc) -> Result<SharedShape> {
        let shape = match desc {
            ShapeDesc::Box { half_extents } => {
                SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            ShapeDesc::Sphere { radius } => SharedShape::ball(*radius),
            ShapeDesc::TriangleMesh { vertices, indices } => {
                let points: Vec<Point<Real>> = vertices.iter().map(|v| to_point(*v)).collect();
                SharedShape::trimesh(points, indices.clone())
            }
            ShapeDesc::Heightfield {
                rows,
                cols,
                heights,
                scale,
            } => {
                let cols = *cols;
                let matrix = na::DMatrix::from_fn(*rows, cols, |i, j| heights[i * cols + j]);
                SharedShape::heightfield(matrix, to_vector(*scale))
            }
        };
        Ok(shape)
    }

    fn shape_in_use(&self, shape: &SharedShape) -> bool {
        // The caller's copy is one of the references
        Arc::strong_count(&shape.0) > 1
    }

    fn add_rigid_body(&mut self, shape: &SharedShape, desc: &BodyDesc) -> BodyHandle {
        let body = RigidBodyBuilder::new(to_body_type(desc.kind))
            .position(to_isometry(desc.position, desc.rotation))
            .linear_damping(desc.linear_damping)
            .angular_damping(desc.angular_damping)
            .can_sleep(desc.can_sleep)
            .ccd_enabled(desc.ccd_enabled)
            .build();
        let rapier_body = self.rigid_body_set.insert(body);

        let mut builder = ColliderBuilder::new(shape.clone())
            .friction(desc.friction)
            .restitution(desc.restitution)
            .translation(to_vector(desc.collider_offset))
            .active_events(ActiveEvents::COLLISION_EVENTS);
        if desc.mass > 0.0 {
            builder = builder.mass(desc.mass);
        }
        let collider = self.collider_set.insert_with_parent(
            builder.build(),
            rapier_body,
            &mut self.rigid_body_set,
        );

        let handle = BodyHandle(self.next_body_handle);
        self.next_body_handle += 1;

        self.handle_to_body.insert(
            handle,
            BodyEntry {
                body: rapier_body,
                collider,
            },
        );
        self.body_to_handle.insert(rapier_body, handle);

        handle
    }

    fn remove_rigid_body(&mut self, handle: BodyHandle) -> bool {
        let Some(entry) = self.handle_to_body.remove(&handle) else {
            return false;
        };
        self.body_to_handle.remove(&entry.body);
        self.rigid_body_set
            .remove(
                entry.body,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true,
            )
            .is_some()
    }

    fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        let collector = ContactCollector::default();

        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &collector,
        );

        let events = collector.events.into_inner().unwrap_or_default();
        for (collider_a, collider_b, started) in events {
            // Removed colliders no longer resolve to a body
            if let (Some(body_a), Some(body_b)) = (
                self.collider_owner(collider_a),
                self.collider_owner(collider_b),
            ) {
                self.contacts.push(BackendContact {
                    body_a,
                    body_b,
                    started,
                });
            }
        }
    }

    fn clear_forces(&mut self) {
        for entry in self.handle_to_body.values() {
            if let Some(body) = self.rigid_body_set.get_mut(entry.body) {
                body.reset_forces(false);
                body.reset_torques(false);
            }
        }
    }

    fn body_transform(&self, handle: BodyHandle) -> Option<(Vec3, Quat)> {
        self.body(handle).map(|body| from_isometry(body.position()))
    }

    fn set_kinematic_target(&mut self, handle: BodyHandle, position: Vec3, rotation: Quat) {
        if let Some(body) = self.body_mut(handle) {
            body.set_next_kinematic_position(to_isometry(position, rotation));
        }
    }

    fn set_body_kind(&mut self, handle: BodyHandle, kind: BodyKind) {
        if let Some(body) = self.body_mut(handle) {
            body.set_body_type(to_body_type(kind), true);
        }
    }

    fn body_kind(&self, handle: BodyHandle) -> Option<BodyKind> {
        self.body(handle).map(|body| from_body_type(body.body_type()))
    }

    fn activate(&mut self, handle: BodyHandle) {
        if let Some(body) = self.body_mut(handle) {
            body.wake_up(true);
        }
    }

    fn is_active(&self, handle: BodyHandle) -> bool {
        self.body(handle).is_some_and(|body| !body.is_sleeping())
    }

    fn apply_force(&mut self, handle: BodyHandle, force: Vec3, relative_position: Option<Vec3>) {
        if let Some(body) = self.body_mut(handle) {
            match relative_position {
                Some(rel) => {
                    let point = *body.center_of_mass() + to_vector(rel);
                    body.add_force_at_point(to_vector(force), point, true);
                }
                None => body.add_force(to_vector(force), true),
            }
        }
    }

    fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3, relative_position: Option<Vec3>) {
        if let Some(body) = self.body_mut(handle) {
            match relative_position {
                Some(rel) => {
                    let point = *body.center_of_mass() + to_vector(rel);
                    body.apply_impulse_at_point(to_vector(impulse), point, true);
                }
                None => body.apply_impulse(to_vector(impulse), true),
            }
        }
    }

    fn apply_torque(&mut self, handle: BodyHandle, torque: Vec3) {
        if let Some(body) = self.body_mut(handle) {
            body.add_torque(to_vector(torque), true);
        }
    }

    fn apply_torque_impulse(&mut self, handle: BodyHandle, torque: Vec3) {
        if let Some(body) = self.body_mut(handle) {
            body.apply_torque_impulse(to_vector(torque), true);
        }
    }

    fn linear_velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        self.body(handle).map(|body| from_vector(body.linvel()))
    }

    fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec3) {
        if let Some(body) = self.body_mut(handle) {
            body.set_linvel(to_vector(velocity), true);
        }
    }

    fn angular_velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        self.body(handle).map(|body| from_vector(body.angvel()))
    }

    fn set_angular_velocity(&mut self, handle: BodyHandle, velocity: Vec3) {
        if let Some(body) = self.body_mut(handle) {
            body.set_angvel(to_vector(velocity), true);
        }
    }

    fn set_material(&mut self, handle: BodyHandle, friction: f32, restitution: f32) {
        let Some(entry) = self.handle_to_body.get(&handle) else {
            return;
        };
        if let Some(collider) = self.collider_set.get_mut(entry.collider) {
            collider.set_friction(friction);
            collider.set_restitution(restitution);
        }
    }

    fn set_damping(&mut self, handle: BodyHandle, linear: f32, angular: f32) {
        if let Some(body) = self.body_mut(handle) {
            body.set_linear_damping(linear);
            body.set_angular_damping(angular);
        }
    }

    fn raycast(&self, ray: &Ray, max_distance: f32) -> Option<BackendHit> {
        let rapier_ray = rapier3d::prelude::Ray::new(to_point(ray.origin), to_vector(ray.direction));

        self.query_pipeline
            .cast_ray_and_get_normal(
                &self.rigid_body_set,
                &self.collider_set,
                &rapier_ray,
                max_distance,
                true,
                QueryFilter::default(),
            )
            .and_then(|(collider, intersection)| {
                let body = self.collider_owner(collider)?;
                Some(BackendHit {
                    body,
                    position: ray.point_at(intersection.time_of_impact),
                    normal: from_vector(&intersection.normal),
                    distance: intersection.time_of_impact,
                })
            })
    }

    fn drain_contacts(&mut self) -> Vec<BackendContact> {
        std::mem::take(&mut self.contacts)
    }

    fn name(&self) -> &'static str {
        "Rapier 3D"
    }
}
