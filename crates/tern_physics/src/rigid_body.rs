//! Rigid bodies attached to scene nodes
//!
//! A body is created from a node and a [`ShapeType`], registered with the
//! controller's world immediately, and driven through the controller until
//! it is removed.

use crate::backend::{BodyDesc, BodyHandle, BodyKind, PhysicsBackend};
use crate::controller::{BodyRecord, PhysicsController};
use crate::error::{PhysicsError, Result};
use crate::motion_state::MotionState;
use crate::shape::{ShapeDesc, ShapeKind, ShapeType};
use tern_core::{Vec3, MATH_EPSILON};
use tern_scene::{NodeId, SceneGraph};

/// Physical properties of a new rigid body
///
/// A mass of exactly zero makes the body static.
#[derive(Clone, Debug, PartialEq)]
pub struct RigidBodyParams {
    /// Mass in kg
    pub mass: f32,
    pub friction: f32,
    /// Bounciness, 0 = no bounce
    pub restitution: f32,
    /// Linear damping (air resistance)
    pub linear_damping: f32,
    /// Angular damping (rotational resistance)
    pub angular_damping: f32,
    /// Follow the node instead of simulating
    pub kinematic: bool,
    /// Enable continuous collision detection
    pub ccd_enabled: bool,
    /// Whether body can sleep when at rest
    pub can_sleep: bool,
}

impl Default for RigidBodyParams {
    fn default() -> Self {
        Self {
            mass: 1.0,
            friction: 0.5,
            restitution: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            kinematic: false,
            ccd_enabled: false,
            can_sleep: true,
        }
    }
}

impl RigidBodyParams {
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction.max(0.0);
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution.max(0.0);
        self
    }

    /// Set linear and angular damping
    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.linear_damping = linear.max(0.0);
        self.angular_damping = angular.max(0.0);
        self
    }

    pub fn with_kinematic(mut self, kinematic: bool) -> Self {
        self.kinematic = kinematic;
        self
    }

    pub fn with_ccd(mut self, enabled: bool) -> Self {
        self.ccd_enabled = enabled;
        self
    }

    pub fn with_can_sleep(mut self, can_sleep: bool) -> Self {
        self.can_sleep = can_sleep;
        self
    }

    /// Body kind these parameters produce
    pub fn kind(&self) -> BodyKind {
        if self.kinematic {
            BodyKind::Kinematic
        } else if self.mass == 0.0 {
            BodyKind::Static
        } else {
            BodyKind::Dynamic
        }
    }

    // ========== Material Presets ==========

    /// Bouncy material (rubber ball)
    pub fn bouncy(mut self) -> Self {
        self.friction = 0.8;
        self.restitution = 0.9;
        self
    }

    /// Ice/slippery material
    pub fn slippery(mut self) -> Self {
        self.friction = 0.05;
        self.restitution = 0.1;
        self
    }

    pub fn metal(mut self) -> Self {
        self.friction = 0.3;
        self.restitution = 0.3;
        self
    }

    pub fn wood(mut self) -> Self {
        self.friction = 0.5;
        self.restitution = 0.2;
        self
    }

    /// Concrete/stone material
    pub fn stone(mut self) -> Self {
        self.friction = 0.7;
        self.restitution = 0.1;
        self
    }

    // ========== Presets ==========

    /// Immovable scenery
    pub fn static_body() -> Self {
        Self::default().with_mass(0.0)
    }

    /// Fast moving, CCD enabled
    pub fn projectile() -> Self {
        Self::default()
            .with_mass(0.1)
            .with_ccd(true)
            .with_can_sleep(false)
    }
}

/// Handle to a rigid body registered with a [`PhysicsController`]
///
/// Copying the handle does not copy the body. Every operation on it goes
/// through the controller that created it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PhysicsRigidBody {
    handle: BodyHandle,
    node: NodeId,
    shape: ShapeKind,
}

impl PhysicsRigidBody {
    pub fn handle(&self) -> BodyHandle {
        self.handle
    }

    /// Node this body moves
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn shape(&self) -> ShapeKind {
        self.shape
    }
}

impl<B: PhysicsBackend> PhysicsController<B> {
    /// Create a rigid body for `node` and add it to the world
    ///
    /// The body starts at the node's world pose. Box and sphere shapes are
    /// shared through the controller's shape cache.
    pub fn create_rigid_body(
        &mut self,
        scene: &SceneGraph,
        node: NodeId,
        shape_type: &ShapeType,
        params: &RigidBodyParams,
    ) -> Result<PhysicsRigidBody> {
        if !params.mass.is_finite() || params.mass < 0.0 {
            return Err(PhysicsError::InvalidMass(params.mass));
        }
        let scene_node = scene.get(node).ok_or(PhysicsError::NodeNotFound(node))?;
        if self.node_to_body.contains_key(&node) {
            return Err(PhysicsError::NodeAlreadyHasBody(node));
        }

        let kind = params.kind();
        if kind == BodyKind::Dynamic && !shape_type.supports_dynamic() {
            return Err(PhysicsError::ConcaveDynamicShape(shape_type.name()));
        }

        let (shape_desc, collider_offset) = ShapeDesc::from_node(node, scene_node, shape_type)?;
        let shape = self.shape_for(&shape_desc)?;

        let motion_state = MotionState::new(node);
        let (position, rotation) = motion_state
            .world_transform(scene)
            .ok_or(PhysicsError::NodeNotFound(node))?;

        let desc = BodyDesc {
            kind,
            position,
            rotation,
            collider_offset,
            mass: params.mass,
            friction: params.friction,
            restitution: params.restitution,
            linear_damping: params.linear_damping,
            angular_damping: params.angular_damping,
            ccd_enabled: params.ccd_enabled || self.config().ccd_enabled,
            can_sleep: params.can_sleep,
        };
        let handle = self.backend.add_rigid_body(&shape, &desc);

        self.bodies.insert(
            handle,
            BodyRecord {
                motion_state,
                kind,
                released_kind: params.clone().with_kinematic(false).kind(),
                friction: params.friction,
                restitution: params.restitution,
            },
        );
        self.node_to_body.insert(node, handle);

        tracing::debug!(
            "Registered {:?} {} body {:?} for node {:?}",
            kind,
            shape_type.name(),
            handle,
            node
        );

        Ok(PhysicsRigidBody {
            handle,
            node,
            shape: shape_type.kind(),
        })
    }

    /// Remove the body from the world
    ///
    /// Its shape stays cached until [`prune_shapes`](Self::prune_shapes).
    pub fn remove_rigid_body(&mut self, body: PhysicsRigidBody) -> Result<()> {
        let record = self
            .bodies
            .remove(&body.handle)
            .ok_or(PhysicsError::BodyNotFound)?;
        self.node_to_body.remove(&record.motion_state.node());
        self.backend.remove_rigid_body(body.handle);
        tracing::debug!("Removed body {:?} of node {:?}", body.handle, body.node);
        Ok(())
    }

    /// Apply a force for the next step
    ///
    /// `relative_position` is an offset from the center of mass in world
    /// orientation; without it the force acts on the center of mass.
    /// Negligible forces are ignored and do not wake the body.
    pub fn apply_force(&mut self, body: PhysicsRigidBody, force: Vec3, relative_position: Option<Vec3>) -> Result<()> {
        self.ensure_registered(body)?;
        if force.length_squared() > MATH_EPSILON {
            self.backend.activate(body.handle);
            self.backend.apply_force(body.handle, force, relative_position);
        }
        Ok(())
    }

    /// Apply an impulse, changing velocity immediately
    pub fn apply_impulse(&mut self, body: PhysicsRigidBody, impulse: Vec3, relative_position: Option<Vec3>) -> Result<()> {
        self.ensure_registered(body)?;
        if impulse.length_squared() > MATH_EPSILON {
            self.backend.activate(body.handle);
            self.backend.apply_impulse(body.handle, impulse, relative_position);
        }
        Ok(())
    }

    /// Apply a torque for the next step
    pub fn apply_torque(&mut self, body: PhysicsRigidBody, torque: Vec3) -> Result<()> {
        self.ensure_registered(body)?;
        if torque.length_squared() > MATH_EPSILON {
            self.backend.activate(body.handle);
            self.backend.apply_torque(body.handle, torque);
        }
        Ok(())
    }

    pub fn apply_torque_impulse(&mut self, body: PhysicsRigidBody, torque: Vec3) -> Result<()> {
        self.ensure_registered(body)?;
        if torque.length_squared() > MATH_EPSILON {
            self.backend.activate(body.handle);
            self.backend.apply_torque_impulse(body.handle, torque);
        }
        Ok(())
    }

    pub fn linear_velocity(&self, body: PhysicsRigidBody) -> Result<Vec3> {
        self.ensure_registered(body)?;
        self.backend
            .linear_velocity(body.handle)
            .ok_or(PhysicsError::BodyNotFound)
    }

    pub fn set_linear_velocity(&mut self, body: PhysicsRigidBody, velocity: Vec3) -> Result<()> {
        self.ensure_registered(body)?;
        self.backend.set_linear_velocity(body.handle, velocity);
        Ok(())
    }

    pub fn angular_velocity(&self, body: PhysicsRigidBody) -> Result<Vec3> {
        self.ensure_registered(body)?;
        self.backend
            .angular_velocity(body.handle)
            .ok_or(PhysicsError::BodyNotFound)
    }

    pub fn set_angular_velocity(&mut self, body: PhysicsRigidBody, velocity: Vec3) -> Result<()> {
        self.ensure_registered(body)?;
        self.backend.set_angular_velocity(body.handle, velocity);
        Ok(())
    }

    pub fn set_friction(&mut self, body: PhysicsRigidBody, friction: f32) -> Result<()> {
        let record = self.record_mut(body)?;
        record.friction = friction.max(0.0);
        let (friction, restitution) = (record.friction, record.restitution);
        self.backend.set_material(body.handle, friction, restitution);
        Ok(())
    }

    pub fn set_restitution(&mut self, body: PhysicsRigidBody, restitution: f32) -> Result<()> {
        let record = self.record_mut(body)?;
        record.restitution = restitution.max(0.0);
        let (friction, restitution) = (record.friction, record.restitution);
        self.backend.set_material(body.handle, friction, restitution);
        Ok(())
    }

    pub fn set_damping(&mut self, body: PhysicsRigidBody, linear: f32, angular: f32) -> Result<()> {
        self.ensure_registered(body)?;
        self.backend
            .set_damping(body.handle, linear.max(0.0), angular.max(0.0));
        Ok(())
    }

    /// Switch between following the node and simulating
    ///
    /// Leaving kinematic mode makes the body dynamic, or static when it was
    /// created with zero mass.
    pub fn set_kinematic(&mut self, body: PhysicsRigidBody, kinematic: bool) -> Result<()> {
        let record = self.record_mut(body)?;
        let kind = if kinematic {
            BodyKind::Kinematic
        } else {
            record.released_kind
        };
        if kind == BodyKind::Dynamic && matches!(body.shape, ShapeKind::TriangleMesh | ShapeKind::Heightfield) {
            return Err(PhysicsError::ConcaveDynamicShape(body.shape.name()));
        }
        record.kind = kind;
        self.backend.set_body_kind(body.handle, kind);
        Ok(())
    }

    /// Whether the body is awake
    pub fn is_active(&self, body: PhysicsRigidBody) -> Result<bool> {
        self.ensure_registered(body)?;
        Ok(self.backend.is_active(body.handle))
    }

    /// Wake the body
    pub fn activate(&mut self, body: PhysicsRigidBody) -> Result<()> {
        self.ensure_registered(body)?;
        self.backend.activate(body.handle);
        Ok(())
    }

    pub fn body_kind(&self, body: PhysicsRigidBody) -> Result<BodyKind> {
        self.bodies
            .get(&body.handle)
            .map(|record| record.kind)
            .ok_or(PhysicsError::BodyNotFound)
    }

    /// Node moved by the body behind `handle`
    pub fn node_of(&self, handle: BodyHandle) -> Option<NodeId> {
        self.bodies
            .get(&handle)
            .map(|record| record.motion_state.node())
    }

    /// The body registered for `node`, if any
    pub fn body_for_node(&self, node: NodeId) -> Option<BodyHandle> {
        self.node_to_body.get(&node).copied()
    }

    fn ensure_registered(&self, body: PhysicsRigidBody) -> Result<()> {
        if self.bodies.contains_key(&body.handle) {
            Ok(())
        } else {
            Err(PhysicsError::BodyNotFound)
        }
    }

    fn record_mut(&mut self, body: PhysicsRigidBody) -> Result<&mut BodyRecord> {
        self.bodies
            .get_mut(&body.handle)
            .ok_or(PhysicsError::BodyNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::recording::{Call, RecordingBackend};
    use crate::config::PhysicsConfig;
    use crate::queries::Ray;
    use crate::shape::Heightfield;
    use tern_core::Quat;
    use tern_scene::{Geometry, Model, Node};

    fn setup() -> (SceneGraph, NodeId, PhysicsController<RecordingBackend>) {
        let mut scene = SceneGraph::new();
        let node = scene.add(
            Node::new("crate")
                .with_position(Vec3::new(1.0, 2.0, 3.0))
                .with_model(Model::from_geometry(Geometry::cube(0.5))),
        );
        let controller = PhysicsController::with_backend(RecordingBackend::new(), PhysicsConfig::default());
        (scene, node, controller)
    }

    fn forwarded(controller: &PhysicsController<RecordingBackend>) -> Vec<Call> {
        controller
            .backend
            .calls
            .iter()
            .filter(|call| !matches!(call, Call::Step(_) | Call::ClearForces))
            .cloned()
            .collect()
    }

    #[test]
    fn test_params_defaults_and_presets() {
        let params = RigidBodyParams::default();
        assert!((params.mass - 1.0).abs() < 1e-6);
        assert!((params.friction - 0.5).abs() < 1e-6);
        assert_eq!(params.kind(), BodyKind::Dynamic);

        assert_eq!(RigidBodyParams::static_body().kind(), BodyKind::Static);
        assert_eq!(RigidBodyParams::static_body().with_kinematic(true).kind(), BodyKind::Kinematic);

        let ball = RigidBodyParams::projectile().bouncy();
        assert!(ball.ccd_enabled);
        assert!((ball.restitution - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_create_registers_body_at_node_pose() {
        let (scene, node, mut controller) = setup();
        let params = RigidBodyParams::default()
            .with_mass(4.0)
            .stone()
            .with_damping(0.1, 0.2);

        let body = controller
            .create_rigid_body(&scene, node, &ShapeType::Box, &params)
            .unwrap();

        assert_eq!(body.node(), node);
        assert_eq!(body.shape(), ShapeKind::Box);
        assert_eq!(controller.body_for_node(node), Some(body.handle()));
        assert_eq!(controller.node_of(body.handle()), Some(node));

        let recorded = &controller.backend.bodies[&body.handle()];
        assert_eq!(recorded.desc.kind, BodyKind::Dynamic);
        assert_eq!(recorded.desc.position, Vec3::new(1.0, 2.0, 3.0));
        assert!(recorded.desc.rotation.approx_eq(&Quat::IDENTITY, 1e-6));
        assert!((recorded.desc.mass - 4.0).abs() < 1e-6);
        assert!((recorded.desc.friction - 0.7).abs() < 1e-6);
        assert!((recorded.desc.restitution - 0.1).abs() < 1e-6);
        assert!((recorded.desc.linear_damping - 0.1).abs() < 1e-6);
        assert!((recorded.desc.angular_damping - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_zero_mass_is_static() {
        let (scene, node, mut controller) = setup();
        let body = controller
            .create_rigid_body(&scene, node, &ShapeType::Sphere, &RigidBodyParams::static_body())
            .unwrap();
        assert_eq!(controller.body_kind(body).unwrap(), BodyKind::Static);
    }

    #[test]
    fn test_create_errors() {
        let (mut scene, node, mut controller) = setup();

        let negative = RigidBodyParams::default().with_mass(-1.0);
        assert!(matches!(
            controller.create_rigid_body(&scene, node, &ShapeType::Box, &negative),
            Err(PhysicsError::InvalidMass(_))
        ));
        let nan = RigidBodyParams::default().with_mass(f32::NAN);
        assert!(matches!(
            controller.create_rigid_body(&scene, node, &ShapeType::Box, &nan),
            Err(PhysicsError::InvalidMass(_))
        ));

        assert!(matches!(
            controller.create_rigid_body(&scene, node, &ShapeType::TriangleMesh, &RigidBodyParams::default()),
            Err(PhysicsError::ConcaveDynamicShape("TriangleMesh"))
        ));

        let bare = scene.add(Node::new("bare"));
        assert!(matches!(
            controller.create_rigid_body(&scene, bare, &ShapeType::Box, &RigidBodyParams::default()),
            Err(PhysicsError::MissingModel(_))
        ));

        controller
            .create_rigid_body(&scene, node, &ShapeType::Box, &RigidBodyParams::default())
            .unwrap();
        assert!(matches!(
            controller.create_rigid_body(&scene, node, &ShapeType::Sphere, &RigidBodyParams::default()),
            Err(PhysicsError::NodeAlreadyHasBody(_))
        ));

        scene.remove(bare);
        assert!(matches!(
            controller.create_rigid_body(&scene, bare, &ShapeType::Box, &RigidBodyParams::default()),
            Err(PhysicsError::NodeNotFound(_))
        ));
        assert_eq!(controller.body_count(), 1);
    }

    #[test]
    fn test_concave_shapes_for_static_and_kinematic() {
        let (mut scene, node, mut controller) = setup();
        let terrain = scene.add(Node::new("terrain"));

        let field = Heightfield::flat(4, 4, Vec3::new(10.0, 1.0, 10.0));
        let ground = controller
            .create_rigid_body(&scene, terrain, &ShapeType::Heightfield(field), &RigidBodyParams::static_body())
            .unwrap();
        assert_eq!(ground.shape(), ShapeKind::Heightfield);

        let mover = controller
            .create_rigid_body(
                &scene,
                node,
                &ShapeType::TriangleMesh,
                &RigidBodyParams::default().with_kinematic(true),
            )
            .unwrap();
        assert_eq!(controller.body_kind(mover).unwrap(), BodyKind::Kinematic);

        // Leaving kinematic mode would make the mesh dynamic
        assert!(matches!(
            controller.set_kinematic(mover, false),
            Err(PhysicsError::ConcaveDynamicShape(_))
        ));
        assert_eq!(controller.body_kind(mover).unwrap(), BodyKind::Kinematic);
        assert_eq!(controller.cached_shape_count(), 0);
    }

    #[test]
    fn test_small_inputs_are_ignored() {
        let (scene, node, mut controller) = setup();
        let body = controller
            .create_rigid_body(&scene, node, &ShapeType::Box, &RigidBodyParams::default())
            .unwrap();
        controller.backend.put_to_sleep(body.handle());

        let tiny = Vec3::new(1e-4, 0.0, 0.0);
        controller.apply_force(body, tiny, None).unwrap();
        controller.apply_impulse(body, tiny, Some(Vec3::UP)).unwrap();
        controller.apply_torque(body, Vec3::ZERO).unwrap();
        controller.apply_torque_impulse(body, tiny).unwrap();

        assert!(forwarded(&controller).is_empty());
        assert!(!controller.is_active(body).unwrap());
    }

    #[test]
    fn test_significant_inputs_wake_and_forward() {
        let (scene, node, mut controller) = setup();
        let body = controller
            .create_rigid_body(&scene, node, &ShapeType::Box, &RigidBodyParams::default())
            .unwrap();
        let h = body.handle();
        controller.backend.put_to_sleep(h);

        let push = Vec3::new(0.0, 10.0, 0.0);
        let arm = Vec3::new(0.5, 0.0, 0.0);
        controller.apply_force(body, push, None).unwrap();
        controller.apply_force(body, push, Some(arm)).unwrap();
        controller.apply_impulse(body, push, Some(arm)).unwrap();
        controller.apply_torque(body, push).unwrap();
        controller.apply_torque_impulse(body, push).unwrap();

        assert_eq!(
            forwarded(&controller),
            vec![
                Call::Activate(h),
                Call::Force(h, push, None),
                Call::Activate(h),
                Call::Force(h, push, Some(arm)),
                Call::Activate(h),
                Call::Impulse(h, push, Some(arm)),
                Call::Activate(h),
                Call::Torque(h, push),
                Call::Activate(h),
                Call::TorqueImpulse(h, push),
            ]
        );
        assert!(controller.is_active(body).unwrap());
    }

    #[test]
    fn test_removed_body_rejects_operations() {
        let (scene, node, mut controller) = setup();
        let body = controller
            .create_rigid_body(&scene, node, &ShapeType::Box, &RigidBodyParams::default())
            .unwrap();

        controller.remove_rigid_body(body).unwrap();
        assert_eq!(controller.body_count(), 0);
        assert!(controller.backend.bodies.is_empty());
        assert!(controller.body_for_node(node).is_none());
        // The box stays cached until pruned
        assert_eq!(controller.cached_shape_count(), 1);

        assert!(matches!(controller.remove_rigid_body(body), Err(PhysicsError::BodyNotFound)));
        assert!(matches!(
            controller.apply_force(body, Vec3::UP, None),
            Err(PhysicsError::BodyNotFound)
        ));
        assert!(controller.linear_velocity(body).is_err());
        assert!(controller.set_friction(body, 1.0).is_err());

        // The node can take a new body
        assert!(controller
            .create_rigid_body(&scene, node, &ShapeType::Box, &RigidBodyParams::default())
            .is_ok());
    }

    #[test]
    fn test_property_setters_reach_backend() {
        let (scene, node, mut controller) = setup();
        let body = controller
            .create_rigid_body(&scene, node, &ShapeType::Box, &RigidBodyParams::default())
            .unwrap();
        let h = body.handle();

        controller.set_friction(body, 0.9).unwrap();
        controller.set_restitution(body, 0.4).unwrap();
        controller.set_damping(body, 0.3, -1.0).unwrap();
        controller.set_linear_velocity(body, Vec3::new(1.0, 0.0, 0.0)).unwrap();
        controller.set_angular_velocity(body, Vec3::new(0.0, 2.0, 0.0)).unwrap();

        let desc = &controller.backend.bodies[&h].desc;
        assert!((desc.friction - 0.9).abs() < 1e-6);
        assert!((desc.restitution - 0.4).abs() < 1e-6);
        assert!((desc.linear_damping - 0.3).abs() < 1e-6);
        assert_eq!(desc.angular_damping, 0.0);
        assert_eq!(controller.linear_velocity(body).unwrap(), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(controller.angular_velocity(body).unwrap(), Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_set_kinematic_round_trip() {
        let (scene, node, mut controller) = setup();
        let body = controller
            .create_rigid_body(&scene, node, &ShapeType::Box, &RigidBodyParams::default())
            .unwrap();

        controller.set_kinematic(body, true).unwrap();
        assert_eq!(controller.body_kind(body).unwrap(), BodyKind::Kinematic);
        assert_eq!(controller.backend.body_kind(body.handle()), Some(BodyKind::Kinematic));

        controller.set_kinematic(body, false).unwrap();
        assert_eq!(controller.body_kind(body).unwrap(), BodyKind::Dynamic);
    }

    #[test]
    fn test_rapier_impulse_moves_node() {
        let mut scene = SceneGraph::new();
        let node = scene.add(
            Node::new("puck").with_model(Model::from_geometry(Geometry::cube(0.5))),
        );
        let mut controller = PhysicsController::new(PhysicsConfig::zero_gravity());
        let body = controller
            .create_rigid_body(&scene, node, &ShapeType::Sphere, &RigidBodyParams::default())
            .unwrap();

        // Mass properties settle on the first step
        controller.step(&mut scene, 1.0 / 60.0);
        controller.apply_impulse(body, Vec3::new(3.0, 0.0, 0.0), None).unwrap();
        for _ in 0..60 {
            controller.step(&mut scene, 1.0 / 60.0);
        }

        let x = scene.get(node).unwrap().position.x;
        assert!((x - 3.0).abs() < 0.1, "puck at {x}");
        assert!((controller.linear_velocity(body).unwrap().x - 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_rapier_off_center_push_spins_body() {
        let mut scene = SceneGraph::new();
        let cube = Model::from_geometry(Geometry::cube(0.5));
        let hit = scene.add(Node::new("hit").with_model(cube.clone()));
        let pushed = scene.add(
            Node::new("pushed")
                .with_position(Vec3::new(5.0, 0.0, 0.0))
                .with_model(cube),
        );
        let mut controller = PhysicsController::new(PhysicsConfig::zero_gravity());
        let params = RigidBodyParams::default();
        let hit_body = controller.create_rigid_body(&scene, hit, &ShapeType::Box, &params).unwrap();
        let pushed_body = controller.create_rigid_body(&scene, pushed, &ShapeType::Box, &params).unwrap();
        controller.step(&mut scene, 1.0 / 60.0);

        // +X impulse above the center: r x J points along -Z
        controller
            .apply_impulse(hit_body, Vec3::new(1.0, 0.0, 0.0), Some(Vec3::new(0.0, 0.5, 0.0)))
            .unwrap();
        let spin = controller.angular_velocity(hit_body).unwrap();
        assert!(spin.z < -1e-3, "spin {spin:?}");
        assert!(spin.x.abs() < 1e-4 && spin.y.abs() < 1e-4);
        assert!(controller.linear_velocity(hit_body).unwrap().x > 0.0);

        // +Z force to the +X side: r x F points along -Y
        controller
            .apply_force(pushed_body, Vec3::new(0.0, 0.0, 10.0), Some(Vec3::new(1.0, 0.0, 0.0)))
            .unwrap();
        controller.step(&mut scene, 1.0 / 60.0);
        let spin = controller.angular_velocity(pushed_body).unwrap();
        assert!(spin.y < -1e-3, "spin {spin:?}");
    }

    #[test]
    fn test_rapier_off_center_mesh_collider_offset() {
        let mut scene = SceneGraph::new();
        let mut geometry = Geometry::cube(0.5);
        for p in &mut geometry.positions {
            p.x += 2.0;
        }
        let node = scene.add(
            Node::new("offset")
                .with_uniform_scale(2.0)
                .with_model(Model::from_geometry(geometry)),
        );
        let mut controller = PhysicsController::new(PhysicsConfig::zero_gravity());
        controller
            .create_rigid_body(&scene, node, &ShapeType::Box, &RigidBodyParams::static_body())
            .unwrap();
        controller.step(&mut scene, 1.0 / 60.0);

        // Bounds center (2, 0, 0) scaled by 2, half extents 1
        let down = Vec3::new(0.0, -1.0, 0.0);
        let hit = controller.raycast(&Ray::new(Vec3::new(4.0, 10.0, 0.0), down), 100.0).unwrap();
        assert_eq!(hit.node, node);
        assert!((hit.distance - 9.0).abs() < 1e-3, "distance {}", hit.distance);
        assert!((hit.position.x - 4.0).abs() < 1e-3);

        assert!(controller.raycast(&Ray::new(Vec3::new(0.0, 10.0, 0.0), down), 100.0).is_none());
        assert!(controller.raycast(&Ray::new(Vec3::new(5.5, 10.0, 0.0), down), 100.0).is_none());
    }
}
