//! Physics backend seam
//!
//! The controller only talks to the engine through [`PhysicsBackend`].
//! [`RapierBackend`](crate::RapierBackend) is the production implementation.

use crate::config::PhysicsConfig;
use crate::error::Result;
use crate::queries::Ray;
use crate::shape::ShapeDesc;
use tern_core::{Quat, Vec3};

/// Handle to a rigid body in the physics backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub(crate) u64);

/// How the engine moves a body
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BodyKind {
    /// Moves according to physics forces
    #[default]
    Dynamic,
    /// Never moves, infinite mass
    Static,
    /// Follows its node, pushes dynamic bodies
    Kinematic,
}

/// Everything the backend needs to create a body around a shape
#[derive(Clone, Debug, PartialEq)]
pub struct BodyDesc {
    pub kind: BodyKind,
    /// Initial world position of the body origin
    pub position: Vec3,
    /// Initial world rotation
    pub rotation: Quat,
    /// Collider position relative to the body origin, in body space
    pub collider_offset: Vec3,
    /// Mass in kg; only used for dynamic bodies
    pub mass: f32,
    pub friction: f32,
    pub restitution: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub ccd_enabled: bool,
    pub can_sleep: bool,
}

/// A ray hit reported by the backend
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackendHit {
    pub body: BodyHandle,
    pub position: Vec3,
    pub normal: Vec3,
    pub distance: f32,
}

/// Contact start/stop between two bodies
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackendContact {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub started: bool,
}

/// Physics backend trait
///
/// Operations on unknown handles are ignored, and queries on them return
/// `None` or `false`.
pub trait PhysicsBackend {
    /// Engine shape, cheap to clone and shareable between bodies
    type Shape: Clone;

    /// Initialize the backend with config
    fn init(&mut self, config: &PhysicsConfig);

    fn set_gravity(&mut self, gravity: Vec3);

    /// Build an engine shape
    fn create_shape(&mut self, desc: &ShapeDesc) -> Result<Self::Shape>;

    /// Whether any body still uses this shape
    fn shape_in_use(&self, shape: &Self::Shape) -> bool;

    /// Add a rigid body with a single collider and return its handle
    fn add_rigid_body(&mut self, shape: &Self::Shape, desc: &BodyDesc) -> BodyHandle;

    /// Remove a rigid body and its collider
    fn remove_rigid_body(&mut self, handle: BodyHandle) -> bool;

    /// Advance the simulation by `dt` seconds
    fn step(&mut self, dt: f32);

    /// Drop accumulated forces and torques on every body
    fn clear_forces(&mut self);

    /// World pose of the body origin
    fn body_transform(&self, handle: BodyHandle) -> Option<(Vec3, Quat)>;

    /// Pose a kinematic body should reach at the end of the next step
    fn set_kinematic_target(&mut self, handle: BodyHandle, position: Vec3, rotation: Quat);

    fn set_body_kind(&mut self, handle: BodyHandle, kind: BodyKind);

    fn body_kind(&self, handle: BodyHandle) -> Option<BodyKind>;

    /// Wake a sleeping body
    fn activate(&mut self, handle: BodyHandle);

    /// Whether the body is awake
    fn is_active(&self, handle: BodyHandle) -> bool;

    /// Apply force at the center of mass, or at an offset from it
    fn apply_force(&mut self, handle: BodyHandle, force: Vec3, relative_position: Option<Vec3>);

    /// Apply impulse at the center of mass, or at an offset from it
    fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3, relative_position: Option<Vec3>);

    fn apply_torque(&mut self, handle: BodyHandle, torque: Vec3);

    fn apply_torque_impulse(&mut self, handle: BodyHandle, torque: Vec3);

    fn linear_velocity(&self, handle: BodyHandle) -> Option<Vec3>;

    fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec3);

    fn angular_velocity(&self, handle: BodyHandle) -> Option<Vec3>;

    fn set_angular_velocity(&mut self, handle: BodyHandle, velocity: Vec3);

    fn set_material(&mut self, handle: BodyHandle, friction: f32, restitution: f32);

    fn set_damping(&mut self, handle: BodyHandle, linear: f32, angular: f32);

    /// Cast a ray and return the first hit
    fn raycast(&self, ray: &Ray, max_distance: f32) -> Option<BackendHit>;

    /// Take the contact events produced since the last call
    fn drain_contacts(&mut self) -> Vec<BackendContact>;

    /// Backend name
    fn name(&self) -> &'static str;
}
