//! Physics controller: owns the world, the shape cache and the body registry

use crate::backend::{BodyHandle, BodyKind, PhysicsBackend};
use crate::config::PhysicsConfig;
use crate::error::Result;
use crate::motion_state::MotionState;
use crate::queries::{CollisionEvent, CollisionEventType, Ray, RaycastHit};
use crate::rapier_backend::RapierBackend;
use crate::shape::{ShapeDesc, ShapeKey};
use rustc_hash::FxHashMap;
use tern_core::{Quat, Vec3};
use tern_scene::{NodeId, SceneGraph};

/// Per-body bookkeeping kept next to the engine body
#[derive(Clone, Debug)]
pub(crate) struct BodyRecord {
    pub(crate) motion_state: MotionState,
    pub(crate) kind: BodyKind,
    /// Kind taken when kinematic mode is switched off
    pub(crate) released_kind: BodyKind,
    pub(crate) friction: f32,
    pub(crate) restitution: f32,
}

/// Physics world bound to a scene graph
///
/// Bodies are created through
/// [`create_rigid_body`](Self::create_rigid_body) and simulated by
/// [`step`](Self::step), which writes the results back into the nodes.
pub struct PhysicsController<B: PhysicsBackend = RapierBackend> {
    config: PhysicsConfig,
    pub(crate) backend: B,
    /// Box and sphere shapes keyed by scaled size
    shapes: FxHashMap<ShapeKey, B::Shape>,
    pub(crate) bodies: FxHashMap<BodyHandle, BodyRecord>,
    pub(crate) node_to_body: FxHashMap<NodeId, BodyHandle>,
    /// Accumulated time for fixed timestep
    accumulator: f32,
    collision_events: Vec<CollisionEvent>,
}

impl PhysicsController<RapierBackend> {
    /// Create a controller backed by Rapier
    pub fn new(config: PhysicsConfig) -> Self {
        Self::with_backend(RapierBackend::new(), config)
    }
}

impl Default for PhysicsController<RapierBackend> {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

impl<B: PhysicsBackend> PhysicsController<B> {
    /// Create a controller on top of any backend, initialized from `config`
    pub fn with_backend(mut backend: B, config: PhysicsConfig) -> Self {
        backend.init(&config);
        Self {
            config,
            backend,
            shapes: FxHashMap::default(),
            bodies: FxHashMap::default(),
            node_to_body: FxHashMap::default(),
            accumulator: 0.0,
            collision_events: Vec::new(),
        }
    }

    /// Current configuration
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Gravity the world currently uses
    pub fn gravity(&self) -> Vec3 {
        self.config.gravity
    }

    /// Change gravity for every body
    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.config.gravity = gravity;
        self.backend.set_gravity(gravity);
    }

    /// Name of the backend engine
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Number of registered bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Box shape for a bounding box, shared by every caller asking for the
    /// same scaled size
    pub fn get_box(&mut self, min: Vec3, max: Vec3, scale: Vec3) -> Result<B::Shape> {
        self.shape_for(&ShapeDesc::scaled_box(min, max, scale))
    }

    /// Sphere shape for a radius, shared like [`get_box`](Self::get_box)
    pub fn get_sphere(&mut self, radius: f32, scale: Vec3) -> Result<B::Shape> {
        self.shape_for(&ShapeDesc::scaled_sphere(radius, scale))
    }

    /// Number of box and sphere shapes in the cache
    pub fn cached_shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Drop cached shapes that no body uses, returning how many went
    pub fn prune_shapes(&mut self) -> usize {
        let before = self.shapes.len();
        let backend = &self.backend;
        self.shapes.retain(|_, shape| backend.shape_in_use(shape));
        let pruned = before - self.shapes.len();
        if pruned > 0 {
            tracing::debug!("Pruned {} unused collision shapes", pruned);
        }
        pruned
    }

    /// Cached shape for boxes and spheres, a fresh one otherwise
    pub(crate) fn shape_for(&mut self, desc: &ShapeDesc) -> Result<B::Shape> {
        let Some(key) = desc.key() else {
            return self.backend.create_shape(desc);
        };
        if let Some(shape) = self.shapes.get(&key) {
            return Ok(shape.clone());
        }
        let shape = self.backend.create_shape(desc)?;
        tracing::debug!("Created collision shape {:?}", desc);
        self.shapes.insert(key, shape.clone());
        Ok(shape)
    }

    /// Advance the simulation by `dt` seconds and sync the scene
    ///
    /// Kinematic bodies take their node's pose first. After the world has
    /// moved, every awake dynamic body writes its pose back into its node.
    /// Returns the number of substeps run.
    pub fn step(&mut self, scene: &mut SceneGraph, dt: f32) -> usize {
        self.collision_events.clear();
        self.remove_orphans(scene);
        self.push_kinematic_poses(scene);

        let substeps = self.run_substeps(dt);
        if substeps == 0 {
            return 0;
        }

        // Forces and torques only last for one step call
        self.backend.clear_forces();
        self.write_back(scene);
        self.collect_contacts();

        tracing::trace!(
            "Physics step: dt={} substeps={} bodies={} events={}",
            dt,
            substeps,
            self.bodies.len(),
            self.collision_events.len()
        );
        substeps
    }

    /// Contact changes seen by the last [`step`](Self::step)
    pub fn collision_events(&self) -> &[CollisionEvent] {
        &self.collision_events
    }

    /// First body hit by a ray, against the world as of the last step
    pub fn raycast(&self, ray: &Ray, max_distance: f32) -> Option<RaycastHit> {
        let hit = self.backend.raycast(ray, max_distance)?;
        let node = self.node_of(hit.body)?;
        Some(RaycastHit {
            node,
            position: hit.position,
            normal: hit.normal,
            distance: hit.distance,
        })
    }

    fn run_substeps(&mut self, dt: f32) -> usize {
        if !dt.is_finite() || dt <= 0.0 {
            return 0;
        }

        let timestep = self.config.timestep;
        if timestep <= 0.0 {
            // Variable timestep
            self.backend.step(dt);
            return 1;
        }

        self.accumulator += dt;
        let max_substeps = self.config.max_substeps.max(1) as usize;
        let mut steps = 0;
        while self.accumulator >= timestep && steps < max_substeps {
            self.backend.step(timestep);
            self.accumulator -= timestep;
            steps += 1;
        }
        if self.accumulator >= timestep {
            tracing::debug!(
                "Physics fell behind by {:.4}s, dropping the backlog",
                self.accumulator
            );
            self.accumulator %= timestep;
        }
        steps
    }

    fn remove_orphans(&mut self, scene: &SceneGraph) {
        let orphans: Vec<(BodyHandle, NodeId)> = self
            .bodies
            .iter()
            .filter(|(_, record)| !scene.contains(record.motion_state.node()))
            .map(|(handle, record)| (*handle, record.motion_state.node()))
            .collect();

        for (handle, node) in orphans {
            tracing::warn!(
                "Node {:?} left the scene, unregistering its rigid body {:?}",
                node,
                handle
            );
            self.bodies.remove(&handle);
            self.node_to_body.remove(&node);
            self.backend.remove_rigid_body(handle);
        }
    }

    fn push_kinematic_poses(&mut self, scene: &SceneGraph) {
        for (handle, record) in &self.bodies {
            if record.kind != BodyKind::Kinematic {
                continue;
            }
            if let Some((position, rotation)) = record.motion_state.world_transform(scene) {
                self.backend.set_kinematic_target(*handle, position, rotation);
            }
        }
    }

    fn write_back(&mut self, scene: &mut SceneGraph) {
        let mut moved: Vec<(usize, &BodyRecord, Vec3, Quat)> = self
            .bodies
            .iter()
            .filter(|(handle, record)| {
                record.kind == BodyKind::Dynamic && self.backend.is_active(**handle)
            })
            .filter_map(|(handle, record)| {
                let (position, rotation) = self.backend.body_transform(*handle)?;
                let depth = node_depth(scene, record.motion_state.node());
                Some((depth, record, position, rotation))
            })
            .collect();

        // Parents first, so children convert against the parent's new pose
        moved.sort_by_key(|(depth, ..)| *depth);
        for (_, record, position, rotation) in moved {
            record.motion_state.set_world_transform(scene, position, rotation);
        }
    }

    fn collect_contacts(&mut self) {
        for contact in self.backend.drain_contacts() {
            let nodes = (self.node_of(contact.body_a), self.node_of(contact.body_b));
            let (Some(node_a), Some(node_b)) = nodes else {
                tracing::warn!(
                    "Dropping contact between unregistered bodies {:?} and {:?}",
                    contact.body_a,
                    contact.body_b
                );
                continue;
            };
            self.collision_events.push(CollisionEvent {
                node_a,
                node_b,
                event_type: if contact.started {
                    CollisionEventType::Started
                } else {
                    CollisionEventType::Stopped
                },
            });
        }
    }
}

/// Number of ancestors above `node`
fn node_depth(scene: &SceneGraph, node: NodeId) -> usize {
    let mut depth = 0;
    let mut current = node;
    while let Some(parent) = scene.parent(current) {
        depth += 1;
        current = parent;
    }
    depth
}
