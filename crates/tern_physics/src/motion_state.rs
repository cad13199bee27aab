//! Transform bridge between a rigid body and its scene node

use tern_core::{Quat, Vec3};
use tern_scene::{NodeId, SceneGraph};

/// Keeps a body and its node in sync
///
/// The engine reads the initial pose (and every kinematic pose) through
/// [`world_transform`](Self::world_transform) and hands simulated poses back
/// through [`set_world_transform`](Self::set_world_transform).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotionState {
    node: NodeId,
}

impl MotionState {
    pub fn new(node: NodeId) -> Self {
        Self { node }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// World position and rotation of the node
    pub fn world_transform(&self, scene: &SceneGraph) -> Option<(Vec3, Quat)> {
        scene
            .world_transform(self.node)
            .map(|t| (t.position, t.rotation))
    }

    /// Write a simulated world pose into the node
    ///
    /// Returns false when the node is no longer in the scene.
    pub fn set_world_transform(&self, scene: &mut SceneGraph, position: Vec3, rotation: Quat) -> bool {
        scene.set_world_transform(self.node, position, rotation)
    }
}
