//! Ray queries and collision events reported at node level

use tern_core::Vec3;
use tern_scene::NodeId;

/// Ray for raycasting
#[derive(Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Ray direction (normalized on construction)
    pub direction: Vec3,
}

impl Ray {
    /// Ray along `direction`; +Z when the direction is zero
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        let direction = if direction.length() > 0.0001 {
            direction.normalize()
        } else {
            Vec3::new(0.0, 0.0, 1.0)
        };
        Self { origin, direction }
    }

    /// Ray from `from` towards `to`, +Z when the points coincide
    pub fn from_points(from: Vec3, to: Vec3) -> Self {
        Self::new(from, to - from)
    }

    /// Point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Raycast hit result
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RaycastHit {
    /// Node whose body was hit
    pub node: NodeId,
    /// Hit position in world space
    pub position: Vec3,
    /// Surface normal at hit point
    pub normal: Vec3,
    /// Distance from ray origin
    pub distance: f32,
}

/// Type of collision event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollisionEventType {
    /// Collision started
    Started,
    /// Collision ended
    Stopped,
}

/// Contact change between the bodies of two nodes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionEvent {
    pub node_a: NodeId,
    pub node_b: NodeId,
    pub event_type: CollisionEventType,
}

impl CollisionEvent {
    /// Whether the event involves `node`
    pub fn involves(&self, node: NodeId) -> bool {
        self.node_a == node || self.node_b == node
    }

    /// The other node of the pair, if `node` is one of them
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if self.node_a == node {
            Some(self.node_b)
        } else if self.node_b == node {
            Some(self.node_a)
        } else {
            None
        }
    }
}
