//! Scene nodes and the hierarchy that owns them

use crate::mesh::Model;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use tern_core::{Quat, Vec3};

new_key_type! {
    /// Unique identifier for a node in a scene graph
    pub struct NodeId;
}

/// A named transform in the scene, optionally carrying a model
#[derive(Clone, Debug)]
pub struct Node {
    /// Name for lookup and debugging
    pub name: String,
    /// Local position relative to parent
    pub position: Vec3,
    /// Local rotation relative to parent
    pub rotation: Quat,
    /// Local scale
    pub scale: Vec3,
    /// Attached model, if any
    pub model: Option<Model>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            name: String::new(),
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            model: None,
        }
    }
}

impl Node {
    /// Create a node at the origin
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_uniform_scale(mut self, s: f32) -> Self {
        self.scale = Vec3::splat(s);
        self
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.model = Some(model);
        self
    }
}

/// Node transform accumulated along the parent chain
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for WorldTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl WorldTransform {
    /// Compose a child's local transform onto this one
    fn then(&self, node: &Node) -> Self {
        Self {
            position: self.position + self.rotation.rotate_vec3(self.scale.mul_elem(node.position)),
            rotation: (self.rotation * node.rotation).normalize(),
            scale: self.scale.mul_elem(node.scale),
        }
    }
}

/// Owns every node and the parent/child links between them
#[derive(Default)]
pub struct SceneGraph {
    nodes: SlotMap<NodeId, Node>,
    children: FxHashMap<NodeId, SmallVec<[NodeId; 8]>>,
    parents: FxHashMap<NodeId, NodeId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root node
    pub fn add(&mut self, node: Node) -> NodeId {
        self.nodes.insert(node)
    }

    /// Add a node under `parent`. An unknown parent adds the node at the root.
    pub fn add_child(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = self.nodes.insert(node);
        if self.nodes.contains_key(parent) {
            self.parents.insert(id, parent);
            self.children.entry(parent).or_default().push(id);
        } else {
            tracing::warn!("add_child: parent {:?} not in scene, adding {:?} as a root", parent, id);
        }
        id
    }

    /// Remove a node and all its descendants, returning every removed id
    pub fn remove(&mut self, id: NodeId) -> Vec<NodeId> {
        let mut removed = Vec::new();
        if !self.nodes.contains_key(id) {
            return removed;
        }

        if let Some(parent) = self.parents.remove(&id) {
            if let Some(siblings) = self.children.get_mut(&parent) {
                siblings.retain(|c| *c != id);
            }
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(children) = self.children.remove(&current) {
                stack.extend(children);
            }
            self.parents.remove(&current);
            if self.nodes.remove(current).is_some() {
                removed.push(current);
            }
        }
        removed
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).copied()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children.get(&id).map(|c| c.as_slice()).unwrap_or(&[])
    }

    /// First node with the given name
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.name == name)
            .map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes.iter()
    }

    /// World-space transform of a node
    pub fn world_transform(&self, id: NodeId) -> Option<WorldTransform> {
        let node = self.nodes.get(id)?;
        let parent = match self.parent(id) {
            Some(parent) => self.world_transform(parent)?,
            None => WorldTransform::default(),
        };
        Some(parent.then(node))
    }

    /// Place a node at a world-space pose, keeping its scale
    ///
    /// The pose is converted into the parent's space. Returns false if the
    /// node does not exist.
    pub fn set_world_transform(&mut self, id: NodeId, position: Vec3, rotation: Quat) -> bool {
        let parent = match self.parent(id) {
            Some(parent) => self.world_transform(parent).unwrap_or_default(),
            None => WorldTransform::default(),
        };
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };

        let inv_rotation = parent.rotation.conjugate();
        node.position = inv_rotation
            .rotate_vec3(position - parent.position)
            .div_elem(parent.scale);
        node.rotation = (inv_rotation * rotation).normalize();
        true
    }
}
